#![allow(clippy::too_many_arguments)]

#[macro_use]
extern crate lazy_static;

pub mod api;
pub mod com;

pub use api::*;

#[cfg(feature = "bench")]
pub mod bench {
    pub mod frame {
        pub use crate::api::frame::*;
    }
    pub mod plane {
        pub use crate::com::plane::*;
        pub use crate::com::region::*;
    }
    pub mod itx {
        pub use crate::com::emt::*;
        pub use crate::com::itx::*;
    }
    pub mod mc {
        pub use crate::com::mc::*;
        pub use crate::com::MAX_PB_SIZE;
    }
    pub mod sao {
        pub use crate::com::sao::*;
    }
    pub mod df {
        pub use crate::com::df::*;
    }
    pub mod upsample {
        pub use crate::com::upsample::*;
    }
}
