use std::fmt;

use thiserror::Error;

pub mod config;
pub mod frame;

pub use config::*;
pub use frame::*;

pub const Y_C: usize = 0; /* Y luma */
pub const U_C: usize = 1; /* Cb Chroma */
pub const V_C: usize = 2; /* Cr Chroma */
pub const N_C: usize = 3; /* number of color component */

/// Errors raised while setting up a reconstruction session.
///
/// Kernels themselves never return errors: a descriptor that reaches them
/// out of range is a caller bug and panics.
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("unsupported bit depth {0}")]
    UnsupportedBitDepth(u32),
    #[error("unsupported chroma sampling {0}")]
    UnsupportedChromaSampling(ChromaSampling),
    #[error("transform dynamic range {0} outside 9..=15")]
    InvalidDynamicRange(u32),
    #[error("invalid picture dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("cannot resample {base_width}x{base_height} into {enh_width}x{enh_height}")]
    InvalidScaling {
        base_width: usize,
        base_height: usize,
        enh_width: usize,
        enh_height: usize,
    },
    #[error("invalid color lut: {0}")]
    InvalidColorLut(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum ChromaSampling {
    Cs400,
    Cs420,
    Cs422,
    Cs444,
}

impl Default for ChromaSampling {
    fn default() -> Self {
        ChromaSampling::Cs420
    }
}

impl From<u8> for ChromaSampling {
    fn from(val: u8) -> Self {
        use self::ChromaSampling::*;
        match val {
            0 => Cs400,
            1 => Cs420,
            2 => Cs422,
            _ => Cs444,
        }
    }
}

impl fmt::Display for ChromaSampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::ChromaSampling::*;
        match self {
            Cs400 => write!(f, "4:0:0"),
            Cs420 => write!(f, "4:2:0"),
            Cs422 => write!(f, "4:2:2"),
            Cs444 => write!(f, "4:4:4"),
        }
    }
}

impl ChromaSampling {
    // Provides the sampling period in the horizontal and vertical axes.
    pub fn sampling_period(self) -> (usize, usize) {
        use self::ChromaSampling::*;
        match self {
            Cs420 => (2, 2),
            Cs422 => (2, 1),
            Cs444 => (1, 1),
            Cs400 => (2, 2),
        }
    }

    // log2 of the sampling period
    pub fn decimation(self) -> (usize, usize) {
        let (x, y) = self.sampling_period();
        (x >> 1, y >> 1)
    }
}
