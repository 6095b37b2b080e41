pub mod colormap;
pub mod df;
pub mod emt;
pub mod itx;
pub mod mc;
pub mod plane;
pub mod recon;
pub mod region;
pub mod sao;
pub mod tbl;
pub mod tracer;
pub mod upsample;
pub mod util;

/*****************************************************************************
 * block geometry
 *****************************************************************************/
pub const MIN_TR_LOG2: usize = 2; /* 4x4 */
pub const MAX_TR_LOG2: usize = 5; /* 32x32 */
pub const MAX_EMT_LOG2: usize = 6; /* 64x64, DCT-II only */
pub const MIN_TR_SIZE: usize = 1 << MIN_TR_LOG2;
pub const MAX_TR_SIZE: usize = 1 << MAX_TR_LOG2;
pub const MAX_EMT_SIZE: usize = 1 << MAX_EMT_LOG2;
pub const MAX_TR_DIM: usize = MAX_TR_SIZE * MAX_TR_SIZE;
pub const MAX_EMT_DIM: usize = MAX_EMT_SIZE * MAX_EMT_SIZE;

/* largest prediction block, and row stride of the interpolation intermediates */
pub const MAX_PB_SIZE: usize = 64;
/* rows/columns of overhang needed around a block by the 8-tap filters */
pub const QPEL_EXTRA_BEFORE: usize = 3;
pub const QPEL_EXTRA_AFTER: usize = 4;
pub const QPEL_EXTRA: usize = QPEL_EXTRA_BEFORE + QPEL_EXTRA_AFTER;
pub const EPEL_EXTRA_BEFORE: usize = 1;
pub const EPEL_EXTRA_AFTER: usize = 2;
pub const EPEL_EXTRA: usize = EPEL_EXTRA_BEFORE + EPEL_EXTRA_AFTER;

/* largest CTU, bounds the SAO and deblocking regions */
pub const MAX_CTU_LOG2: usize = 6;
pub const MAX_CTU_SIZE: usize = 1 << MAX_CTU_LOG2;

/* lowest and highest supported transform dynamic range for i16 coefficients */
pub const MIN_LOG2_TR_DYNAMIC_RANGE: u32 = 9;
pub const MAX_LOG2_TR_DYNAMIC_RANGE: u32 = 15;
