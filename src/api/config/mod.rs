use crate::api::*;
use crate::com::upsample::{ResampleAxis, ResampleGeometry};
use crate::com::{MAX_LOG2_TR_DYNAMIC_RANGE, MIN_LOG2_TR_DYNAMIC_RANGE};

use log::*;

// Session settings shared by every reconstruction kernel of one layer.
#[derive(Clone, Copy, Debug)]
pub struct ReconConfig {
    // Bit depth of the luma plane.
    pub bit_depth_luma: u32,
    // Bit depth of both chroma planes.
    pub bit_depth_chroma: u32,
    // Chroma subsampling.
    pub chroma_sampling: ChromaSampling,
    // Extended multiple transform selection for luma blocks.
    pub emt_enabled: bool,
    // Range extension: transform dynamic range follows the bit depth.
    pub extended_precision: bool,
    // Explicit transform dynamic range, mostly for conformance testing.
    pub log2_tr_dynamic_range: Option<u32>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        ReconConfig {
            bit_depth_luma: 8,
            bit_depth_chroma: 8,
            chroma_sampling: ChromaSampling::Cs420,
            emt_enabled: false,
            extended_precision: false,
            log2_tr_dynamic_range: None,
        }
    }
}

impl ReconConfig {
    pub fn validate(&self) -> Result<(), ReconError> {
        let luma = SampleDepth::from_bits(self.bit_depth_luma).map_err(|e| {
            error!("luma bit depth {} is not supported", self.bit_depth_luma);
            e
        })?;
        let chroma = SampleDepth::from_bits(self.bit_depth_chroma).map_err(|e| {
            error!("chroma bit depth {} is not supported", self.bit_depth_chroma);
            e
        })?;

        for &bd in &[self.bit_depth_luma, self.bit_depth_chroma] {
            let range = self.max_log2_tr_dynamic_range(bd);
            if range < MIN_LOG2_TR_DYNAMIC_RANGE || range > MAX_LOG2_TR_DYNAMIC_RANGE {
                error!("transform dynamic range {} out of bounds", range);
                return Err(ReconError::InvalidDynamicRange(range));
            }
        }

        debug!(
            "recon config: luma {}, chroma {}, {}, emt {}",
            luma, chroma, self.chroma_sampling, self.emt_enabled
        );
        Ok(())
    }

    pub fn bit_depth(&self, c: usize) -> u32 {
        if c == Y_C {
            self.bit_depth_luma
        } else {
            self.bit_depth_chroma
        }
    }

    /// Log2 of the coefficient magnitude bound the transforms clip to.
    ///
    /// Coefficients are carried as i16, so the extended-precision range
    /// `max(15, bit_depth + 6)` saturates at 15.
    pub fn max_log2_tr_dynamic_range(&self, bit_depth: u32) -> u32 {
        if let Some(range) = self.log2_tr_dynamic_range {
            range
        } else if self.extended_precision {
            std::cmp::min(std::cmp::max(15, bit_depth + 6), MAX_LOG2_TR_DYNAMIC_RANGE)
        } else {
            15
        }
    }
}

// Offsets of the scaled reference window inside the enhancement picture,
// in luma samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScaledWindow {
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
}

// Inter-layer reference settings of a two-layer spatially scalable stream.
#[derive(Clone, Copy, Debug)]
pub struct InterLayerConfig {
    pub base_width: usize,
    pub base_height: usize,
    pub enh_width: usize,
    pub enh_height: usize,
    pub window: ScaledWindow,

    pub base_bit_depth_luma: u32,
    pub base_bit_depth_chroma: u32,
    pub enh_bit_depth_luma: u32,
    pub enh_bit_depth_chroma: u32,

    pub chroma_sampling: ChromaSampling,
    // Vertical chroma sample location phase, in quarter base samples.
    pub chroma_phase_y: i32,
}

impl Default for InterLayerConfig {
    fn default() -> Self {
        InterLayerConfig {
            base_width: 0,
            base_height: 0,
            enh_width: 0,
            enh_height: 0,
            window: ScaledWindow::default(),
            base_bit_depth_luma: 8,
            base_bit_depth_chroma: 8,
            enh_bit_depth_luma: 8,
            enh_bit_depth_chroma: 8,
            chroma_sampling: ChromaSampling::Cs420,
            chroma_phase_y: 1,
        }
    }
}

impl InterLayerConfig {
    pub fn new(base_width: usize, base_height: usize, enh_width: usize, enh_height: usize) -> Self {
        InterLayerConfig {
            base_width,
            base_height,
            enh_width,
            enh_height,
            ..Default::default()
        }
    }

    fn window_size(&self) -> (usize, usize) {
        let w = &self.window;
        (
            self.enh_width.saturating_sub(w.left + w.right),
            self.enh_height.saturating_sub(w.top + w.bottom),
        )
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for &bd in &[
            self.base_bit_depth_luma,
            self.base_bit_depth_chroma,
            self.enh_bit_depth_luma,
            self.enh_bit_depth_chroma,
        ] {
            SampleDepth::from_bits(bd).map_err(|e| {
                error!("inter-layer bit depth {} is not supported", bd);
                e
            })?;
        }

        match self.chroma_sampling {
            ChromaSampling::Cs420 | ChromaSampling::Cs400 => {}
            cs => {
                error!("inter-layer resampling of {} is not supported", cs);
                return Err(ReconError::UnsupportedChromaSampling(cs));
            }
        }

        if self.base_width == 0 || self.base_height == 0 {
            error!("empty base layer {}x{}", self.base_width, self.base_height);
            return Err(ReconError::InvalidDimensions {
                width: self.base_width,
                height: self.base_height,
            });
        }

        let (win_w, win_h) = self.window_size();
        if win_w < 2 || win_h < 2 || win_w % 2 != 0 || win_h % 2 != 0 {
            error!(
                "scaled window {}x{} of {}x{} is unusable",
                win_w, win_h, self.enh_width, self.enh_height
            );
            return Err(ReconError::InvalidDimensions {
                width: self.enh_width,
                height: self.enh_height,
            });
        }

        if self.base_width > win_w || self.base_height > win_h {
            error!(
                "cannot upsample {}x{} into {}x{}",
                self.base_width, self.base_height, win_w, win_h
            );
            return Err(ReconError::InvalidScaling {
                base_width: self.base_width,
                base_height: self.base_height,
                enh_width: win_w,
                enh_height: win_h,
            });
        }

        debug!(
            "inter-layer: {}x{} -> {}x{} (window {:?}), depths {}/{} -> {}/{}",
            self.base_width,
            self.base_height,
            self.enh_width,
            self.enh_height,
            self.window,
            self.base_bit_depth_luma,
            self.base_bit_depth_chroma,
            self.enh_bit_depth_luma,
            self.enh_bit_depth_chroma
        );
        Ok(())
    }

    /// Resampling geometry of plane `c`; chroma planes use halved
    /// dimensions and window offsets.
    pub fn geometry(&self, c: usize) -> ResampleGeometry {
        let w = &self.window;
        if c == Y_C {
            ResampleGeometry {
                hor: ResampleAxis::new(self.base_width, self.enh_width, w.left, w.right, 0),
                ver: ResampleAxis::new(self.base_height, self.enh_height, w.top, w.bottom, 0),
            }
        } else {
            ResampleGeometry {
                hor: ResampleAxis::new(
                    self.base_width >> 1,
                    self.enh_width >> 1,
                    w.left >> 1,
                    w.right >> 1,
                    0,
                ),
                ver: ResampleAxis::new(
                    self.base_height >> 1,
                    self.enh_height >> 1,
                    w.top >> 1,
                    w.bottom >> 1,
                    self.chroma_phase_y,
                ),
            }
        }
    }

    pub fn base_bit_depth(&self, c: usize) -> u32 {
        if c == Y_C {
            self.base_bit_depth_luma
        } else {
            self.base_bit_depth_chroma
        }
    }

    pub fn enh_bit_depth(&self, c: usize) -> u32 {
        if c == Y_C {
            self.enh_bit_depth_luma
        } else {
            self.enh_bit_depth_chroma
        }
    }
}
