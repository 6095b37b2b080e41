use super::region::*;
use super::util::*;
use super::*;
use crate::api::*;

use log::*;

/* fractional bits of the octant weights */
const CM_WEIGHT_PREC: u32 = 10;

/// Affine mapping of one octant.
///
/// `weights[k]` scales the (y, u, v) input triple for output component `k`,
/// `offset[k]` is added after the mapping shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cuboid {
    pub weights: [[i32; 3]; N_C],
    pub offset: [i32; N_C],
}

impl Cuboid {
    pub fn identity() -> Self {
        let one = 1 << CM_WEIGHT_PREC;
        Cuboid {
            weights: [[one, 0, 0], [0, one, 0], [0, 0, one]],
            offset: [0; N_C],
        }
    }
}

/// Sides of a block lying on the picture boundary. Chroma interpolation
/// replicates the last row or column there instead of reading past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorMapBounds {
    pub top: bool,
    pub bottom: bool,
    pub right: bool,
}

impl ColorMapBounds {
    pub fn picture() -> Self {
        ColorMapBounds {
            top: true,
            bottom: true,
            right: true,
        }
    }
}

/// Three-dimensional color lookup table mapping base layer samples into the
/// color space and depth of the enhancement layer.
#[derive(Debug, Clone)]
pub struct ColorLut {
    octant_depth: u32,
    y_part_num_log2: u32,
    input_bit_depth: [u32; 2],
    output_bit_depth: [u32; 2],
    adapt_threshold: [i32; 2],
    y_shift2idx: u32,
    c_shift2idx: u32,
    mapping_shift: u32,
    cuboids: Vec<Cuboid>,
}

impl ColorLut {
    /// Table of identity octants. `input_bit_depth` and `output_bit_depth`
    /// are (luma, chroma).
    pub fn new(
        octant_depth: u32,
        y_part_num_log2: u32,
        input_bit_depth: [u32; 2],
        output_bit_depth: [u32; 2],
    ) -> Result<Self, ReconError> {
        for &bd in input_bit_depth.iter().chain(output_bit_depth.iter()) {
            SampleDepth::from_bits(bd).map_err(|e| {
                error!("color lut bit depth {} is not supported", bd);
                e
            })?;
        }
        if octant_depth < 1 || octant_depth > 2 {
            error!("color lut octant depth {} out of range", octant_depth);
            return Err(ReconError::InvalidColorLut(format!(
                "octant depth {}",
                octant_depth
            )));
        }
        if y_part_num_log2 > 3 {
            error!("color lut luma partitions 2^{} out of range", y_part_num_log2);
            return Err(ReconError::InvalidColorLut(format!(
                "luma partition log2 {}",
                y_part_num_log2
            )));
        }

        let lut = ColorLut {
            octant_depth,
            y_part_num_log2,
            input_bit_depth,
            output_bit_depth,
            adapt_threshold: [1 << (input_bit_depth[1] - 1); 2],
            y_shift2idx: input_bit_depth[0] - octant_depth - y_part_num_log2,
            c_shift2idx: input_bit_depth[1] - octant_depth,
            mapping_shift: CM_WEIGHT_PREC + input_bit_depth[0] - output_bit_depth[0],
            cuboids: vec![
                Cuboid::identity();
                (1 << (octant_depth + y_part_num_log2)) << (2 * octant_depth)
            ],
        };

        debug!(
            "color lut: {}x{}x{} octants, {}/{} -> {}/{} bits, shift {}",
            lut.y_parts(),
            lut.c_parts(),
            lut.c_parts(),
            input_bit_depth[0],
            input_bit_depth[1],
            output_bit_depth[0],
            output_bit_depth[1],
            lut.mapping_shift
        );
        Ok(lut)
    }

    /// Chroma split points of a depth 1 table.
    pub fn set_adapt_thresholds(&mut self, u: i32, v: i32) -> Result<(), ReconError> {
        let max = 1 << self.input_bit_depth[1];
        for &t in &[u, v] {
            if t <= 0 || t >= max {
                error!("color lut chroma threshold {} out of range", t);
                return Err(ReconError::InvalidColorLut(format!("chroma threshold {}", t)));
            }
        }
        self.adapt_threshold = [u, v];
        Ok(())
    }

    pub fn octant_depth(&self) -> u32 {
        self.octant_depth
    }

    pub fn input_bit_depth(&self) -> [u32; 2] {
        self.input_bit_depth
    }

    pub fn output_bit_depth(&self) -> [u32; 2] {
        self.output_bit_depth
    }

    /// Number of luma partitions.
    pub fn y_parts(&self) -> usize {
        1 << (self.octant_depth + self.y_part_num_log2)
    }

    /// Number of partitions of each chroma axis.
    pub fn c_parts(&self) -> usize {
        1 << self.octant_depth
    }

    pub fn cuboid(&self, y: usize, u: usize, v: usize) -> &Cuboid {
        assert!(y < self.y_parts() && u < self.c_parts() && v < self.c_parts());
        &self.cuboids[(y * self.c_parts() + u) * self.c_parts() + v]
    }

    pub fn cuboid_mut(&mut self, y: usize, u: usize, v: usize) -> &mut Cuboid {
        assert!(y < self.y_parts() && u < self.c_parts() && v < self.c_parts());
        let c_parts = self.c_parts();
        &mut self.cuboids[(y * c_parts + u) * c_parts + v]
    }

    #[inline(always)]
    fn chroma_index(&self, s: i32, c: usize) -> usize {
        if self.octant_depth == 1 {
            (s >= self.adapt_threshold[c]) as usize
        } else {
            (s >> self.c_shift2idx) as usize
        }
    }

    /// Octant holding the sample triple.
    #[inline]
    pub fn lookup(&self, y: i32, u: i32, v: i32) -> &Cuboid {
        self.cuboid(
            (y >> self.y_shift2idx) as usize,
            self.chroma_index(u, 0),
            self.chroma_index(v, 1),
        )
    }

    /// Output component `k` of `cuboid` for the triple, clipped to the
    /// output depth.
    #[inline(always)]
    fn apply(&self, cuboid: &Cuboid, k: usize, yuv: [i32; 3]) -> i32 {
        let w = &cuboid.weights[k];
        let sum = w[0] * yuv[0] + w[1] * yuv[1] + w[2] * yuv[2];
        let v = round_shift(sum, self.mapping_shift) + cuboid.offset[k];
        let max = (1 << self.output_bit_depth[(k != Y_C) as usize]) - 1;
        if v < 0 {
            0
        } else if v > max {
            max
        } else {
            v
        }
    }
}

/// Maps a 4:2:0 block of the base layer. `src` and `dst` hold the luma
/// region and both chroma regions; the luma region has even dimensions and
/// the chroma regions half of them.
///
/// Luma samples see chroma interpolated to their own position; chroma
/// samples see the average of the two luma samples above and below them.
/// Sides not in `bounds` read one chroma row above, below or to the right of
/// the source block.
pub fn map_color_block<B: BitDepth, E: BitDepth>(
    lut: &ColorLut,
    dst: &mut [PlaneRegionMut<'_, E::Pixel>; N_C],
    src: &[PlaneRegion<'_, B::Pixel>; N_C],
    bounds: ColorMapBounds,
) {
    assert_eq!(lut.input_bit_depth(), [B::BITS; 2]);
    assert_eq!(lut.output_bit_depth(), [E::BITS; 2]);

    let (w, h) = (src[Y_C].width(), src[Y_C].height());
    assert!(w % 2 == 0 && h % 2 == 0, "{}x{} block is not 4:2:0 aligned", w, h);
    assert!(dst[Y_C].width() == w && dst[Y_C].height() == h);
    for c in U_C..N_C {
        assert!(src[c].width() == w >> 1 && src[c].height() == h >> 1);
        assert!(dst[c].width() == w >> 1 && dst[c].height() == h >> 1);
    }

    let (cw, ch) = (w as isize >> 1, h as isize >> 1);
    let luma = |x: isize, y: isize| i32::cast_from(src[Y_C].at(x, y));
    let uv = |x: isize, y: isize| {
        [
            i32::cast_from(src[U_C].at(x, y)),
            i32::cast_from(src[V_C].at(x, y)),
        ]
    };

    for r in 0..ch {
        let prev = if bounds.top && r == 0 { 0 } else { r - 1 };
        let next = if bounds.bottom && r == ch - 1 { r } else { r + 1 };

        for k in 0..cw {
            let knext = if bounds.right && k == cw - 1 { k } else { k + 1 };
            let (x, y) = (k << 1, r << 1);

            let cur = uv(k, r);
            let cur_r = uv(knext, r);
            let up = uv(k, prev);
            let up_r = uv(knext, prev);
            let down = uv(k, next);
            let down_r = uv(knext, next);

            let mut tl = [0; 2];
            let mut tr = [0; 2];
            let mut bl = [0; 2];
            let mut br = [0; 2];
            for c in 0..2 {
                let a = cur[c] + cur_r[c];
                tl[c] = (up[c] + 3 * cur[c] + 2) >> 2;
                tr[c] = (3 * a + up[c] + up_r[c] + 4) >> 3;
                bl[c] = (down[c] + 3 * cur[c] + 2) >> 2;
                br[c] = (3 * a + down[c] + down_r[c] + 4) >> 3;
            }

            for &(dx, dy, c) in &[(0, 0, tl), (1, 0, tr), (0, 1, bl), (1, 1, br)] {
                let s = luma(x + dx, y + dy);
                let cuboid = lut.lookup(s, c[0], c[1]);
                let v = lut.apply(cuboid, Y_C, [s, c[0], c[1]]);
                dst[Y_C].set(x + dx, y + dy, E::Pixel::cast_from(v));
            }

            let y_avg = (luma(x, y) + luma(x, y + 1) + 1) >> 1;
            let cuboid = lut.lookup(y_avg, cur[0], cur[1]);
            for c in U_C..N_C {
                let v = lut.apply(cuboid, c, [y_avg, cur[0], cur[1]]);
                dst[c].set(k, r, E::Pixel::cast_from(v));
            }
        }
    }
}

/// Maps a whole 4:2:0 picture, one CTU-sized block at a time, and pads the
/// result.
pub fn map_color_frame<B: BitDepth, E: BitDepth>(
    lut: &ColorLut,
    dst: &mut Frame<E::Pixel>,
    src: &Frame<B::Pixel>,
) {
    assert_eq!(src.chroma_sampling, ChromaSampling::Cs420);
    assert_eq!(dst.chroma_sampling, ChromaSampling::Cs420);
    let (w, h) = (src.width(), src.height());
    assert!(dst.width() == w && dst.height() == h);

    let [py, pu, pv] = &mut dst.planes;
    let mut y0 = 0;
    while y0 < h {
        let bh = std::cmp::min(MAX_CTU_SIZE, h - y0);
        let mut x0 = 0;
        while x0 < w {
            let bw = std::cmp::min(MAX_CTU_SIZE, w - x0);
            let luma = Rect::new(x0 as isize, y0 as isize, bw, bh);
            let chroma = Rect::new(x0 as isize >> 1, y0 as isize >> 1, bw >> 1, bh >> 1);

            let input = [
                src.planes[Y_C].region(luma),
                src.planes[U_C].region(chroma),
                src.planes[V_C].region(chroma),
            ];
            let mut output = [
                py.region_mut(luma),
                pu.region_mut(chroma),
                pv.region_mut(chroma),
            ];
            let bounds = ColorMapBounds {
                top: y0 == 0,
                bottom: y0 + bh == h,
                right: x0 + bw == w,
            };
            map_color_block::<B, E>(lut, &mut output, &input, bounds);
            x0 += bw;
        }
        y0 += bh;
    }

    for p in dst.planes.iter_mut() {
        p.pad();
    }
}
