use super::region::*;
use super::tbl::*;
use super::tracer::*;
use super::util::*;
use crate::api::frame::*;

/// Edge offset direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaoEdgeClass {
    Horizontal = 0,
    Vertical = 1,
    Deg135 = 2,
    Deg45 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaoMode {
    Off,
    /// Four consecutive bands starting at `position` (0..32).
    Band { position: u8 },
    Edge(SaoEdgeClass),
}

impl Default for SaoMode {
    fn default() -> Self {
        SaoMode::Off
    }
}

/// SAO parameters of one component of one CTU.
///
/// `offset_val[0]` is the zero slot; `offset_val[1..5]` are the four signed
/// offsets, already scaled to the sample depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaoParams {
    pub mode: SaoMode,
    pub offset_val: [i16; 5],
}

impl SaoParams {
    pub fn band(position: u8, offsets: [i16; 4]) -> Self {
        SaoParams {
            mode: SaoMode::Band { position },
            offset_val: [0, offsets[0], offsets[1], offsets[2], offsets[3]],
        }
    }

    pub fn edge(class: SaoEdgeClass, offsets: [i16; 4]) -> Self {
        SaoParams {
            mode: SaoMode::Edge(class),
            offset_val: [0, offsets[0], offsets[1], offsets[2], offsets[3]],
        }
    }
}

/// CTU sides lying on a picture boundary; edge offset is not applied there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaoBorders {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

/// Sides and corners whose samples must keep their unfiltered value
/// (neighbour across a slice/tile edge that disables in-loop filtering, or
/// lossless/PCM samples).
///
/// `vert` is left/right, `horiz` top/bottom, `diag` upper-left, upper-right,
/// lower-right, lower-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaoEdgeFlags {
    pub vert: [bool; 2],
    pub horiz: [bool; 2],
    pub diag: [bool; 4],
}

/// Band offset over the whole region.
pub fn sao_band_filter<BD: BitDepth>(
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    src: &PlaneRegion<'_, BD::Pixel>,
    position: u8,
    offset_val: &[i16; 5],
) {
    let shift = BD::BITS - 5;
    let mut table = [0i32; 32];
    for k in 0..4 {
        table[(k + position as usize) & 31] = i32::from(offset_val[k + 1]);
    }

    for y in 0..dst.height() {
        for (d, &s) in dst.row_mut(y).iter_mut().zip(src.row(y)) {
            let s = i32::cast_from(s);
            *d = BD::clip_pixel(s + table[(s >> shift) as usize]);
        }
    }
}

/// Offset slot picked by comparing a sample against its two neighbours.
#[inline(always)]
pub fn sao_edge_category(s: i32, a: i32, b: i32) -> usize {
    SAO_EDGE_IDX[(2 + sign_cmp(s, a) + sign_cmp(s, b)) as usize]
}

/// Edge offset over the whole region. Neighbours are read from `src`, which
/// must have one readable sample of margin around the region.
pub fn sao_edge_filter<BD: BitDepth>(
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    src: &PlaneRegion<'_, BD::Pixel>,
    class: SaoEdgeClass,
    offset_val: &[i16; 5],
) {
    let [(ax, ay), (bx, by)] = SAO_EDGE_POS[class as usize];
    for y in 0..dst.height() as isize {
        for x in 0..dst.width() as isize {
            let s = i32::cast_from(src.at(x, y));
            let a = i32::cast_from(src.at(x + ax, y + ay));
            let b = i32::cast_from(src.at(x + bx, y + by));
            let cat = sao_edge_category(s, a, b);
            dst.set(x, y, BD::clip_pixel(s + i32::from(offset_val[cat])));
        }
    }
}

/// Undoes the edge offset where it must not apply: picture borders get the
/// zero slot, and samples flagged in `flags` get their source value back.
/// Rows and columns already handled by a border are skipped, and so are
/// corner samples another neighbour still allows to be filtered.
pub fn sao_edge_restore<BD: BitDepth>(
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    src: &PlaneRegion<'_, BD::Pixel>,
    class: SaoEdgeClass,
    offset_val: &[i16; 5],
    borders: &SaoBorders,
    flags: &SaoEdgeFlags,
) {
    let zero = i32::from(offset_val[0]);
    let restore = |v: BD::Pixel| BD::clip_pixel(i32::cast_from(v) + zero);
    let (mut width, mut height) = (dst.width(), dst.height());
    let mut init_x = 0;

    if class != SaoEdgeClass::Vertical {
        if borders.left {
            for y in 0..height {
                dst[y][0] = restore(src[y][0]);
            }
            init_x = 1;
        }
        if borders.right {
            for y in 0..height {
                dst[y][width - 1] = restore(src[y][width - 1]);
            }
            width -= 1;
        }
    }
    if class != SaoEdgeClass::Horizontal {
        if borders.top {
            for x in init_x..width {
                dst[0][x] = restore(src[0][x]);
            }
        }
        if borders.bottom {
            for x in init_x..width {
                dst[height - 1][x] = restore(src[height - 1][x]);
            }
            height -= 1;
        }
    }

    let d135 = class == SaoEdgeClass::Deg135;
    let d45 = class == SaoEdgeClass::Deg45;
    let save_ul = (!flags.diag[0] && d135 && !borders.left && !borders.top) as usize;
    let save_ur = (!flags.diag[1] && d45 && !borders.top && !borders.right) as usize;
    let save_lr = (!flags.diag[2] && d135 && !borders.right && !borders.bottom) as usize;
    let save_ll = (!flags.diag[3] && d45 && !borders.left && !borders.bottom) as usize;

    if class != SaoEdgeClass::Vertical {
        if flags.vert[0] {
            for y in save_ul..height - save_ll {
                dst[y][0] = src[y][0];
            }
        }
        if flags.vert[1] {
            for y in save_ur..height - save_lr {
                dst[y][width - 1] = src[y][width - 1];
            }
        }
    }
    if class != SaoEdgeClass::Horizontal {
        if flags.horiz[0] {
            for x in init_x + save_ul..width - save_ur {
                dst[0][x] = src[0][x];
            }
        }
        if flags.horiz[1] {
            for x in init_x + save_ll..width - save_lr {
                dst[height - 1][x] = src[height - 1][x];
            }
        }
    }

    if flags.diag[0] && d135 {
        dst[0][0] = src[0][0];
    }
    if flags.diag[1] && d45 {
        dst[0][width - 1] = src[0][width - 1];
    }
    if flags.diag[2] && d135 {
        dst[height - 1][width - 1] = src[height - 1][width - 1];
    }
    if flags.diag[3] && d45 {
        dst[height - 1][0] = src[height - 1][0];
    }
}

/// SAO of one component of one CTU, from the deblocked samples `src` into
/// `dst`. `Off` leaves `dst` untouched.
pub fn sao_ctu<BD: BitDepth>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    src: &PlaneRegion<'_, BD::Pixel>,
    params: &SaoParams,
    borders: &SaoBorders,
    flags: &SaoEdgeFlags,
) {
    assert_eq!((dst.width(), dst.height()), (src.width(), src.height()));
    TRACE_SAO(tracer, ch_type, params);

    match params.mode {
        SaoMode::Off => {}
        SaoMode::Band { position } => {
            sao_band_filter::<BD>(dst, src, position, &params.offset_val);
        }
        SaoMode::Edge(class) => {
            sao_edge_filter::<BD>(dst, src, class, &params.offset_val);
            sao_edge_restore::<BD>(dst, src, class, &params.offset_val, borders, flags);
        }
    }
}
