use super::region::*;
use super::tracer::*;
use super::util::*;
use crate::api::frame::*;
use crate::api::*;

/* samples on each side of an edge segment */
const DBF_LINES_PER_SEGMENT: usize = 4;
const DBF_SEGMENTS: usize = 2;

/// Filter decision inputs of one 8-sample edge, as two 4-sample segments.
///
/// `beta` and `tc` are the 8-bit table values; they are scaled to the
/// sample depth by the filters. `no_p`/`no_q` keep the P (left/above) or Q
/// (right/below) side of a segment unmodified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeblockParams {
    pub beta: i32,
    pub tc: [i32; DBF_SEGMENTS],
    pub no_p: [bool; DBF_SEGMENTS],
    pub no_q: [bool; DBF_SEGMENTS],
}

/// One edge to filter, `(x, y)` being the first Q sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeblockEdge {
    pub x: isize,
    pub y: isize,
    /// Horizontal edge (filtered across rows) rather than vertical.
    pub hor: bool,
    pub params: DeblockParams,
}

#[inline(always)]
fn offset(i: usize, d: isize) -> usize {
    (i as isize + d) as usize
}

/* p3 p2 p1 p0 q0 q1 q2 q3 across the edge at index `i` */
#[inline(always)]
fn load<T: Pixel>(pix: &[T], i: usize, xstride: isize) -> [i32; 8] {
    let mut s = [0i32; 8];
    for (k, v) in s.iter_mut().enumerate() {
        *v = i32::cast_from(pix[offset(i, (k as isize - 4) * xstride)]);
    }
    s
}

#[inline(always)]
fn store<BD: BitDepth>(pix: &mut [BD::Pixel], i: usize, xstride: isize, k: isize, v: i32) {
    pix[offset(i, k * xstride)] = BD::clip_pixel(v);
}

/// Luma filter of one edge. `xstride` steps across the edge, `ystride` along it.
fn loop_filter_luma<BD: BitDepth>(
    pix: &mut [BD::Pixel],
    mut base: usize,
    xstride: isize,
    ystride: isize,
    params: &DeblockParams,
) {
    let beta = params.beta << (BD::BITS - 8);
    let segment = DBF_LINES_PER_SEGMENT as isize * ystride;

    for j in 0..DBF_SEGMENTS {
        let l0 = load(pix, base, xstride);
        let l3 = load(pix, offset(base, 3 * ystride), xstride);
        let dp0 = (l0[1] - 2 * l0[2] + l0[3]).abs();
        let dq0 = (l0[6] - 2 * l0[5] + l0[4]).abs();
        let dp3 = (l3[1] - 2 * l3[2] + l3[3]).abs();
        let dq3 = (l3[6] - 2 * l3[5] + l3[4]).abs();
        let d0 = dp0 + dq0;
        let d3 = dp3 + dq3;
        let tc = params.tc[j] << (BD::BITS - 8);
        let no_p = params.no_p[j];
        let no_q = params.no_q[j];

        if d0 + d3 >= beta {
            base = offset(base, segment);
            continue;
        }

        let beta_3 = beta >> 3;
        let beta_2 = beta >> 2;
        let tc25 = (tc * 5 + 1) >> 1;
        let strong = |l: &[i32; 8], d: i32| {
            (l[0] - l[3]).abs() + (l[7] - l[4]).abs() < beta_3
                && (l[3] - l[4]).abs() < tc25
                && (d << 1) < beta_2
        };

        if strong(&l0, d0) && strong(&l3, d3) {
            let tc2 = tc << 1;
            for d in 0..DBF_LINES_PER_SEGMENT as isize {
                let i = offset(base, d * ystride);
                let [p3, p2, p1, p0, q0, q1, q2, q3] = load(pix, i, xstride);
                if !no_p {
                    let v0 = p0 + clip3(-tc2, tc2, ((p2 + 2 * p1 + 2 * p0 + 2 * q0 + q1 + 4) >> 3) - p0);
                    let v1 = p1 + clip3(-tc2, tc2, ((p2 + p1 + p0 + q0 + 2) >> 2) - p1);
                    let v2 = p2 + clip3(-tc2, tc2, ((2 * p3 + 3 * p2 + p1 + p0 + q0 + 4) >> 3) - p2);
                    store::<BD>(pix, i, xstride, -1, v0);
                    store::<BD>(pix, i, xstride, -2, v1);
                    store::<BD>(pix, i, xstride, -3, v2);
                }
                if !no_q {
                    let v0 = q0 + clip3(-tc2, tc2, ((p1 + 2 * p0 + 2 * q0 + 2 * q1 + q2 + 4) >> 3) - q0);
                    let v1 = q1 + clip3(-tc2, tc2, ((p0 + q0 + q1 + q2 + 2) >> 2) - q1);
                    let v2 = q2 + clip3(-tc2, tc2, ((2 * q3 + 3 * q2 + q1 + q0 + p0 + 4) >> 3) - q2);
                    store::<BD>(pix, i, xstride, 0, v0);
                    store::<BD>(pix, i, xstride, 1, v1);
                    store::<BD>(pix, i, xstride, 2, v2);
                }
            }
        } else {
            let tc_2 = tc >> 1;
            let side_thr = (beta + (beta >> 1)) >> 3;
            let nd_p = dp0 + dp3 < side_thr;
            let nd_q = dq0 + dq3 < side_thr;

            for d in 0..DBF_LINES_PER_SEGMENT as isize {
                let i = offset(base, d * ystride);
                let [_, p2, p1, p0, q0, q1, q2, _] = load(pix, i, xstride);
                let delta0 = (9 * (q0 - p0) - 3 * (q1 - p1) + 8) >> 4;
                if delta0.abs() >= 10 * tc {
                    continue;
                }
                let delta0 = clip3(-tc, tc, delta0);
                if !no_p {
                    store::<BD>(pix, i, xstride, -1, p0 + delta0);
                }
                if !no_q {
                    store::<BD>(pix, i, xstride, 0, q0 - delta0);
                }
                if !no_p && nd_p {
                    let deltap1 = clip3(-tc_2, tc_2, (((p2 + p0 + 1) >> 1) - p1 + delta0) >> 1);
                    store::<BD>(pix, i, xstride, -2, p1 + deltap1);
                }
                if !no_q && nd_q {
                    let deltaq1 = clip3(-tc_2, tc_2, (((q2 + q0 + 1) >> 1) - q1 - delta0) >> 1);
                    store::<BD>(pix, i, xstride, 1, q1 + deltaq1);
                }
            }
        }
        base = offset(base, segment);
    }
}

/// Chroma filter of one edge; only the boundary pair is modified.
fn loop_filter_chroma<BD: BitDepth>(
    pix: &mut [BD::Pixel],
    mut base: usize,
    xstride: isize,
    ystride: isize,
    params: &DeblockParams,
) {
    let segment = DBF_LINES_PER_SEGMENT as isize * ystride;

    for j in 0..DBF_SEGMENTS {
        let tc = params.tc[j] << (BD::BITS - 8);
        if tc <= 0 {
            base = offset(base, segment);
            continue;
        }
        for d in 0..DBF_LINES_PER_SEGMENT as isize {
            let i = offset(base, d * ystride);
            let [_, _, p1, p0, q0, q1, _, _] = load(pix, i, xstride);
            let delta0 = clip3(-tc, tc, (((q0 - p0) << 2) + p1 - q1 + 4) >> 3);
            if !params.no_p[j] {
                store::<BD>(pix, i, xstride, -1, p0 + delta0);
            }
            if !params.no_q[j] {
                store::<BD>(pix, i, xstride, 0, q0 - delta0);
            }
        }
        base = offset(base, segment);
    }
}

const DBF_EDGE_LEN: usize = DBF_LINES_PER_SEGMENT * DBF_SEGMENTS;

fn edge_rect(x: isize, y: isize, hor: bool) -> Rect {
    if hor {
        Rect::new(x, y, DBF_EDGE_LEN, 1)
    } else {
        Rect::new(x, y, 1, DBF_EDGE_LEN)
    }
}

/// Filters the horizontal luma edge whose first Q sample is `(x, y)`.
/// Rows `y - 4 .. y + 4` must be addressable in `buf`.
pub fn deblock_luma_hor<BD: BitDepth>(
    tracer: &mut Option<Tracer>,
    buf: &mut PlaneRegionMut<'_, BD::Pixel>,
    x: isize,
    y: isize,
    params: &DeblockParams,
) {
    let base = buf.index_of(x, y);
    let stride = buf.stride() as isize;
    let (pix, _) = buf.raw_mut();
    loop_filter_luma::<BD>(pix, base, stride, 1, params);

    TRACE_DBF(tracer, Y_C, true, &buf.subregion_mut(edge_rect(x, y, true)));
}

/// Filters the vertical luma edge whose first Q sample is `(x, y)`.
pub fn deblock_luma_ver<BD: BitDepth>(
    tracer: &mut Option<Tracer>,
    buf: &mut PlaneRegionMut<'_, BD::Pixel>,
    x: isize,
    y: isize,
    params: &DeblockParams,
) {
    let base = buf.index_of(x, y);
    let stride = buf.stride() as isize;
    let (pix, _) = buf.raw_mut();
    loop_filter_luma::<BD>(pix, base, 1, stride, params);

    TRACE_DBF(tracer, Y_C, false, &buf.subregion_mut(edge_rect(x, y, false)));
}

pub fn deblock_chroma_hor<BD: BitDepth>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    buf: &mut PlaneRegionMut<'_, BD::Pixel>,
    x: isize,
    y: isize,
    params: &DeblockParams,
) {
    let base = buf.index_of(x, y);
    let stride = buf.stride() as isize;
    let (pix, _) = buf.raw_mut();
    loop_filter_chroma::<BD>(pix, base, stride, 1, params);

    TRACE_DBF(tracer, ch_type, true, &buf.subregion_mut(edge_rect(x, y, true)));
}

pub fn deblock_chroma_ver<BD: BitDepth>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    buf: &mut PlaneRegionMut<'_, BD::Pixel>,
    x: isize,
    y: isize,
    params: &DeblockParams,
) {
    let base = buf.index_of(x, y);
    let stride = buf.stride() as isize;
    let (pix, _) = buf.raw_mut();
    loop_filter_chroma::<BD>(pix, base, 1, stride, params);

    TRACE_DBF(tracer, ch_type, false, &buf.subregion_mut(edge_rect(x, y, false)));
}

/// Filters a list of edges of one component: every vertical edge first, then
/// every horizontal one, each group in list order.
pub fn deblock_edges<BD: BitDepth>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    buf: &mut PlaneRegionMut<'_, BD::Pixel>,
    edges: &[DeblockEdge],
) {
    for hor in &[false, true] {
        for e in edges.iter().filter(|e| e.hor == *hor) {
            match (ch_type == Y_C, e.hor) {
                (true, false) => deblock_luma_ver::<BD>(tracer, buf, e.x, e.y, &e.params),
                (true, true) => deblock_luma_hor::<BD>(tracer, buf, e.x, e.y, &e.params),
                (false, false) => deblock_chroma_ver::<BD>(tracer, ch_type, buf, e.x, e.y, &e.params),
                (false, true) => deblock_chroma_hor::<BD>(tracer, ch_type, buf, e.x, e.y, &e.params),
            }
        }
    }
}
