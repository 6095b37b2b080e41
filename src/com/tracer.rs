#![allow(non_snake_case, unused_imports, unused_variables)]

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;

use super::region::*;
use super::sao::SaoParams;
use crate::api::frame::Pixel;

pub type Tracer = (Box<dyn Write>, isize);

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(feature = "trace")]
pub fn OPEN_TRACE() -> Option<Tracer> {
    let fp_trace = OpenOptions::new()
        .append(true)
        .create(true)
        .open("recon_trace.txt");
    if let Ok(fp) = fp_trace {
        Some((Box::new(fp), 0))
    } else {
        None
    }
}

#[cfg(feature = "trace")]
pub(crate) fn TRACE_COUNTER(tracer: &mut Option<Tracer>) {
    if let Some((writer, counter)) = tracer {
        let _ = writer.write_fmt(format_args!("{} \t", *counter));
        *counter += 1;
    }
}

#[cfg(feature = "trace")]
pub(crate) fn RECON_TRACE<T: Display>(tracer: &mut Option<Tracer>, name: T) {
    if let Some((writer, _)) = tracer {
        let _ = writer.write_fmt(format_args!("{}", name));
    }
}

#[cfg(feature = "trace_resi")]
pub(crate) fn TRACE_RESI(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    size: usize,
    resi: &[i16],
) {
    TRACE_COUNTER(tracer);
    RECON_TRACE(tracer, "Resi for ");
    RECON_TRACE(tracer, ch_type);
    RECON_TRACE(tracer, " : ");
    for (i, v) in resi[..size * size].iter().enumerate() {
        if i != 0 {
            RECON_TRACE(tracer, " , ");
        }
        RECON_TRACE(tracer, v);
    }
    RECON_TRACE(tracer, " \n");
}

#[cfg(feature = "trace_pred")]
pub(crate) fn TRACE_PRED<T: Pixel>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    pred: &PlaneRegion<'_, T>,
) {
    TRACE_COUNTER(tracer);
    RECON_TRACE(tracer, "Pred for ");
    RECON_TRACE(tracer, ch_type);
    RECON_TRACE(tracer, " : ");
    for (j, row) in pred.rows_iter().enumerate() {
        for (i, v) in row.iter().enumerate() {
            if i != 0 || j != 0 {
                RECON_TRACE(tracer, " , ");
            }
            RECON_TRACE(tracer, v);
        }
    }
    RECON_TRACE(tracer, " \n");
}

#[cfg(feature = "trace_dbf")]
pub(crate) fn TRACE_DBF<T: Pixel>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    hor: bool,
    dbf: &PlaneRegionMut<'_, T>,
) {
    TRACE_COUNTER(tracer);
    RECON_TRACE(tracer, "Dbf for ");
    RECON_TRACE(tracer, ch_type);
    RECON_TRACE(tracer, " hor ");
    RECON_TRACE(tracer, hor as u8);
    RECON_TRACE(tracer, " : ");
    let size = if hor { dbf.width() } else { dbf.height() };
    for k in 0..size as isize {
        for d in -2..2isize {
            let v = if hor { dbf.at(k, d) } else { dbf.at(d, k) };
            RECON_TRACE(tracer, v);
            RECON_TRACE(tracer, " , ");
        }
    }
    RECON_TRACE(tracer, " \n");
}

#[cfg(feature = "trace_sao")]
pub(crate) fn TRACE_SAO(tracer: &mut Option<Tracer>, ch_type: usize, params: &SaoParams) {
    TRACE_COUNTER(tracer);
    RECON_TRACE(tracer, "Sao for ");
    RECON_TRACE(tracer, ch_type);
    RECON_TRACE(tracer, " : ");
    RECON_TRACE(tracer, format_args!("{:?}", params));
    RECON_TRACE(tracer, " \n");
}

#[cfg(feature = "trace_ilr")]
pub(crate) fn TRACE_ILR<T: Pixel>(tracer: &mut Option<Tracer>, ch_type: usize, y: usize, row: &[T]) {
    TRACE_COUNTER(tracer);
    RECON_TRACE(tracer, "Ilr for ");
    RECON_TRACE(tracer, ch_type);
    RECON_TRACE(tracer, " y ");
    RECON_TRACE(tracer, y);
    RECON_TRACE(tracer, " : ");
    for (i, v) in row.iter().enumerate() {
        if i != 0 {
            RECON_TRACE(tracer, " , ");
        }
        RECON_TRACE(tracer, v);
    }
    RECON_TRACE(tracer, " \n");
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(not(feature = "trace"))]
pub fn OPEN_TRACE() -> Option<Tracer> {
    None
}

#[cfg(not(feature = "trace"))]
pub(crate) fn TRACE_COUNTER(tracer: &mut Option<Tracer>) {}

#[cfg(not(feature = "trace"))]
pub(crate) fn RECON_TRACE<T: Display>(tracer: &mut Option<Tracer>, name: T) {}

#[cfg(not(feature = "trace_resi"))]
#[inline(always)]
pub(crate) fn TRACE_RESI(tracer: &mut Option<Tracer>, ch_type: usize, size: usize, resi: &[i16]) {}

#[cfg(not(feature = "trace_pred"))]
#[inline(always)]
pub(crate) fn TRACE_PRED<T: Pixel>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    pred: &PlaneRegion<'_, T>,
) {
}

#[cfg(not(feature = "trace_dbf"))]
#[inline(always)]
pub(crate) fn TRACE_DBF<T: Pixel>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    hor: bool,
    dbf: &PlaneRegionMut<'_, T>,
) {
}

#[cfg(not(feature = "trace_sao"))]
#[inline(always)]
pub(crate) fn TRACE_SAO(tracer: &mut Option<Tracer>, ch_type: usize, params: &SaoParams) {}

#[cfg(not(feature = "trace_ilr"))]
#[inline(always)]
pub(crate) fn TRACE_ILR<T: Pixel>(tracer: &mut Option<Tracer>, ch_type: usize, y: usize, row: &[T]) {
}
