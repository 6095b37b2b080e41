use super::itx::*;
use super::region::*;
use super::tracer::*;
use crate::api::*;

/// Reconstructs one transform block of component `ch_type`: the residual
/// decoded from `coeffs` is added onto the prediction already held by `dst`.
///
/// `coeffs` is consumed as scratch and holds the residual on return.
pub fn reconstruct_block<BD: BitDepth>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    coeffs: &mut [i16],
    desc: &TxDesc,
    config: &ReconConfig,
) {
    assert_eq!(config.bit_depth(ch_type), BD::BITS);
    if let TxKind::Emt { .. } = desc.kind {
        assert!(config.emt_enabled, "EMT block in a session without EMT");
    }

    let size = 1 << desc.log2_size;
    let range = config.max_log2_tr_dynamic_range(BD::BITS);
    inverse_transform::<BD>(coeffs, desc, range);
    TRACE_RESI(tracer, ch_type, size, &coeffs[..size * size]);

    transform_add::<BD>(dst, coeffs, desc.log2_size);
}

/// Reconstructs a coding block coded without residual in component
/// `ch_type`: the prediction already in `dst` is final, only PCM samples are
/// written.
pub fn reconstruct_pcm<BD: BitDepth>(
    config: &ReconConfig,
    ch_type: usize,
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    samples: &[u16],
    pcm_bit_depth: u32,
) {
    assert_eq!(config.bit_depth(ch_type), BD::BITS);
    put_pcm::<BD>(dst, samples, pcm_bit_depth);
}
