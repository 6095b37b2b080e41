use criterion::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use hevc_recon::bench::frame::*;
use hevc_recon::bench::mc::*;
use hevc_recon::bench::plane::*;

criterion_group!(
    mc,
    bench_mc_luma_00,
    bench_mc_luma_hv,
    bench_mc_chroma_hv,
    bench_mc_bi_weighted,
);

fn fill_plane<T: Pixel>(ra: &mut ChaChaRng, plane: &mut Plane<T>) {
    for y in 0..plane.cfg.height {
        for pixel in plane.row_mut(y) {
            let v: u8 = ra.gen();
            *pixel = T::cast_from(v);
        }
    }
    plane.pad();
}

fn new_plane<T: Pixel>(ra: &mut ChaChaRng, width: usize, height: usize) -> Plane<T> {
    let mut p = Plane::new(width, height, 0, 0, FRAME_PAD_LUMA, FRAME_PAD_LUMA);

    fill_plane(ra, &mut p);

    p
}

fn bench_mc_luma_00(c: &mut Criterion) {
    let mut ra = ChaChaRng::from_seed([0; 32]);
    let plane = new_plane::<u8>(&mut ra, 640, 480);
    let mut pred = vec![0; MAX_PB_SIZE * MAX_PB_SIZE];

    c.bench_function("mc_luma_00", |b| {
        b.iter(|| mc_luma::<Depth8>(black_box(&mut pred), &plane, 64, 64, 16, 16, [0, 0]))
    });
}

fn bench_mc_luma_hv(c: &mut Criterion) {
    let mut ra = ChaChaRng::from_seed([0; 32]);
    let plane = new_plane::<u16>(&mut ra, 640, 480);
    let mut pred = vec![0; MAX_PB_SIZE * MAX_PB_SIZE];

    c.bench_function("mc_luma_hv", |b| {
        b.iter(|| mc_luma::<Depth10>(black_box(&mut pred), &plane, 64, 64, 16, 16, [5, -3]))
    });
}

fn bench_mc_chroma_hv(c: &mut Criterion) {
    let mut ra = ChaChaRng::from_seed([0; 32]);
    let mut plane = Plane::<u8>::new(320, 240, 1, 1, FRAME_PAD_CHROMA, FRAME_PAD_CHROMA);
    fill_plane(&mut ra, &mut plane);
    let mut pred = vec![0; MAX_PB_SIZE * MAX_PB_SIZE];

    c.bench_function("mc_chroma_hv", |b| {
        b.iter(|| mc_chroma::<Depth8>(black_box(&mut pred), &plane, 32, 32, 8, 8, [7, 13]))
    });
}

fn bench_mc_bi_weighted(c: &mut Criterion) {
    let mut ra = ChaChaRng::from_seed([0; 32]);
    let pred0: Vec<i32> = (0..MAX_PB_SIZE * MAX_PB_SIZE).map(|_| ra.gen_range(-2000, 18000)).collect();
    let pred1: Vec<i32> = (0..MAX_PB_SIZE * MAX_PB_SIZE).map(|_| ra.gen_range(-2000, 18000)).collect();
    let weight = PredWeight {
        log2_denom: 6,
        weight: [40, 24],
        offset: [3, -2],
    };
    let mut dst = Plane::<u8>::new(64, 64, 0, 0, 0, 0);

    c.bench_function("mc_bi_weighted_64x64", |b| {
        b.iter(|| {
            mc_combine::<Depth8>(
                &mut None,
                0,
                &mut dst.as_region_mut(),
                black_box(&pred0),
                Some(&pred1),
                Some(&weight),
            )
        })
    });
}
