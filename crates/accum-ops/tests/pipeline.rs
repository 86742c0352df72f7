//! End-to-end tests for the filter -> mean -> pack pipeline.

use accum_core::{ColorBuffer, PackedImage, Pos, Size};
use accum_ops::filter::{BoxFilter, BoxParams, IdentityFilter, filter};
use accum_ops::pack::{pack, quantize, unpack};
use accum_ops::{Launch, Postproc, PostprocConfig, mean};
use approx::assert_relative_eq;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic pseudo-random pass, values in [-0.25, 1.25).
fn noisy_pass(size: Size, seed: u32, passes: u32) -> ColorBuffer {
    let mut state = seed.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let data = (0..size.float_len())
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state % 10_000) as f32 / 10_000.0 * 1.5 - 0.25
        })
        .collect();
    ColorBuffer::from_data(size, data, passes).unwrap()
}

#[test]
fn test_two_by_one_scenario() {
    init_logging();
    let size = Size::new(2, 1);
    let pass1 = ColorBuffer::from_data(size, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 1).unwrap();
    let pass2 = ColorBuffer::from_data(size, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0], 1).unwrap();

    for launch in [Launch::Serial, Launch::Parallel] {
        let mut post = Postproc::<IdentityFilter>::builder()
            .launch(launch)
            .build(size, ())
            .unwrap();
        post.process([&pass1, &pass2]).unwrap();
        assert_eq!(post.passes(), 2);
        assert_eq!(post.buffer().data(), &[0.5; 6]);

        post.make_image().unwrap();
        assert_eq!(post.image().pixel(Pos::new(0, 0)), [127, 127, 127]);
        assert_eq!(post.image().pixel(Pos::new(1, 0)), [127, 127, 127]);
    }
}

#[test]
fn test_merge_order_independent() {
    let size = Size::new(8, 6);
    let a = noisy_pass(size, 1, 3);
    let b = noisy_pass(size, 2, 5);

    let mut ab = a.clone();
    mean::accumulate(Launch::Parallel, &mut ab, &b).unwrap();
    let mut ba = b.clone();
    mean::accumulate(Launch::Parallel, &mut ba, &a).unwrap();

    assert_eq!(ab.passes(), 8);
    assert_eq!(ba.passes(), 8);
    assert_eq!(ab.data(), ba.data());
}

#[test]
fn test_self_merge_is_unchanged() {
    let size = Size::new(5, 5);
    let a = noisy_pass(size, 7, 4);
    let mut merged = a.clone();
    mean::accumulate(Launch::Serial, &mut merged, &a).unwrap();
    assert_eq!(merged.data(), a.data());
    assert_eq!(merged.passes(), 8);
}

#[test]
fn test_tiles_merge_like_single_stream() {
    // Merging two partial averages equals averaging every pass in one stream.
    let size = Size::new(4, 3);
    let passes: Vec<_> = (0..6).map(|i| noisy_pass(size, 100 + i, 1)).collect();

    let mut stream = ColorBuffer::new(size);
    for p in &passes {
        mean::accumulate(Launch::Parallel, &mut stream, p).unwrap();
    }

    let mut left = ColorBuffer::new(size);
    let mut right = ColorBuffer::new(size);
    for p in &passes[..2] {
        mean::accumulate(Launch::Parallel, &mut left, p).unwrap();
    }
    for p in &passes[2..] {
        mean::accumulate(Launch::Parallel, &mut right, p).unwrap();
    }
    mean::accumulate(Launch::Parallel, &mut left, &right).unwrap();

    assert_eq!(left.passes(), stream.passes());
    for (a, b) in left.data().iter().zip(stream.data()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-5);
    }
}

#[test]
fn test_serial_and_parallel_agree() {
    let size = Size::new(37, 23);
    let run = |launch: Launch| {
        let mut post = Postproc::<BoxFilter>::builder()
            .config(PostprocConfig { launch, threads: None })
            .build(size, BoxParams { radius: 2 })
            .unwrap();
        for seed in 0..4 {
            post.process_one(&noisy_pass(size, seed, 1 + seed)).unwrap();
        }
        post.make_image().unwrap();
        (post.buffer().clone(), post.image().clone())
    };
    assert_eq!(run(Launch::Serial), run(Launch::Parallel));
}

#[test]
fn test_stage_functions_match_postproc() {
    let size = Size::new(6, 4);
    let passes = [noisy_pass(size, 11, 2), noisy_pass(size, 12, 1)];

    let mut post = Postproc::<BoxFilter>::builder()
        .build(size, BoxParams { radius: 1 })
        .unwrap();
    post.process(&passes).unwrap();
    post.make_image().unwrap();

    let mut acc = ColorBuffer::new(size);
    let mut scratch = ColorBuffer::new(size);
    for p in &passes {
        filter::<BoxFilter>(
            Launch::Serial,
            &mut scratch.view_mut(),
            &p.view(),
            &BoxParams { radius: 1 },
        )
        .unwrap();
        scratch.set_passes(p.passes());
        mean::accumulate(Launch::Serial, &mut acc, &scratch).unwrap();
    }
    let mut image = PackedImage::new(size);
    pack(Launch::Serial, &mut image.view_mut(), &acc.view()).unwrap();

    assert_eq!(post.buffer(), &acc);
    assert_eq!(post.image(), &image);
}

#[test]
fn test_packed_output_in_range_and_close() {
    let size = Size::new(16, 16);
    let src = noisy_pass(size, 42, 1);
    let mut image = PackedImage::new(size);
    pack(Launch::Parallel, &mut image.view_mut(), &src.view()).unwrap();

    let step = 1.0 / 255.0;
    for pos in size.positions() {
        let c = src.view().color(pos);
        let p = image.pixel(pos);
        assert_eq!(p, quantize(c));
        let back = unpack(p);
        for ch in 0..3 {
            let clamped = c[ch].clamp(0.0, 1.0);
            assert!((clamped - back[ch]).abs() <= step + 1e-6, "{pos:?} {c:?} {p:?}");
        }
    }
}
