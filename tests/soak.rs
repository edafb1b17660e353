//! Long randomized runs: random-sized writes bounded by free space, random-sized reads bounded
//! by occupancy, every byte checked against the reference stream. Enough traffic to cross the
//! renormalization threshold many times.

use ph_ring::{raw, CircularBuffer, MovingAverage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DATA_LEN: usize = 1_000_000;

fn reference(rng: &mut StdRng) -> Vec<u8> {
    let mut data = vec![0u8; DATA_LEN];
    rng.fill(&mut data[..]);
    data
}

#[test]
fn circular_buffer_random_traffic() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);
    let data = reference(&mut rng);
    let mut compare = vec![0u8; DATA_LEN];

    let mut ring = CircularBuffer::with_capacity(999).with_threshold(999 * 8);
    let (mut pos_w, mut pos_r) = (0usize, 0usize);

    while pos_w < DATA_LEN || pos_r < DATA_LEN {
        let free = ring.capacity() - ring.length();
        if free > 0 && pos_w < DATA_LEN {
            let n = rng.gen_range(1..=free).min(DATA_LEN - pos_w);
            assert_eq!(ring.write(&data[pos_w..pos_w + n]), n);
            pos_w += n;
        }

        let available = ring.length();
        if available > 0 && pos_r < DATA_LEN {
            let n = rng.gen_range(1..=available).min(DATA_LEN - pos_r);
            assert_eq!(ring.read(&mut compare[pos_r..pos_r + n]), n);
            assert_eq!(&compare[pos_r..pos_r + n], &data[pos_r..pos_r + n]);
            pos_r += n;
        }

        assert!(ring.cursors().write_pos() <= ring.threshold() + 2 * 999);
    }
    assert!(ring.is_empty());
}

#[test]
fn raw_ring_random_traffic() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0002);
    let data = reference(&mut rng);
    let mut compare = vec![0u8; DATA_LEN];

    let mut storage = [0u8; 99];
    let mut ctx = raw::init(&mut storage);
    let cap = raw::capacity(&ctx);
    let (mut pos_w, mut pos_r) = (0usize, 0usize);

    while pos_w < DATA_LEN || pos_r < DATA_LEN {
        let free = (cap - raw::len(&mut ctx)) as usize;
        if free > 0 && pos_w < DATA_LEN {
            let n = rng.gen_range(1..=free).min(DATA_LEN - pos_w);
            raw::write(&mut ctx, &data[pos_w..pos_w + n]);
            pos_w += n;
        }

        let available = raw::len(&mut ctx) as usize;
        if available > 0 && pos_r < DATA_LEN {
            let n = rng.gen_range(1..=available).min(DATA_LEN - pos_r);
            assert_eq!(raw::read(&mut ctx, &mut compare[pos_r..pos_r + n]), n);
            assert_eq!(&compare[pos_r..pos_r + n], &data[pos_r..pos_r + n]);
            pos_r += n;
        }
    }
    assert!(ctx.write_pos() <= ctx.threshold() + cap);
}

#[test]
fn moving_average_matches_direct_mean() {
    const POINTS: usize = 11;
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);
    let samples: Vec<f64> = (0..100_000)
        .map(|_| rng.gen_range(-1_000_000.0..1_000_000.0))
        .collect();

    let mut avg = MovingAverage::<f64, POINTS>::new();
    for (i, &s) in samples.iter().enumerate() {
        avg.append(s);

        let window = &samples[(i + 1).saturating_sub(POINTS)..=i];
        let mut sum = 0.0;
        for &v in window {
            sum += v;
        }
        let expected = sum / window.len() as f64;
        assert!((avg.current_average() - expected).abs() <= 1e-6 * expected.abs().max(1.0));
    }
}
