mod common;

use common::{capture, capture_with_gap, concat, fixture_path};
use rand::{Rng, SeedableRng};
use tlmsync::{
    bits::unpack,
    demod::DemodOpts,
    framing::{SyncOpts, SYNC_PATTERN},
    observer::NoopObserver,
    Pipeline,
};

#[test]
fn channel_scenario() {
    let zult = Pipeline::new().run(&[0x03, 0x01, 0x02, 0x03], &mut NoopObserver);

    let pairs: Vec<(u8, u8)> = zult.samples.iter().map(|s| (s.ch0, s.ch1)).collect();
    assert_eq!(pairs, vec![(1, 1), (1, 0), (0, 1), (1, 1)]);
    assert_eq!(zult.demod.bits, vec![0]);
    assert_eq!(zult.demod.markers, 2);
}

#[test]
fn sync_pattern_alone_is_one_frame() {
    let zult = Pipeline::new().run(&capture(&SYNC_PATTERN), &mut NoopObserver);

    assert_eq!(zult.demod.bits, SYNC_PATTERN.to_vec());
    assert_eq!(zult.frames.len(), 1);
    assert_eq!(zult.frames[0].start, 0);
    assert_eq!(zult.frames[0].bits, 32);
    assert_eq!(hex::encode(zult.packed()), "1acffc1d");
    assert!(zult.diagnostics.is_none());
}

#[test]
fn frames_are_packed_back_to_back() {
    let bits = concat(&[
        &unpack(&[0x55]),
        &unpack(&[0x1a, 0xcf, 0xfc, 0x1d, 0xde, 0xad]),
        &unpack(&[0x1a, 0xcf, 0xfc, 0x1d, 0xbe, 0xef]),
        &[1, 0, 1],
    ]);
    let zult = Pipeline::new().run(&capture(&bits), &mut NoopObserver);

    assert_eq!(zult.stats.count, 2);
    assert_eq!(zult.stats.min_bits, 48);
    assert_eq!(zult.stats.max_bits, 51);
    assert_eq!(zult.describe(), "length: 48-51 bits");
    assert_eq!(
        hex::encode(zult.packed()),
        "1acffc1ddead1acffc1dbeefa0",
        "trailing 3 bits are zero padded in the second frame"
    );
}

#[test]
fn near_miss_produces_diagnostics() {
    let mut near = SYNC_PATTERN;
    for i in [0, 9, 17] {
        near[i] = 1 - near[i];
    }
    let bits = concat(&[&[1, 1, 1, 1], &near, &[0, 0, 0, 0]]);
    let zult = Pipeline::new().run(&capture(&bits), &mut NoopObserver);

    assert!(zult.frames.is_empty());
    assert!(zult.packed().is_empty());

    let diag = zult.diagnostics.as_ref().expect("diagnostics");
    assert_eq!(diag.preview.len(), bits.len());
    assert_eq!(diag.head, "11111001101010001111101111000001");

    let pm = diag
        .partial_matches
        .iter()
        .find(|m| m.position == 4)
        .expect("partial match at the near miss");
    assert_eq!(pm.score, 21);
    assert_eq!(pm.observed, near.to_vec());
    assert!(diag
        .partial_match_lines()
        .contains(&"position: 4, data: 10011010100011111011110000011101".to_string()));
}

#[test]
fn partial_matches_reported_with_frames() {
    let zult = Pipeline::new().run(&capture(&SYNC_PATTERN), &mut NoopObserver);
    assert_eq!(zult.frames.len(), 1);
    assert!(zult.partial_matches.iter().any(|m| m.position == 0));
}

#[test]
fn gaps_are_dropped_and_tracked() {
    let bits = concat(&[&SYNC_PATTERN, &unpack(&[0xf0, 0x0f])]);
    let dat = capture_with_gap(&bits, 40);

    let plain = Pipeline::new().run(&dat, &mut NoopObserver);
    assert_eq!(plain.demod.bits, bits);
    assert_eq!(plain.demod.dropped, 1);
    assert!(plain.demod.gaps.is_empty());
    assert_eq!(plain.frames_with_gaps(), 0);

    let tracked = Pipeline::new()
        .with_demod(DemodOpts::new().with_gap_tracking(true))
        .run(&dat, &mut NoopObserver);
    assert_eq!(tracked.demod.bits, bits);
    assert_eq!(tracked.demod.gaps.len(), 1);
    assert_eq!(tracked.demod.gaps[0].bit_index, 40);
    assert_eq!(tracked.frames_with_gaps(), 1);
}

#[test]
fn custom_asm() {
    let asm = [0xfa, 0xf3, 0x20, 0x00];
    let bits = concat(&[&unpack(&asm), &unpack(&[0x01])]);
    let pipeline = Pipeline::new().with_sync(SyncOpts::new().with_asm(&asm).unwrap());
    let zult = pipeline.run(&capture(&bits), &mut NoopObserver);

    assert_eq!(zult.frames.len(), 1);
    assert_eq!(hex::encode(&zult.frames[0].data), "faf3200001");
}

#[test]
fn upper_bits_are_ignored() {
    let dat = capture(&concat(&[&SYNC_PATTERN, &[1, 1, 0]]));
    let noisy: Vec<u8> = dat.iter().map(|b| b | 0xa4).collect();

    let a = Pipeline::new().run(&dat, &mut NoopObserver);
    let b = Pipeline::new().run(&noisy, &mut NoopObserver);
    assert_eq!(a.demod, b.demod);
    assert_eq!(a.frames, b.frames);
}

#[test]
fn random_captures_never_overlap() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..20 {
        // Bias towards the sync pattern so frames actually occur.
        let mut bits = Vec::new();
        for _ in 0..50 {
            if rng.gen_bool(0.3) {
                bits.extend_from_slice(&SYNC_PATTERN);
            } else {
                bits.extend((0..rng.gen_range(1..64)).map(|_| rng.gen_range(0..=1u8)));
            }
        }
        let zult = Pipeline::new().run(&capture(&bits), &mut NoopObserver);

        assert!(zult.demod.bits.iter().all(|b| *b <= 1));
        for pair in zult.frames.windows(2) {
            assert!(pair[0].end() <= pair[1].start, "{:?}", (pair[0].start, pair[1].start));
        }
        let total: usize = zult.frames.iter().map(|f| f.data.len()).sum();
        assert_eq!(zult.packed().len(), total);
    }
}

#[test]
fn process_fixture_file() {
    let zult = Pipeline::new()
        .process_file(fixture_path("two_frames.bin"), &mut NoopObserver)
        .expect("fixture to be readable");

    assert_eq!(zult.samples.len(), 209);
    assert_eq!(zult.demod.markers, 105);
    assert_eq!(zult.demod.bits.len(), 104);
    assert_eq!(zult.frames.len(), 2);
    assert_eq!((zult.frames[0].start, zult.frames[0].bits), (16, 48));
    assert_eq!((zult.frames[1].start, zult.frames[1].bits), (64, 40));
    assert_eq!(hex::encode(zult.packed()), "1acffc1da55a1acffc1d3c");
}
