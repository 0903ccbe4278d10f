use shardx_core::compute::{CpuBackend, RayonBackend};
use shardx_core::{CodecConfig, RsCodec};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;

#[test]
fn rs_reconstruct_exact_missing_under_m() {
    let mut rng = StdRng::seed_from_u64(42);
    let k = 8usize;
    let m = 4usize;
    let chunk = 32 * 1024;

    // Make data shards
    let data: Vec<Vec<u8>> = (0..k).map(|_| (0..chunk).map(|_| rng.gen()).collect()).collect();
    let rs = RsCodec::new(k, m).unwrap();
    let parity = rs.encode_parity(&data).unwrap();
    let mut shards = data.clone();
    shards.extend(parity);

    // Knock out m shards, mixing data and parity
    let missing = [1usize, 3, 7, 10];
    let present: BTreeMap<usize, Vec<u8>> = shards
        .iter()
        .cloned()
        .enumerate()
        .filter(|(i, _)| !missing.contains(i))
        .collect();
    let restored = rs.decode_missing(&present, chunk).unwrap();

    // Compare restored vs original
    assert_eq!(restored, shards);
}

#[test]
fn backends_agree_byte_for_byte() {
    let mut rng = StdRng::seed_from_u64(7);
    let cfg = CodecConfig::new(10, 4).unwrap();
    let data: Vec<Vec<u8>> = (0..10).map(|_| (0..10_007).map(|_| rng.gen()).collect()).collect();

    let cpu = RsCodec::with_backend(cfg, CpuBackend).unwrap().encode_parity(&data).unwrap();
    let small = RsCodec::with_backend(cfg, RayonBackend::new(333)).unwrap().encode_parity(&data).unwrap();
    let default = RsCodec::from_config(cfg).unwrap().encode_parity(&data).unwrap();
    assert_eq!(cpu, small);
    assert_eq!(cpu, default);
}

#[test]
fn data_shards_pass_through_when_only_parity_lost() {
    let rs = RsCodec::new(3, 2).unwrap();
    let data = vec![b"abc".to_vec(), b"def".to_vec(), b"ghi".to_vec()];
    let parity = rs.encode_parity(&data).unwrap();
    let present: BTreeMap<usize, &[u8]> =
        data.iter().enumerate().map(|(i, d)| (i, d.as_slice())).collect();
    let all = rs.decode_missing(&present, 3).unwrap();
    assert_eq!(&all[..3], &data[..]);
    assert_eq!(&all[3..], &parity[..]);
}

#[test]
fn zero_length_shards_are_allowed() {
    let rs = RsCodec::new(2, 1).unwrap();
    let parity = rs.encode_parity(&[Vec::<u8>::new(), Vec::new()]).unwrap();
    assert_eq!(parity, vec![Vec::<u8>::new()]);
}
