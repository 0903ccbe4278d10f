use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::process::Command;

fn write_random(path: &std::path::Path, bytes: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<u8> = (0..bytes).map(|_| rng.gen()).collect();
    std::fs::write(path, data).unwrap();
}

#[test]
fn encode_writes_six_shards_and_manifest() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("foo.txt");
    input.write_binary(&(1u8..=10).collect::<Vec<_>>()).unwrap();

    Command::cargo_bin("shardx")
        .unwrap()
        .args(["encode", input.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo.txt.0"))
        .stdout(predicate::str::contains("foo.txt.5"))
        .stdout(predicate::str::contains("foo.txt.manifest.json"));

    for i in 0..6 {
        let shard = std::fs::read(td.child(format!("foo.txt.{i}")).path()).unwrap();
        assert_eq!(shard.len(), 4);
    }
    assert_eq!(std::fs::read(td.child("foo.txt.0").path()).unwrap(), vec![0u8, 0, 0, 10]);
    td.child("foo.txt.6").assert(predicate::path::missing());
}

#[test]
fn verify_reports_recoverable_after_losing_parity_count() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("data.bin");
    write_random(input.path(), 64 * 1024, 1);
    let out = td.child("shards");

    Command::cargo_bin("shardx")
        .unwrap()
        .args([
            "encode",
            "--data-shards", "5",
            "--parity-shards", "3",
            "--output", out.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    // lose three shards, corrupt none
    for i in [0, 4, 7] {
        std::fs::remove_file(out.child(format!("data.bin.{i}")).path()).unwrap();
    }
    Command::cargo_bin("shardx")
        .unwrap()
        .args(["verify", out.child("data.bin.manifest.json").path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("shard 0: MISSING"))
        .stdout(predicate::str::contains("Shards OK: 5/8"))
        .stdout(predicate::str::contains("Recoverable: YES"))
        .stdout(predicate::str::contains("Reconstruction: OK (65536 bytes)"));
}

#[test]
fn verify_fails_when_too_many_shards_are_bad() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("x.bin");
    write_random(input.path(), 4096, 2);
    Command::cargo_bin("shardx")
        .unwrap()
        .args(["encode", input.path().to_str().unwrap()])
        .assert()
        .success();

    std::fs::remove_file(td.child("x.bin.1").path()).unwrap();
    std::fs::remove_file(td.child("x.bin.2").path()).unwrap();
    // flip a byte in a third shard
    let p = td.child("x.bin.3");
    let mut buf = std::fs::read(p.path()).unwrap();
    buf[0] ^= 0xFF;
    std::fs::write(p.path(), buf).unwrap();

    Command::cargo_bin("shardx")
        .unwrap()
        .args(["verify", td.child("x.bin.manifest.json").path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("shard 3: CORRUPT"))
        .stdout(predicate::str::contains("Recoverable: NO"));
}

#[test]
fn encode_empty_file() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("empty");
    input.touch().unwrap();
    Command::cargo_bin("shardx")
        .unwrap()
        .args(["encode", "--no-manifest", input.path().to_str().unwrap()])
        .assert()
        .success();
    for i in 0..6 {
        assert_eq!(std::fs::read(td.child(format!("empty.{i}")).path()).unwrap(), vec![0u8]);
    }
    td.child("empty.manifest.json").assert(predicate::path::missing());
}

#[test]
fn matrix_prints_identity_and_parity_rows() {
    Command::cargo_bin("shardx")
        .unwrap()
        .env("SHARDX_DATA_SHARDS", "4")
        .args(["matrix", "--parity-shards", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  0 data   01 00 00 00"))
        .stdout(predicate::str::contains("  4 parity 1b 1c 12 14"));
}

#[test]
fn rejects_zero_parity() {
    Command::cargo_bin("shardx")
        .unwrap()
        .args(["matrix", "--parity-shards", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parity_shards must be at least 1"));
}

#[test]
fn missing_input_is_an_error() {
    let td = assert_fs::TempDir::new().unwrap();
    Command::cargo_bin("shardx")
        .unwrap()
        .args(["encode", td.child("nope").path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read input file"));
}

#[test]
fn verify_rejects_manifest_pointing_outside_its_directory() {
    let td = assert_fs::TempDir::new().unwrap();
    let input = td.child("outside.txt");
    write_random(input.path(), 2048, 3);
    let sub = td.child("sub");

    // shards next to the input, and a second copy (with manifest) under sub/
    for out in [td.path(), sub.path()] {
        Command::cargo_bin("shardx")
            .unwrap()
            .args(["encode", "--output", out.to_str().unwrap(), input.path().to_str().unwrap()])
            .assert()
            .success();
    }

    let mpath = sub.child("outside.txt.manifest.json");
    let text = std::fs::read_to_string(mpath.path()).unwrap();
    let tampered = text.replace("\"file_name\": \"outside.txt\"", "\"file_name\": \"../outside.txt\"");
    assert_ne!(text, tampered);
    std::fs::write(mpath.path(), tampered).unwrap();
    // only the parent-directory copy would satisfy the tampered name
    for i in 0..6 {
        std::fs::remove_file(sub.child(format!("outside.txt.{i}")).path()).unwrap();
    }

    Command::cargo_bin("shardx")
        .unwrap()
        .args(["verify", mpath.path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Recoverable").not())
        .stderr(predicate::str::contains("invalid file name"));
}
