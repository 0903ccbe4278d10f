//! Classifies the shards found for a manifest and decides recoverability.

use std::collections::BTreeMap;

use tracing::warn;

use crate::manifest::ShardManifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardStatus {
    Ok,
    /// Present but its digest or length disagrees with the manifest.
    Corrupt,
    Missing,
}

#[derive(Debug, Clone)]
pub struct AuditReport {
    /// One entry per shard index.
    pub statuses: Vec<ShardStatus>,
    pub shards_ok: usize,
    pub shards_corrupt: usize,
    pub shards_missing: usize,
    /// At least `data_shards` shards are intact.
    pub recoverable: bool,
    /// The recorded Merkle root matches the recorded shard digests.
    pub merkle_ok: bool,
}

/// Checks every shard in `found` against `manifest` and returns the report
/// together with the intact shards, ready for decoding.
pub fn audit<S: AsRef<[u8]>>(
    manifest: &ShardManifest,
    found: BTreeMap<usize, S>,
) -> (AuditReport, BTreeMap<usize, S>) {
    let total = manifest.config.total_shards();
    let mut statuses = vec![ShardStatus::Missing; total];
    let mut intact = BTreeMap::new();

    for (index, shard) in found {
        if index >= total {
            warn!(index, total, "ignoring shard with out-of-range index");
            continue;
        }
        let bytes = shard.as_ref();
        let digest_ok =
            manifest.shard_hashes.get(index).is_some_and(|h| blake3::hash(bytes).to_hex().as_str() == h.as_str());
        if bytes.len() == manifest.shard_size && digest_ok {
            statuses[index] = ShardStatus::Ok;
            intact.insert(index, shard);
        } else {
            warn!(index, len = bytes.len(), "shard does not match manifest digest");
            statuses[index] = ShardStatus::Corrupt;
        }
    }

    let count = |want: ShardStatus| statuses.iter().filter(|&&s| s == want).count();
    let shards_ok = count(ShardStatus::Ok);
    let report = AuditReport {
        shards_ok,
        shards_corrupt: count(ShardStatus::Corrupt),
        shards_missing: count(ShardStatus::Missing),
        recoverable: shards_ok >= manifest.config.data_shards,
        merkle_ok: manifest.recomputed_root_hex().as_deref() == Some(manifest.merkle_root_hex.as_str()),
        statuses,
    };
    (report, intact)
}
