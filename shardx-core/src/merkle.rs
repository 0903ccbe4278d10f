/// Binary Merkle root over 32-byte BLAKE3 leaf digests.
/// Duplicates the last node when the layer is odd.
pub fn root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return *blake3::hash(&[]).as_bytes();
    }
    let mut layer = leaves.to_vec();
    while layer.len() > 1 {
        layer = layer
            .chunks(2)
            .map(|pair| {
                let mut h = blake3::Hasher::new();
                h.update(&pair[0]);
                h.update(pair.get(1).unwrap_or(&pair[0]));
                *h.finalize().as_bytes()
            })
            .collect();
    }
    layer[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaf_is_root() {
        let l = *blake3::hash(b"a").as_bytes();
        assert_eq!(root(&[l]), l);
    }

    #[test]
    fn odd_layer_duplicates_last() {
        let a = *blake3::hash(b"a").as_bytes();
        let b = *blake3::hash(b"b").as_bytes();
        let c = *blake3::hash(b"c").as_bytes();
        assert_eq!(root(&[a, b, c]), root(&[a, b, c, c]));
        assert_ne!(root(&[a, b]), root(&[b, a]));
    }
}
