//! Byte layout between a file and its data shards.
//!
//! The logical stream is `[len: u32 BE][file bytes][zero padding]`, cut into
//! `data_shards` contiguous shards of equal size. The header belongs to the
//! stream, not to shard 0, so it spans several shards when the shard size is
//! below [`HEADER_SIZE`].

use tracing::debug;

use crate::config::{HEADER_SIZE, MAX_TOTAL_SHARDS};
use crate::error::{CodecError, Result};

/// Splits `file` into `data_shards` equal-length data shards.
pub fn split_for_encode(file: &[u8], data_shards: usize) -> Result<Vec<Vec<u8>>> {
    if data_shards == 0 || data_shards >= MAX_TOTAL_SHARDS {
        return Err(CodecError::InvalidConfig(format!(
            "data_shards must be in 1..{MAX_TOTAL_SHARDS}, got {data_shards}"
        )));
    }
    let too_large = || CodecError::FileTooLarge { len: file.len() };
    let declared = u32::try_from(file.len()).map_err(|_| too_large())?;
    let stored = file.len().checked_add(HEADER_SIZE).ok_or_else(too_large)?;
    let shard_size = stored.div_ceil(data_shards);
    let buffer_len = shard_size.checked_mul(data_shards).ok_or_else(too_large)?;

    let mut stream = vec![0u8; buffer_len];
    stream[..HEADER_SIZE].copy_from_slice(&declared.to_be_bytes());
    stream[HEADER_SIZE..HEADER_SIZE + file.len()].copy_from_slice(file);

    debug!(file_len = file.len(), data_shards, shard_size, "split file into data shards");
    Ok(stream.chunks_exact(shard_size).map(<[u8]>::to_vec).collect())
}

/// Concatenates data shards and returns the file bytes the header declares.
pub fn join_after_decode<S: AsRef<[u8]>>(data_shards: &[S]) -> Result<Vec<u8>> {
    let available: usize = data_shards.iter().map(|s| s.as_ref().len()).sum();
    if available < HEADER_SIZE {
        return Err(CodecError::TruncatedHeader { needed: HEADER_SIZE, available });
    }
    let mut stream = Vec::with_capacity(available);
    for s in data_shards {
        stream.extend_from_slice(s.as_ref());
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&stream[..HEADER_SIZE]);
    let declared = u32::from_be_bytes(header) as usize;
    let payload = available - HEADER_SIZE;
    if declared > payload {
        return Err(CodecError::TruncatedPayload { declared, available: payload });
    }
    stream.truncate(HEADER_SIZE + declared);
    stream.drain(..HEADER_SIZE);
    Ok(stream)
}
