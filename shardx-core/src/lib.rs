pub mod audit;
pub mod coding_matrix;
pub mod compute;
pub mod config;
pub mod error;
pub mod galois;
pub mod layout;
pub mod manifest;
pub mod matrix;
pub mod merkle;
pub mod rs_codec;

pub use coding_matrix::{build_coding_matrix, coding_matrix};
pub use config::{CodecConfig, HEADER_SIZE};
pub use error::{CodecError, Result};
pub use layout::{join_after_decode, split_for_encode};
pub use rs_codec::{decode_missing, encode_parity, RsCodec};
