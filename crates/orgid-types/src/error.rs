use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Decode a hex string, with or without a `0x` prefix, into a fixed array.
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], TypeError> {
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(TypeError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}
