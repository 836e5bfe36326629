//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A key or value could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl CoreError {
    /// Creates an encoding error for a key of the wrong shape.
    #[must_use]
    pub fn malformed_key(expected_len: usize, actual: &[u8]) -> Self {
        Self::Encoding(format!(
            "malformed edge key: expected {expected_len} bytes with edge tag, got {} bytes",
            actual.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_key_mentions_lengths() {
        let err = CoreError::malformed_key(41, &[1, 2, 3]);
        let msg = err.to_string();
        assert!(msg.contains("41"));
        assert!(msg.contains("3 bytes"));
    }
}
