use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymmetricError {
    /// Wrong key or modified ciphertext. The two are never told apart.
    #[error("authentication failed")]
    AuthenticationFailure,

    #[error("encryption failed")]
    Encryption,

    #[error("invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("nonce generation failed: {0}")]
    Rng(#[from] rand_core::OsError),

    #[error("cipher suite not compiled in: {0}")]
    Unsupported(&'static str),
}
