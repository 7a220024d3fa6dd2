//! 对称认证加密（CipherEngine）
//!
//! The whole serialized entry collection is sealed as one opaque payload. Wrong keys
//! and corrupted ciphertexts surface as the same `AuthenticationFailure`.

pub mod errors;
pub mod systems;
pub mod traits;

pub use self::errors::SymmetricError;
pub use self::systems::CipherSuite;
pub use self::traits::{Sealed, SymmetricCipher};
