//! # Bunker-Vault: a portable credential vault
//!
//! `bunker-vault` keeps link/username/password/notes records in a single encrypted file
//! that travels on removable media next to the program that opens it. Nothing is
//! readable without the master password.
//!
//! ## Core Concepts
//!
//! - **`VaultManager`**: the locked/unlocked state machine. Unlocking derives a key with
//!   Argon2id, decrypts the whole entry collection into memory, and every later change is
//!   written straight back to disk.
//! - **`VaultStore`**: where the encrypted blob lives. `FileVaultStore` replaces the vault
//!   file atomically, so a pulled drive or a full disk never leaves a half-written vault.
//! - **`VaultCommands`**: the call surface a presentation shell talks to.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bunker_vault::{Entry, VaultCommands, VaultConfig, VaultManager};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = VaultManager::from_config(VaultConfig::from_env()?)?;
//! let commands = VaultCommands::new(Arc::new(manager));
//!
//! if commands.unlock("correct horse battery staple".into()).await? {
//!     let entry = Entry::new(Entry::generate_id(), "example.com", "bob", "hunter2", "");
//!     commands.save_entry(entry).await?;
//!     let found = commands.get_entries(Some("example".into())).await?;
//!     assert_eq!(found.len(), 1);
//!     commands.lock().await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod common;
pub mod contract;
pub mod kdf;
pub mod manager;
pub mod storage;
pub mod symmetric;
pub mod vault;

pub use commands::VaultCommands;
pub use common::{ConfigError, KdfConfig, StorageConfig, VaultConfig, VaultError};
pub use contract::{Clipboard, CommandError, ErrorKind};
pub use manager::VaultManager;
pub use storage::{FileVaultStore, VaultStore};
pub use symmetric::CipherSuite;
pub use vault::Entry;

/// The version of the `bunker-vault` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
