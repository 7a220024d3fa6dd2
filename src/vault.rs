//! The plaintext domain: entries, the in-memory index, and the payload that gets
//! serialized and sealed as a whole.

pub mod entry;
pub mod index;

pub use self::entry::Entry;
pub use self::index::EntryIndex;

use crate::common::errors::{Result, VaultError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

const PAYLOAD_VERSION: u32 = 1;

/// 保险库文件中加密存储的核心载荷 (Payload)。
///
/// Serialized as JSON, then sealed under the derived key. The engine never reads or
/// writes individual entries on disk.
#[derive(Serialize, Deserialize)]
pub struct EntryCollection {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

impl EntryCollection {
    pub fn from_index(index: &EntryIndex) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            saved_at: Utc::now(),
            entries: index.snapshot(),
        }
    }

    /// Serializes into a buffer that is wiped when dropped.
    pub fn to_plaintext(&self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(serde_json::to_vec(self)?))
    }

    /// Parses an authenticated plaintext back into an index.
    pub fn parse_index(plaintext: &[u8]) -> Result<EntryIndex> {
        let collection: EntryCollection = serde_json::from_slice(plaintext)?;
        if collection.version > PAYLOAD_VERSION {
            return Err(VaultError::Internal(format!(
                "payload version {} is newer than supported version {PAYLOAD_VERSION}",
                collection.version
            )));
        }
        EntryIndex::from_entries(collection.entries)
            .map_err(|id| VaultError::Internal(format!("duplicate entry id in payload: {id}")))
    }
}
