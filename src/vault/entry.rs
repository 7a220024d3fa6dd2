use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 一条凭据记录
///
/// `id` is assigned by the caller before the first save and never changes afterwards;
/// it is the only identity used for lookup, update and delete.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Entry {
    pub id: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub pass: String,
    #[serde(default)]
    pub notes: String,
}

impl Entry {
    pub fn new(
        id: impl Into<String>,
        link: impl Into<String>,
        user: impl Into<String>,
        pass: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            link: link.into(),
            user: user.into(),
            pass: pass.into(),
            notes: notes.into(),
        }
    }

    /// Fresh random identifier for a not-yet-saved entry.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// `needle` must already be lowercase. An empty needle matches everything.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.link.to_lowercase().contains(needle)
            || self.user.to_lowercase().contains(needle)
    }
}

// 不在日志或调试输出中泄露密码和备注
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("link", &self.link)
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .field("notes", &"[REDACTED]")
            .finish()
    }
}
