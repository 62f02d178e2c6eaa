//! Master key source trait

use crate::crypto::MasterKey;
use crate::error::Result;

/// Where the process gets its master key from
///
/// Sources are asked for the key once per store operation. The returned key
/// is zeroed when the caller drops it, so a source should not hand out a key
/// it does not need to keep.
pub trait MasterKeySource: Send + Sync {
    /// Produce the master key, or `MasterKeyUnavailable`
    fn acquire(&self) -> Result<MasterKey>;

    /// Short human-readable name for diagnostics
    fn describe(&self) -> &'static str;
}
