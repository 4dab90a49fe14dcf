//! Run identity and clock helpers

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of one worker invocation, based on UUIDv7
///
/// Sortable by creation time, so results from later reruns order after
/// earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u128);

impl RunId {
    /// Generate a new run id
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse a run id from its hyphenated string form
    ///
    /// # Examples
    ///
    /// ```
    /// use thera_domain::RunId;
    ///
    /// let id = RunId::new();
    /// assert_eq!(RunId::from_string(&id.to_string()).unwrap(), id);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid run id: {}", e))
    }

    /// Raw value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Current Unix time in seconds (0 if the clock is before the epoch)
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
