use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Position of a snapshot in an entity's version log.
///
/// Version numbers start at 1 and increase by one per recorded edit. A store
/// reports "no versions" as a latest number of 0, which is not itself a valid
/// `VersionNumber`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct VersionNumber(u32);

impl VersionNumber {
    /// The first version of every entity.
    pub const FIRST: Self = Self(1);

    pub fn new(n: u32) -> Result<Self, TypeError> {
        if n == 0 {
            return Err(TypeError::InvalidVersion(n));
        }
        Ok(Self(n))
    }

    /// The version that follows `latest`, where `latest == 0` means the
    /// entity has no versions yet.
    pub fn after(latest: u32) -> Self {
        Self(latest.saturating_add(1))
    }

    /// The latest version reported by a store, or `None` when the store
    /// reports 0 (no versions).
    pub fn from_latest(latest: u32) -> Option<Self> {
        (latest > 0).then_some(Self(latest))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The preceding version, or `None` for the first version.
    pub fn prev(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }
}

impl TryFrom<u32> for VersionNumber {
    type Error = TypeError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<VersionNumber> for u32 {
    fn from(v: VersionNumber) -> Self {
        v.0
    }
}

impl fmt::Debug for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(VersionNumber::new(0), Err(TypeError::InvalidVersion(0)));
        assert!(VersionNumber::new(1).is_ok());
    }

    #[test]
    fn after_empty_log_is_first() {
        assert_eq!(VersionNumber::after(0), VersionNumber::FIRST);
        assert_eq!(VersionNumber::after(4).get(), 5);
    }

    #[test]
    fn from_latest_maps_zero_to_none() {
        assert_eq!(VersionNumber::from_latest(0), None);
        assert_eq!(VersionNumber::from_latest(3).map(VersionNumber::get), Some(3));
    }

    #[test]
    fn prev_stops_at_first() {
        assert_eq!(VersionNumber::FIRST.prev(), None);
        let v3 = VersionNumber::new(3).unwrap();
        assert_eq!(v3.prev(), VersionNumber::new(2).ok());
        assert_eq!(v3.next().get(), 4);
    }

    #[test]
    fn serde_as_plain_integer() {
        let v = VersionNumber::new(9).unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "9");
        let parsed: VersionNumber = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, v);
        assert!(serde_json::from_str::<VersionNumber>("0").is_err());
    }
}
