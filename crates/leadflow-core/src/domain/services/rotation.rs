//! Rotation cursors
//!
//! Per-context round-robin positions. One context per region plus a single
//! global context. Cursors live as long as the owning service instance and
//! are never persisted.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;

use crate::domain::value_objects::Region;

/// Rotation context key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RotationKey {
    /// Rotation among callers servicing one region (lowercased key)
    Region(String),
    /// Rotation across the full roster
    Global,
}

impl RotationKey {
    pub fn region(region: &Region) -> Self {
        Self::Region(region.key().to_string())
    }
}

impl fmt::Display for RotationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region(key) => write!(f, "state:{}", key),
            Self::Global => write!(f, "global"),
        }
    }
}

/// Next candidate index per rotation context
#[derive(Debug, Default)]
pub struct RotationCursors {
    positions: Mutex<HashMap<RotationKey, usize>>,
}

impl RotationCursors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index to start the next scan from (0 for an unseen context)
    pub fn start(&self, key: &RotationKey) -> usize {
        self.positions.lock().get(key).copied().unwrap_or(0)
    }

    /// Move the cursor past the winning candidate
    pub fn advance(&self, key: &RotationKey, winner: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.positions.lock().insert(key.clone(), (winner + 1) % len);
    }

    /// Current positions keyed by rendered context name
    pub fn snapshot(&self) -> HashMap<String, usize> {
        self.positions
            .lock()
            .iter()
            .map(|(key, pos)| (key.to_string(), *pos))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_context_starts_at_zero() {
        let cursors = RotationCursors::new();
        assert_eq!(cursors.start(&RotationKey::Global), 0);
    }

    #[test]
    fn test_advance_wraps() {
        let cursors = RotationCursors::new();
        cursors.advance(&RotationKey::Global, 2, 3);
        assert_eq!(cursors.start(&RotationKey::Global), 0);

        cursors.advance(&RotationKey::Global, 0, 3);
        assert_eq!(cursors.start(&RotationKey::Global), 1);
    }

    #[test]
    fn test_contexts_are_independent() {
        let cursors = RotationCursors::new();
        let texas = RotationKey::region(&Region::parse("Texas").unwrap());

        cursors.advance(&texas, 0, 4);

        assert_eq!(cursors.start(&texas), 1);
        assert_eq!(cursors.start(&RotationKey::Global), 0);
        assert_eq!(cursors.snapshot().get("state:texas"), Some(&1));
    }
}
