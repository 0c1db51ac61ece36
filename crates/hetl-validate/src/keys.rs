//! Per-run primary-key uniqueness tracking.

use std::collections::HashMap;

/// Maps each primary-key value to the source line where it was first seen.
///
/// Scoped to a single dataset run and dropped with the validator at run
/// end; uniqueness is never tracked across runs or datasets.
#[derive(Debug, Default)]
pub struct KeyTracker {
    first_seen: HashMap<String, u64>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key sighting. Returns the first-seen line when the key is a
    /// duplicate, `None` when this is the first occurrence.
    pub fn observe(&mut self, key: &str, line: u64) -> Option<u64> {
        match self.first_seen.get(key) {
            Some(first) => Some(*first),
            None => {
                self.first_seen.insert(key.to_string(), line);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_wins() {
        let mut tracker = KeyTracker::new();
        assert_eq!(tracker.observe("P001", 2), None);
        assert_eq!(tracker.observe("P002", 3), None);
        assert_eq!(tracker.observe("P001", 9), Some(2));
        // The first-seen line does not move on later duplicates.
        assert_eq!(tracker.observe("P001", 12), Some(2));
        assert_eq!(tracker.len(), 2);
    }
}
