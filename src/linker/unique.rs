//! Collision handling for generated ids
//!
//! Only used when unique ids are requested; the default linking pass lets
//! identical slugs through unchanged.

use std::collections::HashSet;

/// Ids emitted during one linking pass
#[derive(Debug, Default)]
pub struct IdRegistry {
    seen: HashSet<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `candidate`, or `candidate-N` with the smallest free N >= 1,
    /// and record the result.
    pub fn claim(&mut self, candidate: &str) -> String {
        if self.seen.insert(candidate.to_string()) {
            return candidate.to_string();
        }

        let mut n = 1usize;
        loop {
            let next = format!("{}-{}", candidate, n);
            if self.seen.insert(next.clone()) {
                return next;
            }
            n += 1;
        }
    }
}
