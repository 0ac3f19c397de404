//! Fixture factory for user drafts
//!
//! Each factory owns a sequence; drafts get `Name {n}` / `{n}@test.io` with
//! `n` counting up from 1, so every draft it builds passes validation and no
//! two drafts from the same factory share an email.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::user::UserDraft;

/// Password given to every generated draft
pub const DEFAULT_PASSWORD: &str = "password";

/// Sequence-based generator of valid user drafts
#[derive(Debug)]
pub struct UserFactory {
    sequence: AtomicU64,
}

impl UserFactory {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start the sequence at `first` instead of 1
    pub fn starting_at(first: u64) -> Self {
        Self {
            sequence: AtomicU64::new(first),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    /// Next unactivated draft in the sequence
    pub fn next_draft(&self) -> UserDraft {
        let n = self.next_sequence();
        UserDraft::new(format!("Name {}", n), format!("{}@test.io", n), DEFAULT_PASSWORD)
    }

    /// Next draft, customized by `customize`
    pub fn build_with(&self, customize: impl FnOnce(&mut UserDraft)) -> UserDraft {
        let mut draft = self.next_draft();
        customize(&mut draft);
        draft
    }

    /// `count` consecutive drafts
    pub fn drafts(&self, count: usize) -> Vec<UserDraft> {
        (0..count).map(|_| self.next_draft()).collect()
    }
}

impl Default for UserFactory {
    fn default() -> Self {
        Self::new()
    }
}
