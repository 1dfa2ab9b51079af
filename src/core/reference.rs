//! Transaction reference allocation
//!
//! References are short uppercase hex tokens cut from a random v4 UUID.
//! Generation only makes collisions unlikely; uniqueness itself is enforced
//! by the transaction store, and the engine asks for a fresh token when the
//! store rejects one.

use uuid::Uuid;

/// Longest reference a v4 UUID can supply (32 hex digits)
const MAX_REFERENCE_LENGTH: usize = 32;

/// Source of candidate transaction references
pub trait ReferenceSource: Send + Sync {
    /// Produce a new candidate reference
    fn next_reference(&self) -> String;
}

/// References cut from random v4 UUIDs
#[derive(Debug, Clone, Copy)]
pub struct UuidReferences {
    length: usize,
}

impl UuidReferences {
    /// Create a source producing tokens of `length` characters
    ///
    /// `length` is clamped to `1..=32`.
    pub fn new(length: usize) -> Self {
        UuidReferences {
            length: length.clamp(1, MAX_REFERENCE_LENGTH),
        }
    }
}

impl Default for UuidReferences {
    fn default() -> Self {
        Self::new(16)
    }
}

impl ReferenceSource for UuidReferences {
    fn next_reference(&self) -> String {
        let mut token = Uuid::new_v4().simple().to_string().to_uppercase();
        token.truncate(self.length);
        token
    }
}
