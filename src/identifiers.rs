//! Type-safe identifiers.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Inner | Scope |
//! |------|-------|-------|
//! | [`Epoch`] | `u64` | One per connection attempt of a manager |
//! | [`TimerId`] | `u64` | One per armed retry timer of a manager |
//! | [`SubscriptionId`] | `u64` | One per event subscription of a manager |
//! | [`EntryId`] | `Uuid` | One per transcript entry, globally unique |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Counter IDs
// ============================================================================

macro_rules! counter_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(u64);

        impl $name {
            /// Creates an identifier from a raw value.
            #[inline]
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            #[inline]
            #[must_use]
            pub const fn as_u64(self) -> u64 {
                self.0
            }

            /// Returns the identifier following this one.
            #[inline]
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0.wrapping_add(1))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

counter_id! {
    /// Generation token of a connection attempt.
    ///
    /// Incremented on every `connect()`; transport callbacks tagged with an
    /// older epoch are discarded.
    Epoch
}

counter_id! {
    /// Identifier of an armed retry timer.
    TimerId
}

counter_id! {
    /// Identifier of an event subscription.
    SubscriptionId
}

// ============================================================================
// EntryId
// ============================================================================

/// Unique identifier of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generates a new random entry ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_next_increments() {
        let epoch = Epoch::default();
        assert_eq!(epoch.as_u64(), 0);
        assert_eq!(epoch.next(), Epoch::new(1));
        assert!(epoch.next() > epoch);
    }

    #[test]
    fn test_counter_display() {
        assert_eq!(TimerId::new(7).to_string(), "7");
        assert_eq!(SubscriptionId::new(3).to_string(), "3");
    }

    #[test]
    fn test_entry_id_unique() {
        let a = EntryId::generate();
        let b = EntryId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entry_id_serializes_as_string() {
        let id = EntryId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
