//! Type-safe identifier wrappers around `u64` counters.
//!
//! Identifiers are allocated by whoever owns the id space (the `World` for
//! entities, the `EventBus` for subscriptions) from a monotonic counter, so
//! an id is never reused for the lifetime of its owner. There is no random
//! allocation and no collision retry.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw counter value.
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the raw counter value.
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Opaque identifier of an entity registered in a `World`.
    ///
    /// Ordering follows allocation order, which is what turn arbitration
    /// uses to break simultaneous-readiness ties.
    Entity, "e"
}

define_id! {
    /// Identifier of a subscription registered on an `EventBus`.
    SubscriptionId, "sub"
}

/// Monotonic allocator for identifier counters.
///
/// Starts at 1 so that a zeroed value never names a live id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator whose first id is 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Return the next raw id, or `None` once the `u64` range is exhausted.
    pub const fn allocate(&mut self) -> Option<u64> {
        let id = self.next;
        match self.next.checked_add(1) {
            Some(next) => {
                self.next = next;
                Some(id)
            }
            None => None,
        }
    }

    /// Number of ids handed out so far.
    pub const fn allocated(&self) -> u64 {
        self.next.saturating_sub(1)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
