//! Process-unique integer identities.
//!
//! Vertices, planes and shared attribute records each receive a [`Tag`] at
//! construction. Tags identify *instances*, not values: two vertices at the
//! same position carry different tags until canonicalization makes them the
//! same instance. Clones keep their tag.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identity handed out by [`next_tag`].
pub type Tag = u64;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Returns a fresh tag, never returned before in this process.
#[inline]
pub fn next_tag() -> Tag {
    NEXT_TAG.fetch_add(1, Ordering::Relaxed)
}
