//! Process-wide rolling message id (§4.3.7, §9 Design Notes).
//!
//! A single `AtomicU8` rather than a `Cell` — the core is single-threaded
//! by contract (§5), but a bare `Cell` would make this module `!Sync` and
//! poison any attempt to share a [`crate::appliance`] across an
//! executor's worker threads even when only one of them ever calls in.
//! `Relaxed` ordering is enough: callers only need monotonicity, not a
//! synchronizes-with relationship to anything else.

use std::sync::atomic::{AtomicU8, Ordering};

static NEXT: AtomicU8 = AtomicU8::new(0);

/// Returns the next id and advances the counter, wrapping at 256.
pub fn next_message_id() -> u8 {
	NEXT.fetch_add(1, Ordering::Relaxed)
}
