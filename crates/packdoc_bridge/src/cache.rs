use std::sync::{Arc, Mutex, PoisonError};

use packdoc::pack::SharedKeys;

/// Per-session record of which shared-key ids have already been surfaced to
/// the host.
///
/// Dict iterators consult the cache so a shared key's text is materialized
/// once per cache no matter how many documents are traversed; afterwards the
/// host reuses whatever it stored under the id. Clones share one record.
#[derive(Clone)]
pub struct KeyCache {
	seen: Arc<Mutex<Vec<bool>>>,
}

impl KeyCache {
	/// Create an empty cache.
	pub fn new() -> Self {
		Self {
			seen: Arc::new(Mutex::new(Vec::new())),
		}
	}

	/// Mark `id` as surfaced and report whether it had been seen before.
	///
	/// Ids past the shared-table capacity are never memoized; they report
	/// unseen every time.
	pub fn check(&self, id: u32) -> bool {
		let index = id as usize;
		if index >= SharedKeys::MAX_KEYS {
			return false;
		}
		let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
		if index >= seen.len() {
			seen.resize(index + 1, false);
		}
		let before = seen[index];
		seen[index] = true;
		before
	}

	/// Number of live handles to this cache.
	pub fn ref_count(&self) -> usize {
		Arc::strong_count(&self.seen)
	}
}

impl Default for KeyCache {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for KeyCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
		let count = seen.iter().filter(|flag| **flag).count();
		f.debug_struct("KeyCache").field("seen", &count).finish()
	}
}
