use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Reference-counted table mapping small integer ids to frequently repeated
/// dictionary key strings.
///
/// The encoder assigns ids to eligible keys as it meets them; decoders
/// resolve ids back to text. Ids are stable for the lifetime of the table,
/// and cloning the handle retains the same table.
#[derive(Clone)]
pub struct SharedKeys {
	inner: Arc<Mutex<State>>,
}

struct State {
	by_text: HashMap<Box<str>, u32>,
	texts: Vec<Arc<str>>,
}

impl SharedKeys {
	/// Maximum number of keys a table will hold.
	pub const MAX_KEYS: usize = 2048;
	/// Maximum byte length of an eligible key.
	pub const MAX_KEY_LEN: usize = 16;

	/// Create an empty table.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(Mutex::new(State {
				by_text: HashMap::new(),
				texts: Vec::new(),
			})),
		}
	}

	/// Whether `key` may be assigned an id: short identifier-like strings
	/// only, so arbitrary data keys do not crowd the table.
	pub fn is_eligible(key: &str) -> bool {
		!key.is_empty()
			&& key.len() <= Self::MAX_KEY_LEN
			&& key.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
	}

	/// Return the id for `key`, assigning one when the key is eligible and
	/// the table has room. `None` means the key must be stored inline.
	pub fn encode(&self, key: &str) -> Option<u32> {
		if !Self::is_eligible(key) {
			return None;
		}
		let mut state = self.lock();
		if let Some(id) = state.by_text.get(key) {
			return Some(*id);
		}
		if state.texts.len() >= Self::MAX_KEYS {
			return None;
		}
		let id = state.texts.len() as u32;
		state.texts.push(Arc::from(key));
		state.by_text.insert(Box::from(key), id);
		Some(id)
	}

	/// Resolve an id to its key text.
	pub fn resolve(&self, id: u32) -> Option<Arc<str>> {
		self.lock().texts.get(id as usize).cloned()
	}

	/// Number of assigned ids.
	pub fn len(&self) -> usize {
		self.lock().texts.len()
	}

	/// Whether no ids have been assigned.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of live handles to this table.
	pub fn ref_count(&self) -> usize {
		Arc::strong_count(&self.inner)
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, State> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl Default for SharedKeys {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for SharedKeys {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SharedKeys").field("len", &self.len()).finish()
	}
}
