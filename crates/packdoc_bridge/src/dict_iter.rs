use packdoc::pack::{KeyRef, Node};

use crate::cache::KeyCache;
use crate::load::{LoadedKey, LoadedValue, fill, span_of};

/// Stateful cursor over a dictionary's entries.
///
/// Each `next` call flattens one entry's key and value into the caller's
/// slots and advances; entries come back in the order they were written.
/// After the exhausting call returns false, further calls keep returning
/// false and leave the slots untouched.
pub struct DictIter {
	dict: Option<Node>,
	cache: Option<KeyCache>,
	pos: u32,
	count: u32,
	finalize: bool,
	pre_load: bool,
	done: bool,
}

impl DictIter {
	/// Position a cursor before the first entry of `dict`.
	///
	/// A node that is not a dictionary yields an already-exhausted cursor.
	/// With `finalize`, the cursor's document retain is dropped as soon as
	/// iteration completes rather than when the cursor itself goes away.
	/// With `pre_load`, nested collection values get their sizes read
	/// eagerly during `next`; otherwise `collection_size` stays zero and the
	/// host resolves it later through [`crate::load_value`] on the slot's
	/// back-reference.
	pub fn begin(dict: &Node, cache: Option<&KeyCache>, finalize: bool, pre_load: bool) -> DictIter {
		let count = dict.value().as_dict().map_or(0, |value| value.len());
		DictIter {
			dict: Some(dict.clone()),
			cache: cache.cloned(),
			pos: 0,
			count,
			finalize,
			pre_load,
			done: false,
		}
	}

	/// Flatten the next entry into the caller's slots.
	///
	/// Returns false once exhausted, idempotently. The shared-key cache is
	/// consulted for shared keys: text is set on first sighting only, while
	/// `shared_id` is always set. Keys outside the shared table bypass the
	/// cache and always carry their text.
	pub fn next(&mut self, key_out: &mut LoadedKey, value_out: &mut LoadedValue) -> bool {
		if self.done {
			return false;
		}
		let Some(source) = self.dict.clone() else {
			self.done = true;
			return false;
		};
		if self.pos >= self.count {
			self.finish();
			return false;
		}

		let doc = source.doc();
		let Some((key, value)) = source.value().as_dict().and_then(|dict| dict.entry(self.pos)) else {
			self.finish();
			return false;
		};

		key_out.clear();
		match key {
			KeyRef::Shared(id) => {
				key_out.shared_id = id as i32;
				let seen = self.cache.as_ref().is_some_and(|cache| cache.check(id));
				key_out.is_known_shared = seen;
				if !seen {
					key_out.shared_text = doc.shared_keys().and_then(|keys| keys.resolve(id));
				}
			}
			KeyRef::Inline(inline) => {
				key_out.shared_id = -1;
				key_out.string = span_of(inline);
				key_out.node = Some(Node::new(doc, inline));
			}
		}

		fill(doc, value, self.pre_load, value_out);
		self.pos += 1;
		true
	}

	/// Whether the cursor has reported exhaustion.
	pub fn is_done(&self) -> bool {
		self.done
	}

	fn finish(&mut self) {
		self.done = true;
		if self.finalize {
			self.dict = None;
		}
	}
}
