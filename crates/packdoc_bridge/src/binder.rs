use std::collections::HashMap;

use packdoc::pack::{Doc, Encoder, Node, Result, SharedBytes, SharedKeys};

use crate::array_iter::ArrayIter;
use crate::cache::KeyCache;
use crate::dict_iter::DictIter;
use crate::load::{LoadedKey, LoadedValue};

/// Identity of a host-managed object, as assigned by the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
	/// Wrap a raw host identity.
	pub fn new(raw: u64) -> Self {
		Self(raw)
	}

	/// The raw host identity.
	pub fn raw(self) -> u64 {
		self.0
	}
}

impl From<u64> for HandleId {
	fn from(raw: u64) -> Self {
		Self(raw)
	}
}

enum Bound {
	Buf(SharedBytes),
	Keys(SharedKeys),
	Doc(Doc),
	Value(Node),
	Encoder(Box<Encoder>),
	Cache(KeyCache),
	Dict(DictIter),
	Array(ArrayIter),
}

/// Registry tying reference-counted format objects to host-managed handles.
///
/// The embedder wires its collector to call [`Binder::finalize`] when a
/// handle is collected; everything bound under that handle is then released,
/// exactly once. Finalization may happen at any time relative to other
/// calls, and repeating it is harmless.
///
/// Ownership per bound kind:
///
/// - buffers, shared-key tables, and value nodes honor the `retain` flag:
///   retained binds add one reference released at finalize, unretained
///   binds take no ownership and finalize releases nothing for them;
/// - documents and encoders always adopt the passed object and always
///   release it at finalize;
/// - iterators and key caches are owned outright, created through their
///   `begin`/`create` calls.
///
/// Bound objects stay addressable by handle between calls through the
/// `bound_*` accessors, so a host callback holding only its handle can get
/// back to the native object.
///
/// Binding one handle to two different objects without an intervening
/// finalize is a caller error the registry does not detect: both stay
/// until the handle is collected.
#[derive(Default)]
pub struct Binder {
	entries: HashMap<HandleId, Vec<Bound>>,
}

impl Binder {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Bind a buffer; with `retain`, one reference is held until finalize.
	pub fn bind_buf(&mut self, handle: HandleId, data: &SharedBytes, retain: bool) {
		if retain {
			self.push(handle, Bound::Buf(data.clone()));
		}
	}

	/// Bind a shared-key table; with `retain`, one reference is held until
	/// finalize.
	pub fn bind_shared_keys(&mut self, handle: HandleId, keys: &SharedKeys, retain: bool) {
		if retain {
			self.push(handle, Bound::Keys(keys.clone()));
		}
	}

	/// Bind a value node; with `retain`, the node's document is held until
	/// finalize.
	pub fn bind_value(&mut self, handle: HandleId, node: &Node, retain: bool) {
		if retain {
			self.push(handle, Bound::Value(node.clone()));
		}
	}

	/// Bind a document. The registry adopts the passed reference and
	/// releases it at finalize.
	pub fn bind_doc(&mut self, handle: HandleId, doc: Doc) {
		self.push(handle, Bound::Doc(doc));
	}

	/// Bind an encoder. The registry owns it until finalize or
	/// [`Binder::finish_encoder`].
	pub fn bind_encoder(&mut self, handle: HandleId, encoder: Encoder) {
		self.push(handle, Bound::Encoder(Box::new(encoder)));
	}

	/// The buffer bound under `handle`, when one is.
	pub fn bound_buf(&self, handle: HandleId) -> Option<&SharedBytes> {
		self.entries.get(&handle)?.iter().find_map(|bound| match bound {
			Bound::Buf(data) => Some(data),
			_ => None,
		})
	}

	/// The shared-key table bound under `handle`, when one is.
	pub fn bound_shared_keys(&self, handle: HandleId) -> Option<&SharedKeys> {
		self.entries.get(&handle)?.iter().find_map(|bound| match bound {
			Bound::Keys(keys) => Some(keys),
			_ => None,
		})
	}

	/// The document bound under `handle`, when one is.
	pub fn bound_doc(&self, handle: HandleId) -> Option<&Doc> {
		self.entries.get(&handle)?.iter().find_map(|bound| match bound {
			Bound::Doc(doc) => Some(doc),
			_ => None,
		})
	}

	/// The value node bound under `handle`, when one is.
	pub fn bound_value(&self, handle: HandleId) -> Option<&Node> {
		self.entries.get(&handle)?.iter().find_map(|bound| match bound {
			Bound::Value(node) => Some(node),
			_ => None,
		})
	}

	/// The key cache bound under `handle`, when one is.
	pub fn key_cache(&self, handle: HandleId) -> Option<&KeyCache> {
		self.entries.get(&handle)?.iter().find_map(|bound| match bound {
			Bound::Cache(cache) => Some(cache),
			_ => None,
		})
	}

	/// Borrow a bound encoder for write calls.
	pub fn encoder_mut(&mut self, handle: HandleId) -> Option<&mut Encoder> {
		self.entries.get_mut(&handle)?.iter_mut().find_map(|bound| match bound {
			Bound::Encoder(encoder) => Some(encoder.as_mut()),
			_ => None,
		})
	}

	/// Remove a bound encoder and seal its buffer.
	pub fn finish_encoder(&mut self, handle: HandleId) -> Option<Result<SharedBytes>> {
		let bounds = self.entries.get_mut(&handle)?;
		let index = bounds.iter().position(|bound| matches!(bound, Bound::Encoder(_)))?;
		let Bound::Encoder(encoder) = bounds.remove(index) else {
			return None;
		};
		Some((*encoder).finish())
	}

	/// Allocate a key cache bound to `handle`'s lifetime and return a
	/// shareable reference to it.
	pub fn create_key_cache(&mut self, handle: HandleId) -> KeyCache {
		let cache = KeyCache::new();
		self.push(handle, Bound::Cache(cache.clone()));
		cache
	}

	/// Bind a dict iterator positioned before the first entry of `dict`.
	///
	/// Flag semantics are those of [`DictIter::begin`]; the cache reference,
	/// when given, should come from [`Binder::create_key_cache`] so its
	/// lifetime outlasts every iterator consulting it.
	pub fn begin_dict_iter(
		&mut self,
		handle: HandleId,
		dict: &Node,
		cache: Option<&KeyCache>,
		finalize: bool,
		pre_load: bool,
	) {
		let iter = DictIter::begin(dict, cache, finalize, pre_load);
		self.push(handle, Bound::Dict(iter));
	}

	/// Advance the dict iterator bound to `handle`, flattening one entry
	/// into the caller's slots.
	///
	/// A missing, finalized, or exhausted iterator answers false and leaves
	/// the slots untouched.
	pub fn dict_iter_next(&mut self, handle: HandleId, key_out: &mut LoadedKey, value_out: &mut LoadedValue) -> bool {
		let Some(bounds) = self.entries.get_mut(&handle) else {
			return false;
		};
		bounds
			.iter_mut()
			.find_map(|bound| match bound {
				Bound::Dict(iter) => Some(iter.next(key_out, value_out)),
				_ => None,
			})
			.unwrap_or(false)
	}

	/// Bind an array iterator positioned before the first element of
	/// `array`.
	pub fn begin_array_iter(&mut self, handle: HandleId, array: &Node, finalize: bool) {
		let iter = ArrayIter::begin(array, finalize);
		self.push(handle, Bound::Array(iter));
	}

	/// Advance the array iterator bound to `handle`, flattening one element
	/// into the caller's slot.
	pub fn array_iter_next(&mut self, handle: HandleId, value_out: &mut LoadedValue) -> bool {
		let Some(bounds) = self.entries.get_mut(&handle) else {
			return false;
		};
		bounds
			.iter_mut()
			.find_map(|bound| match bound {
				Bound::Array(iter) => Some(iter.next(value_out)),
				_ => None,
			})
			.unwrap_or(false)
	}

	/// Release everything bound under `handle`.
	///
	/// This is the host collector's callback. The first call drops every
	/// binding; repeating it finds nothing and does nothing.
	pub fn finalize(&mut self, handle: HandleId) {
		self.entries.remove(&handle);
	}

	/// Whether anything is currently bound under `handle`.
	pub fn is_bound(&self, handle: HandleId) -> bool {
		self.entries.contains_key(&handle)
	}

	/// Number of resources bound under `handle`.
	pub fn binding_count(&self, handle: HandleId) -> usize {
		self.entries.get(&handle).map_or(0, Vec::len)
	}

	fn push(&mut self, handle: HandleId, bound: Bound) {
		self.entries.entry(handle).or_default().push(bound);
	}
}
