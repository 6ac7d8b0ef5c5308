use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::pack::bytes::u32_at;
use crate::pack::{PackError, Result, SharedKeys, Value, validate_buffer};

/// Reference-counted immutable byte buffer backing zero-copy reads.
#[derive(Clone)]
pub struct SharedBytes {
	data: Arc<[u8]>,
}

impl SharedBytes {
	/// Wrap an owned byte vector.
	pub fn from_vec(data: Vec<u8>) -> Self {
		Self { data: Arc::from(data) }
	}

	/// Read a whole file into a buffer.
	pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
		Ok(Self::from_vec(fs::read(path)?))
	}

	/// Borrow the underlying bytes.
	pub fn as_slice(&self) -> &[u8] {
		&self.data
	}

	/// Buffer length in bytes.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Whether the buffer is empty.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Number of live handles to this buffer.
	pub fn ref_count(&self) -> usize {
		Arc::strong_count(&self.data)
	}
}

impl From<Vec<u8>> for SharedBytes {
	fn from(data: Vec<u8>) -> Self {
		Self::from_vec(data)
	}
}

impl std::fmt::Debug for SharedBytes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SharedBytes").field("len", &self.len()).finish()
	}
}

/// How far to trust an encoded buffer before reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
	/// Fully validate structure before any value is surfaced.
	Untrusted,
	/// Skip validation; the producer is known to emit well-formed buffers.
	Trusted,
}

struct DocInner {
	data: SharedBytes,
	keys: Option<SharedKeys>,
	root: u32,
}

/// Reference-counted decoded document: a buffer, an optional shared-key
/// table, and the root value offset.
///
/// Cloning retains the document; values borrowed from it stay valid while
/// any handle lives.
#[derive(Clone)]
pub struct Doc {
	inner: Arc<DocInner>,
}

impl Doc {
	/// Smallest possible document: one tag byte plus the root offset.
	pub const MIN_SIZE: usize = 5;

	/// Interpret `data` as a document, validating per `trust`.
	///
	/// `keys` must be the same table the producer encoded with; shared ids
	/// are unresolvable without it.
	pub fn from_bytes(data: SharedBytes, trust: Trust, keys: Option<SharedKeys>) -> Result<Doc> {
		let bytes = data.as_slice();
		let root = match trust {
			Trust::Untrusted => validate_buffer(bytes)?,
			Trust::Trusted => {
				if bytes.len() < Self::MIN_SIZE {
					return Err(PackError::BufferTooSmall { len: bytes.len() });
				}
				let region_len = bytes.len() - 4;
				let Some(root) = u32_at(bytes, region_len) else {
					return Err(PackError::BufferTooSmall { len: bytes.len() });
				};
				if root as usize >= region_len {
					return Err(PackError::RootOutOfRange { root, max: region_len });
				}
				root
			}
		};

		Ok(Doc {
			inner: Arc::new(DocInner { data, keys, root }),
		})
	}

	/// Read and decode a document file without a shared-key table.
	pub fn open(path: impl AsRef<Path>, trust: Trust) -> Result<Doc> {
		Doc::from_bytes(SharedBytes::read_file(path)?, trust, None)
	}

	/// The backing buffer.
	pub fn data(&self) -> &SharedBytes {
		&self.inner.data
	}

	/// The shared-key table this document was encoded with, if any.
	pub fn shared_keys(&self) -> Option<&SharedKeys> {
		self.inner.keys.as_ref()
	}

	pub(crate) fn region(&self) -> &[u8] {
		let bytes = self.inner.data.as_slice();
		&bytes[..bytes.len() - 4]
	}

	/// Borrowed view of the root value.
	pub fn root(&self) -> Value<'_> {
		Value::at(self.region(), self.inner.root as usize)
	}

	/// Owned handle to the root value.
	pub fn root_node(&self) -> Node {
		Node {
			doc: self.clone(),
			offset: self.inner.root,
		}
	}

	/// Number of live handles to this document.
	pub fn ref_count(&self) -> usize {
		Arc::strong_count(&self.inner)
	}
}

impl std::fmt::Debug for Doc {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Doc")
			.field("len", &self.inner.data.len())
			.field("root", &self.inner.root)
			.finish()
	}
}

/// Owned handle to one value node: the document plus the node's offset.
///
/// Cloning retains the document, so a node can outlive the borrow it was
/// created from and be resolved again later.
#[derive(Debug, Clone)]
pub struct Node {
	doc: Doc,
	offset: u32,
}

impl Node {
	/// Pin `value` (borrowed from `doc`) into an owned handle.
	pub fn new(doc: &Doc, value: Value<'_>) -> Node {
		debug_assert!(std::ptr::eq(doc.region().as_ptr(), value.region().as_ptr()), "value must come from doc");
		Node {
			doc: doc.clone(),
			offset: value.offset() as u32,
		}
	}

	/// The owning document.
	pub fn doc(&self) -> &Doc {
		&self.doc
	}

	/// Offset of the node inside the document's value region.
	pub fn offset(&self) -> u32 {
		self.offset
	}

	/// Resolve the handle back into a borrowed view.
	pub fn value(&self) -> Value<'_> {
		Value::at(self.doc.region(), self.offset as usize)
	}
}

#[cfg(test)]
mod tests;
