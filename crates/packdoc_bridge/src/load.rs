use std::sync::Arc;

use packdoc::pack::{Doc, Node, SharedBytes, SharedKeys, Trust, Value, ValueType};

/// Zero-copy view location inside a document buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	/// Byte offset of the payload.
	pub offset: u32,
	/// Payload length in bytes.
	pub len: u32,
}

/// Flattened value descriptor: everything a host needs to know about one
/// decoded node, filled in a single call.
///
/// The descriptor is caller-owned and overwritten in place by loaders and
/// iterators; no history of prior fills is retained. String and blob spans
/// resolve against `node`, which retains the owning document, so a view read
/// through a live descriptor cannot dangle.
#[derive(Debug, Clone, Default)]
pub struct LoadedValue {
	/// Whether the requested node was found and valid. When false, every
	/// other field is cleared.
	pub exists: bool,
	/// Logical type of the node.
	pub tag: Option<ValueType>,
	/// Whether a number is stored in integer representation.
	pub is_integer: bool,
	/// Element or entry count for collections.
	pub collection_size: u32,
	/// Boolean interpretation.
	pub bool_value: bool,
	/// Integer interpretation.
	pub int_value: i64,
	/// Floating-point interpretation.
	pub double_value: f64,
	/// String payload location, for string nodes.
	pub string: Option<Span>,
	/// Blob payload location, for blob nodes.
	pub blob: Option<Span>,
	/// Back-reference to the source node for follow-up calls.
	pub node: Option<Node>,
}

impl LoadedValue {
	/// Create an empty descriptor slot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reset every field to its not-found state.
	pub fn clear(&mut self) {
		*self = Self::default();
	}

	/// Resolve the string span against the retained document.
	pub fn string_bytes(&self) -> Option<&[u8]> {
		resolve_span(self.node.as_ref(), self.string)
	}

	/// Resolve the string span as UTF-8 text.
	pub fn string_str(&self) -> Option<&str> {
		std::str::from_utf8(self.string_bytes()?).ok()
	}

	/// Resolve the blob span against the retained document.
	pub fn blob_bytes(&self) -> Option<&[u8]> {
		resolve_span(self.node.as_ref(), self.blob)
	}
}

/// Flattened dictionary key descriptor.
///
/// For shared keys the string payload is surfaced only on the first
/// sighting per [`crate::KeyCache`]; afterwards `is_known_shared` is set and
/// the host is expected to reuse the text it cached under `shared_id`.
#[derive(Debug, Clone, Default)]
pub struct LoadedKey {
	/// Whether this shared key had already been surfaced to the host.
	pub is_known_shared: bool,
	/// Shared-key id, or -1 when the key is stored inline.
	pub shared_id: i32,
	/// Inline key payload location, for inline keys.
	pub string: Option<Span>,
	/// Key text from the shared table, set on first sighting only.
	pub shared_text: Option<Arc<str>>,
	/// The key's own value node, for inline keys.
	pub node: Option<Node>,
}

impl LoadedKey {
	/// Create an empty key slot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reset every field to its initial state.
	pub fn clear(&mut self) {
		*self = Self::default();
	}

	/// Key text bytes, from the inline payload or the shared table.
	pub fn key_bytes(&self) -> Option<&[u8]> {
		if let Some(text) = &self.shared_text {
			return Some(text.as_bytes());
		}
		resolve_span(self.node.as_ref(), self.string)
	}

	/// Key text, when available on this sighting.
	pub fn key_str(&self) -> Option<&str> {
		std::str::from_utf8(self.key_bytes()?).ok()
	}
}

fn resolve_span<'a>(node: Option<&'a Node>, span: Option<Span>) -> Option<&'a [u8]> {
	let span = span?;
	let bytes = node?.doc().data().as_slice();
	bytes.get(span.offset as usize..span.offset as usize + span.len as usize)
}

pub(crate) fn span_of(value: Value<'_>) -> Option<Span> {
	let (start, len) = value.payload_range()?;
	Some(Span {
		offset: u32::try_from(start).ok()?,
		len: u32::try_from(len).ok()?,
	})
}

/// Fill `out` from `value`, which must belong to `doc`. `eager_sizes`
/// controls whether collection counts are read now or left for a later
/// [`load_value`] on the back-reference.
pub(crate) fn fill(doc: &Doc, value: Value<'_>, eager_sizes: bool, out: &mut LoadedValue) {
	out.clear();
	out.exists = true;
	let tag = value.type_of();
	out.tag = Some(tag);

	match tag {
		ValueType::Null => {}
		ValueType::Bool => {
			let truthy = value.as_bool();
			out.bool_value = truthy;
			out.int_value = i64::from(truthy);
			out.double_value = if truthy { 1.0 } else { 0.0 };
		}
		ValueType::Number => {
			out.is_integer = value.is_integer();
			out.int_value = value.as_int();
			out.double_value = value.as_double();
			out.bool_value = value.as_bool();
		}
		ValueType::String => out.string = span_of(value),
		ValueType::Blob => out.blob = span_of(value),
		ValueType::Array | ValueType::Dict => {
			if eager_sizes {
				out.collection_size = value.collection_len();
			}
		}
	}

	out.node = Some(Node::new(doc, value));
}

/// Flatten a node into `out` in one call.
pub fn load_value(node: &Node, out: &mut LoadedValue) {
	fill(node.doc(), node.value(), true, out);
}

/// Decode `data` per `trust` and flatten its root into `out`.
///
/// Malformed untrusted input is not an error here: the descriptor simply
/// reports `exists = false`.
pub fn load_from_bytes(data: &SharedBytes, trust: Trust, keys: Option<&SharedKeys>, out: &mut LoadedValue) {
	match Doc::from_bytes(data.clone(), trust, keys.cloned()) {
		Ok(doc) => {
			let root = doc.root();
			fill(&doc, root, true, out);
		}
		Err(_) => out.clear(),
	}
}

/// Flatten `array[index]` into `out`; a missing index clears the slot.
pub fn load_array_element(array: &Node, index: u32, out: &mut LoadedValue) {
	match array.value().as_array().and_then(|value| value.get(index)) {
		Some(element) => fill(array.doc(), element, true, out),
		None => out.clear(),
	}
}

/// Flatten the value under `key` into `out`; a missing key clears the slot.
///
/// Shared-key dictionaries resolve `key` through the document's own table.
pub fn load_dict_value(dict: &Node, key: &str, out: &mut LoadedValue) {
	let doc = dict.doc();
	match dict.value().as_dict().and_then(|value| value.get(key, doc.shared_keys())) {
		Some(entry) => fill(doc, entry, true, out),
		None => out.clear(),
	}
}

#[cfg(test)]
mod tests;
