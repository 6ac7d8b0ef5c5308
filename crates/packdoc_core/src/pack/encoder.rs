use crate::pack::bytes::push_varint;
use crate::pack::value::{
	KeyRef, SHARED_KEY_BIT, TAG_ARRAY, TAG_BLOB, TAG_DICT, TAG_DOUBLE, TAG_FALSE, TAG_INT, TAG_NULL, TAG_STRING,
	TAG_TRUE,
};
use crate::pack::{MAX_NESTING, PackError, Result, SharedBytes, SharedKeys, Value, ValueType};

/// Largest offset a value may start at; keeps every offset representable in
/// a key reference with the shared-id bit free.
const MAX_OFFSET: usize = (SHARED_KEY_BIT - 1) as usize;

enum Frame {
	Array { items: Vec<u32> },
	Dict { entries: Vec<(u32, u32)>, pending: Option<u32> },
}

/// Builds an encoded pack buffer bottom-up: leaf values are written as they
/// are fed in, collections close over the offsets of their children, and
/// `finish` seals the buffer with the root offset.
///
/// Exactly one root value must be written. Inside an open dict, every value
/// must be preceded by `write_key`.
pub struct Encoder {
	out: Vec<u8>,
	stack: Vec<Frame>,
	keys: Option<SharedKeys>,
	root: Option<u32>,
}

impl Encoder {
	/// Create an encoder that stores every dict key inline.
	pub fn new() -> Self {
		Self {
			out: Vec::new(),
			stack: Vec::new(),
			keys: None,
			root: None,
		}
	}

	/// Create an encoder that assigns ids from `keys` to eligible dict keys.
	pub fn with_shared_keys(keys: SharedKeys) -> Self {
		Self {
			keys: Some(keys),
			..Self::new()
		}
	}

	/// The shared-key table this encoder writes against, if any.
	pub fn shared_keys(&self) -> Option<&SharedKeys> {
		self.keys.as_ref()
	}

	/// Write a null value.
	pub fn write_null(&mut self) -> Result<()> {
		let offset = self.emit(&[TAG_NULL])?;
		self.place(offset)
	}

	/// Write a boolean value.
	pub fn write_bool(&mut self, value: bool) -> Result<()> {
		let tag = if value { TAG_TRUE } else { TAG_FALSE };
		let offset = self.emit(&[tag])?;
		self.place(offset)
	}

	/// Write an integer value.
	pub fn write_int(&mut self, value: i64) -> Result<()> {
		let offset = self.emit(&[TAG_INT])?;
		self.out.extend_from_slice(&value.to_le_bytes());
		self.place(offset)
	}

	/// Write a floating-point value.
	pub fn write_double(&mut self, value: f64) -> Result<()> {
		let offset = self.emit(&[TAG_DOUBLE])?;
		self.out.extend_from_slice(&value.to_le_bytes());
		self.place(offset)
	}

	/// Write a string value.
	pub fn write_str(&mut self, value: &str) -> Result<()> {
		let offset = self.emit_string(value)?;
		self.place(offset)
	}

	/// Write a blob value.
	pub fn write_blob(&mut self, value: &[u8]) -> Result<()> {
		if value.len() > MAX_OFFSET {
			return Err(PackError::EncodeTooLarge { len: value.len() });
		}
		let offset = self.emit(&[TAG_BLOB])?;
		push_varint(&mut self.out, value.len() as u32);
		self.out.extend_from_slice(value);
		self.place(offset)
	}

	/// Open an array; elements written next belong to it until `end_array`.
	pub fn begin_array(&mut self) -> Result<()> {
		self.stack.push(Frame::Array { items: Vec::new() });
		Ok(())
	}

	/// Close the innermost array and place it as a value.
	pub fn end_array(&mut self) -> Result<()> {
		match self.stack.pop() {
			Some(Frame::Array { items }) => {
				let offset = self.emit(&[TAG_ARRAY])?;
				push_varint(&mut self.out, items.len() as u32);
				for item in items {
					self.out.extend_from_slice(&item.to_le_bytes());
				}
				self.place(offset)
			}
			other => {
				if let Some(frame) = other {
					self.stack.push(frame);
				}
				Err(PackError::EncodeEndMismatch)
			}
		}
	}

	/// Open a dict; keys and values written next belong to it until
	/// `end_dict`.
	pub fn begin_dict(&mut self) -> Result<()> {
		self.stack.push(Frame::Dict {
			entries: Vec::new(),
			pending: None,
		});
		Ok(())
	}

	/// Close the innermost dict and place it as a value.
	pub fn end_dict(&mut self) -> Result<()> {
		match self.stack.pop() {
			Some(Frame::Dict { pending: Some(_), .. }) => Err(PackError::EncodeDanglingKey),
			Some(Frame::Dict { entries, .. }) => {
				let offset = self.emit(&[TAG_DICT])?;
				push_varint(&mut self.out, entries.len() as u32);
				for (key_ref, value) in entries {
					self.out.extend_from_slice(&key_ref.to_le_bytes());
					self.out.extend_from_slice(&value.to_le_bytes());
				}
				self.place(offset)
			}
			other => {
				if let Some(frame) = other {
					self.stack.push(frame);
				}
				Err(PackError::EncodeEndMismatch)
			}
		}
	}

	/// Write the key for the next value of the open dict.
	///
	/// Eligible keys go through the shared-key table when one is attached;
	/// everything else is stored inline as a string value.
	pub fn write_key(&mut self, key: &str) -> Result<()> {
		match self.stack.last() {
			Some(Frame::Dict { pending: None, .. }) => {}
			Some(Frame::Dict { .. }) => return Err(PackError::EncodeKeyPending),
			_ => return Err(PackError::EncodeKeyOutsideDict),
		}

		let key_ref = match self.keys.as_ref().and_then(|table| table.encode(key)) {
			Some(id) => id | SHARED_KEY_BIT,
			None => self.emit_string(key)?,
		};

		let Some(Frame::Dict { pending, .. }) = self.stack.last_mut() else {
			return Err(PackError::EncodeKeyOutsideDict);
		};
		*pending = Some(key_ref);
		Ok(())
	}

	/// Deep-copy an already decoded value into this encoder.
	///
	/// `keys` is the table of the value's source document, used to resolve
	/// shared dict keys before they are re-encoded against this encoder's
	/// own table.
	pub fn write_value(&mut self, value: Value<'_>, keys: Option<&SharedKeys>) -> Result<()> {
		self.write_value_at_depth(value, keys, 0)
	}

	fn write_value_at_depth(&mut self, value: Value<'_>, keys: Option<&SharedKeys>, depth: u32) -> Result<()> {
		if depth >= MAX_NESTING {
			return Err(PackError::DepthExceeded { max: MAX_NESTING });
		}

		match value.type_of() {
			ValueType::Null => self.write_null(),
			ValueType::Bool => self.write_bool(value.as_bool()),
			ValueType::Number => {
				if value.is_integer() {
					self.write_int(value.as_int())
				} else {
					self.write_double(value.as_double())
				}
			}
			ValueType::String => self.write_str(value.as_str().unwrap_or_default()),
			ValueType::Blob => self.write_blob(value.blob_bytes().unwrap_or_default()),
			ValueType::Array => {
				self.begin_array()?;
				if let Some(array) = value.as_array() {
					for element in array.iter() {
						self.write_value_at_depth(element, keys, depth + 1)?;
					}
				}
				self.end_array()
			}
			ValueType::Dict => {
				self.begin_dict()?;
				if let Some(dict) = value.as_dict() {
					for (key, entry_value) in dict.iter() {
						match key {
							KeyRef::Inline(inline) => self.write_key(inline.as_str().unwrap_or_default())?,
							KeyRef::Shared(id) => {
								let Some(text) = keys.and_then(|table| table.resolve(id)) else {
									return Err(PackError::UnknownSharedKey { id });
								};
								self.write_key(&text)?;
							}
						}
						self.write_value_at_depth(entry_value, keys, depth + 1)?;
					}
				}
				self.end_dict()
			}
		}
	}

	/// Seal the buffer: append the root offset and hand back the bytes.
	pub fn finish(self) -> Result<SharedBytes> {
		if !self.stack.is_empty() {
			return Err(PackError::EncodeUnclosedCollection { open: self.stack.len() });
		}
		let Some(root) = self.root else {
			return Err(PackError::EncodeMissingRoot);
		};
		let mut out = self.out;
		out.extend_from_slice(&root.to_le_bytes());
		Ok(SharedBytes::from_vec(out))
	}

	fn emit(&mut self, head: &[u8]) -> Result<u32> {
		let offset = self.out.len();
		if offset > MAX_OFFSET {
			return Err(PackError::EncodeTooLarge { len: offset });
		}
		self.out.extend_from_slice(head);
		Ok(offset as u32)
	}

	fn emit_string(&mut self, value: &str) -> Result<u32> {
		if value.len() > MAX_OFFSET {
			return Err(PackError::EncodeTooLarge { len: value.len() });
		}
		let offset = self.emit(&[TAG_STRING])?;
		push_varint(&mut self.out, value.len() as u32);
		self.out.extend_from_slice(value.as_bytes());
		Ok(offset)
	}

	fn place(&mut self, offset: u32) -> Result<()> {
		match self.stack.last_mut() {
			Some(Frame::Array { items }) => {
				items.push(offset);
				Ok(())
			}
			Some(Frame::Dict { entries, pending }) => {
				let Some(key_ref) = pending.take() else {
					return Err(PackError::EncodeValueWithoutKey);
				};
				entries.push((key_ref, offset));
				Ok(())
			}
			None => {
				if self.root.is_some() {
					return Err(PackError::EncodeMultipleRoots);
				}
				self.root = Some(offset);
				Ok(())
			}
		}
	}
}

impl Default for Encoder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests;
