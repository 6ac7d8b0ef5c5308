use crate::pack::SharedKeys;
use crate::pack::bytes::{f64_at, i64_at, u32_at, varint_at};

pub(crate) const TAG_NULL: u8 = 0x00;
pub(crate) const TAG_FALSE: u8 = 0x01;
pub(crate) const TAG_TRUE: u8 = 0x02;
pub(crate) const TAG_INT: u8 = 0x03;
pub(crate) const TAG_DOUBLE: u8 = 0x04;
pub(crate) const TAG_STRING: u8 = 0x05;
pub(crate) const TAG_BLOB: u8 = 0x06;
pub(crate) const TAG_ARRAY: u8 = 0x07;
pub(crate) const TAG_DICT: u8 = 0x08;

/// High bit of a dict key reference marks a shared-key id.
pub(crate) const SHARED_KEY_BIT: u32 = 0x8000_0000;

/// Logical type of a decoded value.
///
/// Integer and floating-point storage both surface as `Number`; use
/// [`Value::is_integer`] to distinguish the representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
	/// Null value.
	Null,
	/// Boolean value.
	Bool,
	/// Integer or floating-point number.
	Number,
	/// UTF-8 string.
	String,
	/// Raw binary payload.
	Blob,
	/// Ordered element sequence.
	Array,
	/// Ordered key/value entry sequence.
	Dict,
}

/// Borrowed zero-copy view of one value inside an encoded region.
///
/// All accessors are total: a damaged or mistyped node reads as null rather
/// than panicking. Buffers decoded as untrusted have already been validated,
/// so the defensive paths are never taken for them.
#[derive(Debug, Clone, Copy)]
pub struct Value<'a> {
	buf: &'a [u8],
	offset: usize,
}

impl<'a> Value<'a> {
	pub(crate) fn at(buf: &'a [u8], offset: usize) -> Self {
		Self { buf, offset }
	}

	fn tag(&self) -> u8 {
		self.buf.get(self.offset).copied().unwrap_or(TAG_NULL)
	}

	/// Byte offset of this value inside its region.
	pub fn offset(&self) -> usize {
		self.offset
	}

	pub(crate) fn region(&self) -> &'a [u8] {
		self.buf
	}

	/// Logical type of this value.
	pub fn type_of(&self) -> ValueType {
		match self.tag() {
			TAG_FALSE | TAG_TRUE => ValueType::Bool,
			TAG_INT | TAG_DOUBLE => ValueType::Number,
			TAG_STRING => ValueType::String,
			TAG_BLOB => ValueType::Blob,
			TAG_ARRAY => ValueType::Array,
			TAG_DICT => ValueType::Dict,
			_ => ValueType::Null,
		}
	}

	/// Whether a number is stored in integer representation.
	pub fn is_integer(&self) -> bool {
		self.tag() == TAG_INT
	}

	/// Boolean interpretation: `true`, and non-zero numbers, are truthy.
	pub fn as_bool(&self) -> bool {
		match self.tag() {
			TAG_TRUE => true,
			TAG_INT => self.as_int() != 0,
			TAG_DOUBLE => self.as_double() != 0.0,
			_ => false,
		}
	}

	/// Integer interpretation; doubles truncate, booleans map to 0/1.
	pub fn as_int(&self) -> i64 {
		match self.tag() {
			TAG_INT => i64_at(self.buf, self.offset + 1).unwrap_or(0),
			TAG_DOUBLE => f64_at(self.buf, self.offset + 1).unwrap_or(0.0) as i64,
			TAG_TRUE => 1,
			_ => 0,
		}
	}

	/// Floating-point interpretation; integers widen, booleans map to 0/1.
	pub fn as_double(&self) -> f64 {
		match self.tag() {
			TAG_DOUBLE => f64_at(self.buf, self.offset + 1).unwrap_or(0.0),
			TAG_INT => i64_at(self.buf, self.offset + 1).unwrap_or(0) as f64,
			TAG_TRUE => 1.0,
			_ => 0.0,
		}
	}

	/// Offset and length of a string or blob payload within the region.
	pub fn payload_range(&self) -> Option<(usize, usize)> {
		if !matches!(self.tag(), TAG_STRING | TAG_BLOB) {
			return None;
		}
		let (len, used) = varint_at(self.buf, self.offset + 1)?;
		Some((self.offset + 1 + used, len as usize))
	}

	fn payload(&self) -> Option<&'a [u8]> {
		let (start, len) = self.payload_range()?;
		self.buf.get(start..start + len)
	}

	/// String payload bytes, when this value is a string.
	pub fn string_bytes(&self) -> Option<&'a [u8]> {
		if self.tag() == TAG_STRING { self.payload() } else { None }
	}

	/// String payload, when this value is a string with valid UTF-8.
	pub fn as_str(&self) -> Option<&'a str> {
		std::str::from_utf8(self.string_bytes()?).ok()
	}

	/// Blob payload bytes, when this value is a blob.
	pub fn blob_bytes(&self) -> Option<&'a [u8]> {
		if self.tag() == TAG_BLOB { self.payload() } else { None }
	}

	/// Array view, when this value is an array.
	pub fn as_array(&self) -> Option<Array<'a>> {
		if self.tag() != TAG_ARRAY {
			return None;
		}
		let (count, used) = varint_at(self.buf, self.offset + 1)?;
		Some(Array {
			buf: self.buf,
			count,
			table: self.offset + 1 + used,
		})
	}

	/// Dict view, when this value is a dict.
	pub fn as_dict(&self) -> Option<Dict<'a>> {
		if self.tag() != TAG_DICT {
			return None;
		}
		let (count, used) = varint_at(self.buf, self.offset + 1)?;
		Some(Dict {
			buf: self.buf,
			count,
			table: self.offset + 1 + used,
		})
	}

	/// Element or entry count for collections, zero otherwise.
	pub fn collection_len(&self) -> u32 {
		match self.tag() {
			TAG_ARRAY => self.as_array().map_or(0, |array| array.len()),
			TAG_DICT => self.as_dict().map_or(0, |dict| dict.len()),
			_ => 0,
		}
	}
}

/// Borrowed view of an array value's element table.
#[derive(Debug, Clone, Copy)]
pub struct Array<'a> {
	buf: &'a [u8],
	count: u32,
	table: usize,
}

impl<'a> Array<'a> {
	/// Element count.
	pub fn len(&self) -> u32 {
		self.count
	}

	/// Whether the array has no elements.
	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	/// Element at `index`, or `None` past the end.
	pub fn get(&self, index: u32) -> Option<Value<'a>> {
		if index >= self.count {
			return None;
		}
		let offset = u32_at(self.buf, self.table + index as usize * 4)?;
		Some(Value::at(self.buf, offset as usize))
	}

	/// Iterate elements in index order.
	pub fn iter(&self) -> Elements<'a> {
		Elements { array: *self, next: 0 }
	}
}

/// Iterator over array elements.
pub struct Elements<'a> {
	array: Array<'a>,
	next: u32,
}

impl<'a> Iterator for Elements<'a> {
	type Item = Value<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		let item = self.array.get(self.next)?;
		self.next += 1;
		Some(item)
	}
}

/// One dictionary key: a shared-table id or an inline string value.
#[derive(Debug, Clone, Copy)]
pub enum KeyRef<'a> {
	/// Id into the document's shared-key table.
	Shared(u32),
	/// Inline string value stored in the buffer.
	Inline(Value<'a>),
}

/// Borrowed view of a dict value's entry table.
///
/// Entries keep the order they were written in; lookup is a scan in that
/// order.
#[derive(Debug, Clone, Copy)]
pub struct Dict<'a> {
	buf: &'a [u8],
	count: u32,
	table: usize,
}

impl<'a> Dict<'a> {
	/// Entry count.
	pub fn len(&self) -> u32 {
		self.count
	}

	/// Whether the dict has no entries.
	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	/// Entry at `index` in storage order, or `None` past the end.
	pub fn entry(&self, index: u32) -> Option<(KeyRef<'a>, Value<'a>)> {
		if index >= self.count {
			return None;
		}
		let base = self.table + index as usize * 8;
		let key_ref = u32_at(self.buf, base)?;
		let value_offset = u32_at(self.buf, base + 4)?;
		let key = if key_ref & SHARED_KEY_BIT != 0 {
			KeyRef::Shared(key_ref & !SHARED_KEY_BIT)
		} else {
			KeyRef::Inline(Value::at(self.buf, key_ref as usize))
		};
		Some((key, Value::at(self.buf, value_offset as usize)))
	}

	/// Look up `key`, resolving shared ids through `keys` when supplied.
	pub fn get(&self, key: &str, keys: Option<&SharedKeys>) -> Option<Value<'a>> {
		for index in 0..self.count {
			let (entry_key, value) = self.entry(index)?;
			let matches = match entry_key {
				KeyRef::Inline(inline) => inline.as_str() == Some(key),
				KeyRef::Shared(id) => keys.and_then(|table| table.resolve(id)).is_some_and(|text| &*text == key),
			};
			if matches {
				return Some(value);
			}
		}
		None
	}

	/// Iterate entries in storage order.
	pub fn iter(&self) -> Entries<'a> {
		Entries { dict: *self, next: 0 }
	}
}

/// Iterator over dict entries.
pub struct Entries<'a> {
	dict: Dict<'a>,
	next: u32,
}

impl<'a> Iterator for Entries<'a> {
	type Item = (KeyRef<'a>, Value<'a>);

	fn next(&mut self) -> Option<Self::Item> {
		let item = self.dict.entry(self.next)?;
		self.next += 1;
		Some(item)
	}
}
