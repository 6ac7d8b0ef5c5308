use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors produced while reading, validating, and encoding pack buffers.
#[derive(Debug, Error)]
pub enum PackError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Buffer is shorter than the smallest possible document.
	#[error("buffer too small for a document: {len} bytes")]
	BufferTooSmall {
		/// Total buffer length.
		len: usize,
	},
	/// Trailing root offset points outside the value region.
	#[error("root offset {root} out of range (value region is {max} bytes)")]
	RootOutOfRange {
		/// Stored root offset.
		root: u32,
		/// Value region length.
		max: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Unknown value tag byte.
	#[error("invalid value tag 0x{tag:02x} at offset {at}")]
	BadTag {
		/// Offending tag byte.
		tag: u8,
		/// Offset of the tag.
		at: usize,
	},
	/// Malformed length varint.
	#[error("invalid varint at offset {at}")]
	BadVarint {
		/// Offset of the varint.
		at: usize,
	},
	/// String payload is not valid UTF-8.
	#[error("invalid utf-8 in string at offset {at}")]
	BadUtf8 {
		/// Offset of the string value.
		at: usize,
	},
	/// Collection references a child at or after its own offset.
	#[error("child offset {child} not before parent at offset {parent}")]
	ChildOffsetOutOfOrder {
		/// Offset of the parent collection.
		parent: usize,
		/// Offending child offset.
		child: u32,
	},
	/// Collection entry table extends past the value region.
	#[error("entry table at offset {at} with {count} entries exceeds remaining {rem} bytes")]
	EntryTableOutOfRange {
		/// Offset of the collection value.
		at: usize,
		/// Declared entry count.
		count: u32,
		/// Bytes available for the table.
		rem: usize,
	},
	/// Value nesting exceeded the fixed depth limit.
	#[error("value nesting exceeded depth limit {max}")]
	DepthExceeded {
		/// Depth ceiling.
		max: u32,
	},
	/// Dictionary key reference does not point at a string value.
	#[error("dict key at offset {at} is not a string")]
	KeyNotString {
		/// Offset of the referenced key value.
		at: usize,
	},
	/// Shared key id has no entry in the supplied table.
	#[error("shared key id {id} not present in the table")]
	UnknownSharedKey {
		/// Unresolvable shared key id.
		id: u32,
	},
	/// Key written while no dictionary is open.
	#[error("key written outside an open dict")]
	EncodeKeyOutsideDict,
	/// Key written while the previous key still awaits its value.
	#[error("key written while previous key awaits a value")]
	EncodeKeyPending,
	/// Value written inside a dictionary without a preceding key.
	#[error("value written inside a dict without a key")]
	EncodeValueWithoutKey,
	/// `end_array`/`end_dict` does not match the innermost open collection.
	#[error("end call does not match the open collection")]
	EncodeEndMismatch,
	/// Dictionary ended while a key still awaits its value.
	#[error("dict ended with a key awaiting a value")]
	EncodeDanglingKey,
	/// `finish` called with collections still open.
	#[error("finish with {open} unclosed collections")]
	EncodeUnclosedCollection {
		/// Number of collections still open.
		open: usize,
	},
	/// `finish` called before any root value was written.
	#[error("finish without a root value")]
	EncodeMissingRoot,
	/// A second top-level value was written.
	#[error("more than one root value written")]
	EncodeMultipleRoots,
	/// Encoded output grew past the addressable offset limit.
	#[error("encoded buffer exceeds the offset limit at {len} bytes")]
	EncodeTooLarge {
		/// Output length when the limit was hit.
		len: usize,
	},
}
