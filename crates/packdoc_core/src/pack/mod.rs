mod bytes;
mod doc;
mod encoder;
mod error;
mod shared_keys;
mod validate;
mod value;

/// Document container, owned node handles, and trust levels.
pub use doc::{Doc, Node, SharedBytes, Trust};
/// Pack buffer encoder.
pub use encoder::Encoder;
/// Error and result aliases.
pub use error::{PackError, Result};
/// Shared dictionary-key table.
pub use shared_keys::SharedKeys;
/// Untrusted-buffer validation entry point and nesting limit.
pub use validate::{MAX_NESTING, validate_buffer};
/// Zero-copy value views and entry iterators.
pub use value::{Array, Dict, Elements, Entries, KeyRef, Value, ValueType};
