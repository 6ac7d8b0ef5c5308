//! Host-side embedding layer over pack documents.
//!
//! Hosts that manage object lifetimes with their own collector read pack
//! data through this crate: a whole decoded node is flattened into one
//! fixed-layout descriptor per call, arrays and dictionaries are walked by
//! stateful iterators writing into caller-owned slots, shared dictionary
//! keys are materialized at most once per [`KeyCache`], and every
//! reference-counted format object can be tied to a host handle through the
//! [`Binder`] registry so the host's collection releases it exactly once.

mod array_iter;
mod binder;
mod cache;
mod dict_iter;
mod load;
mod write;

/// Array iteration state.
pub use array_iter::ArrayIter;
/// Handle registry and host-handle identity.
pub use binder::{Binder, HandleId};
/// Shared-key sighting cache.
pub use cache::KeyCache;
/// Dict iteration state.
pub use dict_iter::DictIter;
/// Flattened descriptors and the one-call loaders.
pub use load::{LoadedKey, LoadedValue, Span, load_array_element, load_dict_value, load_from_bytes, load_value};
/// Encoder pass-through write.
pub use write::write_array_element;
