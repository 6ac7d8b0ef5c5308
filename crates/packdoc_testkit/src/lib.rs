//! Shared test helpers for workspace crates.

use std::path::PathBuf;

use packdoc::pack::{Doc, Encoder, SharedBytes, SharedKeys, Trust};
use serde_json::Value as Json;

/// Encode a JSON literal into a pack buffer.
///
/// Panics on malformed fixtures; tests declare their inputs inline. Object
/// keys follow `serde_json`'s map order (sorted), so fixtures that assert on
/// entry order should build buffers through the encoder directly.
pub fn encode_json(json: &str, keys: Option<&SharedKeys>) -> SharedBytes {
	let parsed: Json = serde_json::from_str(json).expect("fixture JSON parses");
	let mut encoder = match keys {
		Some(keys) => Encoder::with_shared_keys(keys.clone()),
		None => Encoder::new(),
	};
	write_json(&mut encoder, &parsed);
	encoder.finish().expect("fixture encodes")
}

/// Decode a JSON literal into an untrusted-validated document.
pub fn doc_from_json(json: &str) -> Doc {
	Doc::from_bytes(encode_json(json, None), Trust::Untrusted, None).expect("fixture decodes")
}

/// Decode a JSON literal into a document sharing `keys`.
pub fn doc_with_keys(json: &str, keys: &SharedKeys) -> Doc {
	Doc::from_bytes(encode_json(json, Some(keys)), Trust::Untrusted, Some(keys.clone())).expect("fixture decodes")
}

/// A nested fixture exercising every value type except blobs.
pub fn sample_catalog_json() -> &'static str {
	r#"{
		"id": 7041,
		"name": "field kit",
		"price": 129.5,
		"in_stock": true,
		"replaced_by": null,
		"tags": ["outdoor", "sale"],
		"dimensions": {"width": 40, "height": 12.5}
	}"#
}

/// Resolve a scratch file path under the system temp directory.
pub fn scratch_path(name: &str) -> PathBuf {
	std::env::temp_dir().join(format!("packdoc_{}_{name}", std::process::id()))
}

fn write_json(encoder: &mut Encoder, value: &Json) {
	match value {
		Json::Null => encoder.write_null().expect("null writes"),
		Json::Bool(v) => encoder.write_bool(*v).expect("bool writes"),
		Json::Number(v) => {
			if let Some(int) = v.as_i64() {
				encoder.write_int(int).expect("int writes");
			} else {
				encoder.write_double(v.as_f64().unwrap_or(0.0)).expect("double writes");
			}
		}
		Json::String(v) => encoder.write_str(v).expect("string writes"),
		Json::Array(items) => {
			encoder.begin_array().expect("array opens");
			for item in items {
				write_json(encoder, item);
			}
			encoder.end_array().expect("array closes");
		}
		Json::Object(entries) => {
			encoder.begin_dict().expect("dict opens");
			for (key, item) in entries {
				encoder.write_key(key).expect("key writes");
				write_json(encoder, item);
			}
			encoder.end_dict().expect("dict closes");
		}
	}
}
