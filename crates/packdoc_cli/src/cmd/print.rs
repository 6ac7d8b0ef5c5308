use std::path::PathBuf;

use packdoc::pack::{Doc, KeyRef, Result, SharedKeys, Trust, Value, ValueType};
use serde_json::{Map, Number, Value as JsonValue};

/// Decode a pack file (untrusted) and print it as pretty JSON.
pub fn run(path: PathBuf) -> Result<()> {
	let doc = Doc::open(&path, Trust::Untrusted)?;
	let rendered = render(doc.root(), doc.shared_keys());
	println!("{}", serde_json::to_string_pretty(&rendered).unwrap_or_default());
	Ok(())
}

/// Render a value tree as JSON.
///
/// Blobs have no JSON form and render as `bytes[N]` placeholders; shared
/// keys that cannot be resolved render as `#<id>`.
pub fn render(value: Value<'_>, keys: Option<&SharedKeys>) -> JsonValue {
	match value.type_of() {
		ValueType::Null => JsonValue::Null,
		ValueType::Bool => JsonValue::Bool(value.as_bool()),
		ValueType::Number => {
			if value.is_integer() {
				JsonValue::Number(Number::from(value.as_int()))
			} else {
				render_double(value.as_double())
			}
		}
		ValueType::String => JsonValue::String(value.as_str().unwrap_or_default().to_owned()),
		ValueType::Blob => JsonValue::String(format!("bytes[{}]", value.blob_bytes().map_or(0, <[u8]>::len))),
		ValueType::Array => {
			let items = value.as_array().map_or_else(Vec::new, |array| {
				array.iter().map(|element| render(element, keys)).collect()
			});
			JsonValue::Array(items)
		}
		ValueType::Dict => {
			let mut out = Map::new();
			if let Some(dict) = value.as_dict() {
				for (key, entry_value) in dict.iter() {
					let text = match key {
						KeyRef::Inline(inline) => inline.as_str().unwrap_or_default().to_owned(),
						KeyRef::Shared(id) => match keys.and_then(|table| table.resolve(id)) {
							Some(resolved) => resolved.to_string(),
							None => format!("#{id}"),
						},
					};
					out.insert(text, render(entry_value, keys));
				}
			}
			JsonValue::Object(out)
		}
	}
}

fn render_double(value: f64) -> JsonValue {
	match Number::from_f64(value) {
		Some(number) => JsonValue::Number(number),
		None => JsonValue::String(format!("{value}")),
	}
}
