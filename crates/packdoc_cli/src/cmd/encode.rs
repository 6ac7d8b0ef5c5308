use std::fs;
use std::path::PathBuf;

use packdoc::pack::{Encoder, Result};
use serde_json::Value as JsonValue;

/// Build a pack file from a JSON document.
///
/// Blobs are not representable in JSON input; every other value type maps
/// directly. Dict keys are stored inline because a standalone file carries
/// no shared-key table.
pub fn run(input: PathBuf, output: PathBuf) -> Result<()> {
	let text = fs::read_to_string(&input)?;
	let parsed: JsonValue = serde_json::from_str(&text)
		.map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;

	let mut encoder = Encoder::new();
	write_json(&mut encoder, &parsed)?;
	let data = encoder.finish()?;
	fs::write(&output, data.as_slice())?;

	println!("input: {}", input.display());
	println!("output: {}", output.display());
	println!("bytes: {}", data.len());
	Ok(())
}

fn write_json(encoder: &mut Encoder, value: &JsonValue) -> Result<()> {
	match value {
		JsonValue::Null => encoder.write_null(),
		JsonValue::Bool(v) => encoder.write_bool(*v),
		JsonValue::Number(v) => {
			if let Some(int) = v.as_i64() {
				encoder.write_int(int)
			} else {
				encoder.write_double(v.as_f64().unwrap_or(0.0))
			}
		}
		JsonValue::String(v) => encoder.write_str(v),
		JsonValue::Array(items) => {
			encoder.begin_array()?;
			for item in items {
				write_json(encoder, item)?;
			}
			encoder.end_array()
		}
		JsonValue::Object(entries) => {
			encoder.begin_dict()?;
			for (key, item) in entries {
				encoder.write_key(key)?;
				write_json(encoder, item)?;
			}
			encoder.end_dict()
		}
	}
}
