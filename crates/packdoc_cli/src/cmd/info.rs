use std::path::PathBuf;

use packdoc::pack::{Doc, KeyRef, Result, Trust, Value, ValueType};

/// Per-type node counts and structural measures for one document.
#[derive(Debug, Default, serde::Serialize)]
pub struct DocStats {
	pub nulls: u32,
	pub bools: u32,
	pub integers: u32,
	pub doubles: u32,
	pub strings: u32,
	pub blobs: u32,
	pub arrays: u32,
	pub dicts: u32,
	pub shared_key_refs: u32,
	pub inline_key_refs: u32,
	pub max_depth: u32,
}

#[derive(serde::Serialize)]
struct InfoReport {
	path: String,
	bytes: usize,
	root_type: &'static str,
	root_size: u32,
	stats: DocStats,
}

/// Print file-level information; validation runs as part of opening.
pub fn run(path: PathBuf, json: bool) -> Result<()> {
	let doc = Doc::open(&path, Trust::Untrusted)?;
	let root = doc.root();
	let mut stats = DocStats::default();
	collect_stats(root, 1, &mut stats);

	let report = InfoReport {
		path: path.display().to_string(),
		bytes: doc.data().len(),
		root_type: type_label(root.type_of()),
		root_size: root.collection_len(),
		stats,
	};

	if json {
		println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
		return Ok(());
	}

	println!("path: {}", report.path);
	println!("bytes: {}", report.bytes);
	println!("valid: true");
	println!("root_type: {}", report.root_type);
	println!("root_size: {}", report.root_size);
	println!("max_depth: {}", report.stats.max_depth);
	println!("counts:");
	for (label, count) in [
		("null", report.stats.nulls),
		("bool", report.stats.bools),
		("int", report.stats.integers),
		("double", report.stats.doubles),
		("string", report.stats.strings),
		("blob", report.stats.blobs),
		("array", report.stats.arrays),
		("dict", report.stats.dicts),
	] {
		println!("  {label}: {count}");
	}
	println!("shared_key_refs: {}", report.stats.shared_key_refs);
	println!("inline_key_refs: {}", report.stats.inline_key_refs);

	Ok(())
}

fn collect_stats(value: Value<'_>, depth: u32, stats: &mut DocStats) {
	stats.max_depth = stats.max_depth.max(depth);
	match value.type_of() {
		ValueType::Null => stats.nulls += 1,
		ValueType::Bool => stats.bools += 1,
		ValueType::Number => {
			if value.is_integer() {
				stats.integers += 1;
			} else {
				stats.doubles += 1;
			}
		}
		ValueType::String => stats.strings += 1,
		ValueType::Blob => stats.blobs += 1,
		ValueType::Array => {
			stats.arrays += 1;
			if let Some(array) = value.as_array() {
				for element in array.iter() {
					collect_stats(element, depth + 1, stats);
				}
			}
		}
		ValueType::Dict => {
			stats.dicts += 1;
			if let Some(dict) = value.as_dict() {
				for (key, entry_value) in dict.iter() {
					match key {
						KeyRef::Shared(_) => stats.shared_key_refs += 1,
						KeyRef::Inline(_) => stats.inline_key_refs += 1,
					}
					collect_stats(entry_value, depth + 1, stats);
				}
			}
		}
	}
}

fn type_label(value_type: ValueType) -> &'static str {
	match value_type {
		ValueType::Null => "null",
		ValueType::Bool => "bool",
		ValueType::Number => "number",
		ValueType::String => "string",
		ValueType::Blob => "blob",
		ValueType::Array => "array",
		ValueType::Dict => "dict",
	}
}
