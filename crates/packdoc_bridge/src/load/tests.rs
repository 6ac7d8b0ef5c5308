use packdoc::pack::{SharedBytes, SharedKeys, Trust, ValueType};
use packdoc_testkit::{doc_from_json, encode_json, sample_catalog_json};

use crate::load::{LoadedValue, load_array_element, load_dict_value, load_from_bytes, load_value};

#[test]
fn flattens_every_field_in_one_call() {
	let doc = doc_from_json(sample_catalog_json());
	let root = doc.root_node();
	let mut out = LoadedValue::new();

	load_value(&root, &mut out);
	assert!(out.exists);
	assert_eq!(out.tag, Some(ValueType::Dict));
	assert_eq!(out.collection_size, 7);

	load_dict_value(&root, "id", &mut out);
	assert!(out.exists);
	assert_eq!(out.tag, Some(ValueType::Number));
	assert!(out.is_integer);
	assert_eq!(out.int_value, 7041);
	assert_eq!(out.double_value, 7041.0);
	assert!(out.bool_value);

	load_dict_value(&root, "price", &mut out);
	assert!(!out.is_integer);
	assert_eq!(out.double_value.to_bits(), 129.5_f64.to_bits());
	assert_eq!(out.int_value, 129, "double truncates into the int field");

	load_dict_value(&root, "name", &mut out);
	assert_eq!(out.tag, Some(ValueType::String));
	assert_eq!(out.string_str(), Some("field kit"));
	assert!(out.blob.is_none());

	load_dict_value(&root, "replaced_by", &mut out);
	assert!(out.exists, "an encoded null exists");
	assert_eq!(out.tag, Some(ValueType::Null));

	load_dict_value(&root, "tags", &mut out);
	assert_eq!(out.tag, Some(ValueType::Array));
	assert_eq!(out.collection_size, 2);
	let tags = out.node.clone().expect("back-reference set");
	load_array_element(&tags, 1, &mut out);
	assert_eq!(out.string_str(), Some("sale"));
}

#[test]
fn not_found_clears_the_whole_slot() {
	let doc = doc_from_json(r#"{"tags": ["a"], "n": 9}"#);
	let root = doc.root_node();
	let mut out = LoadedValue::new();

	// Leave residue from a hit, then miss.
	load_dict_value(&root, "n", &mut out);
	assert!(out.exists);
	load_dict_value(&root, "absent", &mut out);
	assert!(!out.exists);
	assert_eq!(out.tag, None);
	assert_eq!(out.int_value, 0);
	assert_eq!(out.double_value, 0.0);
	assert!(!out.bool_value);
	assert_eq!(out.collection_size, 0);
	assert!(out.string.is_none() && out.blob.is_none() && out.node.is_none());

	load_dict_value(&root, "n", &mut out);
	let tags = {
		load_dict_value(&root, "tags", &mut out);
		out.node.clone().expect("back-reference set")
	};
	load_array_element(&tags, 1, &mut out);
	assert!(!out.exists, "index past the end is a plain miss");
	assert!(out.node.is_none());

	// Addressing a scalar as a collection is a miss, not an error.
	load_dict_value(&root, "n", &mut out);
	let n = out.node.clone().expect("back-reference set");
	load_array_element(&n, 0, &mut out);
	assert!(!out.exists);
}

#[test]
fn from_bytes_honors_the_trust_level() {
	let data = encode_json(r#"[1, 2.5, "three"]"#, None);
	let mut out = LoadedValue::new();

	load_from_bytes(&data, Trust::Untrusted, None, &mut out);
	assert!(out.exists);
	assert_eq!(out.tag, Some(ValueType::Array));
	assert_eq!(out.collection_size, 3);

	load_from_bytes(&data, Trust::Trusted, None, &mut out);
	assert!(out.exists, "well-formed input loads under either trust level");

	let garbage = SharedBytes::from_vec(vec![0x2A, 9, 9, 9, 0, 0, 0, 0]);
	load_from_bytes(&garbage, Trust::Untrusted, None, &mut out);
	assert!(!out.exists, "validation failure is a cleared slot, not a panic");

	let short = SharedBytes::from_vec(vec![1, 2]);
	load_from_bytes(&short, Trust::Trusted, None, &mut out);
	assert!(!out.exists, "even trusted decoding checks the root frame");
}

#[test]
fn from_bytes_carries_the_shared_table() {
	let keys = SharedKeys::new();
	let data = encode_json(r#"{"name": "ada"}"#, Some(&keys));
	let mut out = LoadedValue::new();

	load_from_bytes(&data, Trust::Untrusted, Some(&keys), &mut out);
	let root = out.node.clone().expect("back-reference set");
	load_dict_value(&root, "name", &mut out);
	assert_eq!(out.string_str(), Some("ada"), "shared key resolves through the table");

	load_from_bytes(&data, Trust::Untrusted, None, &mut out);
	let root = out.node.clone().expect("back-reference set");
	load_dict_value(&root, "name", &mut out);
	assert!(!out.exists, "without the table the shared key cannot match");
}

#[test]
fn descriptor_views_stay_valid_while_the_slot_lives() {
	let mut out = LoadedValue::new();
	{
		let doc = doc_from_json(r#""borrowed text""#);
		load_value(&doc.root_node(), &mut out);
		assert_eq!(doc.ref_count(), 2, "slot's back-reference retains the doc");
	}
	// The original handle is gone; the descriptor still owns one.
	assert_eq!(out.string_str(), Some("borrowed text"));
	let doc = out.node.as_ref().expect("back-reference set").doc().clone();
	assert_eq!(doc.ref_count(), 2);
	out.clear();
	assert_eq!(doc.ref_count(), 1, "clearing the slot releases the retain");
}

#[test]
fn blobs_flatten_with_spans() {
	let mut encoder = packdoc::pack::Encoder::new();
	encoder.write_blob(&[0xDE, 0xAD, 0xBE, 0xEF]).expect("blob writes");
	let data = encoder.finish().expect("encoder finishes");

	let mut out = LoadedValue::new();
	load_from_bytes(&data, Trust::Untrusted, None, &mut out);
	assert_eq!(out.tag, Some(ValueType::Blob));
	assert_eq!(out.blob_bytes(), Some(&[0xDE_u8, 0xAD, 0xBE, 0xEF][..]));
	assert!(out.string.is_none());
}
