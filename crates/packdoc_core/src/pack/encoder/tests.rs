use crate::pack::{Doc, Encoder, KeyRef, PackError, SharedKeys, Trust, ValueType};

fn decode(encoder: Encoder) -> Doc {
	let keys = encoder.shared_keys().cloned();
	let data = encoder.finish().expect("encoder finishes");
	Doc::from_bytes(data, Trust::Untrusted, keys).expect("encoded buffer validates")
}

#[test]
fn encodes_scalar_roots() {
	let mut encoder = Encoder::new();
	encoder.write_int(-42).expect("int writes");
	let doc = decode(encoder);
	let root = doc.root();
	assert_eq!(root.type_of(), ValueType::Number);
	assert!(root.is_integer());
	assert_eq!(root.as_int(), -42);
	assert_eq!(root.as_double(), -42.0);
}

#[test]
fn doubles_round_trip_bit_exact() {
	for value in [0.0, -0.0, 1.5, f64::MIN_POSITIVE, f64::MAX, f64::NEG_INFINITY] {
		let mut encoder = Encoder::new();
		encoder.write_double(value).expect("double writes");
		let doc = decode(encoder);
		assert!(!doc.root().is_integer());
		assert_eq!(doc.root().as_double().to_bits(), value.to_bits());
	}
}

#[test]
fn encodes_nested_collections_in_insertion_order() {
	let mut encoder = Encoder::new();
	encoder.begin_dict().expect("dict opens");
	encoder.write_key("zulu").expect("key writes");
	encoder.write_int(1).expect("value writes");
	encoder.write_key("alpha").expect("key writes");
	encoder.begin_array().expect("array opens");
	encoder.write_str("x").expect("element writes");
	encoder.write_bool(true).expect("element writes");
	encoder.write_null().expect("element writes");
	encoder.end_array().expect("array closes");
	encoder.end_dict().expect("dict closes");

	let doc = decode(encoder);
	let dict = doc.root().as_dict().expect("root is dict");
	assert_eq!(dict.len(), 2);

	let entries: Vec<_> = dict.iter().collect();
	let (first_key, first_value) = &entries[0];
	let inline = match first_key {
		KeyRef::Inline(value) => value.as_str().expect("key is utf-8"),
		KeyRef::Shared(id) => panic!("unexpected shared key {id}"),
	};
	assert_eq!(inline, "zulu", "insertion order is preserved");
	assert_eq!(first_value.as_int(), 1);

	let nested = dict.get("alpha", None).expect("alpha resolves").as_array().expect("alpha is array");
	assert_eq!(nested.len(), 3);
	assert_eq!(nested.get(0).expect("index 0").as_str(), Some("x"));
	assert!(nested.get(1).expect("index 1").as_bool());
	assert_eq!(nested.get(2).expect("index 2").type_of(), ValueType::Null);
	assert!(nested.get(3).is_none());
}

#[test]
fn shared_table_keys_are_ids_and_long_keys_stay_inline() {
	let keys = SharedKeys::new();
	let mut encoder = Encoder::with_shared_keys(keys.clone());
	encoder.begin_dict().expect("dict opens");
	encoder.write_key("name").expect("key writes");
	encoder.write_str("ada").expect("value writes");
	encoder.write_key("a key with spaces").expect("key writes");
	encoder.write_int(7).expect("value writes");
	encoder.end_dict().expect("dict closes");

	let doc = decode(encoder);
	assert_eq!(keys.len(), 1, "only the eligible key got an id");

	let dict = doc.root().as_dict().expect("root is dict");
	let entries: Vec<_> = dict.iter().collect();
	assert!(
		matches!(entries[0].0, KeyRef::Shared(0)),
		"eligible key stored as id"
	);
	assert!(
		matches!(entries[1].0, KeyRef::Inline(_)),
		"ineligible key stored inline"
	);

	assert_eq!(dict.get("name", Some(&keys)).expect("shared key resolves").as_str(), Some("ada"));
	assert!(dict.get("name", None).is_none(), "shared key unresolvable without the table");
	assert_eq!(dict.get("a key with spaces", None).expect("inline key resolves").as_int(), 7);
}

#[test]
fn write_value_deep_copies_between_documents() {
	let keys = SharedKeys::new();
	let mut encoder = Encoder::with_shared_keys(keys.clone());
	encoder.begin_dict().expect("dict opens");
	encoder.write_key("tags").expect("key writes");
	encoder.begin_array().expect("array opens");
	encoder.write_str("red").expect("element writes");
	encoder.write_blob(&[1, 2, 3]).expect("element writes");
	encoder.end_array().expect("array closes");
	encoder.end_dict().expect("dict closes");
	let source = decode(encoder);

	let mut copy = Encoder::new();
	copy.write_value(source.root(), source.shared_keys()).expect("deep copy writes");
	let copied = decode(copy);

	let dict = copied.root().as_dict().expect("copy is dict");
	let tags = dict.get("tags", None).expect("shared key re-encoded inline").as_array().expect("tags is array");
	assert_eq!(tags.get(0).expect("index 0").as_str(), Some("red"));
	assert_eq!(tags.get(1).expect("index 1").blob_bytes(), Some(&[1_u8, 2, 3][..]));
}

#[test]
fn write_value_fails_without_source_table() {
	let keys = SharedKeys::new();
	let mut encoder = Encoder::with_shared_keys(keys);
	encoder.begin_dict().expect("dict opens");
	encoder.write_key("name").expect("key writes");
	encoder.write_int(1).expect("value writes");
	encoder.end_dict().expect("dict closes");
	let source = decode(encoder);

	let mut copy = Encoder::new();
	let err = copy.write_value(source.root(), None).expect_err("shared id cannot resolve");
	assert!(matches!(err, PackError::UnknownSharedKey { id: 0 }));
}

#[test]
fn rejects_misuse() {
	let mut encoder = Encoder::new();
	assert!(matches!(encoder.write_key("k"), Err(PackError::EncodeKeyOutsideDict)));
	assert!(matches!(encoder.end_array(), Err(PackError::EncodeEndMismatch)));

	encoder.begin_dict().expect("dict opens");
	assert!(matches!(encoder.write_int(1), Err(PackError::EncodeValueWithoutKey)));
	encoder.write_key("k").expect("key writes");
	assert!(matches!(encoder.write_key("again"), Err(PackError::EncodeKeyPending)));
	assert!(matches!(encoder.end_dict(), Err(PackError::EncodeDanglingKey)));

	let open = Encoder::new();
	assert!(matches!(open.finish(), Err(PackError::EncodeMissingRoot)));

	let mut unclosed = Encoder::new();
	unclosed.begin_array().expect("array opens");
	assert!(matches!(unclosed.finish(), Err(PackError::EncodeUnclosedCollection { open: 1 })));

	let mut doubled = Encoder::new();
	doubled.write_null().expect("first root");
	assert!(matches!(doubled.write_null(), Err(PackError::EncodeMultipleRoots)));
}
