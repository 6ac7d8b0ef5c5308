use std::fs;

use crate::pack::{Doc, Encoder, Node, PackError, SharedBytes, Trust};

fn sample_buffer() -> SharedBytes {
	let mut encoder = Encoder::new();
	encoder.begin_array().expect("array opens");
	encoder.write_int(5).expect("element writes");
	encoder.write_str("five").expect("element writes");
	encoder.end_array().expect("array closes");
	encoder.finish().expect("encoder finishes")
}

#[test]
fn from_bytes_shares_the_buffer() {
	let data = sample_buffer();
	assert_eq!(data.ref_count(), 1);
	let doc = Doc::from_bytes(data.clone(), Trust::Untrusted, None).expect("doc decodes");
	assert_eq!(data.ref_count(), 2, "doc retains the buffer without copying");
	assert_eq!(doc.root().collection_len(), 2);
	drop(doc);
	assert_eq!(data.ref_count(), 1);
}

#[test]
fn node_keeps_the_document_alive() {
	let doc = Doc::from_bytes(sample_buffer(), Trust::Trusted, None).expect("doc decodes");
	let node = doc.root_node();
	assert_eq!(doc.ref_count(), 2);

	let element = node.value().as_array().and_then(|array| array.get(1)).expect("element exists");
	let pinned = Node::new(&doc, element);
	drop(node);
	assert_eq!(doc.ref_count(), 2, "pinned element still retains");
	assert_eq!(pinned.value().as_str(), Some("five"));
	drop(pinned);
	assert_eq!(doc.ref_count(), 1);
}

#[test]
fn trusted_mode_still_checks_the_root_frame() {
	assert!(matches!(
		Doc::from_bytes(SharedBytes::from_vec(vec![0_u8; 3]), Trust::Trusted, None),
		Err(PackError::BufferTooSmall { len: 3 })
	));

	let mut bytes = vec![0x00];
	bytes.extend_from_slice(&9_u32.to_le_bytes());
	assert!(matches!(
		Doc::from_bytes(SharedBytes::from_vec(bytes), Trust::Trusted, None),
		Err(PackError::RootOutOfRange { root: 9, .. })
	));
}

#[test]
fn open_reads_a_document_file() {
	let path = std::env::temp_dir().join("packdoc_core_open_test.pack");
	fs::write(&path, sample_buffer().as_slice()).expect("fixture file writes");

	let doc = Doc::open(&path, Trust::Untrusted).expect("file decodes");
	assert_eq!(doc.root().collection_len(), 2);

	fs::remove_file(&path).ok();
}
