use packdoc::pack::{Encoder, Node};

/// Deep-copy `array[index]` into `encoder`.
///
/// Shared dict keys inside the copied subtree are resolved through the
/// source document's table and re-encoded against the encoder's own. Returns
/// false when the index is out of range or the copy fails.
pub fn write_array_element(encoder: &mut Encoder, array: &Node, index: u32) -> bool {
	let Some(element) = array.value().as_array().and_then(|value| value.get(index)) else {
		return false;
	};
	encoder.write_value(element, array.doc().shared_keys()).is_ok()
}
