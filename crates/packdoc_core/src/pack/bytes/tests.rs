use crate::pack::bytes::{push_varint, u32_at, varint_at};

#[test]
fn varint_round_trips_boundary_values() {
	for value in [0_u32, 1, 127, 128, 16_383, 16_384, u32::MAX] {
		let mut out = Vec::new();
		push_varint(&mut out, value);
		let (decoded, used) = varint_at(&out, 0).expect("varint decodes");
		assert_eq!(decoded, value);
		assert_eq!(used, out.len());
	}
}

#[test]
fn varint_rejects_truncation_and_overflow() {
	assert_eq!(varint_at(&[0x80], 0), None, "unterminated varint");
	assert_eq!(varint_at(&[], 0), None, "empty buffer");
	assert_eq!(varint_at(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F], 0), None, "35-bit varint");
}

#[test]
fn u32_at_checks_bounds() {
	let buf = 0xAABB_CCDD_u32.to_le_bytes();
	assert_eq!(u32_at(&buf, 0), Some(0xAABB_CCDD));
	assert_eq!(u32_at(&buf, 1), None);
}
