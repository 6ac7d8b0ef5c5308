use crate::pack::bytes::{u32_at, varint_at};
use crate::pack::value::{
	SHARED_KEY_BIT, TAG_ARRAY, TAG_BLOB, TAG_DICT, TAG_DOUBLE, TAG_FALSE, TAG_INT, TAG_NULL, TAG_STRING, TAG_TRUE,
};
use crate::pack::{Doc, PackError, Result};

/// Depth limit for nested collections, applied while validating untrusted
/// buffers and while deep-copying values into an encoder.
pub const MAX_NESTING: u32 = 64;

/// Validate an untrusted buffer and return its root offset.
///
/// Checks the trailing root offset, every reachable tag, payload bounds,
/// string UTF-8, and the child-before-parent offset ordering the encoder
/// guarantees; the ordering rule also bounds recursion, with [`MAX_NESTING`]
/// as a hard cap.
pub fn validate_buffer(bytes: &[u8]) -> Result<u32> {
	if bytes.len() < Doc::MIN_SIZE {
		return Err(PackError::BufferTooSmall { len: bytes.len() });
	}
	let region_len = bytes.len() - 4;
	let Some(root) = u32_at(bytes, region_len) else {
		return Err(PackError::BufferTooSmall { len: bytes.len() });
	};
	if root as usize >= region_len {
		return Err(PackError::RootOutOfRange { root, max: region_len });
	}

	let region = &bytes[..region_len];
	let mut checked = vec![false; region_len];
	validate_value(region, root as usize, 0, &mut checked)?;
	Ok(root)
}

// `checked` memoizes offsets that already validated; values are context-free,
// so a child shared by several collections is walked once instead of once per
// referencing entry.
fn validate_value(region: &[u8], offset: usize, depth: u32, checked: &mut Vec<bool>) -> Result<()> {
	if depth >= MAX_NESTING {
		return Err(PackError::DepthExceeded { max: MAX_NESTING });
	}
	if checked.get(offset).copied().unwrap_or(false) {
		return Ok(());
	}

	let Some(tag) = region.get(offset).copied() else {
		return Err(PackError::UnexpectedEof {
			at: offset,
			need: 1,
			rem: 0,
		});
	};

	match tag {
		TAG_NULL | TAG_FALSE | TAG_TRUE => {}
		TAG_INT | TAG_DOUBLE => check_extent(region, offset + 1, 8)?,
		TAG_STRING => {
			let (start, len) = payload_bounds(region, offset)?;
			check_extent(region, start, len)?;
			let payload = &region[start..start + len];
			if std::str::from_utf8(payload).is_err() {
				return Err(PackError::BadUtf8 { at: offset });
			}
		}
		TAG_BLOB => {
			let (start, len) = payload_bounds(region, offset)?;
			check_extent(region, start, len)?;
		}
		TAG_ARRAY => {
			let (table, count) = table_bounds(region, offset, 4)?;
			for index in 0..count as usize {
				let child = read_table_u32(region, table + index * 4)?;
				check_child(region, offset, child, depth, checked)?;
			}
		}
		TAG_DICT => {
			let (table, count) = table_bounds(region, offset, 8)?;
			for index in 0..count as usize {
				let base = table + index * 8;
				let key_ref = read_table_u32(region, base)?;
				if key_ref & SHARED_KEY_BIT == 0 {
					check_child(region, offset, key_ref, depth, checked)?;
					if region.get(key_ref as usize).copied() != Some(TAG_STRING) {
						return Err(PackError::KeyNotString { at: key_ref as usize });
					}
				}
				let value = read_table_u32(region, base + 4)?;
				check_child(region, offset, value, depth, checked)?;
			}
		}
		_ => return Err(PackError::BadTag { tag, at: offset }),
	}

	if let Some(flag) = checked.get_mut(offset) {
		*flag = true;
	}
	Ok(())
}

fn payload_bounds(region: &[u8], offset: usize) -> Result<(usize, usize)> {
	let Some((len, used)) = varint_at(region, offset + 1) else {
		return Err(PackError::BadVarint { at: offset + 1 });
	};
	Ok((offset + 1 + used, len as usize))
}

fn table_bounds(region: &[u8], offset: usize, entry_size: usize) -> Result<(usize, u32)> {
	let Some((count, used)) = varint_at(region, offset + 1) else {
		return Err(PackError::BadVarint { at: offset + 1 });
	};
	let table = offset + 1 + used;
	let extent = (count as usize).checked_mul(entry_size).filter(|need| table + need <= region.len());
	if extent.is_none() {
		return Err(PackError::EntryTableOutOfRange {
			at: offset,
			count,
			rem: region.len().saturating_sub(table),
		});
	}
	Ok((table, count))
}

fn read_table_u32(region: &[u8], at: usize) -> Result<u32> {
	u32_at(region, at).ok_or(PackError::UnexpectedEof {
		at,
		need: 4,
		rem: region.len().saturating_sub(at),
	})
}

fn check_extent(region: &[u8], start: usize, need: usize) -> Result<()> {
	if start.checked_add(need).is_none_or(|end| end > region.len()) {
		return Err(PackError::UnexpectedEof {
			at: start,
			need,
			rem: region.len().saturating_sub(start),
		});
	}
	Ok(())
}

fn check_child(region: &[u8], parent: usize, child: u32, depth: u32, checked: &mut Vec<bool>) -> Result<()> {
	if child as usize >= parent {
		return Err(PackError::ChildOffsetOutOfOrder { parent, child });
	}
	validate_value(region, child as usize, depth + 1, checked)
}
