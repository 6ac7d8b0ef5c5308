use packdoc::pack::Node;

use crate::load::{LoadedValue, fill};

/// Stateful cursor over an array's elements.
///
/// Same contract as [`crate::DictIter`] without key handling: each `next`
/// flattens one element into the caller's slot in index order, and false
/// means exhausted, idempotently.
pub struct ArrayIter {
	array: Option<Node>,
	pos: u32,
	count: u32,
	finalize: bool,
	done: bool,
}

impl ArrayIter {
	/// Position a cursor before the first element of `array`.
	///
	/// A node that is not an array yields an already-exhausted cursor. With
	/// `finalize`, the cursor's document retain is dropped as soon as
	/// iteration completes.
	pub fn begin(array: &Node, finalize: bool) -> ArrayIter {
		let count = array.value().as_array().map_or(0, |value| value.len());
		ArrayIter {
			array: Some(array.clone()),
			pos: 0,
			count,
			finalize,
			done: false,
		}
	}

	/// Flatten the next element into the caller's slot; false once
	/// exhausted.
	pub fn next(&mut self, value_out: &mut LoadedValue) -> bool {
		if self.done {
			return false;
		}
		let Some(source) = self.array.clone() else {
			self.done = true;
			return false;
		};
		if self.pos >= self.count {
			self.finish();
			return false;
		}

		let Some(element) = source.value().as_array().and_then(|array| array.get(self.pos)) else {
			self.finish();
			return false;
		};
		fill(source.doc(), element, true, value_out);
		self.pos += 1;
		true
	}

	/// Whether the cursor has reported exhaustion.
	pub fn is_done(&self) -> bool {
		self.done
	}

	fn finish(&mut self) {
		self.done = true;
		if self.finalize {
			self.array = None;
		}
	}
}
