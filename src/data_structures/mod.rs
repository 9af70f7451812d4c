mod bit_field;
mod any_buffer;
mod id_dispenser;

pub use bit_field::*;
pub use id_dispenser::*;

pub(crate) use any_buffer::*;

/// Growth law shared by every growable array in the crate:
/// start at four elements, then double until `required` elements fit.
#[inline]
pub(crate) fn grown_capacity(current: usize, required: usize) -> usize {
	let mut capacity = current;
	while capacity < required {
		capacity = match capacity {
			0 => 4,
			_ => capacity * 2,
		};
	}
	capacity
}
