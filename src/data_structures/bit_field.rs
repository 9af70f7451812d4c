use crate::components::ComponentFlag;
use crate::data_structures::grown_capacity;
use std::cmp::Ordering;

const BITS: usize = 32;

/// A dynamically sized bit-field.
///
/// Serves both as the classification of an entity (which flags it currently carries)
/// and as the compiled predicate of an [entity set](crate::entities::EntitySet).
/// The word count only ever grows; bits past the last word are implicitly zero.
#[derive(Default, Clone, Debug)]
pub struct BitField {
	values: Vec<u32>,
}

impl BitField {
	/// Create a new [BitField].
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a new [BitField] with the specified capacity.
	///
	/// # Arguments
	/// * `capacity` - A usize representing the container's target capacity in bits
	pub fn with_capacity(capacity: usize) -> Self {
		let mut instance = Self::new();
		instance.ensure_words((capacity + BITS - 1) / BITS);
		instance
	}

	/// Get the value of the bit at index `i`.
	///
	/// # Arguments
	/// * `i` - The index of the element to retrieve
	#[inline]
	pub fn get(&self, i: usize) -> bool {
		let (position, bit) = Self::pos_bit(i);
		self.get_word_bit(position, bit)
	}

	/// Set the value of the bit at index `i`.
	///
	/// # Arguments
	/// * `i` - The index of the element to modify
	#[inline]
	pub fn set(&mut self, i: usize, value: bool) {
		let (position, bit) = Self::pos_bit(i);
		self.set_word_bit(position, bit, value)
	}

	/// Check whether `flag` is set.
	#[inline]
	pub fn get_flag(&self, flag: ComponentFlag) -> bool {
		self.get_word_bit(flag.segment(), flag.bit())
	}

	/// Set or clear `flag`, growing the word array if needed.
	#[inline]
	pub fn set_flag(&mut self, flag: ComponentFlag, value: bool) {
		self.set_word_bit(flag.segment(), flag.bit(), value)
	}

	/// Check that every bit set in `filter` is also set in `self`.
	pub fn contains(&self, filter: &BitField) -> bool {
		filter.values.iter().enumerate().all(|(i, part)| {
			*part == 0 || self.values.get(i).map_or(false, |bits| (bits & part) == *part)
		})
	}

	/// Check that no bit set in `filter` is set in `self`.
	pub fn excludes(&self, filter: &BitField) -> bool {
		filter.values.iter().zip(self.values.iter()).all(|(part, bits)| (bits & part) == 0)
	}

	/// Check that at least one bit set in `filter` is also set in `self`.
	#[inline]
	pub fn intersects(&self, filter: &BitField) -> bool {
		!self.excludes(filter)
	}

	/// Overwrite `self` with the bits of `other`.
	pub fn copy_from(&mut self, other: &BitField) {
		self.values.clear();
		self.values.extend_from_slice(&other.values);
	}

	/// Set all bits to 0 without releasing any words.
	pub fn clear(&mut self) {
		self.values.fill(0);
	}

	/// Check whether no bit is set.
	pub fn is_empty(&self) -> bool {
		self.values.iter().all(|v| *v == 0)
	}

	/// Get the [BitField]'s capacity in bits.
	pub fn capacity(&self) -> usize {
		self.values.len() * BITS
	}

	/// The raw 32-bit words.
	pub fn words(&self) -> &[u32] {
		&self.values
	}

	/// Iterate over the indices of all set bits in ascending order.
	pub fn iter_ones(&self) -> BitFieldIterator {
		BitFieldIterator {
			word: 0,
			base: 0,
			current: 0,
			values: &self.values,
		}
	}

	#[inline]
	fn get_word_bit(&self, position: usize, bit: u32) -> bool {
		match self.values.get(position) {
			Some(value) => (value & bit) != 0,
			None => false,
		}
	}

	#[inline]
	fn set_word_bit(&mut self, position: usize, bit: u32, value: bool) {
		match value {
			true => {
				if self.values.len() <= position {
					self.ensure_words(position + 1);
				}
				self.values[position] |= bit;
			},

			false => {
				if let Some(word) = self.values.get_mut(position) {
					*word &= !bit;
				}
			},
		}
	}

	#[inline(never)]
	fn ensure_words(&mut self, count: usize) {
		if self.values.len() < count {
			let len = grown_capacity(self.values.len(), count);
			self.values.resize(len, 0);
		}
	}

	#[inline(always)]
	fn pos_bit(i: usize) -> (usize, u32) {
		(i / BITS, 1 << (i % BITS))
	}
}

impl From<&[ComponentFlag]> for BitField {
	fn from(flags: &[ComponentFlag]) -> Self {
		let mut bitfield = BitField::new();
		for flag in flags {
			bitfield.set_flag(*flag, true);
		}

		bitfield
	}
}

impl Eq for BitField {}

impl PartialEq<Self> for BitField {
	fn eq(&self, other: &Self) -> bool {
		match self.values.len().cmp(&other.values.len()) {
			Ordering::Equal => self.values.eq(&other.values),
			Ordering::Less => {
				self.values.eq(&other.values[0..self.values.len()])
					&& other.values[self.values.len()..].iter().all(|i| *i == 0)
			},
			Ordering::Greater => {
				self.values[0..other.values.len()].eq(&other.values)
					&& self.values[other.values.len()..].iter().all(|i| *i == 0)
			},
		}
	}
}

/// Iterates over the indices of the set bits of a [BitField].
pub struct BitFieldIterator<'l> {
	word: usize,
	base: usize,
	current: u32,
	values: &'l [u32],
}

impl Iterator for BitFieldIterator<'_> {
	type Item = usize;

	fn next(&mut self) -> Option<Self::Item> {
		while self.current == 0 {
			self.current = *self.values.get(self.word)?;
			self.base = self.word * BITS;
			self.word += 1;
		}

		let bit = self.current.trailing_zeros() as usize;
		self.current &= self.current - 1;
		Some(self.base + bit)
	}
}
