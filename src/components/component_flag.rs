//! Unique bit identifiers for component types and reserved entity states.
//!
//! A [ComponentFlag] names one bit of a [classification](crate::data_structures::BitField):
//! the high half of the value is the index of a 32-bit segment, the low half is a
//! single-bit mask inside that segment.

/// A unique bit identifier, either reserved ([ALIVE](ComponentFlag::ALIVE),
/// [ENABLED](ComponentFlag::ENABLED)) or handed out to a component type by a [FlagRegistry].
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct ComponentFlag(u64);

impl nohash_hasher::IsEnabled for ComponentFlag {}

impl ComponentFlag {
	pub const INVALID: Self = Self(0);
	/// Set on every live entity.
	pub const ALIVE: Self = Self::from_parts(0, 1);
	/// Set on every live entity that is not disabled.
	pub const ENABLED: Self = Self::from_parts(0, 1 << 1);

	/// # Arguments
	/// * `segment` - The index of the 32-bit word the flag lives in
	/// * `bit` - A mask with exactly one bit set
	#[inline(always)]
	pub const fn from_parts(segment: u32, bit: u32) -> Self {
		Self(((segment as u64) << 32) | bit as u64)
	}

	/// The flag naming bit `index` of a classification.
	#[inline]
	pub const fn from_index(index: usize) -> Self {
		Self::from_parts((index / 32) as u32, 1 << (index % 32))
	}

	#[inline(always)]
	pub const fn segment(self) -> usize {
		(self.0 >> 32) as usize
	}

	#[inline(always)]
	pub const fn bit(self) -> u32 {
		self.0 as u32
	}

	/// The position of the flag's bit within a classification.
	#[inline]
	pub const fn index(self) -> usize {
		self.segment() * 32 + self.bit().trailing_zeros() as usize
	}

	#[inline(always)]
	pub const fn value(self) -> u64 {
		self.0
	}
}

/// Hands out [component flags](ComponentFlag) by advancing the bit position, then the segment.
///
/// Flags are never reused, so a flag that outlived its component type can never be
/// mistaken for a newer one.
#[derive(Debug)]
pub struct FlagRegistry {
	next: ComponentFlag,
}

impl FlagRegistry {
	pub fn new() -> Self {
		Self {
			next: ComponentFlag::from_parts(0, 1 << 2),
		}
	}

	pub fn next_flag(&mut self) -> ComponentFlag {
		let flag = self.next;
		self.next = match flag.bit() {
			0x8000_0000 => ComponentFlag::from_parts(flag.segment() as u32 + 1, 1),
			bit => ComponentFlag::from_parts(flag.segment() as u32, bit << 1),
		};

		flag
	}
}

impl Default for FlagRegistry {
	fn default() -> Self {
		Self::new()
	}
}
