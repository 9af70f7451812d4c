use crate::data_structures::grown_capacity;
use bytemuck::{Pod, Zeroable};
use std::mem::{align_of, size_of};
use std::ops::Range;

#[derive(Copy, Clone)]
#[repr(C, align(16))]
struct Chunk([u8; 16]);

// Plain bytes without padding.
unsafe impl Zeroable for Chunk {}
unsafe impl Pod for Chunk {}

const CHUNK_SIZE: usize = size_of::<Chunk>();

/// Alignment guaranteed for every record of an [AnyBuffer].
pub(crate) const RECORD_ALIGNMENT: usize = align_of::<Chunk>();

/// A packed container of fixed-size records stored as raw bytes.
///
/// The backing storage is made of 16-byte aligned chunks, so the record at any slot is aligned
/// for every `Pod` type whose size equals the record size and whose alignment is at most [RECORD_ALIGNMENT].
/// Records are always initialized memory; new space is zero-filled.
pub(crate) struct AnyBuffer {
	chunks: Vec<Chunk>,
	record_size: usize,
	capacity: usize,
}

impl AnyBuffer {
	pub fn with_capacity(record_size: usize, capacity: usize) -> Self {
		let mut this = Self {
			chunks: Vec::new(),
			record_size,
			capacity: 0,
		};

		this.ensure_capacity(capacity);
		this
	}

	/// Make room for at least `capacity` records, following the crate's growth law.
	pub fn reserve_for(&mut self, capacity: usize) {
		if self.capacity < capacity {
			self.ensure_capacity(grown_capacity(self.capacity, capacity));
		}
	}

	pub fn ensure_capacity(&mut self, capacity: usize) {
		if self.capacity < capacity {
			let bytes = capacity * self.record_size;
			self.chunks.resize((bytes + CHUNK_SIZE - 1) / CHUNK_SIZE, Chunk::zeroed());
			self.capacity = capacity;
		}
	}

	#[inline]
	pub fn record(&self, slot: usize) -> &[u8] {
		let range = self.range(slot);
		&self.as_bytes()[range]
	}

	#[inline]
	pub fn record_mut(&mut self, slot: usize) -> &mut [u8] {
		let range = self.range(slot);
		&mut self.as_bytes_mut()[range]
	}

	/// The first `count` records as one contiguous byte slice.
	#[inline]
	pub fn records(&self, count: usize) -> &[u8] {
		&self.as_bytes()[..count * self.record_size]
	}

	#[inline]
	pub fn records_mut(&mut self, count: usize) -> &mut [u8] {
		let len = count * self.record_size;
		&mut self.as_bytes_mut()[..len]
	}

	/// Overwrite the record at `dst` with the bytes of the record at `src`.
	pub fn copy_record(&mut self, src: usize, dst: usize) {
		let src = self.range(src);
		let dst = self.range(dst).start;
		self.as_bytes_mut().copy_within(src, dst);
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	#[inline]
	fn range(&self, slot: usize) -> Range<usize> {
		debug_assert!(slot < self.capacity, "Slot {} is out of bounds", slot);
		slot * self.record_size..(slot + 1) * self.record_size
	}

	#[inline]
	fn as_bytes(&self) -> &[u8] {
		bytemuck::cast_slice(&self.chunks)
	}

	#[inline]
	fn as_bytes_mut(&mut self) -> &mut [u8] {
		bytemuck::cast_slice_mut(&mut self.chunks)
	}
}
