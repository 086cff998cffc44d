use crate::error::RenderError;
use bytemuck::Pod;
use std::marker::PhantomData;

/// One block in a [`UniformArena`], addressed by a dynamic offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformSlot(u32);

impl UniformSlot {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Round `size` up to a multiple of `alignment`.
pub fn aligned_stride(size: u32, alignment: u32) -> u32 {
    size.div_ceil(alignment) * alignment
}

/// CPU image of a dynamic-offset uniform buffer.
///
/// Each pushed block lands in its own aligned slot, so every draw of a frame
/// reads its own copy. The whole image is written to the GPU buffer once
/// per frame.
#[derive(Debug, Clone)]
pub struct UniformArena<T> {
    stride: u32,
    capacity: u32,
    len: u32,
    bytes: Vec<u8>,
    _block: PhantomData<T>,
}

impl<T: Pod> UniformArena<T> {
    /// `alignment` is the device's minimum uniform buffer offset alignment.
    pub fn new(alignment: u32, capacity: u32) -> Result<Self, RenderError> {
        if !alignment.is_power_of_two() {
            return Err(RenderError::InvalidAlignment(alignment));
        }
        let stride = aligned_stride(Self::block_size() as u32, alignment);
        Ok(Self {
            stride,
            capacity,
            len: 0,
            bytes: Vec::with_capacity(stride as usize * capacity as usize),
            _block: PhantomData,
        })
    }

    /// Size of one block without padding.
    pub fn block_size() -> u64 {
        std::mem::size_of::<T>() as u64
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.len = 0;
    }

    pub fn push(&mut self, block: &T) -> Result<UniformSlot, RenderError> {
        if self.len >= self.capacity {
            return Err(RenderError::UniformCapacity {
                capacity: self.capacity,
            });
        }
        let start = self.bytes.len();
        self.bytes.extend_from_slice(bytemuck::bytes_of(block));
        self.bytes.resize(start + self.stride as usize, 0);
        let slot = UniformSlot(self.len);
        self.len += 1;
        Ok(slot)
    }

    /// Read a block back, `None` if the slot was not written this frame.
    pub fn get(&self, slot: UniformSlot) -> Option<T> {
        if slot.0 >= self.len {
            return None;
        }
        let start = self.offset(slot) as usize;
        let end = start + std::mem::size_of::<T>();
        Some(bytemuck::pod_read_unaligned(&self.bytes[start..end]))
    }

    /// Dynamic offset of `slot` in bytes.
    pub fn offset(&self, slot: UniformSlot) -> u32 {
        slot.0 * self.stride
    }

    /// Bytes of every slot written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the GPU buffer backing this arena.
    pub fn buffer_size(&self) -> u64 {
        u64::from(self.stride) * u64::from(self.capacity)
    }
}
