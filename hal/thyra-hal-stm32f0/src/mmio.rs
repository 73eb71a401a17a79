//! Volatile word access to a memory-mapped register block.

/// Base-plus-offset volatile access. Offsets are in bytes, as the
/// reference manual tables give them.
pub(crate) struct Mmio {
    base: *mut u32,
}

impl Mmio {
    /// # Safety
    ///
    /// `base` must be the word-aligned base address of a device register
    /// block, and no other owner may interleave accesses to the same
    /// block from another execution context.
    pub(crate) const unsafe fn new(base: usize) -> Self {
        Self {
            base: base as *mut u32,
        }
    }

    pub(crate) fn read(&self, offset: usize) -> u32 {
        // Offset validity is part of the constructor contract.
        unsafe { self.base.add(offset / 4).read_volatile() }
    }

    pub(crate) fn write(&mut self, offset: usize, value: u32) {
        unsafe { self.base.add(offset / 4).write_volatile(value) }
    }

    pub(crate) fn modify(&mut self, offset: usize, clear: u32, set: u32) {
        let value = self.read(offset);
        self.write(offset, (value & !clear) | set);
    }
}

// A register block is an address; the owner decides which context uses it.
unsafe impl Send for Mmio {}
