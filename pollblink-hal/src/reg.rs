//! Typed access to memory-mapped registers
//!
//! Every register the blinker touches is a [`Reg`]: a volatile cell laid out
//! exactly like the hardware word it stands for. Chip bindings turn a fixed
//! address into a `&'static Reg` once, through [`Reg::at`], and hand out only
//! the safe `read`/`write`/`modify` operations from then on.
//!
//! Because `Reg` is `repr(transparent)`, a `Reg` created with [`Reg::new`]
//! in ordinary memory behaves like the real register, which is what the unit
//! tests do.

use vcell::VolatileCell;

/// A single memory-mapped register holding a `T`.
#[repr(transparent)]
pub struct Reg<T: Copy> {
    value: VolatileCell<T>,
}

impl<T: Copy> Reg<T> {
    /// Create a register backed by ordinary memory.
    pub const fn new(value: T) -> Self {
        Self {
            value: VolatileCell::new(value),
        }
    }

    /// View the register at `address`.
    ///
    /// # Safety
    ///
    /// `address` must be the address of a hardware register of width
    /// `size_of::<T>()`, suitably aligned, valid for the whole program, and
    /// not handed out through any other `Reg` whose writes would conflict.
    #[inline]
    pub unsafe fn at(address: usize) -> &'static Self {
        &*(address as *const Self)
    }

    /// Volatile read.
    #[inline(always)]
    pub fn read(&self) -> T {
        self.value.get()
    }

    /// Volatile write.
    #[inline(always)]
    pub fn write(&self, value: T) {
        self.value.set(value)
    }

    /// Read, transform, write back.
    #[inline(always)]
    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        self.write(f(self.read()))
    }

    /// Address of the underlying word.
    pub fn as_ptr(&self) -> *mut T {
        self.value.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_preserves_other_bits() {
        let reg = Reg::new(0b1010_0000u32);
        reg.modify(|v| v | 0b0000_0101);
        assert_eq!(reg.read(), 0b1010_0101);
        reg.modify(|v| v & !0b1000_0000);
        assert_eq!(reg.read(), 0b0010_0101);
    }

    #[test]
    fn view_at_address_aliases_backing_word() {
        let backing = Reg::new(0u16);
        let view = unsafe { Reg::<u16>::at(backing.as_ptr() as usize) };
        view.write(0xffff);
        assert_eq!(backing.read(), 0xffff);
    }
}
