//! Operand format shared by `lgdt` and `lidt`.

/// Pointer to a descriptor table as consumed by `lgdt` / `lidt`.
///
/// The CPU reads exactly `limit + 1` bytes starting at `base`.
#[repr(C, packed)]
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DescriptorTablePointer {
    /// Size of the table **minus one** in bytes.
    limit: u16,
    /// Linear address of the first descriptor.
    base: u64,
}

const _: () = assert!(size_of::<DescriptorTablePointer>() == 10);

impl DescriptorTablePointer {
    #[must_use]
    pub const fn new(limit: u16, base: u64) -> Self {
        Self { limit, base }
    }

    /// Pointer covering the whole of `table`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_table<T>(table: &T) -> Self {
        const {
            assert!(size_of::<T>() > 0 && size_of::<T>() <= 0x1_0000);
        }
        let limit = (size_of::<T>() - 1) as u16;
        Self::new(limit, core::ptr::from_ref(table) as u64)
    }

    #[must_use]
    pub const fn limit(&self) -> u16 {
        self.limit
    }

    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_size_minus_one() {
        let table = [0u64; 3];
        let ptr = DescriptorTablePointer::for_table(&table);
        assert_eq!(ptr.limit(), 23);
        assert_eq!(ptr.base(), table.as_ptr() as u64);
    }
}
