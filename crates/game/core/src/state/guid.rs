/// Identifier of a world object (unit, game object, or item instance).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Guid(pub u64);

impl Guid {
    pub const NONE: Self = Self(0);

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for Guid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Monotonic guid allocator for objects created at runtime.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuidAllocator {
    next: u64,
}

impl GuidAllocator {
    pub const fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn allocate(&mut self) -> Guid {
        let guid = Guid(self.next);
        self.next += 1;
        guid
    }

    /// Makes sure future allocations never collide with `guid`.
    pub fn reserve(&mut self, guid: Guid) {
        if guid.0 >= self.next {
            self.next = guid.0 + 1;
        }
    }
}

impl Default for GuidAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
