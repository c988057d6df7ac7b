use core::num::NonZero;

// Narrow cell addressing under test so the exhaustion path is reachable.
#[cfg(test)]
type Cell = u16;
#[cfg(not(test))]
type Cell = u32;

/// Address of one cell in a [`Pool`](super::pool::Pool).
///
/// Stored with a bias of one in a `NonZero`, which hands the zero value to
/// the niche so that `Option<Handle>` is no wider than the raw integer. A
/// node carries three optional handles (parent and both children), so
/// absent links cost nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<Cell>);

impl Handle {
    /// Cells a pool can address. One raw value is spent on the bias.
    pub(crate) const CAPACITY: usize = Cell::MAX as usize - 1;

    #[inline]
    pub(crate) const fn new(cell: usize) -> Self {
        assert!(cell <= Self::CAPACITY, "`Handle::new()` - cell is past the pool's addressable range!");
        #[allow(clippy::cast_possible_truncation)]
        match NonZero::new(cell as Cell + 1) {
            Some(biased) => Self(biased),
            // The add cannot wrap and cannot produce zero.
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn cell(self) -> usize {
        self.0.get() as usize - 1
    }
}
