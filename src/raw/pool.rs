use alloc::vec::Vec;

use super::handle::Handle;

/// Cells handed out per slab. Kept small under test so slab boundaries are
/// crossed constantly.
#[cfg(test)]
pub(crate) const SLAB: usize = 8;
#[cfg(not(test))]
pub(crate) const SLAB: usize = 64;

/// A slab allocator for fixed-size node records.
///
/// Storage grows in slabs of [`SLAB`] cells; a slab is created with its full
/// capacity and never reallocates, so a live cell keeps its address and its
/// [`Handle`] for as long as the entry exists. Freed cells are threaded onto
/// a stack and reused before any new slab is carved.
///
/// Not thread-safe. Moving the pool moves the slab list in O(1); the pool
/// is deliberately not `Clone` - containers deep-copy through their public
/// insert path instead.
pub(crate) struct Pool<T> {
    slabs: Vec<Vec<Option<T>>>,
    free: Vec<Handle>,
}

impl<T> Pool<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slabs: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Total cells carved out so far, live or free.
    fn cells(&self) -> usize {
        match self.slabs.last() {
            Some(last) => (self.slabs.len() - 1) * SLAB + last.len(),
            None => 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells() - self.free.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a freed cell.
            self.slabs[h.cell() / SLAB][h.cell() % SLAB] = Some(element);
            return h;
        }

        if self.slabs.last().is_none_or(|slab| slab.len() == SLAB) {
            // Carving the next cell must leave it addressable.
            assert!(
                self.cells() < Handle::CAPACITY,
                "`Pool::alloc()` - every addressable cell ({}) is carved",
                Handle::CAPACITY
            );
            self.slabs.push(Vec::with_capacity(SLAB));
        }

        let slab_index = self.slabs.len() - 1;
        let slab = self.slabs.last_mut().unwrap();
        let handle = Handle::new(slab_index * SLAB + slab.len());
        slab.push(Some(element));
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        let cell = handle.cell();
        self.slabs[cell / SLAB][cell % SLAB].as_ref().expect("`Pool::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        let cell = handle.cell();
        self.slabs[cell / SLAB][cell % SLAB].as_mut().expect("`Pool::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let cell = handle.cell();
        let element = self.slabs[cell / SLAB][cell % SLAB].take().expect("`Pool::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    pub(crate) fn clear(&mut self) {
        self.slabs.clear();
        self.free.clear();
    }
}
