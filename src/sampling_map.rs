use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::raw::{Handle, RawTree, WeightTally};
use crate::weight::Weight;

mod sampling;

/// An ordered map whose entries carry sampling weights.
///
/// `SamplingMap` stores key-value pairs in key order, like `BTreeMap`, and
/// gives every entry a numeric weight. On top of the usual map operations
/// it supports drawing a random entry with probability proportional to its
/// weight in O(log n) ([`sample`](SamplingMap::sample)), resolving an
/// explicit sampling position ([`sample_at`](SamplingMap::sample_at)), and
/// re-weighting an entry in place ([`set_weight`](SamplingMap::set_weight)).
///
/// The map is implemented as a red-black tree in which every node carries
/// the weight sum of its subtree; sampling is a single descent guided by
/// those sums. The weight type is chosen by the caller - see [`Weight`] -
/// and the integer/float distinction (draw range, boundary handling,
/// aggregate tolerance) is resolved at compile time.
///
/// Zero-weight entries are legal and are simply never sampled. Negative
/// weights are not meaningful; the container does not attempt to detect
/// them.
///
/// # Examples
///
/// ```
/// use tally_tree::SamplingMap;
/// use rand::SeedableRng;
///
/// let mut queue: SamplingMap<&str, u32, u32> = SamplingMap::new();
/// queue.insert("warm", 0, 1);
/// queue.insert("hot", 0, 6);
/// queue.insert("cold", 0, 1);
/// assert_eq!(queue.total_weight(), 8);
///
/// // "hot" comes up six times out of eight, on average.
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let cursor = queue.sample(&mut rng);
/// assert!(!cursor.is_null());
///
/// // Position-based selection is deterministic: positions 1..=6 are "hot"
/// // (keys are ordered "cold" < "hot" < "warm").
/// assert_eq!(queue.get_at(queue.sample_at(0)).0, &"cold");
/// assert_eq!(queue.get_at(queue.sample_at(3)).0, &"hot");
/// ```
pub struct SamplingMap<K, V, W> {
    raw: RawTree<K, V, WeightTally<W>>,
    /// Entry count; the weight tally aggregates weights, not entries.
    len: usize,
}

impl<K, V, W: Weight> SamplingMap<K, V, W> {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        SamplingMap {
            raw: RawTree::new(),
            len: 0,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let mut map = SamplingMap::new();
    /// map.insert("a", 1, 2.5);
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.len = 0;
    }

    /// Checks every container invariant: key order, red-black balance,
    /// subtree weight sums (exact for integers, within a small relative
    /// tolerance for floats) and parent links. Intended for tests and
    /// debugging; the walk is O(n).
    #[must_use]
    pub fn check_consistency(&self) -> bool
    where
        K: Ord,
    {
        self.raw.check_consistency()
    }
}

impl<K: Ord, V, W: Weight> SamplingMap<K, V, W> {
    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).map(|handle| &self.raw.node(handle).value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    #[must_use]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.find(key)?;
        Some(&mut self.raw.node_mut(handle).value)
    }

    /// Returns the key-value pair corresponding to the key.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).map(|handle| {
            let node = self.raw.node(handle);
            (&node.key, &node.value)
        })
    }

    /// Returns true if the map contains the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).is_some()
    }

    /// Inserts a key-value pair with the given weight.
    ///
    /// If the key is not present a new entry is created and `(cursor,
    /// true)` is returned. If the key is already present **only the value
    /// is overwritten** - the entry keeps its weight, and any cursor to it
    /// stays valid - and `(cursor, false)` is returned. Use
    /// [`set_weight`](Self::set_weight) to change the weight of an
    /// existing entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let mut map = SamplingMap::new();
    /// let (_, inserted) = map.insert("baz", 3, 3u32);
    /// assert!(inserted);
    ///
    /// let (cursor, inserted) = map.insert("baz", 6, 2);
    /// assert!(!inserted);
    /// assert_eq!(map.get_at(cursor).1, &6);
    /// assert_eq!(map.total_weight(), 3); // weight unchanged
    /// ```
    pub fn insert(&mut self, key: K, value: V, weight: W) -> (Cursor, bool) {
        let (handle, inserted) = self.raw.insert_with(key, value, WeightTally::new(weight));
        if inserted {
            self.len += 1;
        }
        (Cursor(Some(handle)), inserted)
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let mut map = SamplingMap::from([("foo", 2, 1u32)]);
    /// assert_eq!(map.remove(&"foo"), Some(2));
    /// assert_eq!(map.remove(&"foo"), None);
    /// assert_eq!(map.total_weight(), 0);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key-value pair if
    /// the key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.find(key)?;
        self.len -= 1;
        Some(self.raw.erase_at(handle))
    }

    /// Removes the entry a cursor points to, returning its key and value.
    ///
    /// Cursors to other entries remain valid.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null. The cursor must belong to this map.
    pub fn remove_at(&mut self, cursor: Cursor) -> (K, V) {
        let handle = cursor.expect("`SamplingMap::remove_at()`");
        self.len -= 1;
        self.raw.erase_at(handle)
    }

    /// Returns a cursor to the entry with the given key, or the null cursor
    /// if the key is not present.
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor(self.raw.find(key))
    }
}

impl<K, V, W: Weight> SamplingMap<K, V, W> {
    /// Returns a cursor to the entry with the smallest key, or the null
    /// cursor if the map is empty.
    #[must_use]
    pub fn first(&self) -> Cursor {
        Cursor(self.raw.first())
    }

    /// Returns a cursor to the entry with the largest key, or the null
    /// cursor if the map is empty.
    #[must_use]
    pub fn last(&self) -> Cursor {
        Cursor(self.raw.last())
    }

    /// Moves a cursor to the entry with the next larger key; the null
    /// cursor is returned when walking past the largest entry.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null.
    #[must_use]
    pub fn next(&self, cursor: Cursor) -> Cursor {
        let handle = cursor.expect("`SamplingMap::next()`");
        Cursor(self.raw.successor(handle))
    }

    /// Moves a cursor to the entry with the next smaller key; the null
    /// cursor is returned when walking past the smallest entry.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null.
    #[must_use]
    pub fn prev(&self, cursor: Cursor) -> Cursor {
        let handle = cursor.expect("`SamplingMap::prev()`");
        Cursor(self.raw.predecessor(handle))
    }

    /// Dereferences a cursor.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null.
    #[must_use]
    pub fn get_at(&self, cursor: Cursor) -> (&K, &V) {
        let handle = cursor.expect("`SamplingMap::get_at()`");
        let node = self.raw.node(handle);
        (&node.key, &node.value)
    }

    /// Dereferences a cursor, with mutable access to the value. The key is
    /// shared: mutating it would violate the ordering invariant.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null.
    #[must_use]
    pub fn get_at_mut(&mut self, cursor: Cursor) -> (&K, &mut V) {
        let handle = cursor.expect("`SamplingMap::get_at_mut()`");
        let node = self.raw.node_mut(handle);
        (&node.key, &mut node.value)
    }

    /// Gets an iterator over `(key, value, weight)` triples, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let map = SamplingMap::from([("b", 2, 4u32), ("a", 1, 3)]);
    /// let triples: Vec<_> = map.iter().map(|(&k, &v, w)| (k, v, w)).collect();
    /// assert_eq!(triples, [("a", 1, 3), ("b", 2, 4)]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, W> {
        Iter {
            raw: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.len,
        }
    }

    /// Returns the entries as a vector of `(key, value, weight)` triples in
    /// key order. Feeding the result back through [`From`]/[`FromIterator`]
    /// rebuilds an equivalent map.
    #[must_use]
    pub fn linearize(&self) -> Vec<(K, V, W)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(key, value, weight)| (key.clone(), value.clone(), weight)).collect()
    }
}

impl<K: Ord + Clone, V: Clone, W: Weight> Clone for SamplingMap<K, V, W> {
    /// Deep copy, rebuilt entry by entry through the insert path.
    fn clone(&self) -> Self {
        self.iter().map(|(key, value, weight)| (key.clone(), value.clone(), weight)).collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, W: Weight + fmt::Debug> fmt::Debug for SamplingMap<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(key, value, weight)| (key, (value, weight)))).finish()
    }
}

impl<K, V, W: Weight> Default for SamplingMap<K, V, W> {
    fn default() -> Self {
        SamplingMap::new()
    }
}

impl<K: PartialEq, V: PartialEq, W: Weight> PartialEq for SamplingMap<K, V, W> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .zip(other.iter())
                .all(|((k1, v1, w1), (k2, v2, w2))| k1 == k2 && v1 == v2 && w1 == w2)
    }
}

impl<K: Ord, V, W: Weight> FromIterator<(K, V, W)> for SamplingMap<K, V, W> {
    fn from_iter<I: IntoIterator<Item = (K, V, W)>>(iter: I) -> Self {
        let mut map = SamplingMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, W: Weight> Extend<(K, V, W)> for SamplingMap<K, V, W> {
    fn extend<I: IntoIterator<Item = (K, V, W)>>(&mut self, iter: I) {
        for (key, value, weight) in iter {
            self.insert(key, value, weight);
        }
    }
}

impl<K: Ord, V, W: Weight, const N: usize> From<[(K, V, W); N]> for SamplingMap<K, V, W> {
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let map = SamplingMap::from([(1, "a", 2u32), (3, "b", 4)]);
    /// assert_eq!(map.total_weight(), 6);
    /// ```
    fn from(entries: [(K, V, W); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, Q, V, W> Index<&Q> for SamplingMap<K, V, W>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
    W: Weight,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V, W: Weight> IntoIterator for &'a SamplingMap<K, V, W> {
    type Item = (&'a K, &'a V, W);
    type IntoIter = Iter<'a, K, V, W>;

    fn into_iter(self) -> Iter<'a, K, V, W> {
        self.iter()
    }
}

impl<K, V, W: Weight> IntoIterator for SamplingMap<K, V, W> {
    type Item = (K, V, W);
    type IntoIter = IntoIter<K, V, W>;

    fn into_iter(mut self) -> IntoIter<K, V, W> {
        let entries: Vec<(K, V, W)> = self
            .raw
            .drain_in_order()
            .into_iter()
            .map(|(key, value, tally)| (key, value, tally.weight))
            .collect();
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

/// An iterator over the entries of a [`SamplingMap`], sorted by key. Yields
/// `(&key, &value, weight)` triples.
///
/// Created by [`SamplingMap::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, W> {
    raw: &'a RawTree<K, V, WeightTally<W>>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<'a, K, V, W: Weight> Iterator for Iter<'a, K, V, W> {
    type Item = (&'a K, &'a V, W);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.front.expect("`Iter` - entries remain but the front is gone!");
        let node = self.raw.node(handle);
        if self.remaining == 1 {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.raw.successor(handle);
        }
        self.remaining -= 1;
        Some((&node.key, &node.value, node.tally.weight))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, W: Weight> DoubleEndedIterator for Iter<'_, K, V, W> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.back.expect("`Iter` - entries remain but the back is gone!");
        let node = self.raw.node(handle);
        if self.remaining == 1 {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.raw.predecessor(handle);
        }
        self.remaining -= 1;
        Some((&node.key, &node.value, node.tally.weight))
    }
}

impl<K, V, W: Weight> ExactSizeIterator for Iter<'_, K, V, W> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, W: Weight> FusedIterator for Iter<'_, K, V, W> {}

impl<K, V, W> Clone for Iter<'_, K, V, W> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, W> fmt::Debug for Iter<'_, K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

/// An owning iterator over the entries of a [`SamplingMap`], sorted by key.
/// Yields `(key, value, weight)` triples.
pub struct IntoIter<K, V, W> {
    inner: alloc::vec::IntoIter<(K, V, W)>,
}

impl<K, V, W> Iterator for IntoIter<K, V, W> {
    type Item = (K, V, W);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, W> DoubleEndedIterator for IntoIter<K, V, W> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V, W> ExactSizeIterator for IntoIter<K, V, W> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, W> FusedIterator for IntoIter<K, V, W> {}

impl<K: fmt::Debug, V: fmt::Debug, W> fmt::Debug for IntoIter<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}
