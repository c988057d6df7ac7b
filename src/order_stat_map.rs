use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::Index;

use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::raw::{CountTally, Handle, RawTree};

mod order_statistic;

pub use crate::Rank;

/// An ordered map with O(log n) access by rank.
///
/// Given a key type with a [total order], the map stores its entries in key
/// order, like `BTreeMap`, and additionally answers *order-statistic*
/// queries in logarithmic time: the entry with the i-th smallest key
/// ([`get_by_rank`](OrderStatMap::get_by_rank), indexing by [`Rank`]) and
/// the sorted position of a key ([`rank_of`](OrderStatMap::rank_of)).
///
/// The map is implemented as a red-black tree in which every node carries
/// the size of its subtree. The count is maintained incrementally by every
/// insertion, removal and rotation, so rank queries are plain root-to-leaf
/// descents. Nodes are allocated from a slab pool and never move, which is
/// what backs the [`Cursor`] stability guarantee.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key changes while it is in the map. The
/// behavior resulting from such a logic error is not specified (it could
/// include panics or incorrect results) but will not be undefined behavior.
///
/// # Examples
///
/// ```
/// use tally_tree::{OrderStatMap, Rank};
///
/// let mut movie_reviews = OrderStatMap::new();
///
/// // Review some movies.
/// movie_reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction", "Masterpiece.");
/// movie_reviews.insert("The Godfather", "Very enjoyable.");
///
/// // Ordinary map operations.
/// assert!(movie_reviews.contains_key(&"Office Space"));
/// assert_eq!(movie_reviews.len(), 3);
///
/// // The alphabetically first review, in O(log n).
/// let (title, _) = movie_reviews.get_by_rank(0).unwrap();
/// assert_eq!(*title, "Office Space");
///
/// // Iterate in key order.
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: {review}");
/// }
/// ```
///
/// Entries can be addressed by [`Cursor`]:
///
/// ```
/// use tally_tree::OrderStatMap;
///
/// let mut map = OrderStatMap::new();
/// let (cursor, inserted) = map.insert("foo", 1);
/// assert!(inserted);
///
/// map.insert("bar", 2);
/// // The cursor survived the insertion of "bar".
/// assert_eq!(map.get_at(cursor), (&"foo", &1));
/// assert_eq!(map.rank_at(cursor), 1);
/// ```
///
/// [total order]: https://en.wikipedia.org/wiki/Total_order
pub struct OrderStatMap<K, V> {
    raw: RawTree<K, V, CountTally>,
}

impl<K, V> OrderStatMap<K, V> {
    /// Creates an empty map.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        OrderStatMap { raw: RawTree::new() }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes all entries, returning every node to the pool.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::from([(1, "a")]);
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Checks every container invariant: key order, red-black balance,
    /// subtree counts and parent links. Intended for tests and debugging;
    /// the walk is O(n).
    #[must_use]
    pub fn check_consistency(&self) -> bool
    where
        K: Ord,
    {
        self.raw.check_consistency()
    }
}

impl<K: Ord, V> OrderStatMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, with
    /// matching `Ord`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).map(|handle| &self.raw.node(handle).value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// map.insert(1, "a");
    /// if let Some(value) = map.get_mut(&1) {
    ///     *value = "b";
    /// }
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
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
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let map = OrderStatMap::from([(1, "a")]);
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).is_some()
    }

    /// Inserts a key-value pair.
    ///
    /// If the key is not present a new entry is created and `(cursor,
    /// true)` is returned. If the key is already present its value is
    /// overwritten in place - the entry, and any cursor to it, survives -
    /// and `(cursor, false)` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// let (_, inserted) = map.insert(37, "a");
    /// assert!(inserted);
    ///
    /// let (cursor, inserted) = map.insert(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(map.get_at(cursor), (&37, &"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool) {
        let (handle, inserted) = self.raw.insert_with(key, value, CountTally::new());
        (Cursor(Some(handle)), inserted)
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::from([(1, "a")]);
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
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
        Some(self.raw.erase_at(handle))
    }

    /// Removes the entry a cursor points to, returning its key and value.
    ///
    /// Cursors to other entries remain valid; the removed cursor (and any
    /// copy of it) is invalidated.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null. The cursor must belong to this map.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// let (cursor, _) = map.insert(1, "a");
    /// map.insert(2, "b");
    ///
    /// assert_eq!(map.remove_at(cursor), (1, "a"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove_at(&mut self, cursor: Cursor) -> (K, V) {
        let handle = cursor.expect("`OrderStatMap::remove_at()`");
        self.raw.erase_at(handle)
    }

    /// Returns a cursor to the entry with the given key, or the null cursor
    /// if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let map = OrderStatMap::from([(1, "a")]);
    /// assert!(!map.find(&1).is_null());
    /// assert!(map.find(&2).is_null());
    /// ```
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor(self.raw.find(key))
    }
}

impl<K, V> OrderStatMap<K, V> {
    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| {
            let node = self.raw.node(handle);
            (&node.key, &node.value)
        })
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| {
            let node = self.raw.node(handle);
            (&node.key, &node.value)
        })
    }

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
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let map = OrderStatMap::from([(1, "a"), (2, "b")]);
    /// let first = map.first();
    /// let second = map.next(first);
    /// assert_eq!(map.get_at(second), (&2, &"b"));
    /// assert!(map.next(second).is_null());
    /// ```
    #[must_use]
    pub fn next(&self, cursor: Cursor) -> Cursor {
        let handle = cursor.expect("`OrderStatMap::next()`");
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
        let handle = cursor.expect("`OrderStatMap::prev()`");
        Cursor(self.raw.predecessor(handle))
    }

    /// Dereferences a cursor.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null.
    #[must_use]
    pub fn get_at(&self, cursor: Cursor) -> (&K, &V) {
        let handle = cursor.expect("`OrderStatMap::get_at()`");
        let node = self.raw.node(handle);
        (&node.key, &node.value)
    }

    /// Dereferences a cursor, with mutable access to the value. The key is
    /// shared: mutating it would violate the ordering invariant.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// let (cursor, _) = map.insert("bar", 1);
    /// *map.get_at_mut(cursor).1 = -4;
    /// assert_eq!(map.get(&"bar"), Some(&-4));
    /// ```
    #[must_use]
    pub fn get_at_mut(&mut self, cursor: Cursor) -> (&K, &mut V) {
        let handle = cursor.expect("`OrderStatMap::get_at_mut()`");
        let node = self.raw.node_mut(handle);
        (&node.key, &mut node.value)
    }

    /// Gets an iterator over the entries, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let map = OrderStatMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let pairs: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
    /// assert_eq!(pairs, [(1, "a"), (2, "b"), (3, "c")]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys, in sorted order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values, ordered by their keys.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns the entries as a vector of key-value pairs in key order.
    ///
    /// Feeding the result back through [`From`]/[`FromIterator`] rebuilds
    /// an equivalent map (the internal tree shape may differ; contents and
    /// order do not).
    #[must_use]
    pub fn linearize(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
    }
}

impl<K: Ord + Clone, V: Clone> Clone for OrderStatMap<K, V> {
    /// Deep copy, rebuilt entry by entry through the insert path.
    fn clone(&self) -> Self {
        self.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderStatMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for OrderStatMap<K, V> {
    fn default() -> Self {
        OrderStatMap::new()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderStatMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderStatMap<K, V> {}

impl<K: Hash, V: Hash> Hash for OrderStatMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for entry in self.iter() {
            entry.hash(state);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderStatMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderStatMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderStatMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderStatMap<K, V> {
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let map1 = OrderStatMap::from([(1, 2), (3, 4)]);
    /// let map2: OrderStatMap<_, _> = [(1, 2), (3, 4)].into();
    /// assert_eq!(map1, map2);
    /// ```
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, Q, V> Index<&Q> for OrderStatMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V> IntoIterator for &'a OrderStatMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for OrderStatMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        let entries: Vec<(K, V)> =
            self.raw.drain_in_order().into_iter().map(|(key, value, _)| (key, value)).collect();
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

/// An iterator over the entries of an [`OrderStatMap`], sorted by key.
///
/// Created by [`OrderStatMap::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawTree<K, V, CountTally>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

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
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
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
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

/// An owning iterator over the entries of an [`OrderStatMap`], sorted by
/// key.
///
/// Created by the [`IntoIterator`] implementation on [`OrderStatMap`].
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}

/// An iterator over the keys of an [`OrderStatMap`], in sorted order.
///
/// Created by [`OrderStatMap::keys`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.remaining).finish()
    }
}

/// An iterator over the values of an [`OrderStatMap`], ordered by their
/// keys.
///
/// Created by [`OrderStatMap::values`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.remaining).finish()
    }
}
