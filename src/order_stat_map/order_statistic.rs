use core::borrow::Borrow;
use core::ops::{Index, IndexMut};

use crate::cursor::Cursor;
use crate::rank::Rank;

use super::OrderStatMap;

impl<K, V> OrderStatMap<K, V> {
    /// Returns the key-value pair at position `rank` in sorted order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n): a single descent guided by the subtree counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// map.insert("a", 10);
    /// map.insert("c", 30);
    /// map.insert("b", 20);
    ///
    /// let (key, value) = map.get_by_rank(1).unwrap();
    /// assert_eq!((key, value), (&"b", &20));
    /// assert!(map.get_by_rank(3).is_none());
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.raw.find_by_rank(rank).map(|handle| {
            let node = self.raw.node(handle);
            (&node.key, &node.value)
        })
    }

    /// Returns the key and a mutable reference to the value at position
    /// `rank` in sorted order.
    ///
    /// The key is returned as a shared reference because mutating it would
    /// violate the map's ordering invariants.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// map.insert(10, "a");
    /// map.insert(5, "b");
    ///
    /// if let Some((key, value)) = map.get_by_rank_mut(0) {
    ///     assert_eq!(*key, 5);
    ///     *value = "updated";
    /// }
    /// assert_eq!(map.get(&5), Some(&"updated"));
    /// ```
    #[must_use]
    pub fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        let handle = self.raw.find_by_rank(rank)?;
        let node = self.raw.node_mut(handle);
        Some((&node.key, &mut node.value))
    }

    /// Returns a cursor to the entry at position `rank` in sorted order.
    ///
    /// # Panics
    ///
    /// Panics if `rank >= len()`; use [`get_by_rank`](Self::get_by_rank)
    /// for the checked variant.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let map = OrderStatMap::from([("bar", 1), ("foo", 2)]);
    /// let cursor = map.find_by_rank(0);
    /// assert_eq!(map.get_at(cursor), (&"bar", &1));
    /// ```
    #[must_use]
    pub fn find_by_rank(&self, rank: usize) -> Cursor {
        match self.raw.find_by_rank(rank) {
            Some(handle) => Cursor(Some(handle)),
            None => panic!("rank (is {rank}) should be < len (is {})", self.len()),
        }
    }

    /// Returns the zero-based rank of `key` in sorted order - the number
    /// of keys strictly smaller than it - or `None` if the key is not
    /// present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::OrderStatMap;
    ///
    /// let mut map = OrderStatMap::new();
    /// map.insert(10, "a");
    /// map.insert(20, "b");
    ///
    /// assert_eq!(map.rank_of(&10), Some(0));
    /// assert_eq!(map.rank_of(&20), Some(1));
    /// assert_eq!(map.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).map(|handle| self.raw.rank_of_node(handle))
    }

    /// Returns the zero-based rank of the entry a cursor points to. The
    /// climb to the root costs O(log n).
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
    /// let (foo, _) = map.insert("foo", 2);
    /// map.insert("bar", 1);
    ///
    /// assert_eq!(map.rank_at(foo), 1);
    /// ```
    #[must_use]
    pub fn rank_at(&self, cursor: Cursor) -> usize {
        let handle = cursor.expect("`OrderStatMap::rank_at()`");
        self.raw.rank_of_node(handle)
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use tally_tree::{OrderStatMap, Rank};
///
/// let mut map = OrderStatMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// assert_eq!(map[Rank(0)], 1);
/// ```
impl<K, V> Index<Rank> for OrderStatMap<K, V> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.get_by_rank(rank.0).map(|(_, value)| value).expect("rank out of bounds")
    }
}

/// Mutably indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use tally_tree::{OrderStatMap, Rank};
///
/// let mut map = OrderStatMap::from([("a", 1), ("b", 2)]);
/// map[Rank(1)] = 5;
///
/// assert_eq!(map.get(&"b"), Some(&5));
/// ```
impl<K, V> IndexMut<Rank> for OrderStatMap<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        let len = self.len();
        self.get_by_rank_mut(rank.0)
            .map(|(_, value)| value)
            .unwrap_or_else(|| panic!("rank (is {}) should be < len (is {len})", rank.0))
    }
}
