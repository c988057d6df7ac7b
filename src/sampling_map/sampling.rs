use rand::Rng;

use crate::cursor::Cursor;
use crate::weight::Weight;

use super::SamplingMap;

impl<K, V, W: Weight> SamplingMap<K, V, W> {
    /// Returns the sum of all entry weights, or zero for an empty map.
    ///
    /// For integer weights this is exact; for float weights it is the
    /// incrementally maintained sum, which can drift from the freshly
    /// recomputed one by a few ulps.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let map = SamplingMap::from([("a", 0, 1u32), ("b", 0, 2), ("c", 0, 1)]);
    /// assert_eq!(map.total_weight(), 4);
    /// ```
    #[must_use]
    pub fn total_weight(&self) -> W {
        self.raw.total_weight()
    }

    /// Returns the weight of the entry a cursor points to.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null.
    #[must_use]
    pub fn weight_at(&self, cursor: Cursor) -> W {
        let handle = cursor.expect("`SamplingMap::weight_at()`");
        self.raw.weight_of(handle)
    }

    /// Changes the weight of the entry a cursor points to, repairing the
    /// subtree weight of every ancestor. The cursor stays valid. O(log n).
    ///
    /// # Panics
    ///
    /// Panics if `cursor` is null.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let mut map = SamplingMap::from([(0, (), 1u32), (1, (), 2), (2, (), 1)]);
    /// let cursor = map.find(&0);
    /// map.set_weight(cursor, 3);
    ///
    /// assert_eq!(map.weight_at(cursor), 3);
    /// assert_eq!(map.total_weight(), 6);
    /// ```
    pub fn set_weight(&mut self, cursor: Cursor, weight: W) {
        let handle = cursor.expect("`SamplingMap::set_weight()`");
        self.raw.set_weight(handle, weight);
    }

    /// Draws a random entry with probability proportional to its weight.
    ///
    /// Returns the null cursor if the map is empty or the total weight is
    /// zero. Consumes exactly one uniform draw from `rng`: integer weights
    /// draw a position in `[0, total - 1]`, float weights in `[0, total)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    /// use rand::SeedableRng;
    ///
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
    ///
    /// let empty: SamplingMap<i32, (), u32> = SamplingMap::new();
    /// assert!(empty.sample(&mut rng).is_null());
    ///
    /// let map = SamplingMap::from([("a", (), 1u32), ("b", (), 3)]);
    /// let cursor = map.sample(&mut rng);
    /// assert!(!cursor.is_null());
    /// ```
    #[must_use]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Cursor {
        Cursor(self.raw.sample_rng(rng))
    }

    /// Resolves an explicit sampling position: returns a cursor to the
    /// entry satisfying
    ///
    /// `weight(entries before it) <= position < weight(before it) + own weight`
    ///
    /// This is a total function. Positions outside `[0, total_weight())`
    /// yield the null cursor, except that for float weights a position of
    /// exactly the total weight resolves to the maximum entry, with a
    /// tolerance of a couple of ulps above it.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let map = SamplingMap::from([(0, (), 1u32), (1, (), 2), (2, (), 1)]);
    /// let key_at = |p| *map.get_at(map.sample_at(p)).0;
    ///
    /// assert_eq!(key_at(0), 0);
    /// assert_eq!(key_at(1), 1);
    /// assert_eq!(key_at(2), 1);
    /// assert_eq!(key_at(3), 2);
    /// assert!(map.sample_at(4).is_null());
    /// ```
    #[must_use]
    pub fn sample_at(&self, position: W) -> Cursor {
        Cursor(self.raw.sample_at(position))
    }

    /// Samples from a position scaled into `[0, 1]`:
    /// `sample_at(u * total_weight())`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingMap;
    ///
    /// let map = SamplingMap::from([("a", (), 1.5f64), ("c", (), 2.0)]);
    /// let cursor = map.sample_scaled(0.99);
    /// assert_eq!(map.get_at(cursor).0, &"c");
    /// ```
    #[must_use]
    pub fn sample_scaled(&self, u: f64) -> Cursor {
        self.sample_at(W::scale(self.total_weight(), u))
    }
}
