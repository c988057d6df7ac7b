use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use rand::Rng;

use crate::sampling_map::{self, SamplingMap};
use crate::weight::Weight;

/// An ordered set of weighted keys with O(log n) proportional sampling.
///
/// `SamplingSet<K, W>` is a thin projection of
/// [`SamplingMap`]`<K, (), W>`: every operation delegates to the map.
///
/// Unlike the map, whose sampling operations report an impossible draw
/// through the null cursor, the set's [`sample`](SamplingSet::sample) and
/// [`sample_at`](SamplingSet::sample_at) return a bare `&K` and therefore
/// **panic** when there is nothing to sample - check
/// [`total_weight`](SamplingSet::total_weight) first.
///
/// # Examples
///
/// ```
/// use tally_tree::SamplingSet;
///
/// let mut set = SamplingSet::new();
/// set.insert("rare", 1u32);
/// set.insert("common", 9);
///
/// assert_eq!(set.total_weight(), 10);
/// assert_eq!(set.sample_at(0), &"common"); // keys sort "common" < "rare"
/// assert_eq!(set.sample_at(9), &"rare");
/// ```
pub struct SamplingSet<K, W> {
    map: SamplingMap<K, (), W>,
}

impl<K, W: Weight> SamplingSet<K, W> {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        SamplingSet {
            map: SamplingMap::new(),
        }
    }

    /// Returns the number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the set contains no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all keys.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the sum of all key weights, or zero for an empty set.
    #[must_use]
    pub fn total_weight(&self) -> W {
        self.map.total_weight()
    }

    /// Checks every container invariant; see
    /// [`SamplingMap::check_consistency`].
    #[must_use]
    pub fn check_consistency(&self) -> bool
    where
        K: Ord,
    {
        self.map.check_consistency()
    }

    /// Gets an iterator over `(key, weight)` pairs, in key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, W> {
        Iter {
            inner: self.map.iter(),
        }
    }

    /// Returns the keys and weights as a vector in key order.
    #[must_use]
    pub fn linearize(&self) -> Vec<(K, W)>
    where
        K: Clone,
    {
        self.iter().map(|(key, weight)| (key.clone(), weight)).collect()
    }

    /// Draws a random key with probability proportional to its weight,
    /// consuming exactly one uniform draw from `rng`.
    ///
    /// # Panics
    ///
    /// Panics if the set is empty or the total weight is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingSet;
    /// use rand::SeedableRng;
    ///
    /// let set = SamplingSet::from([("a", 1u32), ("b", 3)]);
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    /// let key = set.sample(&mut rng);
    /// assert!(*key == "a" || *key == "b");
    /// ```
    #[must_use]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &K {
        let cursor = self.map.sample(rng);
        assert!(!cursor.is_null(), "`SamplingSet::sample()` - nothing to sample (total weight is zero)");
        self.map.get_at(cursor).0
    }

    /// Returns the key at an explicit sampling position; see
    /// [`SamplingMap::sample_at`] for the position contract.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of range.
    #[must_use]
    pub fn sample_at(&self, position: W) -> &K {
        let cursor = self.map.sample_at(position);
        assert!(!cursor.is_null(), "`SamplingSet::sample_at()` - position out of range");
        self.map.get_at(cursor).0
    }

    /// Samples from a position scaled into `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if the scaled position is out of range.
    #[must_use]
    pub fn sample_scaled(&self, u: f64) -> &K {
        self.sample_at(W::scale(self.total_weight(), u))
    }
}

impl<K: Ord, W: Weight> SamplingSet<K, W> {
    /// Adds a key with the given weight. Returns whether the key was newly
    /// inserted; an existing key keeps its weight.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingSet;
    ///
    /// let mut set = SamplingSet::new();
    /// assert!(set.insert("a", 2u32));
    /// assert!(!set.insert("a", 5));
    /// assert_eq!(set.total_weight(), 2);
    /// ```
    pub fn insert(&mut self, key: K, weight: W) -> bool {
        self.map.insert(key, (), weight).1
    }

    /// Removes a key from the set. Returns whether the key was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.remove(key).is_some()
    }

    /// Returns true if the set contains the key.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.contains_key(key)
    }

    /// Changes the weight of an existing key. Returns whether the key was
    /// present.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::SamplingSet;
    ///
    /// let mut set = SamplingSet::from([("a", 2u32)]);
    /// assert!(set.set_weight(&"a", 7));
    /// assert!(!set.set_weight(&"b", 1));
    /// assert_eq!(set.total_weight(), 7);
    /// ```
    pub fn set_weight<Q>(&mut self, key: &Q, weight: W) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let cursor = self.map.find(key);
        if cursor.is_null() {
            return false;
        }
        self.map.set_weight(cursor, weight);
        true
    }
}

impl<K: Ord + Clone, W: Weight> Clone for SamplingSet<K, W> {
    fn clone(&self) -> Self {
        SamplingSet {
            map: self.map.clone(),
        }
    }
}

impl<K: fmt::Debug, W: Weight + fmt::Debug> fmt::Debug for SamplingSet<K, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, W: Weight> Default for SamplingSet<K, W> {
    fn default() -> Self {
        SamplingSet::new()
    }
}

impl<K: PartialEq, W: Weight> PartialEq for SamplingSet<K, W> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<K: Ord, W: Weight> FromIterator<(K, W)> for SamplingSet<K, W> {
    fn from_iter<I: IntoIterator<Item = (K, W)>>(iter: I) -> Self {
        let mut set = SamplingSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord, W: Weight> Extend<(K, W)> for SamplingSet<K, W> {
    fn extend<I: IntoIterator<Item = (K, W)>>(&mut self, iter: I) {
        for (key, weight) in iter {
            self.insert(key, weight);
        }
    }
}

impl<K: Ord, W: Weight, const N: usize> From<[(K, W); N]> for SamplingSet<K, W> {
    fn from(entries: [(K, W); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, W: Weight> IntoIterator for &'a SamplingSet<K, W> {
    type Item = (&'a K, W);
    type IntoIter = Iter<'a, K, W>;

    fn into_iter(self) -> Iter<'a, K, W> {
        self.iter()
    }
}

impl<K, W: Weight> IntoIterator for SamplingSet<K, W> {
    type Item = (K, W);
    type IntoIter = IntoIter<K, W>;

    fn into_iter(self) -> IntoIter<K, W> {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

/// An iterator over the `(key, weight)` pairs of a [`SamplingSet`], in key
/// order.
///
/// Created by [`SamplingSet::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, W> {
    inner: sampling_map::Iter<'a, K, (), W>,
}

impl<'a, K, W: Weight> Iterator for Iter<'a, K, W> {
    type Item = (&'a K, W);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _, weight)| (key, weight))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, W: Weight> DoubleEndedIterator for Iter<'_, K, W> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _, weight)| (key, weight))
    }
}

impl<K, W: Weight> ExactSizeIterator for Iter<'_, K, W> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, W: Weight> FusedIterator for Iter<'_, K, W> {}

impl<K, W> Clone for Iter<'_, K, W> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

/// An owning iterator over the `(key, weight)` pairs of a [`SamplingSet`],
/// in key order.
pub struct IntoIter<K, W> {
    inner: sampling_map::IntoIter<K, (), W>,
}

impl<K, W> Iterator for IntoIter<K, W> {
    type Item = (K, W);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, (), weight)| (key, weight))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, W> DoubleEndedIterator for IntoIter<K, W> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, (), weight)| (key, weight))
    }
}

impl<K, W> ExactSizeIterator for IntoIter<K, W> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, W> FusedIterator for IntoIter<K, W> {}
