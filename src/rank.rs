/// A zero-based rank into the sorted order of a map or set.
///
/// Indexing an [`OrderStatMap`](crate::OrderStatMap) by `Rank(i)` yields the
/// value whose key is the i-th smallest in the container.
///
/// # Examples
///
/// ```
/// use tally_tree::{OrderStatMap, Rank};
///
/// let mut map = OrderStatMap::new();
/// map.insert("a", 10);
/// map.insert("b", 20);
///
/// assert_eq!(map[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
