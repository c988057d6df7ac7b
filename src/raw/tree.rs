use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;

use rand::Rng;

use crate::weight::Weight;

use super::handle::Handle;
use super::node::{Color, CountTally, Node, Tally, WeightTally};
use super::pool::Pool;

/// The augmented red-black tree backing every container in this crate.
///
/// Generic over the tally kind `A`, which is all that distinguishes the
/// order-statistic tree from the sampling tree: the rebalancing machinery,
/// the descent-time tally arithmetic and the deletion protocol are shared.
/// Tally-specific queries (rank descent, weighted sampling) live in
/// inherent impls on the two concrete instantiations below.
pub(crate) struct RawTree<K, V, A> {
    pool: Pool<Node<K, V, A>>,
    root: Option<Handle>,
}

impl<K, V, A: Tally> RawTree<K, V, A> {
    pub(crate) const fn new() -> Self {
        Self {
            pool: Pool::new(),
            root: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V, A> {
        self.pool.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V, A> {
        self.pool.get_mut(handle)
    }

    pub(crate) fn clear(&mut self) {
        self.pool.clear();
        self.root = None;
    }

    // ─── Relationship queries ────────────────────────────────────────────

    fn color_of(&self, handle: Option<Handle>) -> Color {
        handle.map_or(Color::Black, |h| self.node(h).color)
    }

    fn is_left_child(&self, handle: Handle) -> bool {
        self.node(handle).parent.is_some_and(|p| self.node(p).left == Some(handle))
    }

    fn sibling(&self, handle: Handle) -> Option<Handle> {
        let parent = self.node(handle).parent?;
        if self.node(parent).left == Some(handle) {
            self.node(parent).right
        } else {
            self.node(parent).left
        }
    }

    fn uncle(&self, handle: Handle) -> Option<Handle> {
        let parent = self.node(handle).parent?;
        let grandparent = self.node(parent).parent?;
        if self.node(grandparent).left == Some(parent) {
            self.node(grandparent).right
        } else {
            self.node(grandparent).left
        }
    }

    // ─── Tally maintenance ───────────────────────────────────────────────

    fn refresh_tally(&mut self, handle: Handle) {
        let node = self.node(handle);
        let left = node.left.map(|l| self.node(l).tally);
        let right = node.right.map(|r| self.node(r).tally);
        self.node_mut(handle).tally.refresh(left.as_ref(), right.as_ref());
    }

    /// Applies `apply` to the tally of `from` and of every ancestor, in
    /// leaf-to-root order.
    fn for_each_to_root(&mut self, from: Handle, mut apply: impl FnMut(&mut A)) {
        let mut current = Some(from);
        while let Some(c) = current {
            apply(&mut self.node_mut(c).tally);
            current = self.node(c).parent;
        }
    }

    // ─── Rotations ───────────────────────────────────────────────────────

    /// Re-hangs `new_parent` in `handle`'s place and pivots `handle` below
    /// it; the shared prologue of both rotations.
    fn move_down(&mut self, handle: Handle, new_parent: Handle) {
        let parent = self.node(handle).parent;
        if let Some(p) = parent {
            if self.node(p).left == Some(handle) {
                self.node_mut(p).left = Some(new_parent);
            } else {
                self.node_mut(p).right = Some(new_parent);
            }
        }
        self.node_mut(new_parent).parent = parent;
        self.node_mut(handle).parent = Some(new_parent);
    }

    fn rotate_left(&mut self, handle: Handle) {
        let new_parent = self.node(handle).right.expect("`rotate_left()` - pivot has no right child!");
        if self.root == Some(handle) {
            self.root = Some(new_parent);
        }
        self.move_down(handle, new_parent);

        let inner = self.node(new_parent).left;
        self.node_mut(handle).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(handle);
        }
        self.node_mut(new_parent).left = Some(handle);

        // Lower node first: the promoted node aggregates over the pivot.
        self.refresh_tally(handle);
        self.refresh_tally(new_parent);
    }

    fn rotate_right(&mut self, handle: Handle) {
        let new_parent = self.node(handle).left.expect("`rotate_right()` - pivot has no left child!");
        if self.root == Some(handle) {
            self.root = Some(new_parent);
        }
        self.move_down(handle, new_parent);

        let inner = self.node(new_parent).right;
        self.node_mut(handle).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(handle);
        }
        self.node_mut(new_parent).right = Some(handle);

        self.refresh_tally(handle);
        self.refresh_tally(new_parent);
    }

    fn swap_colors(&mut self, a: Handle, b: Handle) {
        let color_a = self.node(a).color;
        let color_b = self.node(b).color;
        self.node_mut(a).color = color_b;
        self.node_mut(b).color = color_a;
    }

    // ─── Insertion fixup ─────────────────────────────────────────────────

    /// Restores the red-black invariants after attaching the red node `x`.
    fn fix_red_red(&mut self, mut x: Handle) {
        loop {
            if self.root == Some(x) {
                self.node_mut(x).color = Color::Black;
                return;
            }

            let parent = self.node(x).parent.expect("`fix_red_red()` - non-root node has a parent!");
            if self.node(parent).color == Color::Black {
                return;
            }
            // A red parent is never the root, so a grandparent exists.
            let grandparent = self.node(parent).parent.expect("`fix_red_red()` - red node has a parent!");
            let uncle = self.uncle(x);

            if self.color_of(uncle) == Color::Red {
                // Red uncle: recolor and continue from the grandparent.
                self.node_mut(parent).color = Color::Black;
                self.node_mut(uncle.unwrap()).color = Color::Black;
                self.node_mut(grandparent).color = Color::Red;
                x = grandparent;
                continue;
            }

            // Black uncle: one or two rotations, then done. Inner cases
            // rotate the parent first to become outer cases.
            if self.is_left_child(parent) {
                if self.is_left_child(x) {
                    self.swap_colors(parent, grandparent);
                } else {
                    self.rotate_left(parent);
                    self.swap_colors(x, grandparent);
                }
                self.rotate_right(grandparent);
            } else {
                if self.is_left_child(x) {
                    self.rotate_right(parent);
                    self.swap_colors(x, grandparent);
                } else {
                    self.swap_colors(parent, grandparent);
                }
                self.rotate_left(grandparent);
            }
            return;
        }
    }

    // ─── Deletion fixup ──────────────────────────────────────────────────

    /// Resolves the double-black imbalance sitting on `x` by sibling
    /// casework. Every recursive step of the textbook formulation is a
    /// tail call, so this is a loop.
    fn fix_double_black(&mut self, mut x: Handle) {
        loop {
            if self.root == Some(x) {
                return;
            }

            let parent = self.node(x).parent.expect("`fix_double_black()` - non-root node has a parent!");
            let Some(sibling) = self.sibling(x) else {
                // No sibling: push the double black up.
                x = parent;
                continue;
            };

            if self.node(sibling).color == Color::Red {
                // Red sibling: rotate it over the parent to get a black
                // sibling, then resolve at the same node.
                self.node_mut(parent).color = Color::Red;
                self.node_mut(sibling).color = Color::Black;
                if self.is_left_child(sibling) {
                    self.rotate_right(parent);
                } else {
                    self.rotate_left(parent);
                }
                continue;
            }

            let sibling_left = self.node(sibling).left;
            let sibling_right = self.node(sibling).right;
            let left_red = self.color_of(sibling_left) == Color::Red;
            let right_red = self.color_of(sibling_right) == Color::Red;

            if left_red || right_red {
                // Black sibling with a red child: terminal rotations.
                let parent_color = self.node(parent).color;
                if left_red {
                    let sibling_left = sibling_left.unwrap();
                    if self.is_left_child(sibling) {
                        // left left
                        let sibling_color = self.node(sibling).color;
                        self.node_mut(sibling_left).color = sibling_color;
                        self.node_mut(sibling).color = parent_color;
                        self.rotate_right(parent);
                    } else {
                        // right left
                        self.node_mut(sibling_left).color = parent_color;
                        self.rotate_right(sibling);
                        self.rotate_left(parent);
                    }
                } else {
                    let sibling_right = sibling_right.unwrap();
                    if self.is_left_child(sibling) {
                        // left right
                        self.node_mut(sibling_right).color = parent_color;
                        self.rotate_left(sibling);
                        self.rotate_right(parent);
                    } else {
                        // right right
                        let sibling_color = self.node(sibling).color;
                        self.node_mut(sibling_right).color = sibling_color;
                        self.node_mut(sibling).color = parent_color;
                        self.rotate_left(parent);
                    }
                }
                self.node_mut(parent).color = Color::Black;
                return;
            }

            // Black sibling with two black children: recolor, and either
            // absorb the imbalance into a red parent or push it up.
            self.node_mut(sibling).color = Color::Red;
            if self.node(parent).color == Color::Black {
                x = parent;
                continue;
            }
            self.node_mut(parent).color = Color::Black;
            return;
        }
    }

    // ─── Swap-by-position ────────────────────────────────────────────────

    /// Physically trades the tree positions of `a` and `b` by rewiring
    /// links. Colors and position-bound tallies stay with the positions;
    /// payloads (and handles) stay with the nodes, which is what keeps
    /// outstanding cursors valid.
    fn swap_nodes(&mut self, a: Handle, b: Handle) {
        if self.root == Some(a) {
            self.root = Some(b);
        }

        if self.node(b).parent == Some(a) {
            self.swap_parent_child(a, b);
        } else {
            let (a_left, a_right, a_parent) = {
                let n = self.node(a);
                (n.left, n.right, n.parent)
            };
            let (b_left, b_right, b_parent) = {
                let n = self.node(b);
                (n.left, n.right, n.parent)
            };
            {
                let n = self.node_mut(a);
                n.left = b_left;
                n.right = b_right;
                n.parent = b_parent;
            }
            {
                let n = self.node_mut(b);
                n.left = a_left;
                n.right = a_right;
                n.parent = a_parent;
            }
        }

        self.reconnect(a, b);
        self.reconnect(b, a);

        debug_assert!(self.node(a).parent != Some(a));
        debug_assert!(self.node(b).parent != Some(b));

        self.swap_colors(a, b);
        let mut tally_a = self.node(a).tally;
        let mut tally_b = self.node(b).tally;
        tally_a.swap_with(&mut tally_b);
        self.node_mut(a).tally = tally_a;
        self.node_mut(b).tally = tally_b;
    }

    /// The direct parent/child special case of [`swap_nodes`]: the naive
    /// link exchange would make the child its own parent.
    fn swap_parent_child(&mut self, p: Handle, c: Handle) {
        if self.is_left_child(c) {
            let c_right = self.node(c).right;
            let p_right = self.node(p).right;
            self.node_mut(c).right = p_right;
            self.node_mut(p).right = c_right;

            let c_left = self.node(c).left;
            self.node_mut(p).left = c_left;
            self.node_mut(c).left = Some(p);
        } else {
            let c_left = self.node(c).left;
            let p_left = self.node(p).left;
            self.node_mut(c).left = p_left;
            self.node_mut(p).left = c_left;

            let c_right = self.node(c).right;
            self.node_mut(p).right = c_right;
            self.node_mut(c).right = Some(p);
        }

        let grandparent = self.node(p).parent;
        self.node_mut(c).parent = grandparent;
        self.node_mut(p).parent = Some(c);
    }

    /// Repairs the inbound links around `handle` after a swap: the parent
    /// still pointing at `old_position` is redirected, and both children
    /// get their parent link set.
    fn reconnect(&mut self, handle: Handle, old_position: Handle) {
        if let Some(parent) = self.node(handle).parent {
            if self.node(parent).left == Some(old_position) {
                self.node_mut(parent).left = Some(handle);
            } else if self.node(parent).right == Some(old_position) {
                self.node_mut(parent).right = Some(handle);
            }
        }

        let (left, right) = {
            let n = self.node(handle);
            (n.left, n.right)
        };
        if let Some(right) = right {
            self.node_mut(right).parent = Some(handle);
        }
        if let Some(left) = left {
            self.node_mut(left).parent = Some(handle);
        }
    }

    /// Splices out a node with at most one child, resolving any double
    /// black first (while the node is still wired in, so the fixup can see
    /// its sibling).
    fn detach_single(&mut self, handle: Handle) {
        let replacement = {
            let n = self.node(handle);
            n.left.or(n.right)
        };

        let both_black =
            self.node(handle).color == Color::Black && self.color_of(replacement) == Color::Black;
        if both_black {
            self.fix_double_black(handle);
        } else if let Some(replacement) = replacement {
            self.node_mut(replacement).color = Color::Black;
        } else if let Some(sibling) = self.sibling(handle) {
            // A red leaf is leaving; black heights are unaffected.
            self.node_mut(sibling).color = Color::Red;
        }

        let parent = self.node(handle).parent;
        if let Some(parent) = parent {
            if self.node(parent).left == Some(handle) {
                self.node_mut(parent).left = replacement;
            } else if self.node(parent).right == Some(handle) {
                self.node_mut(parent).right = replacement;
            }
        }
        if let Some(replacement) = replacement {
            self.node_mut(replacement).parent = parent;
        }
        if self.root == Some(handle) {
            self.root = replacement;
        }
    }

    // ─── In-order navigation ─────────────────────────────────────────────

    fn leftmost_from(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.node(handle).left {
            handle = left;
        }
        handle
    }

    fn rightmost_from(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.node(handle).right {
            handle = right;
        }
        handle
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost_from(root))
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.rightmost_from(root))
    }

    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.node(handle).right {
            return Some(self.leftmost_from(right));
        }
        // Climb while we are a right child, then one more up.
        let mut current = handle;
        loop {
            let parent = self.node(current).parent?;
            if self.node(parent).right == Some(current) {
                current = parent;
            } else {
                return Some(parent);
            }
        }
    }

    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        if let Some(left) = self.node(handle).left {
            return Some(self.rightmost_from(left));
        }
        let mut current = handle;
        loop {
            let parent = self.node(current).parent?;
            if self.node(parent).left == Some(current) {
                current = parent;
            } else {
                return Some(parent);
            }
        }
    }

    // ─── Lookup and mutation ─────────────────────────────────────────────

    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            match key.cmp(self.node(handle).key.borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => current = self.node(handle).left,
                Ordering::Greater => current = self.node(handle).right,
            }
        }
        None
    }

    /// Inserts `key` with the given payload and fresh tally. If the key is
    /// already present the existing node keeps its tally, only the value is
    /// replaced, and the second element of the result is false.
    ///
    /// The descent credits the incoming tally onto every node passed, so a
    /// late "key exists" discovery has to walk back up and undo.
    pub(crate) fn insert_with(&mut self, key: K, value: V, tally: A) -> (Handle, bool)
    where
        K: Ord,
    {
        let Some(root) = self.root else {
            let handle = self.pool.alloc(Node::new(key, value, tally, None));
            self.node_mut(handle).color = Color::Black;
            self.root = Some(handle);
            return (handle, true);
        };

        let delta = tally.unit();
        let mut current = root;
        let (parent, to_the_left) = loop {
            match key.cmp(&self.node(current).key) {
                Ordering::Equal => {
                    self.node_mut(current).value = value;
                    if let Some(parent) = self.node(current).parent {
                        self.for_each_to_root(parent, |tally| tally.debit(delta));
                    }
                    return (current, false);
                }
                Ordering::Less => {
                    self.node_mut(current).tally.credit(delta);
                    match self.node(current).left {
                        Some(left) => current = left,
                        None => break (current, true),
                    }
                }
                Ordering::Greater => {
                    self.node_mut(current).tally.credit(delta);
                    match self.node(current).right {
                        Some(right) => current = right,
                        None => break (current, false),
                    }
                }
            }
        };

        let handle = self.pool.alloc(Node::new(key, value, tally, Some(parent)));
        if to_the_left {
            self.node_mut(parent).left = Some(handle);
        } else {
            self.node_mut(parent).right = Some(handle);
        }
        self.fix_red_red(handle);
        (handle, true)
    }

    /// Removes the node at `handle` and returns its payload.
    ///
    /// Tally bookkeeping happens up front, so the stored aggregates already
    /// describe the post-removal tree when the double-black fixup runs and
    /// any refresh it performs recomputes those same values.
    pub(crate) fn erase_at(&mut self, handle: Handle) -> (K, V) {
        // The departing entry's contribution leaves its own position and
        // every strict ancestor.
        let delta = self.node(handle).tally.unit();
        self.for_each_to_root(handle, |tally| tally.debit(delta));

        let (left, right) = {
            let n = self.node(handle);
            (n.left, n.right)
        };
        if left.is_some() && let Some(right) = right {
            // Two children: trade places with the in-order successor so
            // the node to splice out has at most one child. Rewiring, not
            // payload copying - cursors on both entries stay valid.
            let successor = self.leftmost_from(right);
            let successor_delta = self.node(successor).tally.unit();
            self.swap_nodes(handle, successor);

            // The successor moved above this whole sub-path: every
            // position from the target's new slot up to (exclusive) the
            // successor's new slot loses the successor's contribution.
            let mut current = handle;
            while current != successor {
                self.node_mut(current).tally.debit(successor_delta);
                current = self
                    .node(current)
                    .parent
                    .expect("`erase_at()` - successor is an ancestor after the swap!");
            }
        }

        self.detach_single(handle);
        let node = self.pool.take(handle);
        (node.key, node.value)
    }

    /// Tears the tree down in key order, returning every entry. Used by the
    /// owning iterators; the structure is dismantled without rebalancing.
    pub(crate) fn drain_in_order(&mut self) -> Vec<(K, V, A)> {
        let mut handles = Vec::with_capacity(self.pool.len());
        let mut current = self.first();
        while let Some(handle) = current {
            handles.push(handle);
            current = self.successor(handle);
        }

        let mut result = Vec::with_capacity(handles.len());
        for handle in handles {
            let node = self.pool.take(handle);
            result.push((node.key, node.value, node.tally));
        }
        self.root = None;
        self.pool.clear();
        result
    }

    // ─── Consistency audit ───────────────────────────────────────────────

    /// Validates the full invariant set: strict key order, red-black shape
    /// (black root, no red-red edge, equal black heights), parent-child
    /// link agreement, and tally correctness on every node. Read-only;
    /// meant for tests and debugging.
    pub(crate) fn check_consistency(&self) -> bool
    where
        K: Ord,
    {
        let Some(root) = self.root else {
            return self.pool.is_empty();
        };
        if self.node(root).parent.is_some() || self.node(root).color != Color::Black {
            return false;
        }
        self.audit(root, None, None).is_some()
    }

    /// Returns the black height and recomputed tally of the subtree at
    /// `handle`, or `None` if any invariant is violated. `low`/`high` are
    /// the exclusive key bounds inherited from the ancestors.
    fn audit(&self, handle: Handle, low: Option<&K>, high: Option<&K>) -> Option<(usize, A)>
    where
        K: Ord,
    {
        let node = self.node(handle);
        if let Some(low) = low
            && node.key <= *low
        {
            return None;
        }
        if let Some(high) = high
            && node.key >= *high
        {
            return None;
        }

        for child in [node.left, node.right] {
            if let Some(child) = child {
                if self.node(child).parent != Some(handle) {
                    return None;
                }
                if node.color == Color::Red && self.node(child).color == Color::Red {
                    return None;
                }
            }
        }

        let left = match node.left {
            Some(left) => Some(self.audit(left, low, Some(&node.key))?),
            None => None,
        };
        let right = match node.right {
            Some(right) => Some(self.audit(right, Some(&node.key), high)?),
            None => None,
        };

        // Absent children count as black leaves.
        let left_height = left.as_ref().map_or(1, |(height, _)| *height);
        let right_height = right.as_ref().map_or(1, |(height, _)| *height);
        if left_height != right_height {
            return None;
        }

        let mut recomputed = node.tally.reset();
        recomputed.refresh(left.as_ref().map(|(_, t)| t), right.as_ref().map(|(_, t)| t));
        if !node.tally.consistent_with(&recomputed) {
            return None;
        }

        Some((left_height + usize::from(node.color == Color::Black), recomputed))
    }
}

// ─── Count-specific operations ───────────────────────────────────────────

impl<K, V> RawTree<K, V, CountTally> {
    pub(crate) fn len(&self) -> usize {
        self.root.map_or(0, |root| self.node(root).tally.subtree_size)
    }

    /// Descends to the node holding the i-th smallest key, guided by the
    /// subtree counts. Returns `None` if `rank >= len()`.
    pub(crate) fn find_by_rank(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len() {
            return None;
        }

        let mut current = self.root.expect("`find_by_rank()` - in-range rank implies a root!");
        let mut before = 0;
        loop {
            let node = self.node(current);
            let here = before + node.left.map_or(0, |l| self.node(l).tally.subtree_size);
            match rank.cmp(&here) {
                Ordering::Equal => return Some(current),
                Ordering::Less => {
                    current = node.left.expect("`find_by_rank()` - rank descends into a populated subtree!");
                }
                Ordering::Greater => {
                    before = here + 1;
                    current = node.right.expect("`find_by_rank()` - rank descends into a populated subtree!");
                }
            }
        }
    }

    /// Number of keys strictly smaller than the one at `handle`: the left
    /// subtree, plus - for every ancestor we sit right of - everything in
    /// that ancestor's subtree that is not ours.
    pub(crate) fn rank_of_node(&self, handle: Handle) -> usize {
        let mut rank = self.node(handle).left.map_or(0, |l| self.node(l).tally.subtree_size);
        let mut current = handle;
        while let Some(parent) = self.node(current).parent {
            if self.node(parent).right == Some(current) {
                rank += self.node(parent).tally.subtree_size - self.node(current).tally.subtree_size;
            }
            current = parent;
        }
        rank
    }
}

// ─── Weight-specific operations ──────────────────────────────────────────

impl<K, V, W: Weight> RawTree<K, V, WeightTally<W>> {
    pub(crate) fn total_weight(&self) -> W {
        self.root.map_or_else(W::default, |root| self.node(root).tally.subtree_weight)
    }

    pub(crate) fn weight_of(&self, handle: Handle) -> W {
        self.node(handle).tally.weight
    }

    /// Draws one uniform position and resolves it. Null when the tree is
    /// empty or all weight is zero.
    pub(crate) fn sample_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Handle> {
        self.root?;
        let total = self.total_weight();
        if total <= W::default() {
            return None;
        }
        self.sample_at(W::draw_position(rng, total))
    }

    /// Resolves a sampling position: the node satisfying
    /// `weight(entries before it) <= position < weight(entries before it) + own weight`.
    ///
    /// Total over all inputs: positions outside the admissible range give
    /// `None`. For float weights a position of exactly the total weight
    /// (within a couple of ulps) resolves to the maximum entry.
    pub(crate) fn sample_at(&self, position: W) -> Option<Handle> {
        let root = self.root?;
        let total = self.node(root).tally.subtree_weight;
        if !W::admissible(position, total) {
            return None;
        }

        let mut current = root;
        let mut before = W::default();
        loop {
            let node = self.node(current);
            let mut lower = before;
            if let Some(left) = node.left {
                lower += self.node(left).tally.subtree_weight;
            }

            if position < lower {
                current = node.left.expect("`sample_at()` - a position below `lower` implies weight on the left!");
            } else if position < lower + node.tally.weight {
                return Some(current);
            } else if let Some(right) = node.right {
                before = lower + node.tally.weight;
                current = right;
            } else {
                // Only reachable for float weights: the admissible sliver
                // at the total resolves to the maximum entry.
                return Some(current);
            }
        }
    }

    /// Re-weights one entry and repairs every aggregate on its root path.
    /// The walk direction is split so unsigned weights never underflow.
    pub(crate) fn set_weight(&mut self, handle: Handle, weight: W) {
        let old = self.node(handle).tally.weight;
        self.node_mut(handle).tally.weight = weight;

        if weight > old {
            let delta = weight - old;
            self.for_each_to_root(handle, |tally| tally.credit(delta));
        } else if old > weight {
            let delta = old - weight;
            self.for_each_to_root(handle, |tally| tally.debit(delta));
        }
    }
}
