//! A height-balanced (AVL) binary search tree over `i32` keys.

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. A leaf has height 0 and a missing subtree has
//   height -1.
// - The balance of a node `x` is `h(right(x)) - h(left(x))`.
//
// The invariants of the tree, which hold after every public operation:
// 1. Keys are strictly increasing in order.
// 2. Every node has a balance in {-1, 0, 1}.
// 3. Every node stores `h(x) = 1 + max(h(left(x)), h(right(x)))`.
//
// The tree is single-writer and has no internal synchronization; callers sharing one across
// threads must serialize access themselves.

use core::cmp::Ordering;

use log::{debug, trace};

mod debug;
mod error;
#[cfg(any(test, feature = "model"))]
pub mod model;
pub mod stats;
pub mod workload;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, DuplicateKey, WorkloadError};
pub use stats::{InstrumentedTree, OpKind, OpStats, Report, Sample, Summary};
pub use workload::{RunOutcome, Workload, WorkloadConfig};

type Link = Option<Box<Node>>;

/// A node of an [`AvlTree`].
///
/// Each node exclusively owns its two subtrees.
#[derive(Debug)]
pub struct Node {
    key: i32,
    height: i32,
    left: Link,
    right: Link,
}

impl Node {
    fn new(key: i32) -> Node {
        Node {
            key,
            height: 0,
            left: None,
            right: None,
        }
    }

    /// Returns the key stored in this node.
    #[inline]
    pub fn key(&self) -> i32 {
        self.key
    }

    /// Returns the height of the subtree rooted at this node. Leaves have height 0.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    #[inline]
    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    #[inline]
    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    #[inline]
    fn balance(&self) -> i32 {
        height(&self.right) - height(&self.left)
    }
}

/// An AVL tree: a binary search tree in which the heights of the two subtrees of every node
/// differ by at most one.
///
/// Insertion, deletion and lookup complete in _O(log(n))_ time.
#[derive(Debug, Default)]
pub struct AvlTree {
    root: Link,
    len: usize,
}

impl AvlTree {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        let empty = self.len == 0;

        debug_assert_eq!(empty, self.root.is_none());

        empty
    }

    /// Returns the number of keys in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the root node, or `None` if the tree is empty.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    /// Returns the height of the tree, which is -1 for an empty tree.
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    /// Inserts `key` into the tree.
    ///
    /// If `key` is already present the tree is left unchanged and [`DuplicateKey`] is returned;
    /// it is up to the caller whether that is fatal.
    pub fn insert(&mut self, key: i32) -> Result<(), DuplicateKey> {
        self.insert_counted(key, &mut 0)
    }

    /// Removes `key` from the tree, returning `true` if it was present.
    pub fn delete(&mut self, key: i32) -> bool {
        self.delete_counted(key, &mut 0)
    }

    /// Returns the node holding `key`.
    pub fn find(&self, key: i32) -> Option<&Node> {
        self.find_counted(key, &mut 0)
    }

    /// Returns `true` if the tree contains `key`.
    #[inline]
    pub fn contains(&self, key: i32) -> bool {
        self.find(key).is_some()
    }

    /// Clears the tree, removing all keys.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    // Counted operations =====================================================
    //
    // `visits` is incremented once for every node examined.

    pub(crate) fn insert_counted(
        &mut self,
        key: i32,
        visits: &mut usize,
    ) -> Result<(), DuplicateKey> {
        let result = insert_at(&mut self.root, key, visits);

        match result {
            Ok(()) => self.len += 1,
            Err(_) => debug!("rejected duplicate key {key}"),
        }

        result
    }

    pub(crate) fn delete_counted(&mut self, key: i32, visits: &mut usize) -> bool {
        let removed = delete_at(&mut self.root, key, visits);

        if removed {
            self.len -= 1;
        }

        removed
    }

    pub(crate) fn find_counted(&self, key: i32, visits: &mut usize) -> Option<&Node> {
        let mut opt_cur = self.root.as_deref();

        while let Some(cur) = opt_cur {
            *visits += 1;

            opt_cur = match key.cmp(&cur.key) {
                Ordering::Less => cur.left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => cur.right(),
            };
        }

        None
    }

    /// Checks every tree invariant, panicking on the first violation, and returns the keys in
    /// order.
    #[doc(hidden)]
    pub fn assert_invariants(&self) -> Vec<i32> {
        let mut keys = Vec::with_capacity(self.len);
        assert_invariants_at(&self.root, &mut keys);

        assert!(
            keys.windows(2).all(|w| w[0] < w[1]),
            "keys out of order: {keys:?}"
        );
        assert_eq!(keys.len(), self.len, "stored length is stale");

        keys
    }
}

// Returns the height of the subtree checked.
fn assert_invariants_at(link: &Link, keys: &mut Vec<i32>) -> i32 {
    let Some(node) = link else {
        return -1;
    };

    let left_height = assert_invariants_at(&node.left, keys);
    keys.push(node.key);
    let right_height = assert_invariants_at(&node.right, keys);

    assert_eq!(
        node.height,
        1 + left_height.max(right_height),
        "stale height at key {}",
        node.key
    );
    assert!(
        (right_height - left_height).abs() <= 1,
        "unbalanced at key {}: left {left_height}, right {right_height}",
        node.key
    );

    node.height
}

/// Returns the stored height of the subtree, or -1 if it is missing.
#[inline]
fn height(link: &Link) -> i32 {
    link.as_ref().map_or(-1, |node| node.height)
}

fn insert_at(slot: &mut Link, key: i32, visits: &mut usize) -> Result<(), DuplicateKey> {
    let Some(mut node) = slot.take() else {
        *slot = Some(Box::new(Node::new(key)));
        return Ok(());
    };

    *visits += 1;

    let result = match key.cmp(&node.key) {
        Ordering::Less => insert_at(&mut node.left, key, visits),
        Ordering::Equal => Err(DuplicateKey(key)),
        Ordering::Greater => insert_at(&mut node.right, key, visits),
    };

    *slot = Some(rebalance(node));
    result
}

fn delete_at(slot: &mut Link, key: i32, visits: &mut usize) -> bool {
    let Some(mut node) = slot.take() else {
        return false;
    };

    *visits += 1;

    let removed = match key.cmp(&node.key) {
        Ordering::Less => delete_at(&mut node.left, key, visits),
        Ordering::Greater => delete_at(&mut node.right, key, visits),
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            // A node with at most one child is replaced by that child, which is already
            // balanced.
            (None, None) => return true,
            (Some(child), None) | (None, Some(child)) => {
                *slot = Some(child);
                return true;
            }

            // Otherwise the in-order successor's key moves up and the successor is removed from
            // the right subtree instead.
            (Some(left), Some(right)) => {
                let successor = min_key(&right, visits);

                node.left = Some(left);
                node.right = Some(right);
                node.key = successor;

                delete_at(&mut node.right, successor, visits)
            }
        },
    };

    *slot = Some(rebalance(node));
    removed
}

// Returns the minimum key in the subtree rooted at `node`.
fn min_key(node: &Node, visits: &mut usize) -> i32 {
    let mut cur = node;

    while let Some(left) = cur.left() {
        *visits += 1;
        cur = left;
    }

    cur.key
}

// Restores the balance of `node`, whose subtrees are already balanced, and returns the new root
// of the subtree.
fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update_height();

    let balance = node.balance();

    if balance > 1 {
        // Right-heavy. If the inner grandchild is taller, rotate it outward first.
        if let Some(right) = node.right.take() {
            node.right = Some(if height(&right.right) >= height(&right.left) {
                right
            } else {
                rotate_right(right)
            });
        }

        rotate_left(node)
    } else if balance < -1 {
        if let Some(left) = node.left.take() {
            node.left = Some(if height(&left.left) >= height(&left.right) {
                left
            } else {
                rotate_left(left)
            });
        }

        rotate_right(node)
    } else {
        node
    }
}

// Moves `node`'s right child up into its place. Heights are updated bottom-up.
fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut up) = node.right.take() else {
        return node;
    };

    trace!("rotate left at {}, {} moves up", node.key, up.key);

    node.right = up.left.take();
    node.update_height();

    up.left = Some(node);
    up.update_height();
    up
}

// Moves `node`'s left child up into its place. Heights are updated bottom-up.
fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut up) = node.left.take() else {
        return node;
    };

    trace!("rotate right at {}, {} moves up", node.key, up.key);

    node.left = up.right.take();
    node.update_height();

    up.right = Some(node);
    up.update_height();
    up
}
