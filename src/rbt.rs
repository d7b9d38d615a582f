use std::{
    borrow::Borrow,
    cmp::Ordering,
    mem,
};

use log::{debug, trace};
use rand::Rng;

use crate::config::{Config, Duplicates};
use crate::depth::Depth;
use crate::error::Error;

/// Rbt manage a single instance of in-memory index using a classic
/// [red-black][rbt] tree, with parent links.
///
/// Nodes live in an arena owned by the tree and refer to each other by
/// slot index, so parent links are plain back-references. Slots released
/// by [`Rbt::delete`] are reused by later inserts.
///
/// Rbt is not thread safe by itself, applications sharing an instance
/// across threads shall serialize all access, say, with a `Mutex`.
///
/// [rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
#[derive(Clone)]
pub struct Rbt<K>
where
    K: Ord,
{
    name: String,
    config: Config,
    nodes: Vec<Option<Node<K>>>,
    free: Vec<usize>, // released slots in nodes.
    root: Option<usize>,
    n_count: usize, // number of entries in the tree.
}

/// Opaque reference to a node in [`Rbt`], returned by insert and search.
/// A handle is valid until the next delete on the same instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(usize);

/// Color tag on every node, absent leaf-slots count as Black.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dir {
    Left,
    Right,
}

impl Dir {
    #[inline]
    fn flip(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Different ways to construct a new Rbt instance.
impl<K> Rbt<K>
where
    K: Ord,
{
    /// Create an empty instance of Rbt, identified by `name`, with
    /// default [`Config`].
    pub fn new<S>(name: S) -> Rbt<K>
    where
        S: AsRef<str>,
    {
        Rbt::with_config(name, Default::default())
    }

    /// Create an empty instance of Rbt, identified by `name`.
    pub fn with_config<S>(name: S, config: Config) -> Rbt<K>
    where
        S: AsRef<str>,
    {
        Rbt {
            name: name.as_ref().to_string(),
            nodes: Vec::with_capacity(config.capacity),
            config,
            free: Default::default(),
            root: Default::default(),
            n_count: Default::default(),
        }
    }
}

/// Maintenance API.
impl<K> Rbt<K>
where
    K: Ord,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating Rbt instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return quickly with basic statisics, only entries() and
    /// node_size() are valid with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<K>>())
    }
}

/// Write operations on Rbt instance.
impl<K> Rbt<K>
where
    K: Ord,
{
    /// Insert `key` into the index and return a handle to the node
    /// holding it. With [`Duplicates::Allow`] an equal key is placed
    /// after the existing ones, with [`Duplicates::Overwrite`] it
    /// replaces the existing key.
    pub fn insert(&mut self, key: K) -> Handle {
        let (mut parent, mut link, mut go_left) = (None, self.root, false);
        while let Some(id) = link {
            let (ord, left, right) = {
                let node = self.node(id);
                (key.cmp(&node.key), node.left, node.right)
            };
            match ord {
                Ordering::Equal if self.config.duplicates == Duplicates::Overwrite => {
                    self.node_mut(id).key = key;
                    return Handle(id);
                }
                Ordering::Less => {
                    link = left;
                    go_left = true;
                }
                _ => {
                    link = right;
                    go_left = false;
                }
            }
            parent = Some(id);
        }

        let id = self.alloc(Node::new(key, parent));
        match parent {
            None => self.root = Some(id),
            Some(p) if go_left => self.node_mut(p).left = Some(id),
            Some(p) => self.node_mut(p).right = Some(id),
        }
        self.n_count += 1;
        debug!(target: "rbt", "{} insert slot:{} parent:{:?}", self.name, id, parent);

        self.insert_fixup(id);
        Handle(id)
    }

    /// Create a new entry for `key`. If an equal key is already present
    /// return error, leaving the index untouched.
    pub fn create(&mut self, key: K) -> Result<Handle, Error<K>> {
        match self.search(&key) {
            Some(_) => Err(Error::DuplicateKey),
            None => Ok(self.insert(key)),
        }
    }

    /// Delete key from this instance and return the removed key. If key
    /// is not present, then delete is effectively a no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Handle(target) = self.search(key)?;

        // physically remove a node with at most one child.
        let spliced = match (self.node(target).left, self.node(target).right) {
            (Some(_), Some(right)) => self.leftmost(right),
            _ => target,
        };
        let (child, parent) = {
            let node = self.node(spliced);
            (node.left.or(node.right), node.parent)
        };
        self.transplant(spliced, child);

        let removed = self.release(spliced);
        let old_key = if spliced == target {
            removed.key
        } else {
            mem::replace(&mut self.node_mut(target).key, removed.key)
        };
        self.n_count -= 1;
        debug!(
            target: "rbt",
            "{} delete slot:{} spliced:{} color:{:?}", self.name, target, spliced, removed.color
        );

        if removed.color == Color::Black {
            self.delete_fixup(child, parent);
        }
        Some(old_key)
    }

    /// Validate red-black tree with following rules:
    ///
    /// * Root node, if present, is black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Parent link of every node points back to its parent.
    /// * Make sure keys are in sorted order.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, Error<K>>
    where
        K: Clone,
    {
        if self.color_of(self.root) == Color::Red {
            return Err(Error::RedRoot);
        }

        let mut stats = self.stats();
        let mut depths = Depth::new();
        let blacks = self.validate_tree(self.root, None, false, 0, 0, &mut depths)?;

        let mut prev: Option<&K> = None;
        for key in self.iter() {
            match prev {
                Some(prev) if key.lt(prev) => {
                    return Err(Error::SortError(key.clone(), prev.clone()));
                }
                _ => (),
            }
            prev = Some(key);
        }

        stats.set_blacks(blacks);
        stats.set_depths(depths);
        Ok(stats)
    }
}

/// Read operations on Rbt instance.
impl<K> Rbt<K>
where
    K: Ord,
{
    /// Search for key, return a handle to the first matching node on the
    /// search path.
    pub fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut link = self.root;
        while let Some(id) = link {
            let node = self.node(id);
            link = match node.key.borrow().cmp(key) {
                Ordering::Less => node.right,
                Ordering::Greater => node.left,
                Ordering::Equal => return Some(Handle(id)),
            };
        }
        None
    }

    /// Return the key held by the node behind `handle`.
    pub fn get(&self, handle: Handle) -> Option<&K> {
        self.slot(handle.0).map(|node| &node.key)
    }

    /// Return the color of the node behind `handle`.
    pub fn color(&self, handle: Handle) -> Option<Color> {
        self.slot(handle.0).map(|node| node.color)
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<&K> {
        let mut id = self.root?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let node = self.node(id);
            let next = match rng.gen::<u8>() % 2 {
                0 => node.left,
                _ => node.right,
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    id = next;
                }
                _ => break Some(&node.key),
            }
        }
    }

    /// Return an iterator over all keys in this instance, in sort order.
    pub fn iter(&self) -> Iter<K> {
        let mut iter = Iter {
            tree: self,
            stack: vec![],
        };
        iter.push_left(self.root);
        iter
    }
}

impl<K> Rbt<K>
where
    K: Ord,
{
    fn insert_fixup(&mut self, mut node: usize) {
        while let Some(parent) = self.node(node).parent {
            if self.node(parent).color == Color::Black {
                break;
            }
            // a red parent is never the root.
            let grand = match self.node(parent).parent {
                Some(grand) => grand,
                None => break,
            };
            let side = self.side_of(grand, parent);
            let uncle = self.child(grand, side.flip());

            if self.color_of(uncle) == Color::Red {
                trace!(target: "rbt", "insert-fixup red-uncle at {}", grand);
                self.set_color(parent, Color::Black);
                if let Some(uncle) = uncle {
                    self.set_color(uncle, Color::Black);
                }
                self.set_color(grand, Color::Red);
                node = grand;
                continue;
            }

            let mut parent = parent;
            if self.child(parent, side.flip()) == Some(node) {
                trace!(target: "rbt", "insert-fixup inner-child at {}", node);
                self.rotate(parent, side);
                parent = node;
            }
            trace!(target: "rbt", "insert-fixup outer-child at {}", grand);
            self.set_color(parent, Color::Black);
            self.set_color(grand, Color::Red);
            self.rotate(grand, side.flip());
            break;
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    // `node` may be an absent leaf-slot, hence `parent` is tracked along.
    fn delete_fixup(&mut self, mut node: Option<usize>, mut parent: Option<usize>) {
        while node != self.root && self.color_of(node) == Color::Black {
            let p = match parent {
                Some(p) => p,
                None => break,
            };
            let side = if self.node(p).left == node {
                Dir::Left
            } else {
                Dir::Right
            };

            let mut sibling = self.expect_child(p, side.flip());
            if self.node(sibling).color == Color::Red {
                trace!(target: "rbt", "delete-fixup red-sibling at {}", sibling);
                self.set_color(sibling, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, side);
                sibling = self.expect_child(p, side.flip());
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.flip());
            if self.color_of(near) == Color::Black && self.color_of(far) == Color::Black {
                trace!(target: "rbt", "delete-fixup black-nephews at {}", sibling);
                self.set_color(sibling, Color::Red);
                node = Some(p);
                parent = self.node(p).parent;
                continue;
            }

            if self.color_of(far) == Color::Black {
                trace!(target: "rbt", "delete-fixup red-near-nephew at {}", sibling);
                if let Some(near) = near {
                    self.set_color(near, Color::Black);
                }
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.flip());
                sibling = self.expect_child(p, side.flip());
            }

            trace!(target: "rbt", "delete-fixup red-far-nephew at {}", sibling);
            let color = self.node(p).color;
            self.set_color(sibling, color);
            self.set_color(p, Color::Black);
            if let Some(far) = self.child(sibling, side.flip()) {
                self.set_color(far, Color::Black);
            }
            self.rotate(p, side);
            node = self.root;
            break;
        }

        if let Some(id) = node {
            self.set_color(id, Color::Black);
        }
    }

    // Replace the sub-tree at `old` with the sub-tree at `new`, in old's
    // parent slot. Links of `old` are left untouched.
    fn transplant(&mut self, old: usize, new: Option<usize>) {
        let parent = self.node(old).parent;
        match parent {
            None => self.root = new,
            Some(p) if self.node(p).left == Some(old) => self.node_mut(p).left = new,
            Some(p) => self.node_mut(p).right = new,
        }
        if let Some(new) = new {
            self.node_mut(new).parent = parent;
        }
    }

    fn leftmost(&self, mut id: usize) -> usize {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    fn validate_tree(
        &self,
        link: Option<usize>,
        parent: Option<usize>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        depths: &mut Depth,
    ) -> Result<usize, Error<K>> {
        let id = match link {
            None => {
                depths.sample(depth);
                return Ok(nb);
            }
            Some(id) => id,
        };

        let node = self.node(id);
        if node.parent != parent {
            let err = format!("slot:{} parent:{:?} expected:{:?}", id, node.parent, parent);
            return Err(Error::BrokenLink(err));
        }
        let red = node.color == Color::Red;
        if fromred && red {
            return Err(Error::ConsecutiveReds);
        }
        if !red {
            nb += 1;
        }
        let lblacks = self.validate_tree(node.left, link, red, nb, depth + 1, depths)?;
        let rblacks = self.validate_tree(node.right, link, red, nb, depth + 1, depths)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(err));
        }
        Ok(lblacks)
    }

    //--------- rotation routines ----------------

    #[inline]
    fn rotate(&mut self, id: usize, dir: Dir) {
        match dir {
            Dir::Left => self.rotate_left(id),
            Dir::Right => self.rotate_right(id),
        }
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //          left      x              node      xr
    //                   / \             /  \
    //                 xl   xr        left   xl
    //
    fn rotate_left(&mut self, node: usize) {
        let x = match self.node(node).right {
            Some(x) => x,
            None => panic!("rotate_left(): no right child ? Call the programmer"),
        };
        let xl = self.node(x).left;
        self.node_mut(node).right = xl;
        if let Some(xl) = xl {
            self.node_mut(xl).parent = Some(node);
        }
        self.transplant(node, Some(x));
        self.node_mut(x).left = Some(node);
        self.node_mut(node).parent = Some(x);
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //           x      right             xl      node
    //          / \                               / \
    //        xl   xr                            xr  right
    //
    fn rotate_right(&mut self, node: usize) {
        let x = match self.node(node).left {
            Some(x) => x,
            None => panic!("rotate_right(): no left child ? Call the programmer"),
        };
        let xr = self.node(x).right;
        self.node_mut(node).left = xr;
        if let Some(xr) = xr {
            self.node_mut(xr).parent = Some(node);
        }
        self.transplant(node, Some(x));
        self.node_mut(x).right = Some(node);
        self.node_mut(node).parent = Some(x);
    }

    //--------- arena routines ----------------

    fn alloc(&mut self, node: Node<K>) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: usize) -> Node<K> {
        match self.nodes.get_mut(id).and_then(Option::take) {
            Some(node) => {
                self.free.push(id);
                debug!(target: "rbt", "{} release slot:{}", self.name, id);
                node
            }
            None => panic!("release(): slot {} already free, call the programmer", id),
        }
    }

    #[inline]
    fn slot(&self, id: usize) -> Option<&Node<K>> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn root_link(&self) -> Option<usize> {
        self.root
    }

    pub(crate) fn node(&self, id: usize) -> &Node<K> {
        match self.slot(id) {
            Some(node) => node,
            None => panic!("node(): dangling link {}, call the programmer", id),
        }
    }

    fn node_mut(&mut self, id: usize) -> &mut Node<K> {
        match self.nodes.get_mut(id).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("node_mut(): dangling link {}, call the programmer", id),
        }
    }

    #[inline]
    fn child(&self, id: usize, dir: Dir) -> Option<usize> {
        let node = self.node(id);
        match dir {
            Dir::Left => node.left,
            Dir::Right => node.right,
        }
    }

    fn expect_child(&self, id: usize, dir: Dir) -> usize {
        match self.child(id, dir) {
            Some(child) => child,
            None => panic!("expect_child(): {} has no {:?} child, call the programmer", id, dir),
        }
    }

    #[inline]
    fn side_of(&self, parent: usize, child: usize) -> Dir {
        if self.node(parent).left == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    #[inline]
    fn color_of(&self, link: Option<usize>) -> Color {
        link.map_or(Color::Black, |id| self.node(id).color)
    }

    #[inline]
    fn set_color(&mut self, id: usize, color: Color) {
        self.node_mut(id).color = color
    }
}

/// In-order iterator over keys in [`Rbt`].
pub struct Iter<'a, K>
where
    K: Ord,
{
    tree: &'a Rbt<K>,
    stack: Vec<usize>,
}

impl<'a, K> Iter<'a, K>
where
    K: Ord,
{
    fn push_left(&mut self, mut link: Option<usize>) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.tree.node(id).left;
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K>
where
    K: Ord,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.push_left(node.right);
        Some(&node.key)
    }
}

/// Node corresponds to a single entry in Rbt instance.
#[derive(Clone)]
pub(crate) struct Node<K>
where
    K: Ord,
{
    pub(crate) key: K,
    pub(crate) color: Color,
    pub(crate) left: Option<usize>,  // slot of left child
    pub(crate) right: Option<usize>, // slot of right child
    parent: Option<usize>,           // slot of parent, back-link
}

impl<K> Node<K>
where
    K: Ord,
{
    // new nodes are always red.
    fn new(key: K, parent: Option<usize>) -> Node<K> {
        Node {
            key,
            color: Color::Red,
            left: None,
            right: None,
            parent,
        }
    }
}

/// Statistics on [`Rbt`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`Rbt::stats`] method.
/// * To get full statisics via [`Rbt::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`Rbt`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `Rbt<K>`. Although
    /// the node overhead is constant, the node size varies based on
    /// key type. EG:
    ///
    /// ```
    /// use rbt_index::Rbt;
    /// let rbt: Rbt<u64> = Rbt::new("myinstance");
    ///
    /// // size of key: 8 bytes
    /// // overhead is 56 bytes
    /// assert_eq!(rbt.stats().node_size(), 64);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to leaf, same along every
    /// path.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics, None for an empty tree or when
    /// computed via [`Rbt::stats`].
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 1 => Some(depths.clone()),
            _ => None,
        }
    }
}
