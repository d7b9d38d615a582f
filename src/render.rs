use std::fmt;

use crate::rbt::{Color, Rbt};

/// Which link of its parent a visited node hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Root,
    Left,
    Right,
}

/// A node, as seen by [`Walk`].
#[derive(Debug, PartialEq)]
pub struct Visit<'a, K> {
    pub key: &'a K,
    pub color: Color,
    pub depth: usize,
    pub side: Side,
}

/// Pre-order walk over [`Rbt`]: a node, then its left sub-tree, then its
/// right sub-tree. Call [`Rbt::walk`] again to restart, a clone resumes
/// from where the original stands.
pub struct Walk<'a, K>
where
    K: Ord,
{
    tree: &'a Rbt<K>,
    stack: Vec<(usize, usize, Side)>, // (slot, depth, side)
}

impl<'a, K> Clone for Walk<'a, K>
where
    K: Ord,
{
    fn clone(&self) -> Self {
        Walk {
            tree: self.tree,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, K> Iterator for Walk<'a, K>
where
    K: Ord,
{
    type Item = Visit<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth, side) = self.stack.pop()?;
        let node = self.tree.node(id);
        if let Some(right) = node.right {
            self.stack.push((right, depth + 1, Side::Right));
        }
        if let Some(left) = node.left {
            self.stack.push((left, depth + 1, Side::Left));
        }
        Some(Visit {
            key: &node.key,
            color: node.color,
            depth,
            side,
        })
    }
}

/// Diagnostic API, read-only.
impl<K> Rbt<K>
where
    K: Ord,
{
    /// Return a pre-order walk over every node, along with its color and
    /// depth, root at depth 0.
    pub fn walk(&self) -> Walk<K> {
        let stack = match self.root_link() {
            Some(root) => vec![(root, 0, Side::Root)],
            None => vec![],
        };
        Walk { tree: self, stack }
    }

    /// Render the tree shape as text, one line per node. An empty tree
    /// renders as an empty string. EG:
    ///
    /// ```
    /// use rbt_index::Rbt;
    /// let mut rbt: Rbt<u32> = Rbt::new("render");
    /// rbt.insert(2);
    /// rbt.insert(1);
    /// rbt.insert(3);
    /// assert_eq!(rbt.render(), "\\-- 2 (B)\n  |-- 1 (R)\n  \\-- 3 (R)\n");
    /// ```
    pub fn render(&self) -> String
    where
        K: fmt::Display,
    {
        self.to_string()
    }
}

impl<K> fmt::Display for Rbt<K>
where
    K: Ord + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for visit in self.walk() {
            let marker = match visit.side {
                Side::Left => "|-- ",
                Side::Root | Side::Right => "\\-- ",
            };
            let color = match visit.color {
                Color::Black => "(B)",
                Color::Red => "(R)",
            };
            let indent = "  ".repeat(visit.depth);
            writeln!(f, "{}{}{} {}", indent, marker, visit.key, color)?;
        }
        Ok(())
    }
}
