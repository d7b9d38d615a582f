/// Policy applied by [`Rbt::insert`] when an equal key is already
/// indexed.
///
/// [`Rbt::insert`]: crate::Rbt::insert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Duplicates {
    /// Attach a new node, equal keys route to the right sub-tree. The
    /// tree behaves like an ordered multi-set.
    Allow,
    /// Replace the key held by the existing node, in place, without
    /// touching the tree shape. Useful when only part of the key takes
    /// part in ordering.
    Overwrite,
}

impl Default for Duplicates {
    fn default() -> Self {
        Duplicates::Allow
    }
}

/// Configuration for [`Rbt`] instances.
///
/// [`Rbt`]: crate::Rbt
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub(crate) duplicates: Duplicates,
    pub(crate) capacity: usize,
}

impl Config {
    /// Set the duplicate-key policy, default is [`Duplicates::Allow`].
    pub fn set_duplicates(mut self, duplicates: Duplicates) -> Config {
        self.duplicates = duplicates;
        self
    }

    /// Number of node slots to reserve up front.
    pub fn set_capacity(mut self, capacity: usize) -> Config {
        self.capacity = capacity;
        self
    }

    pub fn duplicates(&self) -> Duplicates {
        self.duplicates
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
