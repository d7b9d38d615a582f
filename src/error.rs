use std::{error, fmt};

/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum Error<K> {
    /// Returned by create() API when an equal key is already present.
    DuplicateKey,
    /// Fatal case, root node is colored red.
    RedRoot,
    /// Fatal case, a red node has a red child.
    ConsecutiveReds,
    /// Fatal case, left and right sub-trees differ in black height. The
    /// String component of this variant can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, index entries are not in sort-order. Carries the
    /// out-of-order key and the key it was compared against.
    SortError(K, K),
    /// Fatal case, parent back-link does not match the child link.
    BrokenLink(String),
}

impl<K> fmt::Display for Error<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DuplicateKey => write!(f, "key already present"),
            Error::RedRoot => write!(f, "root node is red"),
            Error::ConsecutiveReds => write!(f, "consecutive red nodes"),
            Error::UnbalancedBlacks(msg) => write!(f, "unbalanced blacks, {}", msg),
            Error::SortError(key, other) => {
                write!(f, "key {:?} out of order against {:?}", key, other)
            }
            Error::BrokenLink(msg) => write!(f, "broken parent link, {}", msg),
        }
    }
}

impl<K> error::Error for Error<K> where K: fmt::Debug {}
