mod config;
mod depth;
mod error;
mod rbt;
mod render;

pub use crate::config::{Config, Duplicates};
pub use crate::depth::Depth;
pub use crate::error::Error;
pub use crate::rbt::{Color, Handle, Iter, Rbt, Stats};
pub use crate::render::{Side, Visit, Walk};

#[cfg(test)]
mod rbt_test;
