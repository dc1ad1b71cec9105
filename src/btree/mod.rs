//! B-tree implementation.
//!
//! This module provides an in-memory B-tree of minimum degree `t` that supports:
//! - Point lookups (contains/find)
//! - Insertions with pre-emptive splitting
//! - Deletions with borrow/merge rebalancing
//! - Lazy in-order traversal

mod delete;
mod insert;
mod iter;
mod tree;

pub use iter::Iter;
pub use tree::BTree;
