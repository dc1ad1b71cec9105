//! Common types used throughout the tree.

mod node_id;

pub use node_id::NodeId;

use crate::error::{BTreeError, Result};
use serde::{Deserialize, Serialize};

/// Key type stored in the tree
pub type Key = i64;

/// Smallest legal minimum degree
pub const MIN_DEGREE: usize = 2;

/// Default minimum degree (nodes hold 2..=5 keys)
pub const DEFAULT_MIN_DEGREE: usize = 3;

/// BTree configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BTreeConfig {
    /// Minimum degree `t`: non-root nodes hold between `t-1` and `2t-1` keys
    pub min_degree: usize,
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }
}

impl BTreeConfig {
    /// Create a config with the given minimum degree
    pub fn new(min_degree: usize) -> Self {
        Self { min_degree }
    }

    /// Reject degrees below [`MIN_DEGREE`]
    pub fn validate(&self) -> Result<()> {
        if self.min_degree < MIN_DEGREE {
            return Err(BTreeError::InvalidDegree {
                degree: self.min_degree,
                min: MIN_DEGREE,
            });
        }
        Ok(())
    }

    /// Maximum keys per node (`2t-1`)
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Minimum keys per non-root node (`t-1`)
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    /// Maximum children per internal node (`2t`)
    pub fn max_children(&self) -> usize {
        2 * self.min_degree
    }
}
