//! Prefix-keyed block registry.
//!
//! Two blocks with byte-identical prefixes share rendering state and
//! accumulate into one record. Insertion order defines emission order;
//! a prefix registers once no matter how often it recurs.

use std::collections::HashMap;

use crate::graph::{FillGraph, StrokeGraph};
use crate::line::LineId;

/// Accumulated state for one rendering-state prefix.
#[derive(Default)]
pub struct Block {
    /// Content line indices re-emitted verbatim, in input order.
    pub passthrough: Vec<LineId>,
    pub stroke: StrokeGraph,
    pub fill: FillGraph,
}

impl Block {
    pub fn has_paths(&self) -> bool {
        !self.stroke.is_empty() || !self.fill.is_empty()
    }
}

/// Insertion-ordered block registry.
#[derive(Default)]
pub struct Registry {
    blocks: HashMap<String, Block>,
    order: Vec<String>,
}

impl Registry {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Fetch the block for `prefix`, registering it (at the end of
    /// the emission order) on first encounter.
    pub fn entry(&mut self, prefix: &str) -> &mut Block {
        if !self.blocks.contains_key(prefix) {
            self.order.push(prefix.to_owned());
        }
        self.blocks.entry(prefix.to_owned()).or_default()
    }

    /// Remove every block, in insertion order.
    pub fn drain(&mut self) -> Vec<(String, Block)> {
        let order = std::mem::take(&mut self.order);
        let mut out = Vec::with_capacity(order.len());
        for prefix in order {
            if let Some(block) = self.blocks.remove(&prefix) {
                out.push((prefix, block));
            }
        }
        out
    }

    /// Soft-grouping flush: remove every block except `keep`, which
    /// survives with its accumulated state and becomes the sole
    /// remaining entry.
    pub fn drain_except(&mut self, keep: &str) -> Vec<(String, Block)> {
        let order = std::mem::take(&mut self.order);
        let mut out = Vec::with_capacity(order.len());
        for prefix in order {
            if prefix == keep {
                self.order.push(prefix);
            } else if let Some(block) = self.blocks.remove(&prefix) {
                out.push((prefix, block));
            }
        }
        out
    }
}
