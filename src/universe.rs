use log::debug;
use thunderdome::Index;

use crate::cache::{CacheReport, NodeCache};
use crate::rule::Rule;

/// An unbounded Life-family universe backed by the hash-consed quadtree
/// engine.
///
/// The universe owns one [`NodeCache`] and the current root handle.
/// Coordinates are signed and centered on the root midpoint; y grows
/// northward. Advancing by `n` generations costs far less than `n` dense
/// steps whenever the pattern repeats itself in space or time.
pub struct Universe {
    cache: NodeCache,
    root: Index,
    generation: u64,
}

impl Universe {
    /// Empty universe under the given rule. Starts as the all-dead level-3
    /// root.
    pub fn new(rule: Rule) -> Self {
        let mut cache = NodeCache::new(rule);
        let root = cache.zero(3);
        Universe {
            cache,
            root,
            generation: 0,
        }
    }

    pub fn rule(&self) -> Rule {
        self.cache.rule()
    }

    /// Handle of the current root, for hosts that walk the tree themselves.
    pub fn root(&self) -> Index {
        self.root
    }

    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    /// Level of the current root.
    pub fn level(&self) -> u8 {
        self.cache.level(self.root)
    }

    /// Number of live cells.
    pub fn population(&self) -> u64 {
        self.cache.population(self.root)
    }

    /// Number of nodes held by the cache, catalog included.
    pub fn node_count(&self) -> usize {
        self.cache.len()
    }

    /// Generations advanced since construction or the last import.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get_cell(&self, x: i64, y: i64) -> bool {
        self.cache.get_cell(self.root, x, y)
    }

    pub fn set_cell(&mut self, x: i64, y: i64, alive: bool) {
        self.root = self.cache.set_cell(self.root, x, y, alive);
    }

    /// Advances the universe by exactly `generations` steps.
    ///
    /// The count is decomposed into powers of two, smallest first, so every
    /// chunk can ride the maximum-speedup memoization at its own power.
    pub fn run(&mut self, generations: u64) {
        let mut remaining = generations;
        let mut power: u8 = 0;
        while remaining != 0 {
            if remaining & 1 == 1 {
                // Grow until the requested power is representable, then pad
                // twice more so the light cone of the step stays inside the
                // region evolve() returns.
                while self.cache.level(self.root) < power + 2 {
                    self.root = self.cache.expand(self.root);
                }
                self.root = self.cache.expand(self.root);
                self.root = self.cache.expand(self.root);
                self.root = self.cache.evolve(self.root, power);
                self.root = self.cache.compact(self.root);
                debug!(
                    "advanced 2^{} generations: level {}, {} nodes",
                    power,
                    self.cache.level(self.root),
                    self.cache.len()
                );
            }
            remaining >>= 1;
            power += 1;
        }
        self.generation += generations;
    }

    /// Rebuilds the cache from scratch and re-interns the current root into
    /// it, shedding unreachable nodes and accumulated memoization. Useful
    /// between long runs to bound memory.
    pub fn restart(&mut self) {
        let fresh = NodeCache::new(self.cache.rule());
        let old = std::mem::replace(&mut self.cache, fresh);
        self.root = self.cache.adopt(&old, self.root);
        debug!(
            "restart: {} nodes reinterned from {}",
            self.cache.len(),
            old.len()
        );
    }

    /// In-place reachability sweep: frees every cache node the current root
    /// does not use. Memoized futures under the root survive.
    pub fn collect(&mut self) {
        self.cache.collect(self.root);
    }

    /// Diagnostic summary of the backing cache.
    pub fn report(&self) -> CacheReport {
        self.cache.report()
    }

    /// Kills every cell. The cache keeps whatever it has interned.
    pub fn clear(&mut self) {
        self.root = self.cache.zero(3);
        self.generation = 0;
    }

    /// Coordinates of every live cell, southwest corners first within each
    /// subtree.
    pub fn export(&self) -> Vec<(i64, i64)> {
        let mut cells = Vec::new();
        let half = 1i64 << (self.level() - 1);
        self.export_rec(self.root, -half, -half, &mut cells);
        cells
    }

    fn export_rec(&self, n: Index, x0: i64, y0: i64, out: &mut Vec<(i64, i64)>) {
        if self.cache.population(n) == 0 {
            return;
        }
        let level = self.cache.level(n);
        if level == 0 {
            out.push((x0, y0));
            return;
        }
        let Some(c) = self.cache.children(n) else {
            unreachable!("populated branch without children");
        };
        let half = 1i64 << (level - 1);
        self.export_rec(c.sw, x0, y0, out);
        self.export_rec(c.se, x0 + half, y0, out);
        self.export_rec(c.nw, x0, y0 + half, out);
        self.export_rec(c.ne, x0 + half, y0 + half, out);
    }

    /// Replaces the universe contents with the given live cells.
    pub fn import(&mut self, cells: &[(i64, i64)]) {
        self.clear();
        for &(x, y) in cells {
            self.set_cell(x, y, true);
        }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Universe::new(Rule::LIFE)
    }
}
