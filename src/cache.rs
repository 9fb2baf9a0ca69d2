use std::fmt;

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use thunderdome::{Arena, Index};

use crate::catalog::Catalog;
use crate::node::{Children, Node};
use crate::rule::Rule;

/// Bucket count of the interner table. Prime, fixed for the cache lifetime.
const BUCKETS: usize = 196_613;

/// Content-addressed store of canonical quadtree nodes.
///
/// The arena owns every node; handles are plain `Index` values that are only
/// meaningful against the cache that produced them. Interning guarantees that
/// two nodes with the same children are the same handle, which is what lets
/// evolution results be memoized on the nodes themselves.
pub struct NodeCache {
    arena: Arena<Node>,
    buckets: Box<[Option<Index>]>,
    rule: Rule,
    catalog: Catalog,
    /// `zeros[k]` is the all-dead node of level `k`. Levels 0-2 come from the
    /// catalog, higher levels are interned on demand.
    zeros: Vec<Index>,
}

/// Multiplicative combine of the four child identities. `Index::to_bits` is
/// stable for the lifetime of a node, so the bucket assignment is too.
pub(crate) fn hash_children(children: &Children) -> u64 {
    let mut h: u64 = 5381;
    for id in [children.nw, children.ne, children.sw, children.se] {
        h = h.wrapping_mul(31).wrapping_add(id.to_bits());
    }
    h
}

/// Find-or-create the canonical node for four children. Free function so the
/// catalog can intern while the cache is still being assembled.
pub(crate) fn intern_in(
    arena: &mut Arena<Node>,
    buckets: &mut [Option<Index>],
    nw: Index,
    ne: Index,
    sw: Index,
    se: Index,
) -> Index {
    let children = Children { nw, ne, sw, se };
    let slot = (hash_children(&children) % buckets.len() as u64) as usize;

    let mut cursor = buckets[slot];
    while let Some(id) = cursor {
        let node = &arena[id];
        if node.children == Some(children) {
            return id;
        }
        cursor = node.next;
    }

    let level = arena[nw].level;
    debug_assert!(
        arena[ne].level == level && arena[sw].level == level && arena[se].level == level,
        "children of a node must share a level"
    );
    let population = arena[nw].population
        + arena[ne].population
        + arena[sw].population
        + arena[se].population;

    let id = arena.insert(Node::branch(children, level + 1, population));
    arena[id].next = buckets[slot];
    buckets[slot] = Some(id);
    id
}

impl NodeCache {
    /// Builds a cache seeded with the full level 0-2 catalog for `rule`.
    pub fn new(rule: Rule) -> Self {
        let mut arena = Arena::new();
        let mut buckets = vec![None; BUCKETS].into_boxed_slice();
        let catalog = Catalog::build(&mut arena, &mut buckets, rule);
        let zeros = vec![catalog.dead, catalog.lvl1[0], catalog.lvl2[0]];
        NodeCache {
            arena,
            buckets,
            rule,
            catalog,
            zeros,
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Number of live nodes in the cache, catalog included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn level(&self, n: Index) -> u8 {
        self.arena[n].level
    }

    pub fn population(&self, n: Index) -> u64 {
        self.arena[n].population
    }

    /// `None` exactly for the two level-0 cells.
    pub fn children(&self, n: Index) -> Option<Children> {
        self.arena[n].children
    }

    fn quad(&self, n: Index) -> Children {
        self.arena[n]
            .children
            .expect("quadrant access on a level-0 cell")
    }

    /// Canonical node for four children of equal level.
    pub fn intern(&mut self, nw: Index, ne: Index, sw: Index, se: Index) -> Index {
        intern_in(&mut self.arena, &mut self.buckets, nw, ne, sw, se)
    }

    /// All-dead node of the given level.
    pub fn zero(&mut self, level: u8) -> Index {
        while self.zeros.len() <= level as usize {
            let top = self.zeros[self.zeros.len() - 1];
            let next = self.intern(top, top, top, top);
            self.zeros.push(next);
        }
        self.zeros[level as usize]
    }

    // --- Geometry ---

    /// The level-1 node made of the four inner grandchildren.
    pub(crate) fn center(&mut self, n: Index) -> Index {
        let c = self.quad(n);
        let nw = self.quad(c.nw).se;
        let ne = self.quad(c.ne).sw;
        let sw = self.quad(c.sw).ne;
        let se = self.quad(c.se).nw;
        self.intern(nw, ne, sw, se)
    }

    /// Same-level node spanning the seam of two horizontal siblings.
    fn horizontal(&mut self, left: Index, right: Index) -> Index {
        let l = self.quad(left);
        let r = self.quad(right);
        self.intern(l.ne, r.nw, l.se, r.sw)
    }

    /// Same-level node spanning the seam of two vertical siblings.
    fn vertical(&mut self, up: Index, down: Index) -> Index {
        let u = self.quad(up);
        let d = self.quad(down);
        self.intern(u.sw, u.se, d.nw, d.ne)
    }

    /// Level-1 node centered on the vertical seam of two siblings.
    fn horizontal_center(&mut self, left: Index, right: Index) -> Index {
        let l = self.quad(left);
        let r = self.quad(right);
        let nw = self.quad(l.ne).se;
        let ne = self.quad(r.nw).sw;
        let sw = self.quad(l.se).ne;
        let se = self.quad(r.sw).nw;
        self.intern(nw, ne, sw, se)
    }

    /// Level-1 node centered on the horizontal seam of two siblings.
    fn vertical_center(&mut self, up: Index, down: Index) -> Index {
        let u = self.quad(up);
        let d = self.quad(down);
        let nw = self.quad(u.sw).se;
        let ne = self.quad(u.se).sw;
        let sw = self.quad(d.nw).ne;
        let se = self.quad(d.ne).nw;
        self.intern(nw, ne, sw, se)
    }

    /// Wraps `n` in a dead border: the result is one level up with `n` as its
    /// center.
    pub fn expand(&mut self, n: Index) -> Index {
        let level = self.level(n);
        debug_assert!(level >= 1, "cannot expand a bare cell");
        let z = self.zero(level - 1);
        let c = self.quad(n);
        let nw = self.intern(z, z, z, c.nw);
        let ne = self.intern(z, z, c.ne, z);
        let sw = self.intern(z, c.sw, z, z);
        let se = self.intern(c.se, z, z, z);
        self.intern(nw, ne, sw, se)
    }

    /// Trims all-dead borders: while every live cell sits inside the center,
    /// replaces `n` by its center. Stops above level 2.
    pub fn compact(&mut self, mut n: Index) -> Index {
        while self.level(n) >= 3 {
            let z = self.zero(self.level(n) - 2);
            let c = self.quad(n);
            let nw = self.quad(c.nw);
            let ne = self.quad(c.ne);
            let sw = self.quad(c.sw);
            let se = self.quad(c.se);
            // The twelve grandchildren outside the center must all be dead.
            let hollow = nw.nw == z
                && nw.ne == z
                && nw.sw == z
                && ne.nw == z
                && ne.ne == z
                && ne.se == z
                && sw.nw == z
                && sw.sw == z
                && sw.se == z
                && se.ne == z
                && se.sw == z
                && se.se == z;
            if !hollow {
                break;
            }
            n = self.center(n);
        }
        n
    }

    // --- Evolution ---

    /// Returns the center of `n` (one level down) advanced by `1 << power`
    /// generations, clamped to the node's maximum speedup of
    /// `1 << (level - 2)`. Results are memoized on `n` keyed by the clamped
    /// power; the level-2 base case always hits the future baked in by the
    /// catalog.
    pub fn evolve(&mut self, n: Index, power: u8) -> Index {
        let level = self.level(n);
        debug_assert!(level >= 2, "evolution needs at least a 4x4 region");
        let max = level - 2;

        if power >= max {
            // Maximum speedup: two half-steps of `1 << (level - 2)`
            // generations each.
            if let Some(hit) = self.arena[n].future(max) {
                return hit;
            }
            let c = self.quad(n);
            let n00 = self.evolve(c.nw, power);
            let edge = self.horizontal(c.nw, c.ne);
            let n01 = self.evolve(edge, power);
            let n02 = self.evolve(c.ne, power);
            let edge = self.vertical(c.nw, c.sw);
            let n10 = self.evolve(edge, power);
            let mid = self.center(n);
            let n11 = self.evolve(mid, power);
            let edge = self.vertical(c.ne, c.se);
            let n12 = self.evolve(edge, power);
            let n20 = self.evolve(c.sw, power);
            let edge = self.horizontal(c.sw, c.se);
            let n21 = self.evolve(edge, power);
            let n22 = self.evolve(c.se, power);

            let future =
                self.evolve_quads([n00, n01, n02, n10, n11, n12, n20, n21, n22], power);
            self.arena[n].add_future(max, future);
            future
        } else {
            // One step of `1 << power`: the nine pieces are static crops, so
            // only the combination pass advances time.
            if let Some(hit) = self.arena[n].future(power) {
                return hit;
            }
            let c = self.quad(n);
            let n00 = self.center(c.nw);
            let n01 = self.horizontal_center(c.nw, c.ne);
            let n02 = self.center(c.ne);
            let n10 = self.vertical_center(c.nw, c.sw);
            let mid = self.center(n);
            let n11 = self.center(mid);
            let n12 = self.vertical_center(c.ne, c.se);
            let n20 = self.center(c.sw);
            let n21 = self.horizontal_center(c.sw, c.se);
            let n22 = self.center(c.se);

            let future =
                self.evolve_quads([n00, n01, n02, n10, n11, n12, n20, n21, n22], power);
            self.arena[n].add_future(power, future);
            future
        }
    }

    /// Combines a 3x3 grid of pieces into four overlapping quadrants, evolves
    /// each, and joins the results.
    fn evolve_quads(&mut self, grid: [Index; 9], power: u8) -> Index {
        let [n00, n01, n02, n10, n11, n12, n20, n21, n22] = grid;
        let q = self.intern(n00, n01, n10, n11);
        let nw = self.evolve(q, power);
        let q = self.intern(n01, n02, n11, n12);
        let ne = self.evolve(q, power);
        let q = self.intern(n10, n11, n20, n21);
        let sw = self.evolve(q, power);
        let q = self.intern(n11, n12, n21, n22);
        let se = self.evolve(q, power);
        self.intern(nw, ne, sw, se)
    }

    // --- Coordinate access ---

    /// Reads the cell at signed coordinates centered on the root midpoint.
    /// Out-of-range coordinates read as dead.
    pub fn get_cell(&self, n: Index, x: i64, y: i64) -> bool {
        let node = &self.arena[n];
        if node.population == 0 {
            return false;
        }
        let level = node.level;
        if level == 0 || level > 63 {
            // A bare cell has no addressable interior; past level 63 the
            // plane outgrows i64 coordinates.
            return false;
        }
        let max = 1i64 << (level - 1);
        if x < -max || x >= max || y < -max || y >= max {
            return false;
        }

        let c = self.quad(n);
        if level == 1 {
            let cell = if x < 0 {
                if y < 0 { c.sw } else { c.nw }
            } else {
                if y < 0 { c.se } else { c.ne }
            };
            return cell == self.catalog.alive;
        }

        let offset = 1i64 << (level - 2);
        if x < 0 {
            if y < 0 {
                self.get_cell(c.sw, x + offset, y + offset)
            } else {
                self.get_cell(c.nw, x + offset, y - offset)
            }
        } else {
            if y < 0 {
                self.get_cell(c.se, x - offset, y + offset)
            } else {
                self.get_cell(c.ne, x - offset, y - offset)
            }
        }
    }

    /// Writes one cell, expanding the root as needed, and returns the new
    /// root. The replacement level-2 node is always looked up in the catalog
    /// so it arrives canonical and carries its baked future.
    pub fn set_cell(&mut self, mut root: Index, x: i64, y: i64, alive: bool) -> Index {
        // compact() may have trimmed an empty-edged root to level 2; the
        // rewrite below wants at least a level-3 node to work in.
        while self.level(root) < 3 {
            root = self.expand(root);
        }
        loop {
            let level = self.level(root);
            if level > 63 {
                // Past i64 addressability; nothing sensible to write.
                return root;
            }
            let max = 1i64 << (level - 1);
            if x >= -max && x < max && y >= -max && y < max {
                break;
            }
            root = self.expand(root);
        }
        self.set_cell_rec(root, x, y, alive)
    }

    fn set_cell_rec(&mut self, n: Index, x: i64, y: i64, alive: bool) -> Index {
        let level = self.level(n);
        let c = self.quad(n);

        if level == 3 {
            let (target, x2, y2) = if x < 0 {
                if y < 0 {
                    (c.sw, x + 2, y + 2)
                } else {
                    (c.nw, x + 2, y - 2)
                }
            } else {
                if y < 0 {
                    (c.se, x - 2, y + 2)
                } else {
                    (c.ne, x - 2, y - 2)
                }
            };
            let mut bits = self.level2_bitmap(target);
            let bit = 1u16 << ((y2 + 2) * 4 + (1 - x2));
            if alive {
                bits |= bit;
            } else {
                bits &= !bit;
            }
            let repl = self.catalog.lvl2[bits as usize];
            return if x < 0 {
                if y < 0 {
                    self.intern(c.nw, c.ne, repl, c.se)
                } else {
                    self.intern(repl, c.ne, c.sw, c.se)
                }
            } else {
                if y < 0 {
                    self.intern(c.nw, c.ne, c.sw, repl)
                } else {
                    self.intern(c.nw, repl, c.sw, c.se)
                }
            };
        }

        let offset = 1i64 << (level - 2);
        if x < 0 {
            if y < 0 {
                let sw = self.set_cell_rec(c.sw, x + offset, y + offset, alive);
                self.intern(c.nw, c.ne, sw, c.se)
            } else {
                let nw = self.set_cell_rec(c.nw, x + offset, y - offset, alive);
                self.intern(nw, c.ne, c.sw, c.se)
            }
        } else {
            if y < 0 {
                let se = self.set_cell_rec(c.se, x - offset, y + offset, alive);
                self.intern(c.nw, c.ne, c.sw, se)
            } else {
                let ne = self.set_cell_rec(c.ne, x - offset, y - offset, alive);
                self.intern(c.nw, ne, c.sw, c.se)
            }
        }
    }

    /// 16-bit bitmap of a level-2 node's cells, in the catalog's bit layout.
    pub(crate) fn level2_bitmap(&self, n: Index) -> u16 {
        debug_assert_eq!(self.level(n), 2);
        let c = self.quad(n);
        let nw = self.quad(c.nw);
        let ne = self.quad(c.ne);
        let sw = self.quad(c.sw);
        let se = self.quad(c.se);
        let bit = |id: Index| self.arena[id].population as u16;
        (bit(nw.nw) << 15)
            | (bit(nw.ne) << 14)
            | (bit(ne.nw) << 13)
            | (bit(ne.ne) << 12)
            | (bit(nw.sw) << 11)
            | (bit(nw.se) << 10)
            | (bit(ne.sw) << 9)
            | (bit(ne.se) << 8)
            | (bit(sw.nw) << 7)
            | (bit(sw.ne) << 6)
            | (bit(se.nw) << 5)
            | (bit(se.ne) << 4)
            | (bit(sw.sw) << 3)
            | (bit(sw.se) << 2)
            | (bit(se.sw) << 1)
            | bit(se.se)
    }

    fn level1_bits(&self, n: Index) -> u8 {
        debug_assert_eq!(self.level(n), 1);
        let c = self.quad(n);
        let bit = |id: Index| self.arena[id].population as u8;
        (bit(c.nw) << 3) | (bit(c.ne) << 2) | (bit(c.sw) << 1) | bit(c.se)
    }

    // --- Lifecycle ---

    /// Deep-interns a tree from another cache and returns the local root.
    /// Levels 0-2 map through the catalog, so adopted level-2 nodes regain
    /// their baked futures; memoized futures above that are not carried over.
    pub fn adopt(&mut self, src: &NodeCache, root: Index) -> Index {
        let mut seen = FxHashMap::default();
        self.adopt_rec(src, root, &mut seen)
    }

    fn adopt_rec(
        &mut self,
        src: &NodeCache,
        n: Index,
        seen: &mut FxHashMap<Index, Index>,
    ) -> Index {
        if let Some(&id) = seen.get(&n) {
            return id;
        }
        let id = match src.level(n) {
            0 => {
                if src.population(n) == 0 {
                    self.catalog.dead
                } else {
                    self.catalog.alive
                }
            }
            1 => self.catalog.lvl1[src.level1_bits(n) as usize],
            2 => self.catalog.lvl2[src.level2_bitmap(n) as usize],
            _ => {
                let c = src.quad(n);
                let nw = self.adopt_rec(src, c.nw, seen);
                let ne = self.adopt_rec(src, c.ne, seen);
                let sw = self.adopt_rec(src, c.sw, seen);
                let se = self.adopt_rec(src, c.se, seen);
                self.intern(nw, ne, sw, se)
            }
        };
        seen.insert(n, id);
        id
    }

    /// Frees every node that is neither part of the catalog nor reachable
    /// from `root`, then rebuilds each bucket chain from the survivors and
    /// drops memoized futures whose target was freed.
    pub fn collect(&mut self, root: Index) {
        let before = self.len();

        // Mark. Children of level-3 nodes are catalog entries, which are
        // retained wholesale, so the walk stops there.
        let mut reachable = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if self.arena[id].level <= 3 {
                continue;
            }
            let c = self.quad(id);
            stack.extend([c.nw, c.ne, c.sw, c.se]);
        }

        // Sweep.
        self.arena
            .retain(|id, node| node.level <= 2 || reachable.contains(&id));

        // Relink every surviving branch bucket-locally and prune futures
        // pointing at freed nodes.
        let live: FxHashSet<Index> = self.arena.iter().map(|(id, _)| id).collect();
        for (_, node) in self.arena.iter_mut() {
            node.next = None;
            node.futures.retain(|future| live.contains(&future.node));
        }
        self.buckets.fill(None);
        let branches: Vec<(Index, Children)> = self
            .arena
            .iter()
            .filter_map(|(id, node)| node.children.map(|c| (id, c)))
            .collect();
        for (id, children) in branches {
            let slot = (hash_children(&children) % BUCKETS as u64) as usize;
            self.arena[id].next = self.buckets[slot];
            self.buckets[slot] = Some(id);
        }

        // The zero ladder is built bottom-up, so survivors form a prefix.
        let keep = self
            .zeros
            .iter()
            .take_while(|z| self.arena.contains(**z))
            .count();
        self.zeros.truncate(keep);

        debug!("collect: {} -> {} nodes", before, self.len());
    }

    /// Bucket-chain statistics for diagnostics.
    pub fn report(&self) -> CacheReport {
        let mut min_chain = usize::MAX;
        let mut max_chain = 0;
        let mut empty = 0usize;
        for &head in self.buckets.iter() {
            let mut len = 0usize;
            let mut cursor = head;
            while let Some(id) = cursor {
                len += 1;
                cursor = self.arena[id].next;
            }
            if len == 0 {
                empty += 1;
            }
            min_chain = min_chain.min(len);
            max_chain = max_chain.max(len);
        }
        CacheReport {
            nodes: self.len(),
            min_chain,
            max_chain,
            empty_percent: empty as f64 * 100.0 / self.buckets.len() as f64,
        }
    }
}

/// Diagnostic summary of the interner table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheReport {
    pub nodes: usize,
    pub min_chain: usize,
    pub max_chain: usize,
    pub empty_percent: f64,
}

impl fmt::Display for CacheReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, bucket chains {}..{}, {:.1}% buckets empty",
            self.nodes, self.min_chain, self.max_chain, self.empty_percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(cache: &mut NodeCache, cells: &[(i64, i64)]) -> Index {
        let mut root = cache.zero(3);
        for &(x, y) in cells {
            root = cache.set_cell(root, x, y, true);
        }
        root
    }

    #[test]
    fn interning_is_canonical() {
        let mut cache = NodeCache::new(Rule::LIFE);
        let z = cache.zero(2);
        let a = cache.intern(z, z, z, z);
        let b = cache.intern(z, z, z, z);
        assert_eq!(a, b);
        assert_eq!(a, cache.zero(3));

        let blinker = place(&mut cache, &[(-1, 0), (0, 0), (1, 0)]);
        let again = place(&mut cache, &[(1, 0), (0, 0), (-1, 0)]);
        assert_eq!(blinker, again);
        assert_ne!(blinker, cache.zero(3));
    }

    #[test]
    fn population_sums_children() {
        let mut cache = NodeCache::new(Rule::LIFE);
        let root = place(&mut cache, &[(-3, -3), (0, 0), (1, 2), (3, -4)]);
        assert_eq!(cache.population(root), 4);
        let c = cache.children(root).unwrap();
        let sum: u64 = [c.nw, c.ne, c.sw, c.se]
            .into_iter()
            .map(|q| cache.population(q))
            .sum();
        assert_eq!(sum, 4);
    }

    #[test]
    fn zero_nodes_are_dead_and_shared() {
        let mut cache = NodeCache::new(Rule::LIFE);
        for level in 0..10 {
            let z = cache.zero(level);
            assert_eq!(cache.level(z), level);
            assert_eq!(cache.population(z), 0);
            assert_eq!(cache.zero(level), z);
        }
    }

    #[test]
    fn expand_keeps_content_centered() {
        let mut cache = NodeCache::new(Rule::LIFE);
        let root = place(&mut cache, &[(0, 0), (-2, 1)]);
        let grown = cache.expand(root);
        assert_eq!(cache.level(grown), 4);
        assert_eq!(cache.population(grown), 2);
        assert!(cache.get_cell(grown, 0, 0));
        assert!(cache.get_cell(grown, -2, 1));
        assert!(!cache.get_cell(grown, 1, 1));
    }

    #[test]
    fn compact_undoes_expand() {
        let mut cache = NodeCache::new(Rule::LIFE);
        // Live cells on every border of the level-3 root, so it is tight.
        let root = place(&mut cache, &[(-4, 0), (3, 0), (0, -4), (0, 3)]);
        let grown = cache.expand(root);
        let grown = cache.expand(grown);
        assert_eq!(cache.compact(grown), root);

        let z5 = cache.zero(5);
        let grown = cache.expand(z5);
        let back = cache.compact(grown);
        assert_eq!(cache.population(back), 0);
        assert_eq!(cache.level(back), 2);
    }

    #[test]
    fn evolve_preserves_emptiness() {
        let mut cache = NodeCache::new(Rule::LIFE);
        for level in 2..8u8 {
            for power in 0..=(level - 2) {
                let z = cache.zero(level);
                let stepped = cache.evolve(z, power);
                assert_eq!(stepped, cache.zero(level - 1));
            }
        }
    }

    #[test]
    fn evolve_results_are_shared() {
        let mut cache = NodeCache::new(Rule::LIFE);
        let root = place(&mut cache, &[(-1, 0), (0, 0), (1, 0)]);
        let root = cache.expand(root);
        let root = cache.expand(root);
        let once = cache.evolve(root, 0);
        let twice = cache.evolve(root, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn cell_roundtrip() {
        let mut cache = NodeCache::new(Rule::LIFE);
        let mut root = cache.zero(3);
        root = cache.set_cell(root, 2, -3, true);
        assert!(cache.get_cell(root, 2, -3));
        assert!(!cache.get_cell(root, -3, 2));
        assert!(!cache.get_cell(root, 100, 100));

        root = cache.set_cell(root, 2, -3, false);
        assert!(!cache.get_cell(root, 2, -3));
        assert_eq!(root, cache.zero(3));
    }

    #[test]
    fn set_cell_expands_out_of_range_writes() {
        let mut cache = NodeCache::new(Rule::LIFE);
        let root = cache.zero(3);
        let root = cache.set_cell(root, 40, -7, true);
        assert!(cache.level(root) >= 7);
        assert!(cache.get_cell(root, 40, -7));
        assert_eq!(cache.population(root), 1);
    }

    #[test]
    fn collect_keeps_root_and_catalog() {
        let mut cache = NodeCache::new(Rule::LIFE);
        let baseline = cache.len();

        // Manufacture garbage on the side, then a root worth keeping.
        let junk = place(&mut cache, &[(2, 2), (-3, 1), (0, -2)]);
        let junk = cache.expand(junk);
        cache.evolve(junk, 0);
        let root = place(&mut cache, &[(-1, 0), (0, 0), (1, 0)]);

        cache.collect(root);
        assert!(cache.len() < baseline + 20);
        assert!(cache.get_cell(root, -1, 0));
        assert_eq!(cache.population(root), 3);

        // The cache stays serviceable after a sweep.
        let root = cache.expand(root);
        let root = cache.expand(root);
        let next = cache.evolve(root, 0);
        assert_eq!(cache.population(next), 3);
    }

    #[test]
    fn report_counts_buckets() {
        let cache = NodeCache::new(Rule::LIFE);
        let report = cache.report();
        // Catalog: 2 cells outside the chains, 16 level-1, 65536 level-2.
        assert_eq!(report.nodes, 2 + 16 + (1 << 16));
        assert_eq!(report.min_chain, 0);
        assert!(report.max_chain >= 1);
        assert!(report.empty_percent > 0.0 && report.empty_percent < 100.0);
    }
}
