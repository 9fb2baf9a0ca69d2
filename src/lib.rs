//! Hash-consed quadtree engine for Life-family cellular automata on an
//! unbounded grid.
//!
//! The grid is a tree of canonical nodes: structurally equal regions are the
//! same node, and each node memoizes its own evolved center. Together these
//! make advancing a self-similar pattern by `2^k` generations roughly as
//! cheap as advancing it by one.
//!
//! ```
//! use hashlife::{Rule, Universe};
//!
//! let mut universe = Universe::new(Rule::LIFE);
//! universe.set_cell(-1, 0, true);
//! universe.set_cell(0, 0, true);
//! universe.set_cell(1, 0, true);
//!
//! universe.run(2);
//! assert_eq!(universe.population(), 3);
//! assert!(universe.get_cell(1, 0));
//! ```

mod cache;
mod catalog;
mod node;
mod rule;
mod universe;

pub use cache::{CacheReport, NodeCache};
pub use node::Children;
pub use rule::{ParseRuleError, Rule};
pub use universe::Universe;

/// Opaque handle to a node in a [`NodeCache`] arena.
pub use thunderdome::Index as NodeId;
