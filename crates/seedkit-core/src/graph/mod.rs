//! Dependency graph construction, topological ordering, and cycle breaking.

pub mod cycle;
pub mod dag;
pub mod topo;
pub mod visualize;

pub use dag::DependencyGraph;
pub use topo::{detect_cycles, topological_sort, DeferredEdge, InsertionPlan};
pub use cycle::break_cycles;
