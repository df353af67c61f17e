use std::hash::BuildHasherDefault;

use indexmap::IndexSet;
use rustc_hash::FxHasher;

/// Insertion-ordered set; iteration order is first-seen order, which keeps
/// derived output (like a pruned dependency list) deterministic.
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;
