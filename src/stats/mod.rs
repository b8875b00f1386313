mod hierarchy;
mod model;
mod parse;

pub use hierarchy::{Hierarchy, HierarchyNode, NodeIndex};
pub use model::{
    BundleStats, Link, ModuleRecord, SizeKind, SizeMap, StatsOptions, TreeEntry, UnknownSizeKind,
};
pub use parse::{load_stats, parse_stats};
