//! Hover panel for treemap nodes: per-node summaries built once from the
//! stats, and placement of the panel next to the pointer.

mod content;
mod controller;
mod index;
mod position;

use thiserror::Error;

pub use content::{
    ContentCache, ContentConfig, ContentNode, PathLine, SummaryLine, TooltipContent, build_cache,
    format_percentage,
};
pub use controller::{OPAQUE, TRANSPARENT, TooltipController, TooltipState, TooltipSurface};
pub use index::{DependencyIndex, LinkedModule};
pub use position::{Anchor, BoxSize, Margin, Placement, Point, position};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TooltipError {
    #[error("node {0} appears more than once in a single cache build")]
    DuplicateNode(String),
    #[error("node {0} was not part of the last cache build")]
    UnknownNode(String),
}
