pub mod stats;
pub mod tooltip;
pub mod util;
