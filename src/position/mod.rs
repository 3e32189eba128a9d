mod parsing;
mod types;

pub use parsing::select_latest;
pub use types::{PositionEntry, PositionRecord};
