// Selection module - selection sets and box selection

pub mod box_selector;
pub mod set;

pub use box_selector::{BoxSelector, BoxState, BoxTick, PointerFrame, strictly_inside};
pub use set::{SelectionId, SelectionSet};
