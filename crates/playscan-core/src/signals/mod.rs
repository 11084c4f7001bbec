pub mod extract;
pub mod model;

pub use extract::{annotate, extract_signals};
pub use model::Signals;
