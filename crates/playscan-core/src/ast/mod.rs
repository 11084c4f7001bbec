pub mod build;
pub mod model;

pub use build::build;
pub use model::{Expression, Play, Task, Variable};
