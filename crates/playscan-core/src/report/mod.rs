pub mod model;
pub mod render;

pub use model::Report;
pub use render::render_text;
