pub mod parse;
pub mod read;

pub use parse::parse_playbook;
pub use read::{read_artifact, ArtifactContext};
