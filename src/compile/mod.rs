
mod artifacts;
mod change;
mod dart_sass;
mod scss;
mod sourcemap;
mod style;

pub use artifacts::{report, BuildArtifacts, CompileError, OutputFiles};
pub use change::{Change, ChangeSet};
pub use dart_sass::sass_args;
pub use scss::compile;
pub use style::{publish, style};
