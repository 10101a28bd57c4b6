pub mod analysis;
pub mod reflection;

pub use analysis::Analysis;
pub use reflection::{Prompt, Reflection, ReflectionDraft};
