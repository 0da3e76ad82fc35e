//! The interactive surface: prompt rendering and the read-eval loop.

mod prompt;
mod repl;

pub use prompt::JshPrompt;
pub use repl::{evaluate_repl, ReplConfig};
