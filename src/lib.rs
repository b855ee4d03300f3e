pub mod config;
pub mod error;
pub mod record;
pub mod input;
pub mod matcher;
pub mod eval;
pub mod annotate;

pub use config::Config;
pub use error::{TellmeError, Result};
pub use eval::{evaluate, run_evaluation, EvalSettings, Evaluation};
pub use matcher::{CrossMatcher, MatchMode};
