//! The restricted query language.
//!
//! Candidate programs coming back from the model are parsed into a small
//! statement grammar and interpreted against the dataset. Nothing outside
//! the whitelisted verb set can run, which is what stands in for sandboxing
//! here: no ambient names, no host-language evaluation.

pub mod ast;
pub mod exec;
pub mod parser;

pub use exec::{execute, ExecValue, Scope};
pub use parser::parse_program;

/// Binding name under which the dataset is visible to programs.
pub const DATASET_BINDING: &str = "df";

/// Binding name the program must assign its answer to.
pub const RESULT_BINDING: &str = "result";
