//! tabchat - natural-language questions over a spreadsheet, answered by a
//! local LLM.
//!
//! The pipeline per question: build a textual profile of the dataset, prompt
//! the model for a query program, sanitize the reply, interpret the program
//! in a restricted scope, normalize the result into a table.

pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod llm;
pub mod normalize;
pub mod profile;
pub mod query;
pub mod render;
pub mod session;
pub mod synth;
