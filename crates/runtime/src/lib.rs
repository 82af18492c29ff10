//! Report orchestration: pick a niche, gather data, generate, assemble and
//! deliver one message.

pub mod message;
mod pipeline;

pub use message::{Generated, Message};
pub use pipeline::{Pipeline, RunReport, select_niche};
