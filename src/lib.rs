//! Substack digest: newsletter ingestion, summarization, and a single
//! ranked digest mailed back to the account's own address.

pub mod auth;
pub mod config;
pub mod error;
pub mod llm;
pub mod mailbox;
pub mod pipeline;
pub mod sanitize;
