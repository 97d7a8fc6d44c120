//! The content pipeline: extraction, summarization, assembly, and the
//! sequential run driver.

pub mod digest;
pub mod extract;
pub mod processor;
pub mod summarize;

pub use digest::{DigestDocument, DigestItem, assemble};
pub use extract::extract_text;
pub use processor::DigestPipeline;
pub use summarize::{SummaryResult, Summarizer};
