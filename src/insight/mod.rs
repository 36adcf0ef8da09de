//! On-demand insight generation via the Gemini API.

pub mod client;
pub mod prompt;

pub use client::InsightClient;
