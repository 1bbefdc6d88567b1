//! CLI library components for the contracts pipeline.

#![allow(missing_docs)]

pub mod logging;
pub mod pipeline;
pub mod types;
