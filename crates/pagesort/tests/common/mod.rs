//! Shared test utilities for pagesort integration tests.
//!
//! This module provides:
//! - `TestHarness` with a temporary scan data directory and a scripted LLM
//! - Builders for document info and model replies

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FakeTransport, RecordingProgress, TestHarness};
