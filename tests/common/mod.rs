//! Shared test utilities for spate integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Timing helpers assume a paused tokio clock
//! (`#[tokio::test(start_paused = true)]`), so every recorded offset is exact.

#![allow(dead_code)]

pub mod builders;
pub mod recorder;

pub use builders::*;
pub use recorder::*;
