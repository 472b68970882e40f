//! Contract checks for the advertisement HTTP API.
//!
//! [`suite::Case`] lists the scenarios, [`testing::Runner`] executes them
//! sequentially against an [`ads::AdsApi`], and [`testing::RunReport`]
//! collects the outcome.

pub mod ads;
pub mod cli;
pub mod environment;
pub mod error;
pub mod history;
pub mod http;
pub mod storage;
pub mod suite;
pub mod testing;

pub use error::{Error, Result};
