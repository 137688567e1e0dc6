//! Business rules evaluation engine for mortgage lending decisions.
//!
//! The engine evaluates structured borrower, loan, and property facts
//! against rules held in a graph-shaped repository and returns typed
//! verdicts. Conversational agents, document extraction, and credit
//! bureau lookups live outside this crate and talk to it through the
//! tool facade.

pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;
