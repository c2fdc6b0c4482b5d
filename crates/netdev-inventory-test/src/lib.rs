//! Test infrastructure for the netdev-inventory engine
//!
//! Provides:
//! - [`FakeDevice`]: an in-memory device implementing both driver traits,
//!   with call counters and failure injection
//! - [`FakeResolver`]: a static hostname table
//! - Record and neighbor verification helpers checking the engine invariants

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;
