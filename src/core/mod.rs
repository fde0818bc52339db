//! Core business logic - framework-agnostic ledger operations.
//!
//! The pure calculators (`currency`, `waterfall`, `allocation`, `distribution`) carry no
//! I/O. `recalc` ties them to the database, and the record modules (`project`, `expense`,
//! `partner`, `withdrawal`) call into `recalc` after every write that can change a
//! project's aggregate.

pub mod allocation;
pub mod currency;
pub mod dashboard;
pub mod distribution;
pub mod expense;
pub mod partner;
pub mod project;
pub mod recalc;
pub mod waterfall;
pub mod withdrawal;
