//! Multi-threaded integration tests.
//!
//! The store is shared by reference across threads. These tests check that
//! concurrent saves are all kept, that readers never see a torn view, and
//! that lock contention is reported as `Busy` rather than a negative result.

#[path = "../common/mod.rs"]
mod common;

mod contention;
