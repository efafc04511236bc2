//! Deterministic, pure logic shared by the engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod batch;
pub mod history;
pub mod parser;
pub mod pending;
pub mod registry;
pub mod value;
