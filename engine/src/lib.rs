//! Whitelist-checked execution of agent-generated slide edits.
//!
//! An autonomous agent edits a slide by emitting short function-call
//! statements (`replace_text(3, 0, 0, 'Hello')`) instead of raw
//! document-manipulation code. This crate interprets a batch of that
//! untrusted text as validated calls against an in-memory slide, with
//! per-statement failure isolation so a corrective retry loop can resend only
//! the failing context. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (statement grammar, registry,
//!   outcome history, pending-edit application). No I/O, fully testable in
//!   isolation.
//! - **[`io`]**: Side-effecting operations (slide documents, config files).
//!
//! [`exec`] coordinates core logic with the slide model to interpret one
//! batch; [`commit`] is the document-model side that applies queued edits.

pub mod commit;
pub mod core;
pub mod docs;
pub mod exec;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod ops;
pub mod slide;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
