//! Pure, deterministic logic of the guarded execution core.
//!
//! Nothing in this module performs I/O or talks to the model; everything is
//! fully testable in isolation.

pub mod clarify;
pub mod extract;
pub mod guardrails;
pub mod normalize;
pub mod schema;
pub mod types;
