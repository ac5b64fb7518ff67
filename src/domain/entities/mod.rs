//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without behaviour beyond construction.
//!
//! # Entity Types
//!
//! - [`Link`] - A short code mapped to a long URL
//! - [`Click`] - A persisted redirect event
//!
//! Creation inputs live in separate structs (`NewLink`, `NewClick`) because the
//! store assigns the numeric identifiers.

pub mod click;
pub mod link;

pub use click::{Click, NewClick};
pub use link::{Link, NewLink};
