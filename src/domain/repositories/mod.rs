//! Repository trait definitions for the domain layer.
//!
//! These traits are the contracts of the two storage collaborators: the link
//! store and the click store. Concrete implementations live in
//! `crate::infrastructure::persistence`; mocks are generated with `mockall`
//! for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short code lookup, insert and listing
//! - [`ClickRepository`] - Click log append and counting

pub mod click_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
