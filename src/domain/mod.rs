//! Domain layer containing business entities and the click pipeline.
//!
//! The domain layer has no dependency on the infrastructure or HTTP layers.
//! Storage and network access are expressed as traits implemented elsewhere.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Storage trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_pipeline`] - Bounded queue and worker pool for click ingestion
//! - [`click_worker`] - Worker loop persisting dequeued events
//! - [`link_health`] - Probe outcomes and the [`link_health::LinkProbe`] trait
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler resolves the short code
//! 2. A [`click_event::ClickEvent`] is submitted to the pipeline (never blocks)
//! 3. One of the workers dequeues it
//! 4. The click is appended via [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_pipeline;
pub mod click_worker;
pub mod entities;
pub mod link_health;
pub mod repositories;
