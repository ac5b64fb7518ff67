//! Helpers shared by the service and HTTP layers.
//!
//! - [`code_generator`] - Random short code generation
//! - [`url_validator`] - Long URL validation
//! - [`client_ip`] - Client address resolution for click events

pub mod client_ip;
pub mod code_generator;
pub mod url_validator;
