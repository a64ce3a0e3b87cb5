//! Core domain types
//!
//! These types describe remote state as it was last observed. They are never
//! computed locally; every value comes from a gateway fetch.

pub mod pipeline;
pub mod secret;
