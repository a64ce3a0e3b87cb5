//! Data Transfer Objects
//!
//! Request types passed into the gateway and the wire schema it decodes.
//! Responses are decoded once at the transport boundary into these types;
//! nothing downstream inspects raw JSON.

pub mod graphql;
pub mod pipeline;
pub mod secret;
