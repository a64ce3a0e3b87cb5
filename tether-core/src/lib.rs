//! Tether Core
//!
//! Core types shared by the Tether gateway, reconciler and CLI.
//!
//! This crate contains:
//! - Domain types: the observed pipeline and its deployments
//! - DTOs: request types and the typed GraphQL wire schema

pub mod domain;
pub mod dto;
