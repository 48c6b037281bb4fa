//! Shared domain types for cachefront.
//!
//! This crate contains the types used across the provisioning engine and the
//! edge decision function: secrets, resource declarations, policy documents,
//! edge request/response wire shapes, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod config;
pub mod edge;
pub mod error;
pub mod policy;
pub mod resource;
pub mod secret;
