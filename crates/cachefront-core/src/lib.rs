//! Provisioning engine and edge decision logic for cachefront.
//!
//! This crate defines the deferred value graph, the resource dependency
//! graph and its wave-scheduled materialization engine, the fixed stack
//! topology, and the edge authenticator decision function. It depends only
//! on `cachefront-types` -- the concrete state backend and secret providers
//! live in `cachefront-infra` behind the ports defined here.

pub mod deferred;
pub mod edge;
pub mod engine;
pub mod graph;
pub mod provider;
pub mod publish;
pub mod secrets;
pub mod topology;

#[cfg(test)]
mod testutil;
