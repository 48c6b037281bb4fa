//! Infrastructure layer for cachefront.
//!
//! Contains implementations of the ports defined in `cachefront-core`:
//! the config file loader, the secret provider chain, and the local JSON
//! state backend behind the `CloudProvider` port.

pub mod config;
pub mod secret;
pub mod state;
