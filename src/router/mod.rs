//! Router support for the hash-routed front end.
//!
//! This module provides:
//! - Router class bootstrap with environment fallback (`bootstrap`)
//! - Hash fragment parsing (`hash`)

pub mod bootstrap;
pub mod hash;

pub use bootstrap::{BootstrapState, RouterBootstrap};
pub use hash::{parse_hash, RouteRequest};
