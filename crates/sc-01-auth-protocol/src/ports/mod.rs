//! # Ports
//!
//! - `inbound`: the API this crate offers to transports
//! - `outbound`: the dependencies it needs from the host

pub mod inbound;
pub mod outbound;
