//! Domain layer: pure protocol logic.

pub mod authenticator;
pub mod canonical;
pub mod entities;
pub mod errors;
pub mod mac;
pub mod signer;
pub mod subscription;
