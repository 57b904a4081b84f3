//! Status gateway client.

pub mod client;

pub use client::{ClientError, StatusClient, StatusRequest};
