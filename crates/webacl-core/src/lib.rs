//! Shared building blocks for the webacl workspace: configuration, errors,
//! vocabulary constants and resource identifiers.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
