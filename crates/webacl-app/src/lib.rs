//! HTTP surface of the `WebACL` server.
//!
//! ## Module Organization
//!
//! - `app`: Routes and request handlers
//! - `config`: Settings hoop
//! - `middleware`: Authentication, resource resolution and access checks
//! - `store_handler`: Document store hoop

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod store_handler;
