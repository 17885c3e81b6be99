//! Authorization engine: `WebID-TLS` identity resolution and Web Access
//! Control evaluation over a [`webacl_store::GraphStore`].

pub mod auth;
pub mod error;
pub mod fetch;
