//! WebACL server - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can reach
//! everything through `webacl_test::component` paths.

pub mod component {
    pub use webacl_core::{config, constants, error, types};
    pub use webacl_rdf as rdf;
    pub use webacl_service::{auth, fetch};
    pub use webacl_store as store;

    // Re-export app wiring
    pub mod app {
        pub use webacl_app::app::router;
        pub use webacl_app::config::ConfigHandler;
        pub use webacl_app::store_handler::StoreHandler;
    }
}
