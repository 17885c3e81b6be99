//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `depot`: Sharing the services and the resolved agent with Salvo handlers
//! - `entry`: Authorization entries parsed from ACL graphs
//! - `evaluator`: Matching entries against a request
//! - `group`: Group membership through group documents
//! - `identity`: `WebID-TLS` certificate verification
//! - `locator`: Finding the ACL that governs a resource
//! - `mode`: Access modes and their implication lattice
//! - `service`: The access decision facade (`Authorizer`)
//! - `subject`: The requesting agent

pub mod depot;
pub mod entry;
pub mod evaluator;
pub mod group;
pub mod identity;
pub mod locator;
pub mod mode;
pub mod service;
pub mod subject;

pub use depot::{
    AccessControl, AccessControlHandler, access_from_depot, agent_from_depot, authorizer_from_depot,
};
pub use entry::AuthorizationEntry;
pub use evaluator::{Evaluator, Request};
pub use group::{GraphGroupResolver, GroupResolver};
pub use identity::{CertificateClaims, RsaKey, WebIdVerifier};
pub use locator::{AclLocation, AclLocator};
pub use mode::{AccessMode, ModeSet, mode_for_method};
pub use service::{Authorizer, Decision};
pub use subject::Agent;
