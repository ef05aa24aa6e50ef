//! State management module.
//!
//! Contains the Hub (shared server state) and its managers.

mod hub;
pub mod managers;
mod uid;

pub use hub::Hub;
pub use managers::admission::{AdmissionGate, AdmissionTicket};
pub use managers::lifecycle::{LifecycleManager, ShutdownPhase};
pub use managers::registry::{ConnectionRegistry, RegistryEntry, RegistryGuard};
pub use managers::stats::{RetireReason, StatsManager};
pub use uid::{ConnId, IDENTITY_PREFIX, IdentityGenerator};
