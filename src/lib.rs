//! Core library for proposal-node
//!
//! The verification/status subsystem for a multi-volume proposal submission:
//! - `store`: the shared JSON document store with section-level merges
//! - `tasks`: the four verification checks and the task registry
//! - `heartbeat`: per-task last-run stamps on the master dashboard
//! - `dashboard`: static status page rendering
//! - `server`: the HTTP task dispatcher

pub mod config;
pub mod dashboard;
pub mod heartbeat;
pub mod server;
pub mod store;
pub mod tasks;
