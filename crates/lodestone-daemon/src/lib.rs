//! Service wiring for the lodestone binary.
//!
//! The binary stays thin: parse flags, validate configuration, run the
//! [`Supervisor`]. Keeping the pieces here makes them reachable from the
//! integration tests, which drive the same pipeline against temporary
//! directories.

pub mod config;
pub mod supervisor;

pub use config::ServiceConfig;
pub use supervisor::Supervisor;
