//! # CrewDesk Shared Library
//!
//! This crate contains the domain models and the records store used across
//! the CrewDesk API server and tooling.
//!
//! ## Module Organization
//!
//! - `models`: Domain entities and their store operations
//! - `store`: The in-memory records store handle
//! - `persist`: Best-effort JSON snapshot persistence
//! - `auth`: Password hashing utilities

pub mod auth;
pub mod models;
pub mod persist;
pub mod store;

/// Current version of the CrewDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
