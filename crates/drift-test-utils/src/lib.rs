//! Shared test utilities for the driftflow workspace.
//!
//! This crate provides standardised fixtures for desired-state stores and
//! an observed host tree. It is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`stores`]: [`TestStores`] builder for store/host scenarios

pub mod stores;

pub use stores::TestStores;
