//! HTTP surface for the bandit engine — REST handlers, server bootstrap,
//! and the Prometheus metrics exporter.

pub mod rest;
pub mod server;

pub use server::ApiServer;
