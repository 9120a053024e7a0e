//! Tool-invocation gateway core.
//!
//! Every server binary in this workspace is the same machine pointed at a
//! different upstream intelligence API: a line-delimited JSON-RPC channel on
//! stdio, a static tool catalog, per-call argument validation, a fixed-window
//! rate limiter, and a single bounded upstream attempt per admitted call.
//! This crate implements that shared machine; the per-API crates only supply
//! a catalog and an [`upstream::UpstreamClient`].

pub mod engine;
pub mod env;
pub mod jsonrpc;
pub mod ratelimit;
pub mod registry;
pub mod telemetry;
pub mod upstream;
pub mod validate;
