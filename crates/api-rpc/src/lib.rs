//! JSON-RPC API Layer
//!
//! Dispatch surface for the Lineup queue engine: slash commands and button
//! actions arrive as JSON-RPC calls, each mutation followed by a view refresh.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
