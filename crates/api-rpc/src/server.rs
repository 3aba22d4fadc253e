//! JSON-RPC Server
//!
//! Serves the queue methods over HTTP on localhost. The chat platform's
//! interaction gateway forwards slash commands and button clicks here.

use crate::handler::RpcHandler;
use crate::types::{ChannelRequest, MemberRequest};
use jsonrpsee::server::{RegisterMethodError, Server, ServerHandle};
use jsonrpsee::RpcModule;
use lineup_core::application::QueueEngine;
use lineup_core::port::ChatClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9530;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        engine: Arc<QueueEngine>,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(engine, chat)),
        }
    }

    /// Bind and start serving. Returns the bound address (useful with port 0).
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = build_module(self.handler).map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC server started");

        Ok((local_addr, server.start(module)))
    }
}

/// Register every queue method against the handler
pub fn build_module(handler: Arc<RpcHandler>) -> Result<RpcModule<()>, RegisterMethodError> {
    let mut module = RpcModule::new(());

    let h = handler.clone();
    module.register_async_method("queue.join.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: MemberRequest = params.parse()?;
            h.join(req).await
        }
    })?;

    let h = handler.clone();
    module.register_async_method("queue.leave.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: MemberRequest = params.parse()?;
            h.leave(req).await
        }
    })?;

    let h = handler.clone();
    module.register_async_method("queue.pop.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: ChannelRequest = params.parse()?;
            h.pop(req).await
        }
    })?;

    let h = handler.clone();
    module.register_async_method("queue.show.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: ChannelRequest = params.parse()?;
            h.refresh(req).await
        }
    })?;

    let h = handler.clone();
    module.register_async_method("queue.list.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: ChannelRequest = params.parse()?;
            h.list(req).await
        }
    })?;

    let h = handler.clone();
    module.register_async_method("queue.clear.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: ChannelRequest = params.parse()?;
            h.clear(req).await
        }
    })?;

    let h = handler.clone();
    module.register_async_method("view.refresh.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: ChannelRequest = params.parse()?;
            h.refresh(req).await
        }
    })?;

    let h = handler;
    module.register_async_method("view.delete.v1", move |params, _, _| {
        let h = h.clone();
        async move {
            let req: ChannelRequest = params.parse()?;
            h.delete(req).await
        }
    })?;

    Ok(module)
}
