// End-to-end dispatch over HTTP JSON-RPC

use lineup_api_rpc::{RpcServer, RpcServerConfig};
use lineup_core::application::QueueEngine;
use lineup_core::port::chat_client::mocks::RecordingChatClient;
use lineup_core::port::head_change::mocks::RecordingListener;
use lineup_core::port::queue_repository::mocks::InMemoryQueueRepository;
use lineup_core::port::time_provider::mocks::ManualTimeProvider;
use lineup_core::port::view_repository::mocks::InMemoryViewRepository;
use lineup_core::EngineConfig;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

async fn start_server() -> (SocketAddr, jsonrpsee::server::ServerHandle, Arc<RecordingChatClient>) {
    let chat = Arc::new(RecordingChatClient::new());
    let engine = Arc::new(QueueEngine::new(
        Arc::new(InMemoryQueueRepository::new()),
        Arc::new(InMemoryViewRepository::new()),
        chat.clone(),
        Arc::new(RecordingListener::new()),
        Arc::new(ManualTimeProvider::new(1_000)),
        EngineConfig::default(),
    ));
    let config = RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let (addr, handle) = RpcServer::new(config, engine, chat.clone())
        .start()
        .await
        .unwrap();
    (addr, handle, chat)
}

async fn call(addr: SocketAddr, method: &str, params: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    });

    reqwest::Client::new()
        .post(format!("http://{}", addr))
        .json(&request)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_join_pop_over_http() {
    let (addr, handle, chat) = start_server().await;

    for member in ["U1", "U2"] {
        let response = call(
            addr,
            "queue.join.v1",
            json!({ "team_id": "T1", "channel_id": "C1", "member_id": member }),
        )
        .await;
        assert_eq!(response["result"]["admitted"], true);
    }

    let response = call(
        addr,
        "queue.pop.v1",
        json!({ "team_id": "T1", "channel_id": "C1" }),
    )
    .await;
    assert_eq!(response["result"]["popped"], "U1");
    assert_eq!(response["result"]["next"], "U2");
    assert_eq!(response["result"]["view"]["strategy"], "EDITED_IN_PLACE");

    let response = call(
        addr,
        "queue.list.v1",
        json!({ "team_id": "T1", "channel_id": "C1" }),
    )
    .await;
    assert_eq!(response["result"]["members"], json!(["U2"]));

    assert_eq!(chat.live_documents("C1").len(), 1);
    handle.stop().unwrap();
}

#[tokio::test]
async fn test_validation_error_code() {
    let (addr, handle, _chat) = start_server().await;

    let response = call(
        addr,
        "queue.join.v1",
        json!({ "team_id": "T1", "channel_id": "C1", "member_id": "" }),
    )
    .await;
    assert_eq!(response["error"]["code"], 4000);

    handle.stop().unwrap();
}
