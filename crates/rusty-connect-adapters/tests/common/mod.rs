#![allow(dead_code)]

use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::Address;
use serde_json::Value;
use tiny_http::{Method, Response, Server, StatusCode};

use rusty_connect_adapters::ConnectConfig;

/// Address of the built-in development key.
pub fn dev_address() -> Address {
    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        .parse()
        .expect("valid dev address")
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is json")
    }
}

pub type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Serve `handler` responses on an ephemeral port until the test process exits.
pub fn spawn_mock_server<F>(handler: F) -> (String, Recorded)
where
    F: Fn(&Method, &str, &str) -> (u16, Value) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let calls: Recorded = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);

    thread::spawn(move || loop {
        let mut req = match server.recv() {
            Ok(r) => r,
            Err(_) => break,
        };
        let method = req.method().clone();
        let url = req.url().to_owned();
        let mut body = String::new();
        let _ = req.as_reader().read_to_string(&mut body);
        let authorization = req
            .headers()
            .iter()
            .find(|h| h.field.equiv("Authorization"))
            .map(|h| h.value.as_str().to_owned());
        if let Ok(mut g) = recorded.lock() {
            g.push(RecordedRequest {
                method: method.to_string(),
                url: url.clone(),
                body: body.clone(),
                authorization,
            });
        }

        let (code, payload) = handler(&method, &url, &body);
        let response =
            Response::from_string(payload.to_string()).with_status_code(StatusCode(code));
        let _ = req.respond(response);
    });

    (addr, calls)
}

/// JSON-RPC success envelope.
pub fn rpc_ok(result: Value) -> (u16, Value) {
    (
        200,
        serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result}),
    )
}

pub fn rpc_method(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("method").and_then(|m| m.as_str()).map(str::to_owned))
        .unwrap_or_default()
}

pub fn dev_config() -> ConnectConfig {
    ConnectConfig {
        http_timeout_ms: 5_000,
        ..ConnectConfig::default()
    }
}

/// Unique cache file path under the system temp dir.
pub fn temp_cache_path(tag: &str) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir()
        .join(format!("rusty-connect-test-{}-{tag}-{n}", std::process::id()))
        .join("cached_provider")
}
