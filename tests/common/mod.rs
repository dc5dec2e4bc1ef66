#![allow(dead_code)]

use async_trait::async_trait;
use flow_assistant::assistant::Assistant;
use flow_assistant::http::transport::ChatTransport;
use flow_assistant::http::{ HttpError, HttpResult };
use flow_assistant::llm::AssistantConfig;
use std::collections::VecDeque;
use std::sync::{ Arc, Mutex };
use tokio::sync::Notify;

/// Replays canned replies in order and records every payload it was given.
/// With a gate, each call parks until the test releases it.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResult, HttpError>>>,
    payloads: Mutex<Vec<Vec<u8>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<HttpResult, HttpError>>) -> Self {
        Self { replies: Mutex::new(replies.into()), ..Self::default() }
    }

    pub fn gated(replies: Vec<Result<HttpResult, HttpError>>, gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::new(replies) }
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .map(|p| String::from_utf8(p.clone()).unwrap())
            .collect()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn post_json(&self, payload: &[u8]) -> Result<HttpResult, HttpError> {
        self.payloads.lock().unwrap().push(payload.to_vec());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more often than scripted")
    }
}

pub fn ok(status: u16, body: &str) -> Result<HttpResult, HttpError> {
    Ok(HttpResult { status, body: body.as_bytes().to_vec() })
}

pub fn reply_body(content: &str) -> String {
    format!(
        r#"{{"id":"chatcmpl-1","choices":[{{"index":0,"message":{{"role":"assistant","content":"{}"}}}}]}}"#,
        content
    )
}

pub fn assistant_with(transport: Arc<ScriptedTransport>) -> Assistant {
    Assistant::new(Arc::new(AssistantConfig::default()), transport)
}

/// Blows up inside the worker task instead of answering.
pub struct PanickingTransport;

#[async_trait]
impl ChatTransport for PanickingTransport {
    async fn post_json(&self, _payload: &[u8]) -> Result<HttpResult, HttpError> {
        panic!("transport exploded");
    }
}
