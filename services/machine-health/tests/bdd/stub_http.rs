//! Scripted HTTP client standing in for the prediction service

use std::sync::Mutex;

use async_trait::async_trait;
use machine_health::io::{HttpClient, HttpResponse};
use machine_health::MachineHealthError;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum StubReply {
    Respond { status: u16, body: String },
    Unreachable,
}

/// Replies with the same canned outcome to every request and records what it was sent
#[derive(Debug)]
pub struct StubHttpClient {
    reply: StubReply,
    requests: Mutex<Vec<(String, Value)>>,
}

impl StubHttpClient {
    pub fn new(reply: StubReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubHttpClient {
    async fn post_json(&self, url: &str, body: &Value) -> machine_health::Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));

        match &self.reply {
            StubReply::Respond { status, body } => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            StubReply::Unreachable => Err(MachineHealthError::Network(
                "connection refused".to_string(),
            )),
        }
    }
}
