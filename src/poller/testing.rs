use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::transport::{FragmentResponse, FragmentTransport};
use crate::types::PollerError;

#[derive(Debug, Clone)]
pub(super) struct RecordedCall {
    pub method: String,
    pub url: String,
    pub at: Instant,
}

enum Scripted {
    Response(FragmentResponse),
    /// Response released only once the gate is notified.
    Held(Arc<Notify>, FragmentResponse),
    Refused,
    Panic,
}

/// Replays canned responses per URL; answers 503 once a script runs out.
#[derive(Default)]
pub(super) struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
    client_missing: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, url: &str, status: u16, body: &str) -> Self {
        self.push(url, Scripted::Response(FragmentResponse::new(status, body)))
    }

    pub fn hold(self, url: &str, gate: Arc<Notify>, status: u16, body: &str) -> Self {
        self.push(url, Scripted::Held(gate, FragmentResponse::new(status, body)))
    }

    pub fn refuse(self, url: &str) -> Self {
        self.push(url, Scripted::Refused)
    }

    pub fn panic_on(self, url: &str) -> Self {
        self.push(url, Scripted::Panic)
    }

    pub fn without_client(mut self) -> Self {
        self.client_missing = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.url == url)
            .count()
    }

    fn push(mut self, url: &str, step: Scripted) -> Self {
        self.scripts
            .get_mut()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(step);
        self
    }
}

#[async_trait]
impl FragmentTransport for ScriptedTransport {
    async fn send(&self, method: &str, url: &str) -> Result<FragmentResponse, PollerError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            url: url.to_string(),
            at: Instant::now(),
        });

        if self.client_missing {
            return Err(PollerError::ClientUnavailable("no client".to_string()));
        }

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);

        match step {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Held(gate, response)) => {
                gate.notified().await;
                Ok(response)
            }
            Some(Scripted::Refused) => Err(PollerError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            Some(Scripted::Panic) => panic!("scripted transport failure for {url}"),
            None => Ok(FragmentResponse::new(503, "")),
        }
    }
}
