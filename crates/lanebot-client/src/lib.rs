//! Live-state query boundary for the local game client.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use lanebot_types::{BotError, Result};

pub mod payload;

mod http;

pub use http::HttpLiveClient;
pub use payload::AllGameData;

#[async_trait]
pub trait LiveStateClient: Send + Sync {
    /// One request against the live-state endpoint. Any failure here is
    /// transient from the caller's point of view; escalation is the
    /// fetcher's job.
    async fn fetch(&self) -> Result<AllGameData>;
}

#[async_trait]
impl<T: LiveStateClient + ?Sized> LiveStateClient for Arc<T> {
    async fn fetch(&self) -> Result<AllGameData> {
        (**self).fetch().await
    }
}

/// Canned client used for tests and dry runs: answers from a queue and
/// reports a connection failure once the script runs out.
#[derive(Clone, Default)]
pub struct ScriptedLiveClient {
    frames: Arc<Mutex<VecDeque<Result<AllGameData, String>>>>,
}

impl ScriptedLiveClient {
    pub fn new(frames: Vec<AllGameData>) -> Self {
        Self {
            frames: Arc::new(Mutex::new(frames.into_iter().map(Ok).collect())),
        }
    }

    /// Queue a transient failure before the remaining frames.
    pub fn push_failure(&self, reason: impl Into<String>) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push_back(Err(reason.into()));
        }
    }

    pub fn push_frame(&self, frame: AllGameData) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push_back(Ok(frame));
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LiveStateClient for ScriptedLiveClient {
    async fn fetch(&self) -> Result<AllGameData> {
        let next = self
            .frames
            .lock()
            .map_err(|_| client_error("scripted client poisoned"))?
            .pop_front();
        match next {
            Some(Ok(frame)) => Ok(frame),
            Some(Err(reason)) => Err(client_error(reason)),
            None => Err(client_error("script exhausted")),
        }
    }
}

/// Generate an error aligned with client semantics.
pub fn client_error(message: impl Into<String>) -> BotError {
    BotError::Client(message.into())
}
