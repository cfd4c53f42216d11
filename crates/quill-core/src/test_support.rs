//! In-memory fakes for the storage and provider ports.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use quill_types::error::{LlmError, RemoteError, RepositoryError};
use quill_types::llm::{ChatRequest, ProviderStatus};
use quill_types::storage::{RemoteRoute, StorageKey};
use serde_json::Value;

use crate::llm::ChatProvider;
use crate::storage::{LocalCache, RemoteStore};

#[derive(Default)]
pub struct MemoryCache {
    values: Mutex<HashMap<StorageKey, Value>>,
    fail_writes: Mutex<bool>,
    puts: AtomicUsize,
}

impl MemoryCache {
    pub fn with(key: StorageKey, value: Value) -> Self {
        let cache = Self::default();
        cache.values.lock().unwrap().insert(key, value);
        cache
    }

    pub fn snapshot(&self, key: StorageKey) -> Option<Value> {
        self.values.lock().unwrap().get(&key).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl LocalCache for MemoryCache {
    async fn get(&self, key: StorageKey) -> Result<Option<Value>, RepositoryError> {
        Ok(self.snapshot(key))
    }

    async fn put(&self, key: StorageKey, value: &Value) -> Result<(), RepositoryError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(RepositoryError::Query("disk full".into()));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.values.lock().unwrap().insert(key, value.clone());
        Ok(())
    }
}

/// How the fake remote answers.
#[derive(Debug, Clone)]
pub enum RemoteBehavior {
    /// Serve whatever was last pushed (or the seed).
    Serve,
    /// Every call fails with a transport error.
    Unreachable,
    /// Every call answers with the stateless sentinel.
    Stateless,
    /// Fetch answers with a body that is not a snapshot.
    Malformed,
}

pub struct FakeRemote {
    behavior: Mutex<RemoteBehavior>,
    value: Mutex<Option<Value>>,
    fetches: AtomicUsize,
    pushes: AtomicUsize,
}

impl FakeRemote {
    pub fn new(behavior: RemoteBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            value: Mutex::new(None),
            fetches: AtomicUsize::new(0),
            pushes: AtomicUsize::new(0),
        }
    }

    pub fn serving(value: Value) -> Self {
        let remote = Self::new(RemoteBehavior::Serve);
        *remote.value.lock().unwrap() = Some(value);
        remote
    }

    pub fn set_behavior(&self, behavior: RemoteBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn stored(&self) -> Option<Value> {
        self.value.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn push_count(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

impl RemoteStore for FakeRemote {
    async fn fetch(&self, _route: RemoteRoute) -> Result<Value, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            RemoteBehavior::Serve => Ok(self.stored().unwrap_or_else(|| Value::Array(Vec::new()))),
            RemoteBehavior::Unreachable => Err(RemoteError::Transport("connection refused".into())),
            RemoteBehavior::Stateless => {
                Err(RemoteError::UseLocalStorage("serverless deployment".into()))
            }
            RemoteBehavior::Malformed => Ok(Value::String("not a snapshot".into())),
        }
    }

    async fn push(&self, _route: RemoteRoute, value: &Value) -> Result<(), RemoteError> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            RemoteBehavior::Unreachable => Err(RemoteError::Transport("connection refused".into())),
            RemoteBehavior::Stateless => {
                Err(RemoteError::UseLocalStorage("serverless deployment".into()))
            }
            _ => {
                *self.value.lock().unwrap() = Some(value.clone());
                Ok(())
            }
        }
    }
}

pub struct FakeProvider {
    status: Mutex<Result<ProviderStatus, String>>,
    replies: Mutex<Vec<Result<String, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeProvider {
    pub fn configured() -> Self {
        Self {
            status: Mutex::new(Ok(ProviderStatus {
                configured: true,
                message: "API key configured".into(),
            })),
            replies: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(status: Result<ProviderStatus, String>) -> Self {
        let provider = Self::configured();
        *provider.status.lock().unwrap() = status;
        provider
    }

    /// Queue the next completion result. Results are consumed in order.
    pub fn reply(&self, result: Result<String, LlmError>) {
        self.replies.lock().unwrap().push(result);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatProvider for FakeProvider {
    async fn check(&self) -> Result<ProviderStatus, LlmError> {
        self.status
            .lock()
            .unwrap()
            .clone()
            .map_err(LlmError::Transport)
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok("ok".to_string());
        }
        replies.remove(0)
    }
}
