/// blocking `KeyValueStore` client over a cache worker.  Each call sends one command
/// and waits for the reply, so it must not be called from inside an async task.
///
use anyhow::{anyhow, Context, Result};
use async_channel::Sender;
use async_std::task;
use std::sync::Arc;

use super::worker::{Command, Worker};
use crate::config::CacheConfig;
use crate::kv::{self, KeyValuePair, KeyValueStore};
use crate::logging::LogProvider;
use crate::worker::WorkerStatus;

pub struct CacheStore {
    worker: Worker,
    logger: Arc<dyn LogProvider>,
}

impl CacheStore {
    /// start a cache worker and connect to it
    pub fn new(logger: Arc<dyn LogProvider>, config: &CacheConfig) -> CacheStore {
        let worker = task::block_on(Worker::new(config.capacity));
        CacheStore { worker, logger }
    }

    pub fn worker_id(&self) -> String {
        self.worker.id()
    }

    // send one request and wait for its reply
    fn call<T>(&self, request: impl FnOnce(Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = async_channel::bounded(1);
        let cmd = request(tx);

        let request_tx = self.worker.request_channel();
        let id = self.worker.id();

        task::block_on(async move {
            request_tx
                .send(cmd)
                .await
                .map_err(|_| anyhow!("cache worker {} is not accepting requests", id))?;

            let reply = rx
                .recv()
                .await
                .context("cache worker dropped the request")?;
            Ok::<T, anyhow::Error>(reply)
        })
    }

    /// the value stored under an exact key
    pub fn get(&self, key: &str) -> Option<String> {
        match self.call(|tx| Command::Get(key.to_string(), tx)) {
            Ok(value) => {
                self.logger.trace(&format!(
                    "cache replied for GET {}: {}",
                    key,
                    value.as_deref().unwrap_or_default()
                ));
                value
            }
            Err(e) => {
                self.logger.error(&format!("{:#}", e));
                None
            }
        }
    }

    /// the keys selected by `pattern`, sorted
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        match self.call(|tx| Command::Keys(pattern.to_string(), tx)) {
            Ok(keys) => {
                self.logger.trace(&format!(
                    "cache replied for KEYS {}: returns elements: {}",
                    pattern,
                    keys.len()
                ));
                keys
            }
            Err(e) => {
                self.logger.error(&format!("{:#}", e));
                vec![]
            }
        }
    }

    /// remove a key, returning its value
    pub fn remove(&self, key: &str) -> Option<String> {
        self.call(|tx| Command::Remove(key.to_string(), tx))
            .unwrap_or_else(|e| {
                self.logger.error(&format!("{:#}", e));
                None
            })
    }

    pub fn len(&self) -> usize {
        self.call(Command::Len).unwrap_or_else(|e| {
            self.logger.error(&format!("{:#}", e));
            0
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// the worker's status; a worker that does not answer reports as down
    pub fn status(&self) -> WorkerStatus {
        let status: Result<WorkerStatus> = self
            .call(Command::Status)
            .and_then(|js| serde_json::from_str(&js).context("invalid status json"));

        match status {
            Ok(status) => status,
            Err(e) => {
                self.logger.warn(&format!("{:#}", e));
                WorkerStatus::down(self.worker_id())
            }
        }
    }

    /// stop the worker; later requests fail
    pub fn shutdown(&self) -> Result<()> {
        task::block_on(self.worker.request_channel().send(Command::Shutdown))
            .map_err(|_| anyhow!("cache worker {} is already down", self.worker.id()))
    }

    // single key, or every key under a wildcard prefix, mapped through `make`
    fn collect<T>(&self, key: &str, make: impl Fn(String, String) -> T) -> Vec<T> {
        if key.is_empty() {
            return vec![];
        }

        if kv::wildcard_prefix(key).is_none() {
            return self
                .get(key)
                .map(|value| make(key.to_string(), value))
                .into_iter()
                .collect();
        }

        self.keys(key)
            .into_iter()
            .filter_map(|subkey| self.get(&subkey).map(|value| make(subkey, value)))
            .collect()
    }
}

impl KeyValueStore for CacheStore {
    fn get_value(&self, key: &str) -> Vec<String> {
        self.collect(key, |_, value| value)
    }

    fn get_key_value(&self, key: &str) -> Vec<KeyValuePair> {
        self.collect(key, |key, value| KeyValuePair { key, value })
    }

    fn set_value(&self, key: &str, value: &str) -> bool {
        match self.call(|tx| Command::Set(key.to_string(), value.to_string(), tx)) {
            Ok(prev) => {
                self.logger.trace(&format!(
                    "cache replied for SET {} {}: {}",
                    key,
                    value,
                    prev.as_deref().unwrap_or_default()
                ));
                true
            }
            Err(e) => {
                self.logger
                    .error(&format!("cache is not connected! cannot set any values! {:#}", e));
                false
            }
        }
    }
}
