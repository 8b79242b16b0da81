use anyhow::Result;
use async_channel::bounded;
use async_channel::Receiver;
use async_channel::Sender;
use domain_keys::keys::RouteKey;
use hashbrown::HashMap;
use log::*;
use service_uptime::Uptime;

use crate::kv;
use crate::worker::{JsonString, WorkerState, WorkerStatus, OK};

#[derive(Debug, Clone)]
pub enum Command {
    Set(String, String, Sender<Option<String>>),
    Get(String, Sender<Option<String>>),
    Remove(String, Sender<Option<String>>),
    Keys(String, Sender<Vec<String>>), // exact key, or a prefix ending in '*'
    Len(Sender<usize>),
    Status(Sender<JsonString>), // request the worker's status
    Shutdown,
}

// the handler loop
pub async fn handler(id: String, rx: Receiver<Command>) -> Result<()> {
    let uptime = Uptime::new();
    let mut state = WorkerState::Idle;
    let mut error_count = 0;

    let mut cache: HashMap<String, String> = HashMap::new();

    // now read and respond to requests
    while let Ok(cmd) = rx.recv().await {
        debug!("recv cmd: {:?}", cmd);
        match cmd {
            Command::Set(key, value, tx) => {
                let prev = cache.insert(key, value);
                error_count += send_response(prev, tx).await;
            }
            Command::Get(key, tx) => {
                let value = cache.get(&key).cloned();
                error_count += send_response(value, tx).await;
            }
            Command::Remove(key, tx) => {
                let prev = cache.remove(&key);
                error_count += send_response(prev, tx).await;
            }
            Command::Keys(pattern, tx) => {
                let mut list: Vec<String> = cache
                    .keys()
                    .filter(|k| kv::key_matches(&pattern, k))
                    .cloned()
                    .collect();
                list.sort();
                error_count += send_response(list, tx).await;
            }
            Command::Len(tx) => {
                error_count += send_response(cache.len(), tx).await;
            }
            Command::Status(tx) => {
                let status = WorkerStatus::new(
                    id.to_string(),
                    OK.to_string(),
                    state.clone(),
                    uptime.to_string(),
                    error_count,
                );

                let msg = match serde_json::to_string(&status) {
                    Ok(js) => js,
                    Err(e) => {
                        format!(r#"{}"status":"json parse error: {:?}"{}"#, "{", e, "}\n")
                    }
                };

                info!("status response: {}", msg);
                error_count += send_response(msg, tx).await;
            }
            Command::Shutdown => {
                state = WorkerState::Shutdown;
                info!("worker id: {}, state: {:?}", id, state);
                break;
            }
        }
    }

    // helper functions
    async fn send_response<T>(msg: T, tx: Sender<T>) -> u16 {
        if tx.send(msg).await.is_err() {
            error!("error sending response, the requester is gone");
            1u16
        } else {
            0u16
        }
    }

    // drop anything queued behind the shutdown so no requester waits on a reply
    rx.close();
    while let Ok(cmd) = rx.try_recv() {
        warn!("dropped request after shutdown: {:?}", cmd);
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct Worker {
    id: String,
    uptime: Uptime,
    request_tx: Sender<Command>,
}

//
impl Worker {
    /// create and start a new worker with room for `capacity` queued requests.
    pub async fn new(capacity: usize) -> Worker {
        let uptime = Uptime::new();
        let id = RouteKey::create();

        // this is for the worker struct
        let wid = id.clone();

        info!("starting up worker, id: {}", id);

        let (request_tx, request_receiver) = bounded(capacity.max(1));

        // run the handler loop as a background task
        async_std::task::spawn(async move {
            match handler(id.clone(), request_receiver).await {
                Ok(()) => info!("worker handler exit for worker id: {}", id),
                Err(e) => error!("worker exit with error: {:?}", e),
            }
        });

        let worker = Worker {
            id: wid,
            uptime,
            request_tx,
        };

        info!("worker created: {:?}", &worker);

        worker
    }

    /// return the worker's id
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    /// return the worker's uptime as days, hours, minutes and seconds
    pub fn get_uptime(&self) -> String {
        self.uptime.to_string()
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.uptime.get_uptime_seconds()
    }

    /// This is invoked by the client to enable sending command request to
    /// the worker
    pub fn request_channel(&self) -> Sender<Command> {
        self.request_tx.clone()
    }
}
