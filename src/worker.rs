/// worker support structs
///
use serde::{Deserialize, Serialize};

pub type JsonString = String;

/// the status string of a healthy worker
pub const OK: &str = "ok";
/// the status string of a worker that no longer answers
pub const DOWN: &str = "down";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    #[default]
    Idle,
    Busy,
    Broken,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    pub worker_id: String,
    pub status: String,
    pub state: WorkerState,
    pub uptime: String,
    pub error_count: u16,
}

impl WorkerStatus {
    pub fn new(
        worker_id: String,
        status: String,
        state: WorkerState,
        uptime: String,
        error_count: u16,
    ) -> WorkerStatus {
        WorkerStatus {
            worker_id,
            status,
            state,
            uptime,
            error_count,
        }
    }

    /// the status reported for a worker whose request channel is closed
    pub fn down(worker_id: String) -> WorkerStatus {
        WorkerStatus::new(
            worker_id,
            DOWN.to_string(),
            WorkerState::Shutdown,
            String::new(),
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_json() {
        let status = WorkerStatus::new(
            "abc".to_string(),
            OK.to_string(),
            WorkerState::Idle,
            "0 days, 00:00:01".to_string(),
            0,
        );

        let js = serde_json::to_string(&status).expect("status should serialize");
        assert!(js.contains(r#""state":"Idle""#));

        let back: WorkerStatus = serde_json::from_str(&js).expect("status should parse");
        assert_eq!(back, status);
    }

    #[test]
    fn down() {
        let status = WorkerStatus::down("abc".to_string());
        assert_eq!(status.status, DOWN);
        assert_eq!(status.state, WorkerState::Shutdown);
    }
}
