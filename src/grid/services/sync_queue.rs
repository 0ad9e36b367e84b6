//! # Sync Queue
//!
//! Serializes mutation calls per patient/column/item key. Each key owns one
//! worker task that executes its requests strictly in submission order, so an
//! update or delete submitted while the item's create is in flight waits for
//! the create and then targets the id the server assigned. Requests for
//! different keys run concurrently. A worker lives only while its key has
//! outcomes not yet taken from the queue.
//!
//! Outcomes are delivered over a channel that the controller drains on its
//! event loop; workers never touch grid state.

use crate::grid::error::{GridError, PatientId};
use crate::grid::models::{ItemKey, Record};
use crate::grid::services::api::{cell_path, item_path, patients_path, ApiClient};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Serialization key of a sync request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncKey {
    /// One add-new submission
    NewPatient(ItemKey),
    /// The sole item of a single-valued column
    Cell { patient_id: PatientId, column: String },
    /// One item of a multi-valued column
    Item {
        patient_id: PatientId,
        column: String,
        item_key: ItemKey,
    },
}

/// A mutation call to the API
#[derive(Debug, Clone, PartialEq)]
pub enum SyncRequest {
    CreatePatient {
        token: ItemKey,
        body: Record,
    },
    UpdateCell {
        patient_id: PatientId,
        column: String,
        body: Record,
    },
    CreateItem {
        patient_id: PatientId,
        column: String,
        item_key: ItemKey,
        body: Record,
    },
    /// `item_id` is `None` while the item's create is still in flight
    UpdateItem {
        patient_id: PatientId,
        column: String,
        item_key: ItemKey,
        item_id: Option<i64>,
        body: Record,
    },
    DeleteItem {
        patient_id: PatientId,
        column: String,
        item_key: ItemKey,
        item_id: Option<i64>,
    },
}

impl SyncRequest {
    pub fn key(&self) -> SyncKey {
        match self {
            SyncRequest::CreatePatient { token, .. } => SyncKey::NewPatient(*token),
            SyncRequest::UpdateCell {
                patient_id, column, ..
            } => SyncKey::Cell {
                patient_id: *patient_id,
                column: column.clone(),
            },
            SyncRequest::CreateItem {
                patient_id,
                column,
                item_key,
                ..
            }
            | SyncRequest::UpdateItem {
                patient_id,
                column,
                item_key,
                ..
            }
            | SyncRequest::DeleteItem {
                patient_id,
                column,
                item_key,
                ..
            } => SyncKey::Item {
                patient_id: *patient_id,
                column: column.clone(),
                item_key: *item_key,
            },
        }
    }

    /// Method and path, for logs and status messages
    pub fn describe(&self) -> String {
        match self {
            SyncRequest::CreatePatient { .. } => format!("POST {}", patients_path()),
            SyncRequest::UpdateCell {
                patient_id, column, ..
            } => format!("PUT {}", cell_path(*patient_id, column)),
            SyncRequest::CreateItem {
                patient_id, column, ..
            } => format!("POST {}", cell_path(*patient_id, column)),
            SyncRequest::UpdateItem {
                patient_id,
                column,
                item_id,
                ..
            } => match item_id {
                Some(id) => format!("PUT {}", item_path(*patient_id, column, *id)),
                None => format!("PUT {}<pending>/", cell_path(*patient_id, column)),
            },
            SyncRequest::DeleteItem {
                patient_id,
                column,
                item_id,
                ..
            } => match item_id {
                Some(id) => format!("DELETE {}", item_path(*patient_id, column, *id)),
                None => format!("DELETE {}<pending>/", cell_path(*patient_id, column)),
            },
        }
    }
}

/// Successful result of a sync request
#[derive(Debug, Clone, PartialEq)]
pub enum SyncSuccess {
    /// Full record of the new patient, including its id
    PatientCreated(Record),
    /// Server id assigned to a new multi-valued item
    ItemCreated { id: i64 },
    Updated,
    Deleted,
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub request: SyncRequest,
    pub result: Result<SyncSuccess, GridError>,
}

type WorkerSender = mpsc::UnboundedSender<SyncRequest>;

/// A key's worker and the number of its requests whose outcome has not been taken
struct Worker {
    sender: WorkerSender,
    unfinished: usize,
}

pub struct SyncQueue {
    api: Arc<ApiClient>,
    workers: HashMap<SyncKey, Worker>,
    outcome_sender: mpsc::UnboundedSender<SyncOutcome>,
    outcome_receiver: mpsc::UnboundedReceiver<SyncOutcome>,
}

impl SyncQueue {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (outcome_sender, outcome_receiver) = mpsc::unbounded_channel();
        Self {
            api,
            workers: HashMap::new(),
            outcome_sender,
            outcome_receiver,
        }
    }

    /// Queue a request behind every earlier request with the same key
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, request: SyncRequest) {
        let key = request.key();
        tracing::debug!("Queueing {} for {:?}", request.describe(), key);

        let request = match self.workers.get_mut(&key) {
            Some(worker) => match worker.sender.send(request) {
                Ok(()) => {
                    worker.unfinished += 1;
                    return;
                }
                Err(mpsc::error::SendError(request)) => request,
            },
            None => request,
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(
            Arc::clone(&self.api),
            receiver,
            self.outcome_sender.clone(),
        ));
        if sender.send(request).is_err() {
            tracing::error!("Sync worker for {:?} stopped before its first request", key);
            return;
        }
        self.workers.insert(
            key,
            Worker {
                sender,
                unfinished: 1,
            },
        );
    }

    /// Next finished outcome, without waiting
    pub fn try_next_outcome(&mut self) -> Option<SyncOutcome> {
        let outcome = self.outcome_receiver.try_recv().ok()?;
        self.finish(&outcome);
        Some(outcome)
    }

    /// Wait for the next finished outcome
    pub async fn next_outcome(&mut self) -> Option<SyncOutcome> {
        let outcome = self.outcome_receiver.recv().await?;
        self.finish(&outcome);
        Some(outcome)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Dropping an idle worker's sender ends its task; the key's next
    /// request starts a fresh one and carries the item id from the grid.
    fn finish(&mut self, outcome: &SyncOutcome) {
        let key = outcome.request.key();
        let Some(worker) = self.workers.get_mut(&key) else {
            return;
        };
        worker.unfinished = worker.unfinished.saturating_sub(1);
        if worker.unfinished == 0 {
            self.workers.remove(&key);
            tracing::trace!("Released idle sync worker for {:?}", key);
        }
    }
}

async fn run_worker(
    api: Arc<ApiClient>,
    mut requests: mpsc::UnboundedReceiver<SyncRequest>,
    outcomes: mpsc::UnboundedSender<SyncOutcome>,
) {
    // Id assigned by this key's create, used by later requests that predate it
    let mut resolved_id: Option<i64> = None;

    while let Some(request) = requests.recv().await {
        let result = execute(&api, &request, &mut resolved_id).await;
        match &result {
            Ok(_) => tracing::info!("{} succeeded", request.describe()),
            Err(e) => tracing::warn!("{} failed: {}", request.describe(), e),
        }
        if outcomes.send(SyncOutcome { request, result }).is_err() {
            break;
        }
    }
}

async fn execute(
    api: &ApiClient,
    request: &SyncRequest,
    resolved_id: &mut Option<i64>,
) -> Result<SyncSuccess, GridError> {
    match request {
        SyncRequest::CreatePatient { body, .. } => {
            let record = api.create_patient(body).await?;
            Ok(SyncSuccess::PatientCreated(record))
        }
        SyncRequest::UpdateCell {
            patient_id,
            column,
            body,
        } => {
            api.update_cell(*patient_id, column, body).await?;
            Ok(SyncSuccess::Updated)
        }
        SyncRequest::CreateItem {
            patient_id,
            column,
            body,
            ..
        } => {
            let record = api.create_item(*patient_id, column, body).await?;
            let id = record.get("id").and_then(Value::as_i64).ok_or_else(|| {
                GridError::MalformedPayload("created item has no id".to_string())
            })?;
            *resolved_id = Some(id);
            Ok(SyncSuccess::ItemCreated { id })
        }
        SyncRequest::UpdateItem {
            patient_id,
            column,
            item_id,
            body,
            ..
        } => {
            let id = item_id.or(*resolved_id).ok_or(GridError::UnsavedItem)?;
            api.update_item(*patient_id, column, id, body).await?;
            Ok(SyncSuccess::Updated)
        }
        SyncRequest::DeleteItem {
            patient_id,
            column,
            item_id,
            ..
        } => {
            let id = item_id.or(*resolved_id).ok_or(GridError::UnsavedItem)?;
            api.delete_item(*patient_id, column, id).await?;
            Ok(SyncSuccess::Deleted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_requests_for_the_same_item_should_share_a_key() {
        let item_key = ItemKey::next();
        let create = SyncRequest::CreateItem {
            patient_id: 1,
            column: "diagnosis".to_string(),
            item_key,
            body: Record::new(),
        };
        let delete = SyncRequest::DeleteItem {
            patient_id: 1,
            column: "diagnosis".to_string(),
            item_key,
            item_id: None,
        };
        assert_eq!(create.key(), delete.key());

        let other = SyncRequest::DeleteItem {
            patient_id: 1,
            column: "diagnosis".to_string(),
            item_key: ItemKey::next(),
            item_id: None,
        };
        assert_ne!(create.key(), other.key());
    }

    #[test]
    fn describe_should_name_method_and_path() {
        let update = SyncRequest::UpdateItem {
            patient_id: 4,
            column: "diagnosis".to_string(),
            item_key: ItemKey::next(),
            item_id: Some(8),
            body: Record::new(),
        };
        assert_eq!(update.describe(), "PUT patient/4/diagnosis/8/");

        let cell = SyncRequest::UpdateCell {
            patient_id: 4,
            column: "location".to_string(),
            body: Record::new(),
        };
        assert_eq!(cell.describe(), "PUT patient/4/location/");
    }
}
