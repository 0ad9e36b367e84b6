//! # CRUD Management
//!
//! Commits modal working copies into the rows and queues the matching API
//! calls; applies sync outcomes back to the rows.
//!
//! Local state is updated optimistically at commit time. Requests are only
//! queued here; the controller takes them with `take_sync_requests` and hands
//! them to the sync queue.

use crate::config::SyncFailurePolicy;
use crate::grid::error::{GridError, PatientId};
use crate::grid::events::{GridCursor, InteractionState, ViewEvent};
use crate::grid::models::{sort_rows, Item, ItemKey, ModalTarget, Record, Row};
use crate::grid::services::{SyncOutcome, SyncRequest, SyncSuccess};
use crate::grid::view_models::core::ViewModel;

/// Where an edit commit landed
struct CommittedEdit {
    patient_id: PatientId,
    column: String,
}

impl ViewModel {
    /// Enter in a form: commit according to the open modal
    pub fn commit_form(&mut self) -> Result<(), GridError> {
        match self.state {
            InteractionState::Adding => {
                self.commit_add();
                Ok(())
            }
            InteractionState::Editing => self.commit_edit().map(|_| ()),
            _ => Ok(()),
        }
    }

    /// Queue the new patient built from the add-new modal
    pub fn commit_add(&mut self) {
        if self.state != InteractionState::Adding {
            return;
        }
        let Some(working_copy) = self.close_modal() else {
            return;
        };

        let token = ItemKey::next();
        tracing::info!("Creating patient ({:?})", token);
        self.outbox.push(SyncRequest::CreatePatient {
            token,
            body: working_copy.to_patient_template(),
        });
    }

    /// Write the column modal's working copy back to its item
    fn commit_edit(&mut self) -> Result<Option<CommittedEdit>, GridError> {
        if self.state != InteractionState::Editing {
            return Ok(None);
        }
        let Some(working_copy) = self.close_modal() else {
            return Ok(None);
        };
        let ModalTarget::Item {
            patient_id,
            column,
            item_key,
        } = working_copy.target().clone()
        else {
            return Ok(None);
        };

        let Some(schema_column) = self.columns.iter().find(|c| c.name == column).cloned() else {
            return Err(GridError::UnknownColumn(column));
        };
        let rix = self.row_index_for_patient(patient_id)?;
        let record = working_copy.to_record();

        let items = self.rows[rix].items_mut(&column);
        let Some(iix) = items.iter().position(|item| item.key() == item_key) else {
            tracing::warn!("Edited item of patient {} is gone, dropping the edit", patient_id);
            self.set_status_message("Edited item no longer exists");
            return Ok(None);
        };

        let request = if schema_column.single {
            items[iix].replace_record(record.clone());
            Some(SyncRequest::UpdateCell {
                patient_id,
                column: column.clone(),
                body: record,
            })
        } else if items[iix].is_placeholder() {
            if &record == working_copy.base() {
                // Nothing typed into the "add" item
                None
            } else {
                items[iix].replace_record(record.clone());
                items.push(Item::placeholder(patient_id));
                Some(SyncRequest::CreateItem {
                    patient_id,
                    column: column.clone(),
                    item_key,
                    body: record,
                })
            }
        } else {
            let item_id = items[iix].id();
            items[iix].replace_record(record.clone());
            Some(SyncRequest::UpdateItem {
                patient_id,
                column: column.clone(),
                item_key,
                item_id,
                body: record,
            })
        };

        if let Some(request) = request {
            tracing::debug!("Committed {}", request.describe());
            self.outbox.push(request);
        }

        if schema_column.is_location() {
            sort_rows(&mut self.rows);
            let rix = self.row_index_for_patient(patient_id)?;
            self.set_cursor(GridCursor::new(rix, 0, 0));
            self.emit_view_event([ViewEvent::RowsReordered]);
        } else {
            self.emit_view_event([ViewEvent::GridContentChanged]);
        }

        Ok(Some(CommittedEdit { patient_id, column }))
    }

    /// Commit, then edit the new trailing "add" item of the same cell
    pub fn commit_and_add_next(&mut self) -> Result<(), GridError> {
        let Some(CommittedEdit { patient_id, column }) = self.commit_edit()? else {
            return Ok(());
        };
        let Some(cix) = self.columns.iter().position(|c| c.name == column) else {
            return Ok(());
        };
        if self.columns[cix].single {
            return Ok(());
        }

        let rix = self.row_index_for_patient(patient_id)?;
        let last = self.item_count(rix, cix).saturating_sub(1);
        self.set_cursor(GridCursor::new(rix, cix, last));
        self.begin_edit();
        Ok(())
    }

    /// Delete the item of the open confirmation modal
    pub fn confirm_delete(&mut self) -> Result<(), GridError> {
        if self.state != InteractionState::Deleting {
            return Ok(());
        }
        let Some(working_copy) = self.close_modal() else {
            return Ok(());
        };
        let ModalTarget::Item {
            patient_id,
            column,
            item_key,
        } = working_copy.target().clone()
        else {
            return Ok(());
        };

        let rix = self.row_index_for_patient(patient_id)?;
        let items = self.rows[rix].items_mut(&column);
        let Some(iix) = items.iter().position(|item| item.key() == item_key) else {
            return Ok(());
        };
        let removed = items.remove(iix);

        let request = SyncRequest::DeleteItem {
            patient_id,
            column,
            item_key,
            item_id: removed.id(),
        };
        tracing::debug!("Committed {}", request.describe());
        self.outbox.push(request);

        self.clamp_cursor();
        self.emit_view_event([ViewEvent::GridContentChanged, ViewEvent::CursorMoved]);
        Ok(())
    }

    /// Apply the result of a finished sync request
    ///
    /// Rows that disappeared in the meantime (reload) are skipped.
    pub fn apply_sync_outcome(&mut self, outcome: SyncOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.emit_view_event([ViewEvent::StatusBarUpdateRequired]);

        let SyncOutcome { request, result } = outcome;
        match result {
            Ok(SyncSuccess::PatientCreated(record)) => {
                if let Err(e) = self.insert_created_patient(&record) {
                    self.handle_sync_failure(&request, &e);
                }
            }
            Ok(SyncSuccess::ItemCreated { id }) => self.assign_item_id(&request, id),
            Ok(SyncSuccess::Updated) | Ok(SyncSuccess::Deleted) => {}
            Err(e) => self.handle_sync_failure(&request, &e),
        }
    }

    fn insert_created_patient(&mut self, record: &Record) -> Result<(), GridError> {
        let row = Row::from_record(record, &self.columns)?;
        let patient_id = row.patient_id();
        let selected_patient = self.current_row().map(Row::patient_id);

        match self.rows.iter().position(|r| r.patient_id() == patient_id) {
            Some(existing) => self.rows[existing] = row,
            None => self.rows.push(row),
        }
        sort_rows(&mut self.rows);
        tracing::info!("Patient {} created", patient_id);

        if self.state == InteractionState::Normal {
            let rix = self.row_index_for_patient(patient_id)?;
            self.set_cursor(GridCursor::new(rix, 0, 0));
        } else if let Some(rix) = selected_patient.and_then(|id| {
            self.rows.iter().position(|r| r.patient_id() == id)
        }) {
            // A modal is open on the selected row; keep it selected
            self.cursor.rix = rix;
        }
        self.emit_view_event([ViewEvent::RowsReordered]);
        Ok(())
    }

    fn assign_item_id(&mut self, request: &SyncRequest, id: i64) {
        let SyncRequest::CreateItem {
            patient_id,
            column,
            item_key,
            ..
        } = request
        else {
            return;
        };
        let Some(row) = self.rows.iter_mut().find(|r| r.patient_id() == *patient_id) else {
            return;
        };
        if let Some(item) = row
            .items_mut(column)
            .iter_mut()
            .find(|item| item.key() == *item_key)
        {
            item.set_id(id);
            self.emit_view_event([ViewEvent::GridContentChanged]);
        }
    }

    fn handle_sync_failure(&mut self, request: &SyncRequest, error: &GridError) {
        tracing::warn!(
            "Sync failure ({:?} policy): {}: {}",
            self.failure_policy,
            request.describe(),
            error
        );
        match self.failure_policy {
            SyncFailurePolicy::Silent => {}
            SyncFailurePolicy::Notify => {
                self.set_status_message(format!("Sync failed: {}: {}", request.describe(), error));
            }
            SyncFailurePolicy::Reload => {
                self.set_status_message(format!(
                    "Sync failed: {}: {} (reloading)",
                    request.describe(),
                    error
                ));
                self.request_reload();
            }
        }
    }
}
