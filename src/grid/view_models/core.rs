//! # Core ViewModel Structure
//!
//! Contains the main ViewModel struct, schema/data loading and the snapshot
//! handed to commands and the renderer. This is the single explicit state
//! object of a grid session; every handler receives it from the controller.

use crate::config::SyncFailurePolicy;
use crate::grid::error::{GridError, PatientId};
use crate::grid::events::{GridCursor, InteractionState, MousePosition, ViewEvent};
use crate::grid::models::{sort_rows, Column, Item, OptionLists, Record, Row, Schema, WorkingCopy};
use crate::grid::services::SyncRequest;

/// Default terminal size until the first resize arrives
pub const DEFAULT_TERMINAL_SIZE: (u16, u16) = (80, 24);

pub struct ViewModel {
    pub(super) columns: Vec<Column>,
    pub(super) rows: Vec<Row>,
    pub(super) option_lists: OptionLists,
    pub(super) cursor: GridCursor,
    pub(super) mouse: Option<MousePosition>,
    pub(super) state: InteractionState,
    pub(super) working_copy: Option<WorkingCopy>,
    pub(super) status_message: Option<String>,
    pub(super) failure_policy: SyncFailurePolicy,
    pub(super) reload_requested: bool,
    pub(super) outbox: Vec<SyncRequest>,
    pub(super) in_flight: usize,
    pub(super) terminal_size: (u16, u16),
    pending_view_events: Vec<ViewEvent>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            option_lists: OptionLists::new(),
            cursor: GridCursor::zero(),
            mouse: None,
            state: InteractionState::Normal,
            working_copy: None,
            status_message: None,
            failure_policy: SyncFailurePolicy::default(),
            reload_requested: false,
            outbox: Vec::new(),
            in_flight: 0,
            terminal_size: DEFAULT_TERMINAL_SIZE,
            pending_view_events: Vec::new(),
        }
    }

    pub fn with_failure_policy(mut self, policy: SyncFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Install columns and option lists from the schema payload
    pub fn load_schema(&mut self, schema: Schema) {
        tracing::info!(
            "Schema loaded: {} columns, {} option lists",
            schema.columns.len(),
            schema.option_lists.len()
        );
        self.option_lists = OptionLists::from_schema(&schema.option_lists);
        self.columns = schema.columns;
        self.clamp_cursor();
        self.emit_view_event([ViewEvent::FullRedrawRequired]);
    }

    /// Replace all rows with the patient list payload, normalized and sorted
    ///
    /// The cursor stays on the same patient when that patient is still listed.
    pub fn load_patients(&mut self, records: Vec<Record>) -> Result<(), GridError> {
        let selected_patient = self.current_row().map(Row::patient_id);

        let mut rows = records
            .iter()
            .map(|record| Row::from_record(record, &self.columns))
            .collect::<Result<Vec<_>, _>>()?;
        sort_rows(&mut rows);
        self.rows = rows;
        tracing::info!("Patient list loaded: {} rows", self.rows.len());

        if let Some(rix) = selected_patient.and_then(|id| self.find_row(id)) {
            self.cursor.rix = rix;
        }
        self.clamp_cursor();
        self.emit_view_event([ViewEvent::FullRedrawRequired]);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn option_lists(&self) -> &OptionLists {
        &self.option_lists
    }

    pub fn cursor(&self) -> GridCursor {
        self.cursor
    }

    pub fn mouse(&self) -> Option<MousePosition> {
        self.mouse
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn working_copy(&self) -> Option<&WorkingCopy> {
        self.working_copy.as_ref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.emit_view_event([ViewEvent::StatusBarUpdateRequired]);
    }

    pub fn clear_status_message(&mut self) {
        if self.status_message.take().is_some() {
            self.emit_view_event([ViewEvent::StatusBarUpdateRequired]);
        }
    }

    pub fn failure_policy(&self) -> SyncFailurePolicy {
        self.failure_policy
    }

    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    pub fn update_terminal_size(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        self.emit_view_event([ViewEvent::FullRedrawRequired]);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of items in a cell; 0 for out-of-range coordinates
    pub fn item_count(&self, rix: usize, cix: usize) -> usize {
        match (self.rows.get(rix), self.columns.get(cix)) {
            (Some(row), Some(column)) => row.item_count(&column.name),
            _ => 0,
        }
    }

    pub fn current_row(&self) -> Option<&Row> {
        self.rows.get(self.cursor.rix)
    }

    pub fn current_column(&self) -> Option<&Column> {
        self.columns.get(self.cursor.cix)
    }

    pub fn current_item(&self) -> Option<&Item> {
        let column = self.current_column()?;
        self.current_row()?.items(&column.name).get(self.cursor.iix)
    }

    fn find_row(&self, patient_id: PatientId) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.patient_id() == patient_id)
    }

    /// Row index of a patient; a miss is the grid's one fatal condition
    pub fn row_index_for_patient(&self, patient_id: PatientId) -> Result<usize, GridError> {
        self.find_row(patient_id)
            .ok_or(GridError::PatientNotFound(patient_id))
    }

    /// Requests issued since the last call, counted as in flight
    pub fn take_sync_requests(&mut self) -> Vec<SyncRequest> {
        let requests = std::mem::take(&mut self.outbox);
        self.in_flight += requests.len();
        if !requests.is_empty() {
            self.emit_view_event([ViewEvent::StatusBarUpdateRequired]);
        }
        requests
    }

    /// Requests queued but not yet taken by the controller
    pub fn pending_sync_requests(&self) -> &[SyncRequest] {
        &self.outbox
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// A reload was requested (by key or by the failure policy)
    pub fn reload_requested(&self) -> bool {
        self.reload_requested
    }

    pub fn request_reload(&mut self) {
        self.reload_requested = true;
    }

    /// Consume a pending reload request; only honoured in `normal` state
    pub fn take_reload_request(&mut self) -> bool {
        if self.reload_requested && self.state == InteractionState::Normal {
            self.reload_requested = false;
            true
        } else {
            false
        }
    }

    pub(super) fn emit_view_event<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = ViewEvent>,
    {
        self.pending_view_events.extend(events);
    }

    /// Collect and clear the view events emitted since the last render
    pub fn collect_pending_view_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.pending_view_events)
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::new()
    }
}
