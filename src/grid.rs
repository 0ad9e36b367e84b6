//! # Patient Grid
//!
//! A keyboard-driven grid over a patient-list API, laid out as MVVM:
//!
//! ```text
//! ┌────────────┐  CommandEvents  ┌────────────┐  SyncRequests  ┌───────────┐
//! │  Commands  │────────────────▶│ ViewModel  │───────────────▶│ SyncQueue │
//! │ (key map)  │                 │ (state)    │◀───────────────│ (workers) │
//! └────────────┘                 └────────────┘  SyncOutcomes  └───────────┘
//!       ▲                              │ ViewEvents                  │
//!       │ KeyEvent                     ▼                             ▼
//! ┌────────────┐                 ┌────────────┐                ┌───────────┐
//! │ Controller │────────────────▶│ render_grid│                │ ApiClient │
//! │ event loop │      Frame      │ + renderer │                │ (reqwest) │
//! └────────────┘                 └────────────┘                └───────────┘
//! ```
//!
//! Rows are patients, columns come from the server schema, and each cell holds
//! an ordered list of items. Multi-valued cells end with a placeholder item
//! that turns into a real item when edited.

pub mod commands;
pub mod controllers;
pub mod error;
pub mod events;
pub mod io;
pub mod models;
pub mod services;
pub mod view_models;
pub mod views;

pub use commands::{CommandEvent, CommandRegistry};
pub use controllers::AppController;
pub use error::{GridError, PatientId};
pub use events::{GridCursor, InteractionState, MousePosition, ViewEvent};
pub use io::{EventStream, RenderStream};
pub use models::{Column, Item, OptionLists, Record, Row, Schema};
pub use services::{ApiClient, SyncOutcome, SyncQueue, SyncRequest, SyncSuccess};
pub use view_models::ViewModel;
pub use views::{render_grid, Frame, GridSnapshot};
