//! Shared fixtures for the integration tests: a schema and patient list
//! served by a wiremock `MockServer`, and a controller wired to it through the
//! mock terminal streams.

#![allow(dead_code)]

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use serde_json::{json, Value};
use std::time::Duration;
use wardline::config::{GridProfile, SyncFailurePolicy};
use wardline::grid::io::{MockEventStream, MockRenderStream};
use wardline::AppController;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type TestController = AppController<MockEventStream, MockRenderStream>;

pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

pub fn schema_json() -> Value {
    json!({
        "columns": [
            {
                "name": "location",
                "single": true,
                "fields": [
                    {"name": "category"},
                    {"name": "hospital"},
                    {"name": "ward"},
                    {"name": "bed"}
                ]
            },
            {
                "name": "demographics",
                "single": true,
                "fields": [{"name": "name"}]
            },
            {
                "name": "diagnosis",
                "single": false,
                "option_list": "condition",
                "fields": [{"name": "condition"}]
            }
        ],
        "option_lists": {
            "condition": [["Pneumonia", "Chest infection"], ["Sepsis", null]]
        }
    })
}

/// Patients 1 (T1 bed 9) and 2 (T2 bed 4); served in reverse order
pub fn patients_json() -> Value {
    json!([
        {
            "id": 2,
            "location": {"category": "inpatient", "hospital": "UCH", "ward": "T2", "bed": "4"},
            "demographics": {"name": "Bea"},
            "diagnosis": []
        },
        {
            "id": 1,
            "location": {"category": "inpatient", "hospital": "UCH", "ward": "T1", "bed": "9"},
            "demographics": {"name": "Ann"},
            "diagnosis": [{"id": 11, "patient": 1, "condition": "Pneumonia"}]
        }
    ])
}

/// A server answering the two load endpoints
pub async fn mock_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schema/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/patient/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(patients_json()))
        .mount(&server)
        .await;
    server
}

pub fn profile(server: &MockServer, policy: SyncFailurePolicy) -> GridProfile {
    GridProfile::blank()
        .with_base_url(server.uri())
        .with_sync_failure_policy(policy)
}

/// A loaded controller on a 100x30 mock terminal
pub async fn loaded_controller(server: &MockServer, policy: SyncFailurePolicy) -> TestController {
    let mut controller = AppController::with_io_streams(
        profile(server, policy),
        MockEventStream::empty(),
        MockRenderStream::with_size((100, 30)),
    )
    .expect("controller should be created");
    controller.load().await.expect("initial load should succeed");
    controller
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
}

/// Feed keys one by one; typed text becomes character keys
pub fn press(controller: &mut TestController, keys: &[KeyEvent]) {
    for key_event in keys {
        controller
            .process_event(Event::Key(*key_event))
            .expect("key should be processed");
    }
}

pub fn type_text(controller: &mut TestController, text: &str) {
    let keys: Vec<KeyEvent> = text.chars().map(|ch| key(KeyCode::Char(ch))).collect();
    press(controller, &keys);
}

pub fn clear_field(controller: &mut TestController, length: usize) {
    let keys = vec![key(KeyCode::Backspace); length];
    press(controller, &keys);
}

/// Patient ids in display order
pub fn patient_order(controller: &TestController) -> Vec<i64> {
    controller
        .view_model()
        .rows()
        .iter()
        .map(|row| row.patient_id())
        .collect()
}
