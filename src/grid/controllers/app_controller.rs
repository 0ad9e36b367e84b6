//! # Grid Application Controller
//!
//! Owns the view model and drives the event loop: terminal input goes through
//! the command registry, command events mutate the view model, queued
//! mutations are handed to the sync queue, and sync outcomes are drained back
//! into the view model between input polls. Every pass that left view events
//! behind re-renders the grid.

use crate::cmd_args::CommandLineArgs;
use crate::config::{self, GridProfile, IniProfileStore};
use crate::grid::{
    commands::{CommandContext, CommandEvent, CommandRegistry, ViewModelSnapshot},
    error::GridError,
    events::{MousePosition, ViewEvent},
    io::{EventStream, RenderStream, TerminalEventStream, TerminalRenderStream},
    services::{ApiClient, SyncQueue},
    view_models::ViewModel,
    views::{render_grid, Frame, GridSnapshot, TerminalRenderer, ViewRenderer},
};
use anyhow::Result;
use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use std::io;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct AppController<ES: EventStream, RS: RenderStream> {
    view_model: ViewModel,
    view_renderer: TerminalRenderer<RS>,
    command_registry: CommandRegistry,
    event_stream: ES,
    api: Arc<ApiClient>,
    sync_queue: SyncQueue,
    should_quit: bool,
}

impl AppController<TerminalEventStream, TerminalRenderStream<io::Stdout>> {
    /// Controller on the real terminal, configured from the profile file and CLI
    pub fn new(cmd_args: &CommandLineArgs) -> Result<Self> {
        let profile = Self::load_profile(cmd_args)?;
        Self::with_io_streams(profile, TerminalEventStream::new(), TerminalRenderStream::new())
    }
}

impl<ES: EventStream, RS: RenderStream> AppController<ES, RS> {
    /// Create a controller with injected I/O streams
    pub fn with_io_streams(profile: GridProfile, event_stream: ES, render_stream: RS) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&profile)?);
        let view_renderer = TerminalRenderer::with_render_stream(render_stream)?;

        let mut view_model = ViewModel::new().with_failure_policy(profile.on_sync_failure);
        let (width, height) = view_renderer.terminal_size();
        view_model.update_terminal_size(width, height);

        tracing::info!(
            "Controller ready for {} (on sync failure: {:?})",
            api.base_url(),
            profile.on_sync_failure
        );
        Ok(Self {
            view_model,
            view_renderer,
            command_registry: CommandRegistry::new(),
            event_stream,
            sync_queue: SyncQueue::new(Arc::clone(&api)),
            api,
            should_quit: false,
        })
    }

    /// Named profile from the INI store with command-line overrides applied
    ///
    /// A missing file or section falls back to the blank profile.
    pub fn load_profile(cmd_args: &CommandLineArgs) -> Result<GridProfile> {
        let profile_path = config::get_profile_path();
        let profile_name = cmd_args.profile();
        tracing::debug!("Loading profile '{}' from '{}'", profile_name, profile_path);

        let mut profile = match IniProfileStore::new(&profile_path).get_profile(profile_name)? {
            Some(profile) => profile,
            None => {
                tracing::debug!("Profile '{}' not found, using blank profile", profile_name);
                GridProfile::blank()
            }
        };

        if let Some(base_url) = cmd_args.base_url() {
            profile = profile.with_base_url(base_url);
        }
        if let Some(policy) = cmd_args.on_sync_failure() {
            profile = profile.with_sync_failure_policy(policy);
        }
        Ok(profile)
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    pub fn view_model_mut(&mut self) -> &mut ViewModel {
        &mut self.view_model
    }

    pub fn view_renderer(&self) -> &TerminalRenderer<RS> {
        &self.view_renderer
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Fetch the schema, then the patient list
    pub async fn load(&mut self) -> Result<(), GridError> {
        let schema = self.api.fetch_schema().await?;
        self.view_model.load_schema(schema);
        let patients = self.api.list_patients().await?;
        self.view_model.load_patients(patients)
    }

    /// `load`, reporting failures on the status line instead of failing
    pub async fn reload(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!("Loading from {} failed: {}", self.api.base_url(), e);
            self.view_model.set_status_message(format!("Load failed: {e}"));
        }
    }

    /// Run the main application loop until quit or a fatal error
    pub async fn run(&mut self) -> Result<()> {
        self.view_renderer.initialize()?;
        let result = self.event_loop().await;
        let cleanup = self.view_renderer.cleanup();
        result.and(cleanup)
    }

    async fn event_loop(&mut self) -> Result<()> {
        self.render(true)?;
        self.reload().await;
        self.render_pending()?;

        while !self.should_quit {
            if self.event_stream.poll(POLL_INTERVAL)? {
                let event = self.event_stream.read()?;
                self.process_event(event)?;
            }
            self.drain_sync_outcomes();
            self.reload_if_requested().await;
            self.render_pending()?;
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Dispatch one terminal event
    pub fn process_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                self.process_key_event(key_event)
            }
            Event::Mouse(mouse_event) => {
                self.process_mouse_event(mouse_event);
                Ok(())
            }
            Event::Resize(width, height) => {
                self.view_model.update_terminal_size(width, height);
                self.view_renderer.update_size(width, height);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn process_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        tracing::debug!("Received key event: {:?}", key_event);
        let context = CommandContext::new(ViewModelSnapshot::from_view_model(&self.view_model));
        let events = self.command_registry.process_event(key_event, &context)?;
        if events.is_empty() {
            return Ok(());
        }

        tracing::debug!("Command events generated: {:?}", events);
        if events.iter().any(|event| !matches!(event, CommandEvent::NoAction)) {
            self.view_model.clear_status_message();
        }
        for event in events {
            self.apply_command_event(event)?;
        }
        self.flush_sync_requests();
        Ok(())
    }

    /// Hover tracking and left-click selection through the rendered hit regions
    pub fn process_mouse_event(&mut self, mouse_event: MouseEvent) {
        let frame = self.current_frame();
        let hit = frame
            .hit_test(mouse_event.column, mouse_event.row)
            .copied();

        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(region) = hit {
                    self.view_model.select_item(region.rix, region.cix, region.iix);
                }
            }
            MouseEventKind::Moved => {
                self.view_model
                    .set_mouse_hover(hit.map(|region| MousePosition::new(region.rix, region.cix)));
            }
            _ => {}
        }
    }

    /// Apply a command event to the view model
    fn apply_command_event(&mut self, event: CommandEvent) -> Result<()> {
        let result = match event {
            CommandEvent::CursorMoveRequested { direction } => {
                self.view_model.move_cursor(direction);
                Ok(())
            }
            CommandEvent::EditRequested => {
                self.view_model.begin_edit();
                Ok(())
            }
            CommandEvent::AddRequested => {
                self.view_model.begin_add();
                Ok(())
            }
            CommandEvent::DeleteRequested => {
                self.view_model.begin_delete();
                Ok(())
            }
            CommandEvent::CancelRequested => {
                self.view_model.cancel_modal();
                Ok(())
            }
            CommandEvent::CommitRequested => self.view_model.commit_form(),
            CommandEvent::CommitAndAddNextRequested => self.view_model.commit_and_add_next(),
            CommandEvent::ConfirmDeleteRequested => self.view_model.confirm_delete(),
            CommandEvent::FormCharRequested { ch } => {
                self.view_model.form_insert_char(ch);
                Ok(())
            }
            CommandEvent::FormBackspaceRequested => {
                self.view_model.form_backspace();
                Ok(())
            }
            CommandEvent::FormFocusRequested { direction } => {
                self.view_model.form_move_focus(direction);
                Ok(())
            }
            CommandEvent::FormCompleteRequested => {
                self.view_model.form_complete();
                Ok(())
            }
            CommandEvent::ReloadRequested => {
                self.view_model.request_reload();
                Ok(())
            }
            CommandEvent::QuitRequested => {
                self.should_quit = true;
                Ok(())
            }
            CommandEvent::NoAction => Ok(()),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => {
                tracing::error!("Fatal grid error: {}", e);
                Err(e.into())
            }
            Err(e) => {
                tracing::warn!("Command failed: {}", e);
                self.view_model.set_status_message(e.to_string());
                Ok(())
            }
        }
    }

    /// Hand queued mutations to the sync queue
    fn flush_sync_requests(&mut self) {
        for request in self.view_model.take_sync_requests() {
            self.sync_queue.submit(request);
        }
    }

    /// Apply every outcome that has already arrived
    fn drain_sync_outcomes(&mut self) {
        while let Some(outcome) = self.sync_queue.try_next_outcome() {
            self.view_model.apply_sync_outcome(outcome);
        }
        self.flush_sync_requests();
    }

    async fn reload_if_requested(&mut self) {
        if self.view_model.take_reload_request() {
            tracing::info!("Reloading schema and patients");
            self.reload().await;
        }
    }

    /// Wait until every in-flight request has reported back
    pub async fn settle(&mut self, timeout: Duration) -> Result<()> {
        self.flush_sync_requests();
        let deadline = tokio::time::Instant::now() + timeout;
        while self.view_model.in_flight() > 0 {
            match tokio::time::timeout_at(deadline, self.sync_queue.next_outcome()).await {
                Ok(Some(outcome)) => self.view_model.apply_sync_outcome(outcome),
                Ok(None) => break,
                Err(_) => anyhow::bail!(
                    "{} sync requests still in flight after {:?}",
                    self.view_model.in_flight(),
                    timeout
                ),
            }
            self.flush_sync_requests();
        }
        self.reload_if_requested().await;
        Ok(())
    }

    /// The frame for the current state
    pub fn current_frame(&self) -> Frame {
        render_grid(&GridSnapshot::from_view_model(&self.view_model))
    }

    fn render(&mut self, full: bool) -> Result<()> {
        let frame = self.current_frame();
        self.view_renderer.render_frame(&frame, full)
    }

    /// Re-render if anything emitted view events since the last render
    fn render_pending(&mut self) -> Result<()> {
        let view_events = self.view_model.collect_pending_view_events();
        if view_events.is_empty() {
            return Ok(());
        }
        let full = view_events
            .iter()
            .any(|event| matches!(event, ViewEvent::FullRedrawRequired | ViewEvent::RowsReordered));
        self.render(full)
    }
}
