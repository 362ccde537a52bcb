use std::collections::VecDeque;
use std::io::Write;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use serde_json::json;

use crate::config::ViewerConfig;
use crate::error::Result;
use crate::geometry::Size;
use crate::logging::{LogLevel, event_with_fields, json_kv};
use crate::metrics::SessionMetrics;
use crate::navigation::{
    FetchDisposition, FetchKind, FetchRequest, NavEvent, NavigationController, execute,
};
use crate::render::{FramePresenter, GridRenderer, RenderOptions};
use crate::repository::SpatialRepository;

pub mod driver;
mod frame;
mod keys;

pub use frame::compose_frame;
pub use keys::{ViewerCommand, command_for_key};

const RUNTIME_TARGET: &str = "floorgrid::runtime";
const NAVIGATION_TARGET: &str = "floorgrid::navigation";
const ZOOM_STEP: f64 = 2.0;
const MIN_SCALE: f64 = 0.05;
const MAX_SCALE: f64 = 50.0;

/// Input delivered to the viewer loop.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    Tick { elapsed: Duration },
    Key(KeyEvent),
    Resize(Size),
}

/// Single-threaded viewer loop around a [`NavigationController`].
///
/// Fetches requested by the controller are queued, executed against the
/// repository between events and fed back as `DataReady` events.
pub struct ViewerRuntime<R> {
    repo: R,
    controller: NavigationController,
    renderer: GridRenderer,
    presenter: FramePresenter,
    config: ViewerConfig,
    render: RenderOptions,
    metrics: SessionMetrics,
    fetches: VecDeque<FetchRequest>,
    screen: Size,
    last_frame: Vec<String>,
    should_exit: bool,
    redraw_requested: bool,
    start_instant: Option<Instant>,
    last_metrics_emit: Option<Instant>,
}

impl<R: SpatialRepository> ViewerRuntime<R> {
    pub fn new(
        repo: R,
        building_id: impl Into<String>,
        config: ViewerConfig,
        screen: Size,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            repo,
            controller: NavigationController::new(building_id),
            renderer: GridRenderer::new(config.symbol_registry()),
            presenter: FramePresenter::with_default(),
            render: config.render,
            config,
            metrics: SessionMetrics::new(),
            fetches: VecDeque::new(),
            screen,
            last_frame: Vec::new(),
            should_exit: false,
            redraw_requested: true,
            start_instant: None,
            last_metrics_emit: None,
        })
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Text of the most recently composed frame.
    pub fn last_frame(&self) -> &[String] {
        &self.last_frame
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn resize(&mut self, size: Size) {
        self.handle_resize(size);
    }

    pub fn run(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.bootstrap(stdout)?;
        let tick_interval = self.config.tick_interval();
        let mut last_tick = Instant::now();

        while !self.should_exit {
            let timeout = tick_interval
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);

            if event::poll(timeout)? {
                if let Some(runtime_event) = map_event(event::read()?) {
                    self.dispatch_event(runtime_event);
                    self.render_if_needed(stdout)?;
                }
                if self.should_exit {
                    break;
                }
            }

            if last_tick.elapsed() >= tick_interval {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick);
                last_tick = now;
                self.dispatch_event(RuntimeEvent::Tick { elapsed });
                self.render_if_needed(stdout)?;
            }
        }

        self.finalize();
        Ok(())
    }

    pub fn run_scripted<I>(&mut self, stdout: &mut impl Write, events: I) -> Result<()>
    where
        I: IntoIterator<Item = RuntimeEvent>,
    {
        self.bootstrap(stdout)?;
        for event in events {
            self.dispatch_event(event);
            self.render_if_needed(stdout)?;
            if self.should_exit {
                break;
            }
        }
        self.finalize();
        Ok(())
    }

    fn dispatch_event(&mut self, event: RuntimeEvent) {
        let name = describe_event(&event);
        match event {
            RuntimeEvent::Key(key) => {
                if let Some(command) = command_for_key(&key) {
                    self.apply_command(command);
                }
            }
            RuntimeEvent::Resize(size) => self.handle_resize(size),
            RuntimeEvent::Tick { .. } => {}
        }
        self.metrics.record_event();
        if name != "tick" {
            self.log_runtime_event(
                LogLevel::Debug,
                RUNTIME_TARGET,
                "event_dispatched",
                [json_kv("event", name)],
            );
        }
        self.drain_fetches();
        self.maybe_emit_metrics();
    }

    fn apply_command(&mut self, command: ViewerCommand) {
        match command {
            ViewerCommand::Nav(event) => self.apply_nav(event),
            ViewerCommand::ZoomIn => self.set_scale(self.render.scale / ZOOM_STEP),
            ViewerCommand::ZoomOut => self.set_scale(self.render.scale * ZOOM_STEP),
            ViewerCommand::ToggleGrid => {
                self.render.show_grid = !self.render.show_grid;
                self.redraw_requested = true;
            }
            ViewerCommand::ToggleLabels => {
                self.render.show_labels = !self.render.show_labels;
                self.redraw_requested = true;
            }
            ViewerCommand::Quit => {
                self.should_exit = true;
                self.log_runtime_event(
                    LogLevel::Info,
                    RUNTIME_TARGET,
                    "exit_requested",
                    std::iter::empty(),
                );
            }
        }
    }

    fn set_scale(&mut self, scale: f64) {
        let scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        if scale == self.render.scale {
            return;
        }
        self.render.scale = scale;
        self.redraw_requested = true;
        self.log_runtime_event(
            LogLevel::Debug,
            RUNTIME_TARGET,
            "scale_changed",
            [json_kv("scale", scale)],
        );
    }

    fn apply_nav(&mut self, event: NavEvent) {
        let outcome = self.controller.handle(event);
        if outcome.changed {
            self.redraw_requested = true;
        }
        if let Some(disposition) = outcome.disposition {
            self.record_disposition(disposition);
        }
        if let Some(request) = outcome.fetch {
            self.queue_fetch(request);
        }
    }

    fn queue_fetch(&mut self, request: FetchRequest) {
        self.metrics.record_fetch_issued();
        let kind = match &request.kind {
            FetchKind::Building { .. } => json!("building"),
            FetchKind::FloorEquipment { floor_number, .. } => json!(format!("floor:{floor_number}")),
        };
        self.log_runtime_event(
            LogLevel::Debug,
            NAVIGATION_TARGET,
            "fetch_issued",
            [
                json_kv("kind", kind),
                json_kv("generation", request.ticket.generation),
            ],
        );
        self.fetches.push_back(request);
    }

    fn drain_fetches(&mut self) {
        while let Some(request) = self.fetches.pop_front() {
            let result = execute(&self.repo, &request);
            self.apply_nav(request.complete(result));
        }
    }

    fn record_disposition(&mut self, disposition: FetchDisposition) {
        match disposition {
            FetchDisposition::Applied => {
                self.metrics.record_fetch_applied();
                self.log_runtime_event(
                    LogLevel::Debug,
                    NAVIGATION_TARGET,
                    "fetch_applied",
                    std::iter::empty(),
                );
            }
            FetchDisposition::Failed => {
                self.metrics.record_fetch_failed();
                let error = self
                    .controller
                    .last_error()
                    .map(|err| err.to_string())
                    .unwrap_or_default();
                self.log_runtime_event(
                    LogLevel::Warn,
                    NAVIGATION_TARGET,
                    "fetch_failed",
                    [json_kv("error", error)],
                );
            }
            FetchDisposition::Stale => {
                self.metrics.record_fetch_discarded();
                self.log_runtime_event(
                    LogLevel::Debug,
                    NAVIGATION_TARGET,
                    "fetch_discarded",
                    std::iter::empty(),
                );
            }
        }
    }

    fn render_if_needed(&mut self, stdout: &mut impl Write) -> Result<()> {
        if !self.redraw_requested {
            return Ok(());
        }
        self.redraw_requested = false;

        let frame = compose_frame(
            &self.controller,
            &self.renderer,
            &self.render,
            self.screen,
            self.config.list_rows,
        );
        let written = self.presenter.present(stdout, &frame, self.screen)?;
        self.metrics.record_render(written);
        self.log_runtime_event(
            LogLevel::Debug,
            RUNTIME_TARGET,
            "frame_rendered",
            [json_kv("rows", frame.len()), json_kv("written", written)],
        );
        self.last_frame = frame;
        Ok(())
    }

    fn handle_resize(&mut self, size: Size) {
        self.screen = size;
        self.presenter.invalidate();
        self.redraw_requested = true;
        self.log_runtime_event(
            LogLevel::Info,
            RUNTIME_TARGET,
            "resized",
            [json_kv("width", size.width), json_kv("height", size.height)],
        );
    }

    fn bootstrap(&mut self, stdout: &mut impl Write) -> Result<()> {
        self.should_exit = false;
        self.redraw_requested = true;
        let now = Instant::now();
        self.start_instant = Some(now);
        self.last_metrics_emit = Some(now);
        self.log_runtime_event(
            LogLevel::Info,
            RUNTIME_TARGET,
            "runtime_started",
            [
                json_kv("building", self.controller.building_id()),
                json_kv("width", self.screen.width),
                json_kv("height", self.screen.height),
            ],
        );

        let outcome = self.controller.start();
        if let Some(request) = outcome.fetch {
            self.queue_fetch(request);
        }
        self.drain_fetches();
        self.render_if_needed(stdout)
    }

    fn finalize(&mut self) {
        let uptime = self
            .start_instant
            .map(|start| start.elapsed())
            .unwrap_or_default();
        if let Some(logger) = self.config.logger.as_ref() {
            let snapshot = self.metrics.snapshot(uptime);
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
        self.log_runtime_event(
            LogLevel::Info,
            RUNTIME_TARGET,
            "runtime_stopped",
            [json_kv("uptime_ms", uptime.as_millis() as u64)],
        );
    }

    fn log_runtime_event<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, target, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn maybe_emit_metrics(&mut self) {
        let interval = self.config.metrics_interval();
        if interval.is_zero() || self.config.logger.is_none() {
            return;
        }

        let now = Instant::now();
        match self.last_metrics_emit {
            Some(last) if now.duration_since(last) < interval => return,
            _ => self.last_metrics_emit = Some(now),
        }

        let uptime = self
            .start_instant
            .map(|start| now.duration_since(start))
            .unwrap_or_default();
        if let Some(logger) = self.config.logger.as_ref() {
            let snapshot = self.metrics.snapshot(uptime);
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }
}

fn map_event(event: CrosstermEvent) -> Option<RuntimeEvent> {
    match event {
        CrosstermEvent::Key(key) => Some(RuntimeEvent::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(RuntimeEvent::Resize(Size::new(width, height))),
        _ => None,
    }
}

fn describe_event(event: &RuntimeEvent) -> &'static str {
    match event {
        RuntimeEvent::Tick { .. } => "tick",
        RuntimeEvent::Key(_) => "key",
        RuntimeEvent::Resize(_) => "resize",
    }
}
