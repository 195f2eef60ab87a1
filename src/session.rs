//! Tracking session
//!
//! Owns every piece of mutable engine state for one page and drives it from
//! commands, host events and the host clock. Lifecycle:
//!
//! ```text
//! Idle --start--> Tracking --pause--> Paused --start--> Tracking
//!   ^                |                  |
//!   +-----stop/clear-+------------------+
//! ```
//!
//! Overlay visibility and the pinned panel are independent of the tracking
//! state.

use crate::analytics::{format_active_time, has_data, ActivityClock, AnalyticsCache, AnalyticsSnapshot};
use crate::attention::{accrue_dwell, PointerState, ScrollTracker};
use crate::catalog::ElementCatalog;
use crate::color::{detect_theme, Palette, Theme};
use crate::command::{Ack, Command, Response, StatusReport};
use crate::config::HeatGridConfig;
use crate::error::HeatGridError;
use crate::grid::SpatialGrid;
use crate::heat::MouseHeatMap;
use crate::host::{PageHost, Surface};
use crate::panel::PanelView;
use crate::rebuild::rebuild_grid;
use crate::render::{render_grid, OverlayFrame};
use crate::scheduler::{Debouncer, IntervalTimer, RenderLoop};
use crate::types::PageMetrics;
use crate::ux::PageGeometry;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fraction of the mouse heat strength deposited per tick while the pointer moves
const MOVING_HEAT_SCALE: f64 = 0.25;

/// Tracking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingState {
    Idle,
    Tracking,
    Paused,
}

/// Timers fired by one `advance` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdvanceSummary {
    pub ticks: u32,
    pub activity_ticks: u32,
    pub rescans: u32,
    pub panel_refreshes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKind {
    Tick,
    Activity,
    Mutation,
    Panel,
}

/// One page's attention tracking session
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    config: HeatGridConfig,
    state: TrackingState,
    visible: bool,
    pinned: bool,
    theme: Theme,
    page_size: (f64, f64),

    catalog: ElementCatalog,
    grid: SpatialGrid,
    heat: MouseHeatMap,
    pointer: PointerState,
    scroll: ScrollTracker,
    activity: ActivityClock,
    cache: AnalyticsCache,

    tick_timer: IntervalTimer,
    activity_timer: IntervalTimer,
    panel_timer: IntervalTimer,
    mutation_debounce: Debouncer,
    render_loop: RenderLoop,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_config(HeatGridConfig::default())
    }
}

impl Session {
    /// Create a session with a validated config
    pub fn new(config: HeatGridConfig) -> Result<Self, HeatGridError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: HeatGridConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: TrackingState::Idle,
            visible: false,
            pinned: false,
            theme: Theme::Dark,
            page_size: (0.0, 0.0),
            catalog: ElementCatalog::new(),
            grid: SpatialGrid::default(),
            heat: MouseHeatMap::new(config.cell_size, config.max_dwell_score),
            pointer: PointerState::default(),
            scroll: ScrollTracker::default(),
            activity: ActivityClock::default(),
            cache: AnalyticsCache::default(),
            tick_timer: IntervalTimer::new(config.tick_interval_ms),
            activity_timer: IntervalTimer::new(config.activity_interval_ms),
            panel_timer: IntervalTimer::new(config.panel_refresh_ms),
            mutation_debounce: Debouncer::new(config.mutation_debounce_ms),
            render_loop: RenderLoop::default(),
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &HeatGridConfig {
        &self.config
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackingState::Tracking
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn catalog(&self) -> &ElementCatalog {
        &self.catalog
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn heat(&self) -> &MouseHeatMap {
        &self.heat
    }

    pub fn activity(&self) -> &ActivityClock {
        &self.activity
    }

    pub fn cache(&self) -> &AnalyticsCache {
        &self.cache
    }

    pub fn has_pending_rescan(&self) -> bool {
        self.mutation_debounce.is_pending()
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            is_tracking: self.is_tracking(),
            is_visible: self.visible,
            is_paused: self.state == TrackingState::Paused,
            is_pinned: self.pinned,
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Dispatch a command; failures are reported on this command only
    pub fn handle<H, S>(
        &mut self,
        command: Command,
        now: DateTime<Utc>,
        host: &H,
        surface: &mut S,
    ) -> Response
    where
        H: PageHost + ?Sized,
        S: Surface + ?Sized,
    {
        debug!("session {}: {}", self.id, command.action());
        let result = match command {
            Command::Start => self.start(now, host).map(|_| Ack::paused(false)),
            Command::Pause => {
                self.pause();
                Ok(Ack::paused(self.state == TrackingState::Paused))
            }
            Command::Stop => {
                self.stop(now, surface);
                Ok(Ack::ok())
            }
            Command::Show => self.show(host, surface).map(|_| Ack::ok()),
            Command::Hide => {
                self.hide(surface);
                Ok(Ack::ok())
            }
            Command::Clear => {
                self.clear(now, host, surface);
                Ok(Ack::ok())
            }
            Command::GetStatus => return Response::Status(self.status()),
            Command::GetAnalytics => {
                return match self.analytics(host) {
                    Ok(snapshot) => Response::Analytics(Box::new(snapshot)),
                    Err(e) => {
                        warn!("getAnalytics failed: {}", e);
                        Response::Ack(Ack::failed(&e))
                    }
                };
            }
            Command::Pin => {
                self.pin(now, host, surface);
                Ok(Ack::ok())
            }
            Command::Unpin => {
                self.unpin(surface);
                Ok(Ack::ok())
            }
        };

        match result {
            Ok(ack) => Response::Ack(ack),
            Err(e) => {
                warn!("{} failed: {}", command.action(), e);
                Response::Ack(Ack::failed(&e))
            }
        }
    }

    /// Begin tracking. All host reads happen before any state changes, so a
    /// failed start leaves the session as it was.
    pub fn start<H: PageHost + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        host: &H,
    ) -> Result<(), HeatGridError> {
        if self.is_tracking() {
            return Ok(());
        }

        let metrics = host.metrics()?;
        let mut catalog = self.catalog.clone();
        let stats = catalog.rescan(host, &self.config)?;
        let theme = self.sample_theme(host);

        self.theme = theme;
        self.catalog = catalog;
        self.sync_grid(&metrics);
        self.catalog.update_visibility(&metrics);

        self.state = TrackingState::Tracking;
        self.tick_timer.start(now);
        self.activity_timer.start(now);
        info!(
            "session {}: tracking started ({} elements, grid {}x{})",
            self.id,
            stats.kept + stats.added,
            self.grid.cols(),
            self.grid.rows()
        );
        Ok(())
    }

    /// Stop the tickers and keep all accumulated state
    pub fn pause(&mut self) {
        if !self.is_tracking() {
            return;
        }
        self.state = TrackingState::Paused;
        self.tick_timer.cancel();
        self.activity_timer.cancel();
        info!("session {}: tracking paused", self.id);
    }

    /// Stop tracking and discard catalog, grid, heat and active time.
    /// The cached evaluation survives until `clear`.
    pub fn stop<S: Surface + ?Sized>(&mut self, now: DateTime<Utc>, surface: &mut S) {
        self.state = TrackingState::Idle;
        self.tick_timer.cancel();
        self.activity_timer.cancel();
        self.mutation_debounce.cancel();

        self.catalog.clear();
        self.grid = SpatialGrid::default();
        self.heat.clear();
        self.scroll = ScrollTracker::default();
        self.activity.reset(now);
        self.hide(surface);
        info!("session {}: tracking stopped", self.id);
    }

    /// Full reset: `stop` plus discarding the cached evaluation
    pub fn clear<H, S>(&mut self, now: DateTime<Utc>, host: &H, surface: &mut S)
    where
        H: PageHost + ?Sized,
        S: Surface + ?Sized,
    {
        self.stop(now, surface);
        self.cache.discard();
        self.refresh_panel(host, surface);
    }

    /// Show the overlay and start the render loop
    pub fn show<H, S>(&mut self, host: &H, surface: &mut S) -> Result<(), HeatGridError>
    where
        H: PageHost + ?Sized,
        S: Surface + ?Sized,
    {
        if self.visible {
            return Ok(());
        }
        let metrics = host.metrics()?;
        self.theme = self.sample_theme(host);
        if self.grid.is_empty() {
            self.sync_grid(&metrics);
        }
        self.visible = true;
        self.render_loop.start();
        self.on_frame(surface);
        info!("session {}: overlay shown ({:?})", self.id, self.theme);
        Ok(())
    }

    /// Stop the render loop and remove the overlay
    pub fn hide<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if !self.visible {
            return;
        }
        self.visible = false;
        self.render_loop.stop();
        surface.remove_overlay();
        info!("session {}: overlay hidden", self.id);
    }

    pub fn pin<H, S>(&mut self, now: DateTime<Utc>, host: &H, surface: &mut S)
    where
        H: PageHost + ?Sized,
        S: Surface + ?Sized,
    {
        if !self.pinned {
            self.pinned = true;
            self.panel_timer.start(now);
        }
        self.refresh_panel(host, surface);
    }

    pub fn unpin<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.pinned {
            self.pinned = false;
            self.panel_timer.cancel();
            surface.remove_panel();
        }
    }

    /// Current analytics; evaluates live until enough data has been collected
    pub fn analytics<H: PageHost + ?Sized>(
        &mut self,
        host: &H,
    ) -> Result<AnalyticsSnapshot, HeatGridError> {
        let metrics = host.metrics()?;
        let page = PageGeometry::from_metrics(&metrics);
        let active_seconds = self.activity.active_seconds();
        let gate_open = has_data(self.catalog.elements(), active_seconds);
        let ux_evaluation = self.cache.resolve(gate_open, self.catalog.elements(), &page);

        Ok(AnalyticsSnapshot {
            active_time: format_active_time(active_seconds),
            active_time_sec: active_seconds,
            is_tracking: self.is_tracking(),
            has_data: gate_open,
            ux_evaluation,
        })
    }

    // ------------------------------------------------------------------
    // Host events
    // ------------------------------------------------------------------

    pub fn on_pointer_move(&mut self, x: f64, y: f64, now: DateTime<Utc>) {
        self.pointer.move_to(x, y, now);
        self.register_interaction(now);
    }

    /// Clicks deposit heat only while tracking
    pub fn on_click(&mut self, x: f64, y: f64, now: DateTime<Utc>) {
        self.register_interaction(now);
        if self.is_tracking() {
            self.heat.add_heat(x, y, self.config.click_boost);
        }
    }

    /// Record scroll velocity and refresh visibility
    pub fn on_scroll<H: PageHost + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        host: &H,
    ) -> Result<(), HeatGridError> {
        let metrics = host.metrics()?;
        self.scroll.record(metrics.scroll_y, now);
        self.register_interaction(now);
        self.catalog.update_visibility(&metrics);
        Ok(())
    }

    /// Rescan immediately when tracking or showing, and invalidate the cache
    pub fn on_resize<H: PageHost + ?Sized>(&mut self, host: &H) -> Result<(), HeatGridError> {
        if !(self.visible || self.is_tracking()) {
            return Ok(());
        }
        self.rescan(host)?;
        self.cache.mark_dirty();
        Ok(())
    }

    /// Schedule a debounced rescan while tracking
    pub fn on_mutation(&mut self, now: DateTime<Utc>) {
        if self.is_tracking() {
            self.mutation_debounce.trigger(now);
        }
    }

    /// Display refresh callback; returns whether a frame was drawn
    pub fn on_frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if !self.render_loop.begin_frame(self.visible) {
            return false;
        }
        let frame = self.render_frame();
        surface.present(&frame);
        true
    }

    /// Render the current grid
    pub fn render_frame(&self) -> OverlayFrame {
        render_grid(&self.grid, &self.palette(), self.page_size.0, self.page_size.1)
    }

    pub fn palette(&self) -> Palette<'_> {
        let stops = match self.theme {
            Theme::Light => &self.config.color_stops_light,
            Theme::Dark => &self.config.color_stops_dark,
        };
        Palette::new(
            self.theme,
            stops,
            self.config.max_dwell_score,
            self.config.min_render_score,
        )
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Fire every timer due at or before `now`, oldest first
    pub fn advance<H, S>(&mut self, now: DateTime<Utc>, host: &H, surface: &mut S) -> AdvanceSummary
    where
        H: PageHost + ?Sized,
        S: Surface + ?Sized,
    {
        let mut summary = AdvanceSummary::default();

        while let Some((due, kind)) = self.next_due(now) {
            match kind {
                TimerKind::Tick => {
                    self.tick_timer.fire_due(now);
                    self.tick(due);
                    summary.ticks += 1;
                }
                TimerKind::Activity => {
                    self.activity_timer.fire_due(now);
                    if self.is_tracking() {
                        self.activity.tick(due, &self.config);
                    }
                    summary.activity_ticks += 1;
                }
                TimerKind::Mutation => {
                    self.mutation_debounce.fire_due(now);
                    match self.rescan(host) {
                        Ok(()) => {
                            self.cache.mark_dirty();
                            summary.rescans += 1;
                        }
                        Err(e) => warn!("debounced rescan failed: {}", e),
                    }
                }
                TimerKind::Panel => {
                    self.panel_timer.fire_due(now);
                    self.refresh_panel(host, surface);
                    summary.panel_refreshes += 1;
                }
            }
        }
        summary
    }

    fn next_due(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, TimerKind)> {
        [
            (self.tick_timer.next_due(), TimerKind::Tick),
            (self.activity_timer.next_due(), TimerKind::Activity),
            (self.mutation_debounce.deadline(), TimerKind::Mutation),
            (self.panel_timer.next_due(), TimerKind::Panel),
        ]
        .into_iter()
        .filter_map(|(due, kind)| due.filter(|d| *d <= now).map(|d| (d, kind)))
        .min()
    }

    /// One update tick: dwell accrual, heat deposit, decay, then rebuild
    fn tick(&mut self, now: DateTime<Utc>) {
        if !self.is_tracking() {
            return;
        }
        let speed = self.scroll.latest_speed();
        accrue_dwell(
            self.catalog.elements_mut(),
            &self.pointer,
            speed,
            now,
            &self.config,
        );

        if self.pointer.moved_within(now, self.config.pointer_heat_window_ms) {
            self.heat.add_heat(
                self.pointer.x,
                self.pointer.y,
                self.config.mouse_heat_strength * MOVING_HEAT_SCALE,
            );
        }
        self.heat.decay_tick(self.config.heat_decay, self.config.heat_floor);

        rebuild_grid(
            &mut self.grid,
            self.catalog.elements(),
            &self.heat,
            self.config.mouse_influence_radius,
        );
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn register_interaction(&mut self, now: DateTime<Utc>) {
        if self.is_tracking() {
            self.activity.register_interaction(now);
        }
    }

    fn rescan<H: PageHost + ?Sized>(&mut self, host: &H) -> Result<(), HeatGridError> {
        let metrics = host.metrics()?;
        self.catalog.rescan(host, &self.config)?;
        self.sync_grid(&metrics);
        self.catalog.update_visibility(&metrics);
        Ok(())
    }

    /// Allocate the grid on first use, otherwise resize it to the document
    fn sync_grid(&mut self, metrics: &PageMetrics) {
        self.page_size = (metrics.document_width, metrics.document_height);
        if self.grid.is_empty() {
            self.grid = SpatialGrid::new(
                self.config.cell_size,
                metrics.document_width,
                metrics.document_height,
            );
        } else if self.grid.resize(metrics.document_width, metrics.document_height) {
            debug!(
                "grid resized to {}x{}",
                self.grid.cols(),
                self.grid.rows()
            );
        }
    }

    fn sample_theme<H: PageHost + ?Sized>(&self, host: &H) -> Theme {
        match host.theme_sample() {
            Ok(sample) => {
                let (theme, luminance) = detect_theme(&sample);
                debug!("theme detected: {:?} (luminance {:.2})", theme, luminance);
                theme
            }
            Err(e) => {
                warn!("theme sample failed, using dark palette: {}", e);
                Theme::Dark
            }
        }
    }

    fn refresh_panel<H, S>(&mut self, host: &H, surface: &mut S)
    where
        H: PageHost + ?Sized,
        S: Surface + ?Sized,
    {
        if !self.pinned {
            return;
        }
        match self.analytics(host) {
            Ok(snapshot) => surface.show_panel(&PanelView::from_snapshot(&snapshot, self.visible)),
            Err(e) => warn!("panel refresh failed: {}", e),
        }
    }
}
