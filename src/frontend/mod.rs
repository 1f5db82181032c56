//! GUI window built on egui/eframe.
//!
//! The window owns the session and its transport and drives both from
//! [`eframe::App::update`]: each repaint runs at most one session tick, then
//! schedules the next repaint one tick interval later. Everything stays on the
//! UI thread, so ticks never overlap.
//!
//! # Layout
//!
//! - Top: stats bar (state, min/max/mean/std/range, frame counters)
//! - Center: intensity line plot above a per-pixel bar chart

pub mod plot;
pub mod state;
pub mod status_bar;

pub use state::FrameView;

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::session::{Session, TickOutcome};
use crate::transport::Transport;

use status_bar::StatusBarContext;

/// Main application window
pub struct ViewerApp {
    session: Session,
    transport: Box<dyn Transport>,
    view: FrameView,
    tick_interval: Duration,
    last_tick: Option<Instant>,
    source: String,
    fatal: Option<String>,
}

impl ViewerApp {
    /// Create the window state and show the "waiting" screen
    pub fn new(
        mut session: Session,
        transport: Box<dyn Transport>,
        tick_interval: Duration,
    ) -> Result<Self> {
        let mut view = FrameView::default();
        session.start(&mut view)?;
        let source = transport.describe();

        Ok(Self {
            session,
            transport,
            view,
            tick_interval,
            last_tick: None,
            source,
            fatal: None,
        })
    }

    pub fn view(&self) -> &FrameView {
        &self.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Error that stopped the session, if any
    pub fn fatal(&self) -> Option<&str> {
        self.fatal.as_deref()
    }

    /// Run one session tick if the tick interval has elapsed
    ///
    /// Returns the tick outcome, or `None` if no tick was due or the session
    /// has already stopped.
    pub fn poll(&mut self, now: Instant) -> Option<TickOutcome> {
        if self.fatal.is_some() {
            return None;
        }
        if let Some(last) = self.last_tick {
            if now.duration_since(last) < self.tick_interval {
                return None;
            }
        }
        self.last_tick = Some(now);

        match self.session.tick(&mut *self.transport, &mut self.view) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!("Session stopped: {}", e);
                self.fatal = Some(e.to_string());
                self.transport.close();
                None
            }
        }
    }

    /// Stats bar inputs, with live counters from the session
    fn status_context(&self) -> StatusBarContext<'_> {
        StatusBarContext {
            view: &self.view,
            counters: self.session.counters(),
            source: &self.source,
            fatal: self.fatal.as_deref(),
        }
    }

    /// Time until the next tick is due
    fn next_tick_in(&self, now: Instant) -> Duration {
        self.last_tick
            .map(|last| self.tick_interval.saturating_sub(now.duration_since(last)))
            .unwrap_or_default()
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.poll(now);

        egui::TopBottomPanel::top("stats_bar").show(ctx, |ui| {
            status_bar::render_status_bar(ui, &self.status_context());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            plot::render_frame_plots(ui, &self.view);
        });

        if self.fatal.is_none() {
            ctx.request_repaint_after(self.next_tick_in(now));
        }
    }
}

impl Drop for ViewerApp {
    fn drop(&mut self) {
        let counters = self.session.counters();
        tracing::info!(
            "Window closed: {} accepted, {} rejected over {} ticks",
            counters.accepted,
            counters.rejected,
            counters.ticks
        );
        self.transport.close();
    }
}
