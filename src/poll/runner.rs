use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};

use super::transport::{Transport, TransportError};
use super::{FetchTicket, PollCommand, PollController};
use crate::catalog::FieldCatalog;
use crate::logging::{log, log_poll_summary, obj, v_str, Domain, Level, ProfileScope};
use crate::render::{
    connectivity_error, render_fleet, render_page, ButtonSize, DetailView, FleetLayout, FleetPlan, FleetSection,
    RenderOptions,
};
use crate::snapshot::{FleetSnapshot, TelemetrySnapshot};
use crate::view::View;

/// Decodes payloads and owns the view they end up in.
pub trait Screen {
    type Snapshot;

    fn decode(&self, payload: &Value) -> Self::Snapshot;
    fn show(&mut self, snapshot: Self::Snapshot) -> Result<()>;
    fn show_error(&mut self, err: &TransportError) -> Result<()>;
    /// What is visible before the first completion arrives.
    fn show_initial(&mut self) -> Result<()>;
}

/// Single-instrument page.
pub struct DetailScreen<V> {
    catalog: Arc<FieldCatalog>,
    instrument: String,
    options: RenderOptions,
    view: V,
}

impl<V: View<DetailView>> DetailScreen<V> {
    pub fn new(catalog: Arc<FieldCatalog>, instrument: impl Into<String>, options: RenderOptions, view: V) -> Self {
        Self {
            catalog,
            instrument: instrument.into(),
            options,
            view,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn show_connectivity_error(&mut self) -> Result<()> {
        self.view
            .apply(&DetailView::Error(connectivity_error(&self.instrument)))
    }
}

impl<V: View<DetailView>> Screen for DetailScreen<V> {
    type Snapshot = TelemetrySnapshot;

    fn decode(&self, payload: &Value) -> TelemetrySnapshot {
        TelemetrySnapshot::from_value(payload)
    }

    fn show(&mut self, snapshot: TelemetrySnapshot) -> Result<()> {
        let _scope = ProfileScope::with_context("render_page", &[("instrument", v_str(&self.instrument))]);
        let plan = render_page(&snapshot, &self.catalog, &self.instrument, &self.options);
        self.view.apply(&DetailView::Content(plan))
    }

    fn show_error(&mut self, _err: &TransportError) -> Result<()> {
        self.show_connectivity_error()
    }

    fn show_initial(&mut self) -> Result<()> {
        self.show_connectivity_error()
    }
}

/// Fleet overview. A failed poll keeps the previous buttons and only marks
/// the update time stale.
pub struct FleetScreen<V> {
    layout: FleetLayout,
    view: V,
    last: Option<FleetPlan>,
}

impl<V: View<FleetPlan>> FleetScreen<V> {
    pub fn new(layout: FleetLayout, view: V) -> Self {
        Self {
            layout,
            view,
            last: None,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn show_stale(&mut self) -> Result<()> {
        let plan = match &self.last {
            Some(last) => FleetPlan {
                stale: true,
                ..last.clone()
            },
            None => FleetPlan {
                sections: FleetSection::ALL.iter().map(|s| (*s, Vec::new())).collect(),
                size: ButtonSize::ExtraLarge,
                total: 0,
                online: 0,
                error: None,
                updated_at: "never".to_string(),
                stale: true,
            },
        };
        self.view.apply(&plan)
    }
}

impl<V: View<FleetPlan>> Screen for FleetScreen<V> {
    type Snapshot = FleetSnapshot;

    fn decode(&self, payload: &Value) -> FleetSnapshot {
        FleetSnapshot::from_value(payload)
    }

    fn show(&mut self, snapshot: FleetSnapshot) -> Result<()> {
        let _scope = ProfileScope::new("render_fleet");
        let updated_at = chrono::Local::now().format("%H:%M:%S").to_string();
        let plan = render_fleet(&snapshot, &self.layout, &updated_at);
        self.view.apply(&plan)?;
        self.last = Some(plan);
        Ok(())
    }

    fn show_error(&mut self, _err: &TransportError) -> Result<()> {
        self.show_stale()
    }

    fn show_initial(&mut self) -> Result<()> {
        self.show_stale()
    }
}

type Completion = (FetchTicket, Result<Value, TransportError>);

/// Owns the controller and the screen; fetches run as spawned tasks and
/// report back over a channel, so the view only changes on this task.
pub struct PollRunner<S> {
    controller: PollController,
    transport: Arc<dyn Transport>,
    screen: S,
    interval: Duration,
    timeout: Duration,
}

impl<S: Screen> PollRunner<S> {
    pub fn new(
        controller: PollController,
        transport: Arc<dyn Transport>,
        screen: S,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            controller,
            transport,
            screen,
            interval,
            timeout,
        }
    }

    /// Polls until `max_ticks` fetches have been issued and all of them have
    /// completed; `None` polls forever.
    pub async fn run(mut self, max_ticks: Option<u64>) -> Result<S> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if let Err(err) = self.screen.show_initial() {
            self.report_view_failure("initial", &err);
        }

        let mut issued = 0u64;
        loop {
            let ticking = max_ticks.map_or(true, |max| issued < max);
            if !ticking && self.controller.in_flight() == 0 {
                break;
            }

            tokio::select! {
                _ = ticker.tick(), if ticking => {
                    issued += 1;
                    let ticket = self.controller.tick();
                    self.spawn_fetch(ticket, tx.clone());
                }
                Some((ticket, outcome)) = rx.recv() => {
                    self.handle(ticket, outcome);
                }
            }
        }

        let stats = self.controller.stats();
        log_poll_summary(
            self.controller.instrument(),
            stats.ticks,
            stats.successes,
            stats.failures,
            stats.discarded,
        );
        Ok(self.screen)
    }

    fn spawn_fetch(&self, ticket: FetchTicket, tx: mpsc::UnboundedSender<Completion>) {
        let transport = Arc::clone(&self.transport);
        let instrument = self.controller.instrument().to_string();
        let limit = self.timeout;
        tokio::spawn(async move {
            let outcome = match timeout(limit, transport.fetch(&instrument)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout),
            };
            // receiver only goes away when the runner has stopped
            let _ = tx.send((ticket, outcome));
        });
    }

    fn handle(&mut self, ticket: FetchTicket, outcome: Result<Value, TransportError>) {
        let applied = match self.controller.complete(ticket, outcome) {
            PollCommand::Render(payload) => {
                let snapshot = self.screen.decode(&payload);
                self.screen.show(snapshot)
            }
            PollCommand::ShowError(err) => self.screen.show_error(&err),
            PollCommand::Discard => Ok(()),
        };
        if let Err(err) = applied {
            self.report_view_failure("completion", &err);
        }
    }

    fn report_view_failure(&self, stage: &str, err: &anyhow::Error) {
        log(
            Level::Error,
            Domain::View,
            "apply_failed",
            obj(&[
                ("instrument", v_str(self.controller.instrument())),
                ("stage", v_str(stage)),
                ("msg", v_str(&format!("{:#}", err))),
            ]),
        );
    }
}
