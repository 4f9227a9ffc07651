//! Poll cycle: a pure controller deciding what each completion means for the
//! view, plus the async runner that drives it on a fixed interval.
//!
//! ```text
//!            tick                   Ok
//!   Idle ───────────► Fetching ──────────► Idle        (render)
//!    ▲                    │
//!    │ tick              │ Err / timeout
//!    └── ErrorDisplayed ◄─┘                              (show error)
//! ```

pub mod runner;
pub mod transport;

use std::collections::BTreeSet;

use crate::logging::{log_fetch_failure, log_transition};

pub use runner::{DetailScreen, FleetScreen, PollRunner, Screen};
pub use transport::{decode_body, request_url, HttpTransport, Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
    ErrorDisplayed,
}

impl PollPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollPhase::Idle => "idle",
            PollPhase::Fetching => "fetching",
            PollPhase::ErrorDisplayed => "error_displayed",
        }
    }
}

/// Identifies one issued fetch. Tickets increase strictly with issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(pub u64);

/// What the owner of the view should do with a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum PollCommand<T> {
    Render(T),
    ShowError(TransportError),
    Discard,
}

/// How completions that arrive out of issue order are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Drop a completion older than the last one applied to the view.
    #[default]
    DiscardOlder,
    /// Apply every completion in arrival order.
    LastCompletionWins,
}

impl StalePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().replace('-', "_").as_str() {
            "discard_older" | "discard" => Some(StalePolicy::DiscardOlder),
            "last_completion_wins" | "last_wins" => Some(StalePolicy::LastCompletionWins),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StalePolicy::DiscardOlder => "discard_older",
            StalePolicy::LastCompletionWins => "last_completion_wins",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub ticks: u64,
    pub successes: u64,
    pub failures: u64,
    pub discarded: u64,
}

#[derive(Debug)]
pub struct PollController {
    instrument: String,
    policy: StalePolicy,
    phase: PollPhase,
    next_ticket: u64,
    last_applied: Option<FetchTicket>,
    in_flight: BTreeSet<FetchTicket>,
    stats: PollStats,
}

impl PollController {
    pub fn new(instrument: impl Into<String>, policy: StalePolicy) -> Self {
        Self {
            instrument: instrument.into(),
            policy,
            phase: PollPhase::Idle,
            next_ticket: 0,
            last_applied: None,
            in_flight: BTreeSet::new(),
            stats: PollStats::default(),
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn stats(&self) -> PollStats {
        self.stats
    }

    /// Issues a new fetch. Earlier fetches stay in flight.
    pub fn tick(&mut self) -> FetchTicket {
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        self.stats.ticks += 1;
        self.in_flight.insert(ticket);
        self.transition(ticket, PollPhase::Fetching, "tick");
        ticket
    }

    pub fn complete<T>(&mut self, ticket: FetchTicket, outcome: Result<T, TransportError>) -> PollCommand<T> {
        if !self.in_flight.remove(&ticket) {
            self.stats.discarded += 1;
            log_transition(&self.instrument, ticket.0, self.phase.as_str(), self.phase.as_str(), "unknown_ticket");
            return PollCommand::Discard;
        }

        if self.policy == StalePolicy::DiscardOlder && self.last_applied.is_some_and(|last| ticket < last) {
            self.stats.discarded += 1;
            log_transition(&self.instrument, ticket.0, self.phase.as_str(), self.phase.as_str(), "stale_completion");
            return PollCommand::Discard;
        }
        self.last_applied = Some(ticket);

        match outcome {
            Ok(payload) => {
                self.stats.successes += 1;
                self.transition(ticket, PollPhase::Idle, "success");
                PollCommand::Render(payload)
            }
            Err(err) => {
                self.stats.failures += 1;
                log_fetch_failure(&self.instrument, ticket.0, err.kind(), &err.to_string());
                self.transition(ticket, PollPhase::ErrorDisplayed, "failure");
                PollCommand::ShowError(err)
            }
        }
    }

    fn transition(&mut self, ticket: FetchTicket, next: PollPhase, evidence: &str) {
        log_transition(&self.instrument, ticket.0, self.phase.as_str(), next.as_str(), evidence);
        self.phase = next;
    }
}
