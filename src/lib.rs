//! Polling dataweb: keeps an HTML view of IBEX instrument telemetry in step
//! with the status service.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod normalize;
pub mod poll;
pub mod render;
pub mod snapshot;
pub mod view;
