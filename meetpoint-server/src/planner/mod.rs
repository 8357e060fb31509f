//! Planning stages for a meetup.
//!
//! Each stage is a free function over a provider trait. Stages that talk to
//! a provider return an [`Outcome`](crate::domain::Outcome) and never fail
//! outright: a missing or failed upstream result degrades to a documented
//! fallback so the pipeline can always produce a plan.

mod config;
mod consensus;
mod locator;
mod oracle;
mod select;
mod venues;

pub use config::SearchSettings;
pub use consensus::{ConsensusTime, most_voted, next_weekday_at, resolve as resolve_time};
pub use locator::locate_stations;
pub use oracle::travel_times;
pub use select::{Selection, select_station};
pub use venues::find_venues;
