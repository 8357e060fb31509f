//! Meetup finalization server.
//!
//! Given an event whose participants have shared where they are and when
//! they are free, pick a meeting time, a transit station that is fair to
//! everyone, and restaurants near it, then record the plan on the event.

pub mod config;
pub mod domain;
pub mod finalize;
pub mod http;
pub mod planner;
pub mod providers;
pub mod store;
pub mod web;
