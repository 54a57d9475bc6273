//! Domain layer containing business entities and storage contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click event model and non-blocking tracker
//! - [`click_worker`] - Asynchronous click counting worker
//!
//! # Click Processing Flow
//!
//! 1. The redirect resolver finds a live link
//! 2. A [`click_event::ClickEvent`] is offered to the bounded queue (never blocks)
//! 3. [`click_worker::run_click_worker`] applies the increment with retry
//! 4. The counter is updated via [`repositories::LinkRepository::increment_clicks`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
