//! SOW Invoice Engine
//!
//! This crate calculates invoices for Statements of Work: Time & Materials
//! billing from timesheets (hourly, or monthly with excess-leave deduction),
//! fixed-price and maintenance billing from manual amounts, prior-period
//! adjustment when billing in advance, and merged billing of several SOWs of
//! one project. It also carries the client-side contracts of the management
//! console and an HTTP API over the calculator.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
