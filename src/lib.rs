//! A personal expense tracker that keeps its transactions and monthly budgets in a Google sheet.
//!
//! `expenses serve` exposes the sheet over a small JSON API. The other subcommands are clients of
//! that API which aggregate the rows into a monthly dashboard and record new entries.

pub mod api;
pub mod args;
pub mod client;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod report;
pub mod server;
pub mod service;
pub mod store;
mod utils;
pub mod view;


pub use api::Mode;
pub use config::{Config, ServiceAccount};
pub use error::Error;
pub use error::Result;
