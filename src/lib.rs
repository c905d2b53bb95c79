//! Tweet emotion index vs. COVID-19 statistics.
//!
//! The data layer ([`data`]) loads tweets, scores them into a per-day
//! emotion index, loads COVID tables and aligns both by date; [`chart`]
//! assembles the dual-axis chart model; [`app`] and [`ui`] display it.

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
