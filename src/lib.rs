//! Benchmark result tables in, throughput and speedup charts out.
//!
//! [`data`] is the query engine (table store, filters, derived series),
//! [`charts`] turns tables into [`charts::Figure`]s, and [`export`] and
//! [`app`] render them as SVG files or in an egui window.

pub mod app;
pub mod charts;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod export;
pub mod state;
pub mod ui;
