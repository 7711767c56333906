//! Core building blocks for the xdptop dashboard: the XDP action set, the
//! pinned-map accessor, snapshot/rate math, and the TUI loop.

pub mod action;
pub mod app;
pub mod error;
pub mod map;
pub mod stats;
pub mod ui;
