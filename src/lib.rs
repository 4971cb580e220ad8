//! Feedback mini-app client — answer flow, backend client, and screens.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod policy;
pub mod view;
