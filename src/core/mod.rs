//! Core modules for dp-cto: the Stage Record, its store, and the hook wire
//! format. Nothing here knows the policy tables.

pub mod config;
pub mod error;
pub mod event;
pub mod output;
pub mod schemas;
pub mod stage;
pub mod store;
pub mod time;
