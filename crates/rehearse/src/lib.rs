//! # rehearse
//!
//! HTTP API and configuration for the rehearse practice simulator. The
//! `rehearse` binary wires these into its `serve` and `practice` commands.

pub mod api;
pub mod config;
