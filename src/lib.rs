//! azwb - declarative lifecycle management for Application Insights workbooks
//!
//! - [`workbook`] - the reconcile/read/delete lifecycle core
//! - [`azure`] - Azure Resource Manager client implementing [`workbook::RemoteClient`]
//! - [`config`], [`state`], [`manifest`] - the CLI's configuration, identity store and inputs

pub mod azure;
pub mod config;
pub mod manifest;
pub mod state;
pub mod workbook;
