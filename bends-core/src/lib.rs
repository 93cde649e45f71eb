#![doc = "bends-core: core logic library for bends."]

//! Classification, ledger, rendering and dispatch for scheduled-build
//! notifications. Network clients live in the `bends` crate and plug in
//! through the traits in [`contract`].
//!
//! # Usage
//! Build a [`build::TeamServices`] inventory (from a [`contract::ServiceCatalog`]
//! via [`inventory::collect_services`] or from a static document), then run
//! [`notify::notify`].

pub mod build;
pub mod classify;
pub mod clock;
pub mod config;
pub mod contract;
pub mod digest;
pub mod dispatch;
pub mod inventory;
pub mod ledger;
pub mod notify;
