//! Perpgate - HTTP gateway for perpetual-futures order placement.
//!
//! A thin JSON façade over a perpetual-futures exchange: callers submit
//! simplified order requests and the gateway normalizes them against the
//! exchange's per-market constraints before forwarding.
//!
//! The interesting part lives in [`service::orders`]: lot/tick rounding with
//! half-up tie-breaking, leverage bounds checking, market-order crossing
//! prices, notional-to-size conversion, and take-profit/stop-loss attachment
//! whose individual failure is reported in the response instead of failing
//! the already-placed parent order.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration and env-sourced credentials
//! - [`domain`] - order/market/account types and step rounding
//! - [`error`] - error types for the crate
//! - [`exchange`] - the exchange port and its REST adapter
//! - [`service`] - order normalization and market overview assembly
//! - [`api`] - axum router and request handlers

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod service;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
