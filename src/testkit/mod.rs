//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`exchange`] — scripted [`MockExchange`](exchange::MockExchange) with
//!   call recording, plus builders for market fixtures.

pub mod exchange;

pub use exchange::{btc_config, market, MockExchange};
