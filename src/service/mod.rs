//! Request-scoped application services.

pub mod markets;
pub mod orders;

pub use orders::OrderNormalizer;
