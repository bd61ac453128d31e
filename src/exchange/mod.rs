//! Exchange integration: the collaborator port and its REST adapter.

pub mod extended;
pub mod traits;

pub use extended::ExtendedClient;
pub use traits::ExchangeClient;
