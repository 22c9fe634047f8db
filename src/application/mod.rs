// Application layer - use cases and orchestration over a launch store.

pub mod balance;
pub mod error;
pub mod service;

pub use balance::*;
pub use error::*;
pub use service::*;
