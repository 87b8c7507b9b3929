//! Web layer for the bus server.
//!
//! JSON endpoints proxying and reshaping the provider's responses, plus
//! route import and journey planning over the stored network.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, ImportError, ImportOutcome};
