//! Main-thread handlers.
//!
//! - [`dispatcher`]: bus events and inbound bridge events
//! - [`inbound`]: calls from the application layer

pub mod dispatcher;
pub mod inbound;
