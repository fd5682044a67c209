//! Message relay
//!
//! Fan-out of received messages to every registered connection.

pub mod fanout;
pub mod results;

pub use fanout::broadcast;
pub use results::BroadcastOutcome;
