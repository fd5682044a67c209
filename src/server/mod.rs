//! Server core functionality
//!
//! This module contains the listener, the accept loop, and the shared
//! state handed to every session.

pub mod core;

pub use core::Server;
