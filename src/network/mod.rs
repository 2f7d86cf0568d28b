//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor loop on a non-blocking listener
//! - Worker thread pool fed through a crossbeam channel
//! - Requests routed through the Dispatcher

mod server;
mod connection;

pub use server::Server;
pub use connection::Connection;
