//! # respkv
//!
//! A RESP-style request/response protocol stack:
//! - Typed value model with distinct null and empty forms
//! - Encoder and depth-limited recursive-descent decoder
//! - Extensible command dispatcher (PING, ECHO)
//! - Threaded TCP server and interactive client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Decoder                                 │
//! │                 bytes → Value tree                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Dispatcher                               │
//! │              name → handler → response                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Encoder                                 │
//! │                 Value tree → bytes                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod dispatch;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CommandError, DecodeError, EncodeError, RespError, Result};
pub use config::Config;
pub use protocol::{decode, encode, Value};
pub use dispatch::Dispatcher;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of respkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
