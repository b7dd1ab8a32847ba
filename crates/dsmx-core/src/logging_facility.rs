//! Structured logging facility for the DSM engine
//!
//! This module provides a canonical logging facility with:
//! - Single initialization point via `init(profile)`
//! - Boundary macros for operations (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//!   and for journaled mutations (`log_action_start!`, `log_action_end!`, `log_action_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use dsmx_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
