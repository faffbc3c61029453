//! Structured logging facility
//!
//! - Single initialization point via `init(LogProfile)`
//! - Lifecycle macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//!   emitting the canonical fields from `social_core_types::schema`
//! - A capture layer so tests can assert on emitted events
//!
//! The engine owns `start`/`end` events for every command; registry and
//! storage code only emit `tracing::debug!` details.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, LogProfile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
