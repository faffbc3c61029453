//! Social Engine - Orchestration layer
//!
//! Applies create / link / query commands against any `SocialRepo`
//! backend and owns their lifecycle logging.

pub mod commands;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
