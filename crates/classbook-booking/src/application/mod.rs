//! Application layer: use-case orchestrators, reaction handlers, and queries.

pub mod command_handlers;
pub mod context;
pub mod query_handlers;
pub mod reaction_handlers;
