//! Domains module containing business logic organized by bounded contexts.
//!
//! The only domain this server exposes is tools: operational actions the
//! platform can invoke on behalf of an agent.

pub mod tools;
