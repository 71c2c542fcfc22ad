//! Agent state, decision rules, and lifecycle for the Whispers simulation.
//!
//! This crate is the logic layer for agents: everything that operates on
//! agent state without touching the grid or I/O. It sits between
//! `whispers-types` (the data structures) and `whispers-core` (the day
//! cycle that drives agents).
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] and its request, demand, and acceptance rules
//! - [`config`] -- Economy constants for new agents ([`AgentConfig`])
//! - [`negotiation`] -- Single-round bilateral protocol ([`negotiate`])
//! - [`profile`] -- Per-profile parameter table
//! - [`reproduction`] -- Offspring trait inheritance and mutation
//! - [`reputation`] -- Exponential smoothing of the cooperation window

pub mod agent;
pub mod config;
pub mod negotiation;
pub mod profile;
pub mod reproduction;
pub mod reputation;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentParams};
pub use config::AgentConfig;
pub use negotiation::{NegotiationOutcome, Negotiator, negotiate};
pub use profile::{ProfileParams, default_traits};
