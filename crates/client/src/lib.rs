//! Client code for neu-cache.
//!
//! This crate provides the network capability and the resource cache agent
//! that routes intercepted requests between the network and cache storage.

pub mod agent;
pub mod fetch;

pub use agent::{
    ActivateOutcome, Agent, AgentConfig, Event, EventKind, EventOutcome, FetchOutcome, InstallOutcome,
    ResponseSource, Served, SyncEvent, SyncOutcome,
};

pub use fetch::{FetchClient, FetchConfig, Network};
