//! Cache inspection tools.
//!
//! Read-only views of cache storage; nothing here touches the network.

pub mod get;
pub mod list;

pub use get::{CacheGetParams, get_impl};
pub use list::list_impl;
