pub mod config;
pub mod context;
pub mod delivery;
pub mod format;
pub mod guard;
pub mod handlers;
pub mod hook;
pub mod manager;
pub mod module;
pub mod permissions;
pub mod prefix;
pub mod ratelimit;
pub mod search;
pub mod state;
pub mod store;
pub mod tracker;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use modbot;
