pub mod arguments;
pub mod bot;
pub mod builder;
pub mod client;
pub mod model;
pub mod permissions;
pub mod store;
pub mod util;

pub use arguments::Arguments;
pub use bot::{Error, Result};
pub use client::Client;
pub use store::Store;
