// fitagent — Personal fitness assistant in Rust
// License: Apache-2.0

pub mod config;
pub mod document;
pub mod extract;
pub mod logger;
pub mod profile;
pub mod prompt;
pub mod provider;
pub mod session;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
