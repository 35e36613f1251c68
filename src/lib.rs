pub mod error;
pub mod model;
pub mod ops;
pub mod resolver;
pub mod store;
pub mod workflow;

mod app;
pub mod commands;
pub mod config;

#[cfg(test)]
mod test_utils;

// Re-export App, Config and the core error type
pub use app::App;
pub use config::Config;
pub use error::Error;
pub use error::Result;

// Disable colors for all tests to get clean output
#[cfg(test)]
#[ctor::ctor]
fn init_tests() {
    colored::control::set_override(false);
}
