pub mod bitbucket;
pub mod cli;
pub mod datadog;
pub mod error;
pub mod load_config;
pub mod logging;
pub mod slack;

pub use cli::{run, Cli, Commands};
