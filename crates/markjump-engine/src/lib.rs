pub mod backend;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod dom;
pub mod executor;
pub mod memory;
pub mod resolver;

pub use markjump_common::error;
pub use markjump_common::formatter;
pub use markjump_common::protocol;
