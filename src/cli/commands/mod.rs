//! CLI command implementations

pub mod cache;
pub mod clear;
pub mod config;
pub mod delete;
pub mod get;
pub mod purge;
pub mod put;
pub mod status;

pub use cache::execute as cache;
pub use clear::execute as clear;
pub use config::execute as config;
pub use delete::execute as delete;
pub use get::execute as get;
pub use purge::execute as purge;
pub use put::execute as put;
pub use status::execute as status;
