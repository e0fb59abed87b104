//! CLI command handlers, one file per command.

mod fetch;
mod list;
mod sources;

pub use fetch::{run_fetch, FetchArgs};
pub use list::run_list;
pub use sources::run_sources;
