//! CLI command handlers. Each command is in its own file.

mod classify;
mod digest;
mod load;
mod output;
mod stream;

pub use classify::run_classify;
pub use digest::run_digest;
pub use load::run_load;
pub use stream::run_stream;
