mod args;
mod repl;

pub use args::CliArgs;
pub use repl::run_repl;
