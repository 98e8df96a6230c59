pub mod dispatch;
pub mod prompt;
mod turn;

pub use prompt::build_system_prompt;
pub use turn::{APOLOGY_REPLY, ChatAgent};
