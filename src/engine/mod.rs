//! 清理流程：私钥加载、逐账户确认、指令组装与交易提交。

mod builder;
mod confirm;
mod error;
mod identity;
pub mod prompt;
mod session;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{EngineError, EngineResult};
pub use prompt::{Prompter, Tone};
pub use session::SweepSession;
pub use types::SweepOutcome;
