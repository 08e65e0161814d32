//! CLI 模块负责解析命令行参数、组装依赖并驱动一次清理流程。

mod console_ui;
mod runner;

pub mod args;

pub use runner::run;
