use std::io;

use async_trait::async_trait;

/// 终端输出的语气，对应不同颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Failure,
}

/// 所有与用户的交互都经过同一个 `Prompter`，保证提问严格串行。
#[async_trait]
pub trait Prompter: Send {
    /// 输出问题并读取一行回答（不含换行）。
    async fn ask(&mut self, question: &str) -> io::Result<String>;

    /// 隐藏回显读取一行。
    async fn ask_secret(&mut self, question: &str) -> io::Result<String>;

    /// 在若干选项中选择一项，返回下标。
    async fn select(&mut self, title: &str, items: &[&str]) -> io::Result<usize>;

    fn notify(&mut self, tone: Tone, message: &str);
}

/// 空输入或任意大小写的 `y` 视为同意，其余一律拒绝。
pub fn is_affirmative(answer: &str) -> bool {
    let trimmed = answer.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("y")
}
