use std::io::{self, BufRead, IsTerminal};

use async_trait::async_trait;
use console::{Key, Term, style};
use tracing::warn;

use crate::engine::{Prompter, Tone};

/// 基于 `console::Term`（stderr）的终端交互。读取在 blocking 线程池上执行。
pub struct ConsolePrompter {
    term: Term,
}

/// 输入来源：stdin 与 stderr 都是终端时逐键读取，stdin 被重定向时按行读取。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputMode {
    Keys,
    Lines,
    /// stdin 是终端但 stderr 被重定向，无法在不回显的前提下读取。
    Detached,
}

impl InputMode {
    fn detect(term: &Term) -> Self {
        Self::from_flags(io::stdin().is_terminal(), term.is_term())
    }

    fn from_flags(stdin_is_tty: bool, term_is_tty: bool) -> Self {
        match (stdin_is_tty, term_is_tty) {
            (false, _) => InputMode::Lines,
            (true, true) => InputMode::Keys,
            (true, false) => InputMode::Detached,
        }
    }
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.term.is_term()
    }

    async fn blocking<T, F>(&self, task: F) -> io::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Term) -> io::Result<T> + Send + 'static,
    {
        let term = self.term.clone();
        tokio::task::spawn_blocking(move || task(term))
            .await
            .map_err(|err| io::Error::other(format!("终端读取任务异常退出: {err}")))?
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn ask(&mut self, question: &str) -> io::Result<String> {
        let question = question.to_string();
        self.blocking(move |term| {
            term.write_str(&question)?;
            term.flush()?;
            match InputMode::detect(&term) {
                InputMode::Keys => read_keyed_line(&term, true),
                InputMode::Lines | InputMode::Detached => read_stdin_line(),
            }
        })
        .await
    }

    async fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        let question = question.to_string();
        self.blocking(move |term| {
            term.write_str(&question)?;
            term.flush()?;
            match InputMode::detect(&term) {
                InputMode::Keys => read_keyed_line(&term, false),
                InputMode::Lines => read_stdin_line(),
                InputMode::Detached => Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "stderr 不是终端，无法隐藏私钥输入",
                )),
            }
        })
        .await
    }

    async fn select(&mut self, title: &str, items: &[&str]) -> io::Result<usize> {
        if items.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "菜单没有选项"));
        }
        let title = title.to_string();
        let items: Vec<String> = items.iter().map(|item| item.to_string()).collect();
        self.blocking(move |term| match InputMode::detect(&term) {
            InputMode::Keys => interactive_select(&term, &title, &items),
            InputMode::Lines | InputMode::Detached => numbered_select(&term, &title, &items),
        })
        .await
    }

    fn notify(&mut self, tone: Tone, message: &str) {
        let styled = match tone {
            Tone::Plain => style(message),
            Tone::Info => style(message).cyan(),
            Tone::Success => style(message).green(),
            Tone::Failure => style(message).red(),
        };
        if let Err(err) = self.term.write_line(&styled.to_string()) {
            warn!(target: "cli::console", error = %err, "终端输出失败");
        }
    }
}

/// 中断退出前恢复光标；逐键读取在每次按键后已还原终端模式。
pub fn restore_terminal() {
    let term = Term::stderr();
    if term.is_term() {
        if let Err(err) = term.show_cursor() {
            warn!(target: "cli::console", error = %err, "恢复终端光标失败");
        }
    }
}

fn interrupted() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "用户中断")
}

/// 非 TTY 下直接读 stdin；EOF 视为错误，避免把空输入当成同意。
fn read_stdin_line() -> io::Result<String> {
    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "标准输入已关闭"));
    }
    Ok(input.trim_end_matches(&['\r', '\n'][..]).to_string())
}

#[derive(Debug, PartialEq, Eq)]
enum LineEdit {
    Pushed(char),
    Erased,
    Ignored,
    Submit,
}

/// 单个按键对行缓冲的作用。raw 模式下 ^C 以 `Key::CtrlC` 到达。
fn apply_line_key(buffer: &mut String, key: Key) -> io::Result<LineEdit> {
    match key {
        Key::Enter => Ok(LineEdit::Submit),
        Key::CtrlC => Err(interrupted()),
        Key::Backspace => Ok(match buffer.pop() {
            Some(_) => LineEdit::Erased,
            None => LineEdit::Ignored,
        }),
        Key::Char(c) if !c.is_control() => {
            buffer.push(c);
            Ok(LineEdit::Pushed(c))
        }
        _ => Ok(LineEdit::Ignored),
    }
}

fn read_keyed_line(term: &Term, echo: bool) -> io::Result<String> {
    let mut buffer = String::new();
    loop {
        match apply_line_key(&mut buffer, term.read_key_raw()?)? {
            LineEdit::Pushed(c) if echo => term.write_str(c.encode_utf8(&mut [0u8; 4]))?,
            LineEdit::Erased if echo => term.clear_chars(1)?,
            LineEdit::Submit => {
                term.write_line("")?;
                return Ok(buffer);
            }
            _ => {}
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum MenuStep {
    Stay,
    Choose(usize),
}

#[derive(Debug, Default)]
struct MenuState {
    current: usize,
    typed: String,
}

impl MenuState {
    fn apply(&mut self, key: Key, len: usize) -> io::Result<MenuStep> {
        match key {
            Key::ArrowUp | Key::Char('k') | Key::Char('K') => {
                self.typed.clear();
                self.current = self.current.checked_sub(1).unwrap_or(len - 1);
            }
            Key::ArrowDown | Key::Char('j') | Key::Char('J') => {
                self.typed.clear();
                self.current = (self.current + 1) % len;
            }
            Key::Char(c) if c.is_ascii_digit() => {
                self.typed.push(c);
                if let Some(index) = parse_choice(&self.typed, len) {
                    self.current = index;
                }
            }
            Key::Backspace => {
                self.typed.pop();
            }
            Key::Enter => return Ok(MenuStep::Choose(self.current)),
            Key::CtrlC => return Err(interrupted()),
            _ => {}
        }
        Ok(MenuStep::Stay)
    }
}

fn interactive_select(term: &Term, title: &str, items: &[String]) -> io::Result<usize> {
    let mut state = MenuState::default();
    let mut rendered = false;
    let menu_lines = items.len() + 1;

    term.hide_cursor()?;
    let result = loop {
        if rendered {
            if let Err(err) = term.clear_last_lines(menu_lines) {
                break Err(err);
            }
        }
        rendered = true;
        if let Err(err) = render_menu(term, title, items, state.current) {
            break Err(err);
        }

        let step = term
            .read_key_raw()
            .and_then(|key| state.apply(key, items.len()));
        match step {
            Ok(MenuStep::Stay) => {}
            Ok(MenuStep::Choose(index)) => break Ok(index),
            Err(err) => break Err(err),
        }
    };

    term.show_cursor()?;
    if rendered {
        term.clear_last_lines(menu_lines)?;
    }
    if let Ok(index) = result {
        term.write_line(&format!("{} {}", style(title).cyan(), items[index]))?;
    }
    result
}

fn render_menu(term: &Term, title: &str, items: &[String], current: usize) -> io::Result<()> {
    term.write_line(&style(title).cyan().to_string())?;
    for (idx, item) in items.iter().enumerate() {
        if idx == current {
            term.write_line(&format!("  ➤ [{}] {}", idx + 1, style(item).bold()))?;
        } else {
            term.write_line(&format!("    [{}] {}", idx + 1, item))?;
        }
    }
    Ok(())
}

fn numbered_select(term: &Term, title: &str, items: &[String]) -> io::Result<usize> {
    term.write_line(title)?;
    for (idx, item) in items.iter().enumerate() {
        term.write_line(&format!("  [{}] {}", idx + 1, item))?;
    }
    loop {
        term.write_str(&format!("Select [1-{}]: ", items.len()))?;
        term.flush()?;
        let line = read_stdin_line()?;
        if let Some(index) = parse_choice(&line, items.len()) {
            return Ok(index);
        }
    }
}

/// 1 起始的序号转换为下标。
fn parse_choice(input: &str, len: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(value) if (1..=len).contains(&value) => Some(value - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_are_one_based() {
        assert_eq!(parse_choice("1", 2), Some(0));
        assert_eq!(parse_choice(" 2 ", 2), Some(1));
        assert_eq!(parse_choice("0", 2), None);
        assert_eq!(parse_choice("3", 2), None);
        assert_eq!(parse_choice("x", 2), None);
    }

    #[test]
    fn hidden_entry_follows_stdin_not_stdout() {
        assert_eq!(InputMode::from_flags(true, true), InputMode::Keys);
        assert_eq!(InputMode::from_flags(false, true), InputMode::Lines);
        assert_eq!(InputMode::from_flags(false, false), InputMode::Lines);
        assert_eq!(InputMode::from_flags(true, false), InputMode::Detached);
    }

    #[test]
    fn keyed_line_collects_chars_and_submits() {
        let mut buffer = String::new();
        for c in "5Kq".chars() {
            assert_eq!(
                apply_line_key(&mut buffer, Key::Char(c)).expect("key"),
                LineEdit::Pushed(c)
            );
        }
        assert_eq!(
            apply_line_key(&mut buffer, Key::Backspace).expect("key"),
            LineEdit::Erased
        );
        assert_eq!(
            apply_line_key(&mut buffer, Key::Char('\u{1b}')).expect("key"),
            LineEdit::Ignored
        );
        assert_eq!(
            apply_line_key(&mut buffer, Key::Enter).expect("key"),
            LineEdit::Submit
        );
        assert_eq!(buffer, "5K");

        let mut empty = String::new();
        assert_eq!(
            apply_line_key(&mut empty, Key::Backspace).expect("key"),
            LineEdit::Ignored
        );
    }

    #[test]
    fn ctrl_c_in_raw_mode_interrupts_line_and_menu() {
        let mut buffer = "secret".to_string();
        let err = apply_line_key(&mut buffer, Key::CtrlC).expect_err("interrupt");
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);

        let mut menu = MenuState::default();
        let err = menu.apply(Key::CtrlC, 2).expect_err("interrupt");
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }

    #[test]
    fn menu_moves_wraps_and_accepts_digits() {
        let mut menu = MenuState::default();
        assert_eq!(menu.apply(Key::ArrowUp, 2).expect("up"), MenuStep::Stay);
        assert_eq!(menu.current, 1);
        assert_eq!(menu.apply(Key::Char('j'), 2).expect("down"), MenuStep::Stay);
        assert_eq!(menu.current, 0);
        assert_eq!(menu.apply(Key::Char('2'), 2).expect("digit"), MenuStep::Stay);
        assert_eq!(menu.apply(Key::Enter, 2).expect("enter"), MenuStep::Choose(1));
    }
}
