//! Input parsing for the interactive shell.
//!
//! A line starting with `http` loads a problem; a line starting with `/`
//! is a shell command; anything else is a follow-up question.

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Fetch a problem and start a new conversation.
    LoadUrl(String),
    /// Ask a follow-up question about the loaded problem.
    Ask(String),
    /// Print the conversation so far.
    History,
    /// Print the loaded problem again.
    Problem,
    /// Print token usage and estimated cost.
    Usage,
    Help,
    Quit,
    Empty,
    /// A `/command` the shell doesn't know.
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ShellCommand::Empty;
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return ShellCommand::LoadUrl(trimmed.to_string());
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            return ShellCommand::Quit;
        }
        if let Some(command) = trimmed.strip_prefix('/') {
            let (name, arg) = command
                .split_once(char::is_whitespace)
                .map(|(n, a)| (n, a.trim()))
                .unwrap_or((command, ""));
            return match name.to_ascii_lowercase().as_str() {
                "history" => ShellCommand::History,
                "problem" => ShellCommand::Problem,
                "usage" => ShellCommand::Usage,
                "help" | "?" => ShellCommand::Help,
                "quit" | "exit" | "q" => ShellCommand::Quit,
                "load" | "url" if !arg.is_empty() => ShellCommand::LoadUrl(arg.to_string()),
                _ => ShellCommand::Unknown(trimmed.to_string()),
            };
        }
        ShellCommand::Ask(trimmed.to_string())
    }
}

/// Help text for the shell.
pub const HELP: &str = "\
Paste a LeetCode problem URL to load it, then type follow-up questions.

Commands:
  <url> | /load <url>   fetch a problem and start a new conversation
  /history              show the conversation so far
  /problem              show the loaded problem again
  /usage                show token usage and estimated cost
  /help                 show this help
  /quit                 exit (also: quit, exit, Ctrl-D)";
