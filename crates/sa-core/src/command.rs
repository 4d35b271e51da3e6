//! Classification of one input line.

use std::path::PathBuf;

pub const RUN_GITHUB: &str = "run_github";
pub const RUN_LOCAL: &str = "run_local";

pub const RUN_GITHUB_USAGE: &str = "run_github <raw_url>";
pub const RUN_LOCAL_USAGE: &str = "run_local <path>";

/// What the dispatcher should do with a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send the line to the chat backend.
    Chat(String),
    /// Fetch a script from a URL and run it.
    RunRemote(String),
    /// Read a script from disk and run it.
    RunLocal(PathBuf),
    /// A run keyword without its argument. Carries the usage string.
    Usage(&'static str),
    Help,
    /// Blank line; nothing to do.
    Empty,
    Quit,
}

impl Command {
    /// Parse a line (without its line terminator).
    ///
    /// Keywords match case-insensitively; everything that is not a keyword
    /// is chat, passed through verbatim.
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Command::Empty;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            return Command::Quit;
        }
        if trimmed.eq_ignore_ascii_case("help") {
            return Command::Help;
        }

        let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (trimmed, ""),
        };

        if keyword.eq_ignore_ascii_case(RUN_GITHUB) {
            if rest.is_empty() {
                return Command::Usage(RUN_GITHUB_USAGE);
            }
            return Command::RunRemote(rest.to_string());
        }
        if keyword.eq_ignore_ascii_case(RUN_LOCAL) {
            if rest.is_empty() {
                return Command::Usage(RUN_LOCAL_USAGE);
            }
            return Command::RunLocal(PathBuf::from(rest));
        }

        Command::Chat(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat_verbatim() {
        for line in [
            "hello there",
            "  leading and trailing  ",
            "what does run_github do?",
            "run_githubx https://example.com",
            "please run_local foo.py",
            "quit now",
            "exit()",
        ] {
            assert_eq!(Command::parse(line), Command::Chat(line.to_string()), "{line:?}");
        }
    }

    #[test]
    fn quit_and_exit_any_case() {
        for line in ["quit", "QUIT", "Exit", "EXIT", "  quit  ", "eXiT\t"] {
            assert_eq!(Command::parse(line), Command::Quit, "{line:?}");
        }
    }

    #[test]
    fn run_github_takes_trimmed_url() {
        assert_eq!(
            Command::parse("run_github   https://raw.githubusercontent.com/u/r/main/a.py  "),
            Command::RunRemote("https://raw.githubusercontent.com/u/r/main/a.py".to_string())
        );
    }

    #[test]
    fn run_github_keyword_case_insensitive() {
        assert_eq!(
            Command::parse("RUN_GITHUB http://x/Y.py"),
            Command::RunRemote("http://x/Y.py".to_string())
        );
        assert_eq!(
            Command::parse("Run_GitHub\thttp://x/y.py"),
            Command::RunRemote("http://x/y.py".to_string())
        );
    }

    #[test]
    fn argument_case_is_preserved() {
        assert_eq!(
            Command::parse("run_local Scripts/Hello.PY"),
            Command::RunLocal(PathBuf::from("Scripts/Hello.PY"))
        );
    }

    #[test]
    fn run_local_keeps_inner_spaces() {
        assert_eq!(
            Command::parse("run_local my scripts/a b.py"),
            Command::RunLocal(PathBuf::from("my scripts/a b.py"))
        );
    }

    #[test]
    fn bare_keywords_are_usage() {
        assert_eq!(Command::parse("run_local"), Command::Usage(RUN_LOCAL_USAGE));
        assert_eq!(Command::parse("run_github"), Command::Usage(RUN_GITHUB_USAGE));
        assert_eq!(Command::parse("RUN_LOCAL   "), Command::Usage(RUN_LOCAL_USAGE));
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("   \t "), Command::Empty);
    }

    #[test]
    fn help_keyword() {
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse(" HELP "), Command::Help);
        assert_eq!(
            Command::parse("help me"),
            Command::Chat("help me".to_string())
        );
    }
}
