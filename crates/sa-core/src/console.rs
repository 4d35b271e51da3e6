//! Everything the loop prints, with NO_COLOR-aware styling.

use std::io::{self, Write};
use std::time::Duration;

use sa_protocol::ExecutionResult;

use crate::command::{RUN_GITHUB_USAGE, RUN_LOCAL_USAGE};

/// ANSI styling that can be switched off.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    enabled: bool,
}

impl Style {
    /// Colors on only for a terminal and when `NO_COLOR` is unset.
    pub fn detect(is_terminal: bool) -> Self {
        Self {
            enabled: is_terminal && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Colors on regardless of environment (for tests).
    pub fn force_enabled() -> Self {
        Self { enabled: true }
    }

    fn code(&self, code: &'static str) -> &'static str {
        if self.enabled {
            code
        } else {
            ""
        }
    }

    fn dim(&self) -> &'static str {
        self.code("\x1b[2m")
    }

    fn bold(&self) -> &'static str {
        self.code("\x1b[1m")
    }

    fn red(&self) -> &'static str {
        self.code("\x1b[31m")
    }

    fn green(&self) -> &'static str {
        self.code("\x1b[32m")
    }

    fn yellow(&self) -> &'static str {
        self.code("\x1b[33m")
    }

    fn cyan(&self) -> &'static str {
        self.code("\x1b[36m")
    }

    fn reset(&self) -> &'static str {
        self.code("\x1b[0m")
    }
}

pub struct Console<W: Write> {
    writer: W,
    style: Style,
}

impl<W: Write> Console<W> {
    pub fn new(writer: W, style: Style) -> Self {
        Self { writer, style }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Startup banner with the command list.
    pub fn banner(&mut self, backend: &str, model: &str) -> io::Result<()> {
        let s = self.style;
        writeln!(
            self.writer,
            "{}--- scriptagent is ready ({backend}, {model}) ---{}",
            s.bold(),
            s.reset()
        )?;
        self.commands()?;
        writeln!(self.writer, "{}", "-".repeat(50))
    }

    pub fn help(&mut self) -> io::Result<()> {
        self.commands()
    }

    fn commands(&mut self) -> io::Result<()> {
        let s = self.style;
        writeln!(self.writer, "Command: {}{RUN_GITHUB_USAGE}{}", s.cyan(), s.reset())?;
        writeln!(self.writer, "Command: {}{RUN_LOCAL_USAGE}{}", s.cyan(), s.reset())?;
        writeln!(self.writer, "Type 'help' for this list, 'quit' or 'exit' to end.")
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.writer, "{}You:{} ", self.style.bold(), self.style.reset())?;
        self.writer.flush()
    }

    pub fn farewell(&mut self) -> io::Result<()> {
        self.agent_line("Goodbye!")
    }

    pub fn reply(&mut self, text: &str) -> io::Result<()> {
        self.agent_line(text)
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        let s = self.style;
        writeln!(
            self.writer,
            "{}Agent:{} {}error: {message}{}",
            s.bold(),
            s.reset(),
            s.red(),
            s.reset()
        )?;
        self.writer.flush()
    }

    pub fn usage(&mut self, usage: &str) -> io::Result<()> {
        self.agent_line(&format!("usage: {usage}"))
    }

    /// Banner printed before a script is fetched or read.
    pub fn action(&mut self, source: &str) -> io::Result<()> {
        let s = self.style;
        writeln!(
            self.writer,
            "{}--- Action: Executing script from: {source} ---{}",
            s.dim(),
            s.reset()
        )?;
        self.writer.flush()
    }

    /// Render one script run. Non-zero exits and timeouts are shown as
    /// output, never as errors.
    pub fn execution(&mut self, result: &ExecutionResult, timeout: Duration) -> io::Result<()> {
        let s = self.style;
        if result.timed_out {
            writeln!(
                self.writer,
                "{}--- Script Timed Out after {timeout:?} ---{}",
                s.yellow(),
                s.reset()
            )?;
        } else if result.exit_code == Some(0) {
            writeln!(self.writer, "{}--- Script Result ---{}", s.green(), s.reset())?;
        } else {
            writeln!(self.writer, "{}--- Script Error ---{}", s.red(), s.reset())?;
        }

        self.block(&result.stdout)?;
        if !result.stderr.is_empty() {
            writeln!(self.writer, "{}STDERR:{}", s.dim(), s.reset())?;
            self.block(&result.stderr)?;
        }

        match result.exit_code {
            Some(0) => {}
            Some(code) => writeln!(self.writer, "{}[exit code: {code}]{}", s.dim(), s.reset())?,
            None if !result.timed_out => {
                writeln!(self.writer, "{}[terminated by signal]{}", s.dim(), s.reset())?
            }
            None => {}
        }
        self.writer.flush()
    }

    fn block(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.writer.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn agent_line(&mut self, text: &str) -> io::Result<()> {
        writeln!(
            self.writer,
            "{}Agent:{} {text}",
            self.style.bold(),
            self.style.reset()
        )?;
        self.writer.flush()
    }
}
