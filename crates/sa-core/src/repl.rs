//! The read-dispatch loop.
//!
//! Each line is parsed into a [`Command`] and handled to completion before
//! the next prompt. Action failures are printed and the loop continues;
//! only I/O errors on the console end it early.

use std::io::{self, BufRead, Write};
use std::path::Path;

use sa_backend::ChatBackend;
use sa_protocol::Turn;

use crate::command::Command;
use crate::console::Console;
use crate::fetch::Fetcher;
use crate::memory::ConversationMemory;
use crate::runner::{read_local_script, ScriptRunner};

/// Whether the loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the session state and routes commands to their handlers.
pub struct Dispatcher<B: ChatBackend> {
    backend: B,
    fetcher: Fetcher,
    runner: ScriptRunner,
    memory: ConversationMemory,
}

impl<B: ChatBackend> Dispatcher<B> {
    pub fn new(backend: B, fetcher: Fetcher, runner: ScriptRunner) -> Self {
        Self {
            backend,
            fetcher,
            runner,
            memory: ConversationMemory::new(),
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn dispatch<W: Write>(
        &mut self,
        command: Command,
        console: &mut Console<W>,
    ) -> io::Result<Flow> {
        match command {
            Command::Empty => {}
            Command::Quit => {
                console.farewell()?;
                return Ok(Flow::Quit);
            }
            Command::Help => console.help()?,
            Command::Usage(usage) => console.usage(usage)?,
            Command::Chat(text) => self.chat(text, console).await?,
            Command::RunRemote(url) => self.run_remote(&url, console).await?,
            Command::RunLocal(path) => self.run_local(&path, console).await?,
        }
        Ok(Flow::Continue)
    }

    async fn chat<W: Write>(&mut self, text: String, console: &mut Console<W>) -> io::Result<()> {
        let reply = self.backend.complete(self.memory.snapshot(), &text).await;

        // The user turn is kept even when the request fails.
        self.memory.append(Turn::user(text));

        match reply {
            Ok(reply) => {
                console.reply(&reply)?;
                self.memory.append(Turn::assistant(reply));
                tracing::info!(
                    backend = self.backend.name(),
                    turns = self.memory.len(),
                    "chat_replied"
                );
            }
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), error = %e, "chat_failed");
                console.error(&e.to_string())?;
            }
        }
        Ok(())
    }

    async fn run_remote<W: Write>(&self, url: &str, console: &mut Console<W>) -> io::Result<()> {
        console.action(url)?;
        match self.fetcher.fetch(url).await {
            Ok(source) => self.execute(&source, console).await,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "fetch_failed");
                console.error(&e.to_string())
            }
        }
    }

    async fn run_local<W: Write>(&self, path: &Path, console: &mut Console<W>) -> io::Result<()> {
        console.action(&path.display().to_string())?;
        match read_local_script(path).await {
            Ok(source) => self.execute(&source, console).await,
            Err(e) => console.error(&e.to_string()),
        }
    }

    async fn execute<W: Write>(&self, source: &str, console: &mut Console<W>) -> io::Result<()> {
        match self.runner.execute(source, None).await {
            Ok(result) => console.execution(&result, self.runner.timeout()),
            Err(e) => {
                tracing::warn!(error = %e, "script_launch_failed");
                console.error(&e.to_string())
            }
        }
    }
}

/// Prompt, read a line, dispatch, repeat until quit or end of input.
pub async fn run_repl<B, R, W>(
    dispatcher: &mut Dispatcher<B>,
    mut input: R,
    console: &mut Console<W>,
) -> io::Result<()>
where
    B: ChatBackend,
    R: BufRead,
    W: Write,
{
    let mut buf = Vec::new();
    loop {
        console.prompt()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            // End of input behaves like quit.
            console.farewell()?;
            return Ok(());
        }
        // Invalid UTF-8 is replaced rather than ending the session.
        let line = String::from_utf8_lossy(&buf);
        let text = line.strip_suffix('\n').unwrap_or(&line);
        let text = text.strip_suffix('\r').unwrap_or(text);

        let command = Command::parse(text);
        if dispatcher.dispatch(command, console).await? == Flow::Quit {
            return Ok(());
        }
    }
}
