//! Adaptex editor session
//!
//! A line-oriented stand-in for a document editor: typed lines go into a
//! buffer, commands starting with `:` act on it. Every `:run` is a fresh
//! top-level expansion of the whole buffer.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::engine::{expand_with, EngineConfig};
use crate::errors::{print_error, ExpansionError};
use crate::runtime::{ContentRetriever, InteractivePrompt, TerminalPrompt, UrlRetriever};

/// Buffer and configuration of one editing session.
pub struct EditorSession {
    lines: Vec<String>,
    config: EngineConfig,
}

impl EditorSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            lines: Vec::new(),
            config,
        }
    }

    pub fn push_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Replaces the buffer with a file; returns the number of lines read.
    pub fn open(&mut self, path: &Path) -> io::Result<usize> {
        let text = std::fs::read_to_string(path)?;
        self.lines = text.lines().map(str::to_string).collect();
        Ok(self.lines.len())
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.text())
    }

    pub fn expand(
        &self,
        prompt: &mut dyn InteractivePrompt,
        retriever: &dyn ContentRetriever,
    ) -> Result<String, ExpansionError> {
        expand_with(&self.config, &self.text(), prompt, retriever)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    Run,
    Clear,
    Open(PathBuf),
    Save(PathBuf),
    Show,
    Help,
    Quit,
    Unknown(String),
}

/// Parses a `:` command; other lines are document text.
pub fn parse_command(line: &str) -> Option<EditorCommand> {
    let command = line.trim().strip_prefix(':')?;
    let (verb, argument) = match command.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (command, ""),
    };
    let with_path = |build: fn(PathBuf) -> EditorCommand| {
        if argument.is_empty() {
            EditorCommand::Unknown(format!(":{} needs a file name", verb))
        } else {
            build(PathBuf::from(argument))
        }
    };
    Some(match verb.to_ascii_lowercase().as_str() {
        "run" | "r" => EditorCommand::Run,
        "clear" | "c" => EditorCommand::Clear,
        "open" | "o" => with_path(EditorCommand::Open),
        "save" | "s" => with_path(EditorCommand::Save),
        "show" => EditorCommand::Show,
        "help" | "h" => EditorCommand::Help,
        "quit" | "q" => EditorCommand::Quit,
        _ => EditorCommand::Unknown(format!("unknown command ':{}'", verb)),
    })
}

/// Main editor entry point
pub fn run_editor(config: EngineConfig) {
    let mut session = EditorSession::new(config);
    let mut prompt = TerminalPrompt::stdio();
    let retriever = UrlRetriever::new();
    let mut stdout = io::stdout();
    if let Err(error) = session.run(&mut prompt, &retriever, &mut stdout) {
        eprintln!("Error reading input: {}", error);
    }
}

impl EditorSession {
    /// Reads lines and commands through `prompt` until `:quit` or end of input.
    ///
    /// `input text` replies come from the same reader, so a reply and the
    /// commands typed after it are consumed in order.
    pub fn run<R: BufRead, E: Write, W: Write>(
        &mut self,
        prompt: &mut TerminalPrompt<R, E>,
        retriever: &dyn ContentRetriever,
        out: &mut W,
    ) -> io::Result<()> {
        writeln!(out, "adaptex editor")?;
        writeln!(out, "Type document lines; :run expands the buffer, :help lists commands.")?;

        loop {
            let mut line = String::new();
            if prompt.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\n', '\r']);

            let Some(command) = parse_command(line) else {
                self.push_line(line);
                continue;
            };
            match command {
                EditorCommand::Run => match self.expand(prompt, retriever) {
                    Ok(output) => writeln!(out, "{}", output)?,
                    Err(error) => print_error(error),
                },
                EditorCommand::Clear => {
                    self.clear();
                    writeln!(out, "Buffer cleared.")?;
                }
                EditorCommand::Open(path) => match self.open(&path) {
                    Ok(count) => writeln!(out, "Read {} line(s) from {}.", count, path.display())?,
                    Err(error) => eprintln!("Could not open {}: {}", path.display(), error),
                },
                EditorCommand::Save(path) => match self.save(&path) {
                    Ok(()) => writeln!(out, "Saved {}.", path.display())?,
                    Err(error) => eprintln!("Could not save {}: {}", path.display(), error),
                },
                EditorCommand::Show => writeln!(out, "{}", self.text())?,
                EditorCommand::Help => print_help(out)?,
                EditorCommand::Quit => break,
                EditorCommand::Unknown(message) => {
                    writeln!(out, "{}. Type :help for available commands.", message)?
                }
            }
            out.flush()?;
        }
        Ok(())
    }
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Editor commands:")?;
    writeln!(out, "  :run, :r          Expand the buffer and print the result")?;
    writeln!(out, "  :show             Print the buffer")?;
    writeln!(out, "  :clear, :c        Empty the buffer")?;
    writeln!(out, "  :open, :o FILE    Replace the buffer with a file")?;
    writeln!(out, "  :save, :s FILE    Write the buffer to a file")?;
    writeln!(out, "  :help, :h         Show this help")?;
    writeln!(out, "  :quit, :q         Leave the editor")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{NullPrompt, StaticRetriever};
    use std::io::Cursor;

    fn run_session(input: &str) -> (EditorSession, String) {
        let mut prompt = TerminalPrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let mut out = Vec::new();
        let mut session = EditorSession::new(EngineConfig::default());
        session
            .run(&mut prompt, &StaticRetriever::new(), &mut out)
            .unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn prompt_replies_and_commands_share_one_reader() {
        let (session, shown) = run_session(
            "\\|input text(\\!Title!\\,\\!draft!\\)|\\\n:run\nfirst\nsecond\n.\nn\n:show\n:quit\nafter quit\n",
        );
        assert!(shown.contains("first\nsecond\n"));
        assert!(shown.contains("\\|input text("));
        assert_eq!(session.line_count(), 1);
    }

    #[test]
    fn session_ends_at_end_of_input() {
        let (session, shown) = run_session("one\ntwo\n:help\n");
        assert_eq!(session.text(), "one\ntwo");
        assert!(shown.contains(":quit, :q"));
    }

    #[test]
    fn commands_parse_with_arguments() {
        assert_eq!(parse_command(":run"), Some(EditorCommand::Run));
        assert_eq!(parse_command("  :Q "), Some(EditorCommand::Quit));
        assert_eq!(
            parse_command(":open  notes/book.txt"),
            Some(EditorCommand::Open(PathBuf::from("notes/book.txt")))
        );
        assert!(matches!(parse_command(":save"), Some(EditorCommand::Unknown(_))));
        assert!(matches!(parse_command(":frobnicate"), Some(EditorCommand::Unknown(_))));
        assert_eq!(parse_command("plain text"), None);
    }

    #[test]
    fn each_run_is_independent() {
        let mut session = EditorSession::new(EngineConfig::default());
        session.push_line("\\|new counter(\\!n!\\)|\\\\|increment counter(\\!n!\\)|\\");
        session.push_line("\\|counter(\\!n!\\)|\\");
        let retriever = StaticRetriever::new();
        assert_eq!(session.expand(&mut NullPrompt, &retriever).unwrap(), "\n1");
        assert_eq!(session.expand(&mut NullPrompt, &retriever).unwrap(), "\n1");
    }

    #[test]
    fn open_and_save_round_trip_the_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        let mut session = EditorSession::new(EngineConfig::default());
        session.push_line("first");
        session.push_line("second");
        session.save(&path).unwrap();

        session.clear();
        assert_eq!(session.line_count(), 0);
        assert_eq!(session.open(&path).unwrap(), 2);
        assert_eq!(session.text(), "first\nsecond");
    }
}
