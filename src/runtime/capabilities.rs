//! External capabilities consumed by the primitives.
//!
//! The expander never talks to a terminal, a network or a file system on
//! its own. `input text` and `send message` go through an `InteractivePrompt`;
//! `get url` goes through a `ContentRetriever`. Stock implementations for
//! batch runs, terminals, HTTP, files and tests live here.

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

use std::collections::{HashMap, VecDeque};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// What the user answered to an `input text` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptReply {
    /// Whether the returned text should be expanded again.
    pub expand: bool,
    pub text: String,
}

impl PromptReply {
    pub fn verbatim(text: impl Into<String>) -> Self {
        Self {
            expand: false,
            text: text.into(),
        }
    }

    pub fn expanded(text: impl Into<String>) -> Self {
        Self {
            expand: true,
            text: text.into(),
        }
    }
}

pub trait InteractivePrompt {
    /// Shows `title` and `initial` to the user and returns the edited text.
    fn ask_text(&mut self, title: &str, initial: &str) -> PromptReply;

    /// Shows a message; nothing is returned.
    fn notify(&mut self, title: &str, body: &str);
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },
    #[error("nothing found at '{locator}'")]
    NotFound { locator: String },
    #[error("scheme '{scheme}' is not supported")]
    UnsupportedScheme { scheme: String },
    #[error("could not reach '{locator}': {reason}")]
    Network { locator: String, reason: String },
    #[error("could not read '{locator}'")]
    Io {
        locator: String,
        #[source]
        source: io::Error,
    },
}

pub trait ContentRetriever {
    fn fetch(&self, locator: &str) -> Result<String, RetrievalError>;
}

// ============================================================================
// PROMPTS
// ============================================================================

/// Non-interactive prompt: keeps the initial text and drops messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPrompt;

impl InteractivePrompt for NullPrompt {
    fn ask_text(&mut self, _title: &str, initial: &str) -> PromptReply {
        PromptReply::verbatim(initial)
    }

    fn notify(&mut self, _title: &str, _body: &str) {}
}

/// Line-based prompt over a reader and a writer, normally stdin and stderr.
///
/// A reply is read line by line until a line holding only `.`; an empty
/// reply keeps the initial text. Messages are word-wrapped. A caller that
/// reads its own input from the same stream (the editor) must go through
/// `read_line`, so nothing is left behind in a second buffer.
pub struct TerminalPrompt<R, W> {
    reader: R,
    writer: W,
    interactive: bool,
}

const MESSAGE_WIDTH: usize = 72;

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on the process terminal, holding the stdin lock. When stdin
    /// is not a terminal, `ask_text` answers like `NullPrompt`.
    pub fn stdio() -> Self {
        Self {
            reader: io::stdin().lock(),
            writer: io::stderr(),
            interactive: atty::is(atty::Stream::Stdin),
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            interactive: true,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Reads one line from the prompt's input, for callers sharing it.
    pub fn read_line(&mut self, line: &mut String) -> io::Result<usize> {
        self.reader.read_line(line)
    }

    fn read_reply(&mut self, title: &str, initial: &str) -> io::Result<PromptReply> {
        writeln!(self.writer, "== {} ==", title)?;
        writeln!(self.writer, "{}", initial)?;
        writeln!(
            self.writer,
            "-- type the new text, end with a line holding only '.' (empty keeps the text above)"
        )?;
        self.writer.flush()?;

        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end_matches(['\n', '\r']);
            if line == "." {
                break;
            }
            lines.push(line.to_string());
        }
        if lines.is_empty() {
            return Ok(PromptReply::verbatim(initial));
        }

        write!(self.writer, "expand? [y/N] ")?;
        self.writer.flush()?;
        let mut answer = String::new();
        self.reader.read_line(&mut answer)?;
        let expand = matches!(answer.trim(), "y" | "Y" | "yes");
        Ok(PromptReply {
            expand,
            text: lines.join("\n"),
        })
    }
}

impl<R: BufRead, W: Write> InteractivePrompt for TerminalPrompt<R, W> {
    fn ask_text(&mut self, title: &str, initial: &str) -> PromptReply {
        if !self.interactive {
            return PromptReply::verbatim(initial);
        }
        match self.read_reply(title, initial) {
            Ok(reply) => reply,
            Err(error) => {
                log::warn!("prompt '{}' failed, keeping the initial text: {}", title, error);
                PromptReply::verbatim(initial)
            }
        }
    }

    fn notify(&mut self, title: &str, body: &str) {
        let mut message = format!("== {} ==\n", title);
        for line in wrap(body, MESSAGE_WIDTH) {
            message.push_str(&line);
            message.push('\n');
        }
        if let Err(error) = self.writer.write_all(message.as_bytes()) {
            log::warn!("could not show message '{}': {}", title, error);
        }
    }
}

/// Greedy word wrap; paragraphs (existing line breaks) are kept.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

/// Prompt with canned replies that records everything it was asked.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    replies: VecDeque<PromptReply>,
    pub asked: Vec<(String, String)>,
    pub notifications: Vec<(String, String)>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, reply: PromptReply) -> Self {
        self.replies.push_back(reply);
        self
    }
}

impl InteractivePrompt for ScriptedPrompt {
    /// Pops the next canned reply; once they run out, keeps the initial text.
    fn ask_text(&mut self, title: &str, initial: &str) -> PromptReply {
        self.asked.push((title.to_string(), initial.to_string()));
        self.replies
            .pop_front()
            .unwrap_or_else(|| PromptReply::verbatim(initial))
    }

    fn notify(&mut self, title: &str, body: &str) {
        self.notifications.push((title.to_string(), body.to_string()));
    }
}

// ============================================================================
// RETRIEVERS
// ============================================================================

/// Reads UTF-8 text from `file://` URLs and plain paths.
#[derive(Debug, Clone, Default)]
pub struct FileRetriever {
    base_dir: Option<PathBuf>,
}

impl FileRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `base_dir` instead of the working directory.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, locator: &str) -> Result<PathBuf, RetrievalError> {
        let invalid = |reason: &str| RetrievalError::InvalidLocator {
            locator: locator.to_string(),
            reason: reason.to_string(),
        };
        if locator.is_empty() {
            return Err(invalid("the locator is empty"));
        }

        let raw_path = match locator.split_once("://") {
            Some(("file", rest)) => {
                if rest.is_empty() {
                    return Err(invalid("the file URL has no path"));
                }
                rest
            }
            Some((scheme, _)) if is_scheme(scheme) => {
                return Err(RetrievalError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                })
            }
            _ if locator.starts_with("file:") => {
                return Err(invalid("expected 'file://' followed by a path"))
            }
            _ => locator,
        };

        let path = Path::new(raw_path);
        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl ContentRetriever for FileRetriever {
    fn fetch(&self, locator: &str) -> Result<String, RetrievalError> {
        let locator = locator.trim();
        let path = self.resolve(locator)?;
        log::debug!("retrieving '{}' from {}", locator, path.display());
        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RetrievalError::NotFound {
                locator: locator.to_string(),
            },
            _ => RetrievalError::Io {
                locator: locator.to_string(),
                source,
            },
        })
    }
}

/// Default timeout of a single HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches `http://` and `https://` URLs with a blocking GET.
///
/// 404 and 410 are `NotFound`; any other failing status, and every
/// transport failure, is `Network`.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    agent: ureq::Agent,
}

impl Default for HttpRetriever {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }
}

impl HttpRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl ContentRetriever for HttpRetriever {
    fn fetch(&self, locator: &str) -> Result<String, RetrievalError> {
        let locator = locator.trim();
        log::debug!("retrieving '{}' over HTTP", locator);
        let response = self
            .agent
            .get(locator)
            .call()
            .map_err(|error| classify_http_error(locator, error))?;
        response.into_string().map_err(|source| RetrievalError::Io {
            locator: locator.to_string(),
            source,
        })
    }
}

fn classify_http_error(locator: &str, error: ureq::Error) -> RetrievalError {
    let locator = locator.to_string();
    match error {
        ureq::Error::Status(404 | 410, _) => RetrievalError::NotFound { locator },
        ureq::Error::Status(code, response) => RetrievalError::Network {
            locator,
            reason: format!("HTTP status {} {}", code, response.status_text()),
        },
        ureq::Error::Transport(transport) if transport.kind() == ureq::ErrorKind::InvalidUrl => {
            RetrievalError::InvalidLocator {
                locator,
                reason: transport.to_string(),
            }
        }
        ureq::Error::Transport(transport) => RetrievalError::Network {
            locator,
            reason: transport.to_string(),
        },
    }
}

/// Routes `http(s)://` locators to a network retriever and everything else
/// (`file://` URLs, plain paths, unknown schemes) to a file retriever.
pub struct UrlRetriever {
    network: Box<dyn ContentRetriever>,
    files: Box<dyn ContentRetriever>,
}

impl Default for UrlRetriever {
    fn default() -> Self {
        Self::with_parts(HttpRetriever::new(), FileRetriever::new())
    }
}

impl UrlRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(
        network: impl ContentRetriever + 'static,
        files: impl ContentRetriever + 'static,
    ) -> Self {
        Self {
            network: Box::new(network),
            files: Box::new(files),
        }
    }
}

/// Whether `locator` names an `http` or `https` URL; the scheme is case-insensitive.
pub fn is_network_locator(locator: &str) -> bool {
    match locator.trim().split_once("://") {
        Some((scheme, _)) => {
            scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
        }
        None => false,
    }
}

impl ContentRetriever for UrlRetriever {
    fn fetch(&self, locator: &str) -> Result<String, RetrievalError> {
        if is_network_locator(locator) {
            self.network.fetch(locator)
        } else {
            self.files.fetch(locator)
        }
    }
}

/// In-memory retriever keyed by exact locator.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    documents: HashMap<String, String>,
}

impl StaticRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locator: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(locator.into(), text.into());
        self
    }
}

impl ContentRetriever for StaticRetriever {
    fn fetch(&self, locator: &str) -> Result<String, RetrievalError> {
        self.documents
            .get(locator)
            .cloned()
            .ok_or_else(|| RetrievalError::NotFound {
                locator: locator.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};
    use std::net::TcpListener;

    fn terminal(input: &str) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn terminal_reads_until_dot_then_asks_to_expand() {
        let mut prompt = terminal("first\nsecond\n.\ny\n");
        let reply = prompt.ask_text("Name", "initial");
        assert_eq!(reply, PromptReply::expanded("first\nsecond"));
        let shown = String::from_utf8(prompt.into_writer()).unwrap();
        assert!(shown.contains("== Name =="));
        assert!(shown.contains("initial"));
        assert!(shown.contains("expand? [y/N]"));
    }

    #[test]
    fn terminal_empty_reply_keeps_initial_text() {
        let mut prompt = terminal(".\n");
        assert_eq!(prompt.ask_text("t", "keep me"), PromptReply::verbatim("keep me"));
    }

    #[test]
    fn terminal_end_of_input_ends_the_reply() {
        let mut prompt = terminal("only line\n");
        assert_eq!(prompt.ask_text("t", "x"), PromptReply::verbatim("only line"));
    }

    #[test]
    fn terminal_notify_wraps_long_lines() {
        let mut prompt = terminal("");
        let body = "word ".repeat(40);
        prompt.notify("Note", &body);
        let shown = String::from_utf8(prompt.into_writer()).unwrap();
        assert!(shown.starts_with("== Note ==\n"));
        assert!(shown.lines().all(|line| line.chars().count() <= MESSAGE_WIDTH));
    }

    #[test]
    fn scripted_prompt_records_and_falls_back() {
        let mut prompt = ScriptedPrompt::new().with_reply(PromptReply::expanded("reply"));
        assert_eq!(prompt.ask_text("a", "b"), PromptReply::expanded("reply"));
        assert_eq!(prompt.ask_text("c", "d"), PromptReply::verbatim("d"));
        prompt.notify("title", "body");
        assert_eq!(prompt.asked.len(), 2);
        assert_eq!(prompt.notifications, vec![("title".to_string(), "body".to_string())]);
    }

    #[test]
    fn file_retriever_reads_paths_and_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.txt");
        std::fs::write(&file, "contents").unwrap();

        let retriever = FileRetriever::new();
        assert_eq!(retriever.fetch(file.to_str().unwrap()).unwrap(), "contents");
        let url = format!("file://{}", file.display());
        assert_eq!(retriever.fetch(&url).unwrap(), "contents");

        let relative = FileRetriever::with_base_dir(dir.path());
        assert_eq!(relative.fetch(" note.txt ").unwrap(), "contents");
    }

    #[test]
    fn file_retriever_classifies_failures() {
        let retriever = FileRetriever::new();
        assert!(matches!(
            retriever.fetch("https://example.com/page"),
            Err(RetrievalError::UnsupportedScheme { scheme }) if scheme == "https"
        ));
        assert!(matches!(
            retriever.fetch("file:relative"),
            Err(RetrievalError::InvalidLocator { .. })
        ));
        assert!(matches!(retriever.fetch(""), Err(RetrievalError::InvalidLocator { .. })));
        assert!(matches!(
            retriever.fetch("/definitely/not/here.txt"),
            Err(RetrievalError::NotFound { .. })
        ));
    }

    #[test]
    fn terminal_shares_its_reader_with_the_caller() {
        let mut prompt = terminal("reply\n.\nn\n:next\n");
        assert_eq!(prompt.ask_text("t", "x"), PromptReply::verbatim("reply"));
        let mut line = String::new();
        prompt.read_line(&mut line).unwrap();
        assert_eq!(line, ":next\n");
    }

    /// Serves one canned HTTP response on a local port and returns its URL.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            loop {
                line.clear();
                if request.read_line(&mut line).unwrap() <= 2 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/chapter.txt", address)
    }

    #[test]
    fn http_retriever_returns_the_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 11\r\nConnection: close\r\n\r\nonce upon a",
        );
        assert_eq!(HttpRetriever::new().fetch(&url).unwrap(), "once upon a");
    }

    #[test]
    fn http_missing_document_is_not_found() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        assert!(matches!(
            HttpRetriever::new().fetch(&url),
            Err(RetrievalError::NotFound { .. })
        ));
    }

    #[test]
    fn http_server_errors_and_refusals_are_network_errors() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        match HttpRetriever::new().fetch(&url) {
            Err(RetrievalError::Network { reason, .. }) => assert!(reason.contains("500")),
            other => panic!("unexpected {:?}", other),
        }

        let closed = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let url = format!("http://{}/", closed);
        assert!(matches!(
            HttpRetriever::with_timeout(Duration::from_secs(5)).fetch(&url),
            Err(RetrievalError::Network { .. })
        ));
    }

    #[test]
    fn network_schemes_are_recognized() {
        assert!(is_network_locator("http://example.com/a"));
        assert!(is_network_locator(" HTTPS://example.com/a"));
        assert!(!is_network_locator("file:///tmp/a"));
        assert!(!is_network_locator("notes/a.txt"));
        assert!(!is_network_locator("ftp://example.com/a"));
    }

    #[test]
    fn url_retriever_routes_by_scheme() {
        let retriever = UrlRetriever::with_parts(
            StaticRetriever::new().with("https://example.com/a", "web"),
            StaticRetriever::new()
                .with("a.txt", "disk")
                .with("file:///a.txt", "file url"),
        );
        assert_eq!(retriever.fetch("https://example.com/a").unwrap(), "web");
        assert_eq!(retriever.fetch("a.txt").unwrap(), "disk");
        assert_eq!(retriever.fetch("file:///a.txt").unwrap(), "file url");
        assert!(retriever.fetch("https://example.com/missing").is_err());
    }

    #[test]
    fn static_retriever_is_exact() {
        let retriever = StaticRetriever::new().with("doc", "text");
        assert_eq!(retriever.fetch("doc").unwrap(), "text");
        assert!(retriever.fetch("doc ").is_err());
    }
}
