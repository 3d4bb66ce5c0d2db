//! The interactive command shell.
//!
//! One line of input is one command. Every command failure is printed and
//! the loop keeps going; only `/q`, end of input, or a broken stdin end
//! the session.

use std::io::{self, Write};

use thiserror::Error;

use flypost::{fingerprint, parse_port, ClientError, Node, Result, ServerHandle, PROTOCOL_VERSION};

const HELP: &str = "\
Commands:
  /h                    this help
  /q                    quit
  /port                 local listening port
  /list                 show local messages
  /say <text>           post a message
  /isay <text>          post a signed message
  /version [host port]  protocol version, local or a peer's
  /id [host port]       node id, local or a peer's
  /pull <host> <port>   fetch messages a peer has that we lack";

/// What went wrong with one line of input.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unrecognized command")]
    Unrecognized,

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    Client(#[from] ClientError),
}

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Port,
    List,
    Say(String),
    SaySigned(String),
    LocalVersion,
    PeerVersion { host: String, port: u16 },
    LocalId,
    PeerId { host: String, port: u16 },
    Pull { host: String, port: u16 },
}

impl Command {
    /// Parse one trimmed, non-empty line of input.
    ///
    /// `/say` and `/isay` keep everything after the first space verbatim,
    /// so message text may contain further spaces.
    pub fn parse(line: &str) -> std::result::Result<Self, ShellError> {
        if let Some(text) = line.strip_prefix("/say ") {
            return Ok(Command::Say(text.to_owned()));
        }
        if let Some(text) = line.strip_prefix("/isay ") {
            return Ok(Command::SaySigned(text.to_owned()));
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["/h"] => Ok(Command::Help),
            ["/q"] => Ok(Command::Quit),
            ["/port"] => Ok(Command::Port),
            ["/list"] => Ok(Command::List),

            ["/version"] => Ok(Command::LocalVersion),
            ["/version", host, port] => Ok(Command::PeerVersion {
                host: (*host).to_owned(),
                port: parse_port(port)?,
            }),
            ["/version", ..] => Err(ShellError::Usage("/version [host port]")),

            ["/id"] => Ok(Command::LocalId),
            ["/id", host, port] => Ok(Command::PeerId {
                host: (*host).to_owned(),
                port: parse_port(port)?,
            }),
            ["/id", ..] => Err(ShellError::Usage("/id [host port]")),

            ["/pull", host, port] => Ok(Command::Pull {
                host: (*host).to_owned(),
                port: parse_port(port)?,
            }),
            ["/pull", ..] => Err(ShellError::Usage("/pull <host> <port>")),

            _ => Err(ShellError::Unrecognized),
        }
    }
}

/// Outcome of one executed command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Text to print. Empty for commands that succeed silently.
    Output(String),
    /// The session is over.
    Quit,
}

/// The shell: a node plus the server handle it may be listening with.
pub struct Shell {
    node: Node,
    server: Option<ServerHandle>,
}

impl Shell {
    pub fn new(node: Node, server: Option<ServerHandle>) -> Self {
        Self { node, server }
    }

    /// Run one command against the node, returning what to print.
    pub async fn execute(&self, command: Command) -> Result<Outcome> {
        let output = match command {
            Command::Help => HELP.to_owned(),

            Command::Quit => return Ok(Outcome::Quit),

            Command::Port => match &self.server {
                Some(server) => server.port().to_string(),
                None => "not listening".to_owned(),
            },

            Command::List => {
                let lines: Vec<String> = self
                    .node
                    .store()
                    .messages()
                    .iter()
                    .map(|m| m.to_string())
                    .collect();
                lines.join("\n")
            }

            Command::Say(text) => {
                self.node.publish(&text, false)?;
                String::new()
            }

            Command::SaySigned(text) => {
                self.node.publish(&text, true)?;
                String::new()
            }

            Command::LocalVersion => format!("local : {}", PROTOCOL_VERSION),

            Command::PeerVersion { host, port } => {
                let version = self.node.peer_version(&host, port).await?;
                format!("{}:{} : {}", host, port, version)
            }

            Command::LocalId => format!(
                "local : ({}) : {}",
                self.node.fingerprint(),
                self.node.node_id()
            ),

            Command::PeerId { host, port } => {
                let id = self.node.peer_id(&host, port).await?;
                format!("{}:{} : ({}) : {}", host, port, fingerprint(&id), id)
            }

            Command::Pull { host, port } => {
                let fetched = self.node.pull_from(&host, port).await?;
                format!("{}:{} : {} new msgs", host, port, fetched)
            }
        };
        Ok(Outcome::Output(output))
    }

    /// Stop listening, if we were.
    pub async fn shutdown(self) {
        if let Some(server) = self.server {
            server.shutdown().await;
        }
    }
}

/// Drive the shell until `/q` or end of input.
///
/// Reads stdin blocking; the listener runs on other worker threads.
pub async fn run(shell: Shell) -> anyhow::Result<()> {
    let mut input = String::new();
    loop {
        print!("$ ");
        io::stdout().flush()?;

        input.clear();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Error: {}", e);
                if matches!(e, ShellError::Unrecognized) {
                    println!("{}", HELP);
                }
                continue;
            }
        };

        match shell.execute(command).await {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Output(text)) => {
                if !text.is_empty() {
                    println!("{}", text);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    shell.shutdown().await;
    Ok(())
}
