//! IRC session for a single bot.
//!
//! Each session runs in its own tokio task: it registers with `NICK`/`USER`,
//! joins the configured channel once the server welcomes it, answers
//! `PING`s, and pings the server itself when the link goes quiet. Commands
//! sent before registration completes are queued and flushed on `001`.
//!
//! There is no reconnect logic here. A dropped session emits
//! [`Event::Disconnected`] and ends; bringing it back is the fleet's call.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

use crate::event::Event;
use crate::irc::Message;

/// How many alternate nicks to try when the server reports a collision.
const MAX_NICK_TRIES: u32 = 5;
/// Send our own PING after this much silence from the server.
const PING_INTERVAL: Duration = Duration::from_secs(60);
/// Give up on the link after this much silence.
const PING_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for connecting one bot.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Server address (host:port).
    pub server_addr: String,
    /// Desired nickname.
    pub nick: String,
    /// Username (ident).
    pub user: String,
    /// Real name.
    pub realname: String,
    /// Channel to join after registration, if any.
    pub channel: Option<String>,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:6667".to_string(),
            nick: "botfleet".to_string(),
            user: "botfleet".to_string(),
            realname: "botfleet bot".to_string(),
            channel: None,
        }
    }
}

/// Commands the consumer can send to the session.
#[derive(Debug)]
pub enum Command {
    Privmsg { target: String, text: String },
    Raw(String),
    Quit(Option<String>),
}

/// A handle to a running session. Sends never wait: if the session's queue
/// is full or the session is gone, the call fails immediately.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<Command>,
}

impl ClientHandle {
    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .try_send(cmd)
            .map_err(|e| anyhow::anyhow!("session command queue: {e}"))
    }

    pub fn privmsg(&self, target: &str, text: &str) -> Result<()> {
        self.send(Command::Privmsg {
            target: target.to_string(),
            text: text.to_string(),
        })
    }

    pub fn raw(&self, line: &str) -> Result<()> {
        self.send(Command::Raw(line.to_string()))
    }

    pub fn quit(&self, message: Option<&str>) -> Result<()> {
        self.send(Command::Quit(message.map(|s| s.to_string())))
    }
}

/// Open the TCP connection to `config.server_addr`.
pub async fn establish_connection(config: &ConnectConfig) -> Result<TcpStream> {
    tracing::debug!("Connecting to {}...", config.server_addr);
    let tcp = TcpStream::connect(&config.server_addr)
        .await
        .map_err(|e| anyhow::anyhow!("TCP connect to {} failed: {e}", config.server_addr))?;
    tcp.set_nodelay(true)?;
    Ok(tcp)
}

/// Connect to the server and run the session in a spawned task.
///
/// Must be called from within a tokio runtime.
pub fn connect(config: ConnectConfig) -> (ClientHandle, mpsc::Receiver<Event>) {
    let (event_tx, event_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(256);

    tokio::spawn(async move {
        if let Err(e) = run_client(config, event_tx.clone(), cmd_rx).await {
            let _ = event_tx
                .send(Event::Disconnected {
                    reason: e.to_string(),
                })
                .await;
        }
    });

    (ClientHandle { cmd_tx }, event_rx)
}

/// Run the session over an already-established stream.
pub fn connect_with_stream<S>(stream: S, config: ConnectConfig) -> (ClientHandle, mpsc::Receiver<Event>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(256);

    tokio::spawn(async move {
        let _ = event_tx.send(Event::Connected).await;
        let (reader, writer) = tokio::io::split(stream);
        if let Err(e) = run_irc(BufReader::new(reader), writer, &config, event_tx.clone(), cmd_rx).await {
            let _ = event_tx
                .send(Event::Disconnected {
                    reason: e.to_string(),
                })
                .await;
        }
    });

    (ClientHandle { cmd_tx }, event_rx)
}

async fn run_client(
    config: ConnectConfig,
    event_tx: mpsc::Sender<Event>,
    cmd_rx: mpsc::Receiver<Command>,
) -> Result<()> {
    let tcp = establish_connection(&config).await?;
    let _ = event_tx.send(Event::Connected).await;
    let (reader, writer) = tokio::io::split(tcp);
    run_irc(BufReader::new(reader), writer, &config, event_tx, cmd_rx).await
}

async fn run_irc<R, W>(
    mut reader: R,
    mut writer: W,
    config: &ConnectConfig,
    event_tx: mpsc::Sender<Event>,
    mut cmd_rx: mpsc::Receiver<Command>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    send_line(&mut writer, &format!("NICK {}", config.nick)).await?;
    send_line(&mut writer, &format!("USER {} 0 * :{}", config.user, config.realname)).await?;

    let mut registered = false;
    let mut nick_tries: u32 = 0;
    let mut pending_commands: Vec<Command> = Vec::new();
    let mut line_buf = String::new();
    let mut last_activity = Instant::now();
    let mut next_ping = last_activity + PING_INTERVAL;

    loop {
        tokio::select! {
            result = reader.read_line(&mut line_buf) => {
                let n = result?;
                if n == 0 {
                    let _ = event_tx.send(Event::Disconnected { reason: "EOF".to_string() }).await;
                    break;
                }
                last_activity = Instant::now();
                next_ping = last_activity + PING_INTERVAL;

                if let Some(msg) = Message::parse(&line_buf) {
                    match msg.command.as_str() {
                        // ERR_NICKNAMEINUSE
                        "433" if !registered => {
                            nick_tries += 1;
                            if nick_tries > MAX_NICK_TRIES {
                                let _ = event_tx.send(Event::Disconnected { reason: "Nick in use".to_string() }).await;
                                break;
                            }
                            let alt = format!("{}{}", config.nick, nick_tries);
                            tracing::debug!(nick = %config.nick, alt = %alt, "Nick in use, retrying");
                            send_line(&mut writer, &format!("NICK {alt}")).await?;
                        }
                        "001" => {
                            let nick = msg.params.first().cloned().unwrap_or_default();
                            let _ = event_tx.send(Event::Registered { nick }).await;
                            registered = true;
                            if let Some(channel) = &config.channel {
                                send_line(&mut writer, &format!("JOIN {channel}")).await?;
                            }
                            for cmd in pending_commands.drain(..) {
                                execute_command(&mut writer, cmd).await?;
                            }
                        }
                        "PING" => {
                            let token = msg.params.first().map(|s| s.as_str()).unwrap_or("");
                            send_line(&mut writer, &format!("PONG :{token}")).await?;
                        }
                        "JOIN" => {
                            let channel = msg.params.first().cloned().unwrap_or_default();
                            let nick = msg.source_nick().unwrap_or("").to_string();
                            let _ = event_tx.send(Event::Joined { channel, nick }).await;
                        }
                        "PRIVMSG" | "NOTICE" if msg.params.len() >= 2 => {
                            let prefix = msg.prefix.as_deref().unwrap_or("");
                            if msg.command == "NOTICE" && !prefix.contains('!') {
                                let text = msg.params[1].clone();
                                let _ = event_tx.send(Event::ServerNotice { text }).await;
                            } else {
                                let _ = event_tx.send(Event::Message {
                                    from: msg.source_nick().unwrap_or("").to_string(),
                                    target: msg.params[0].clone(),
                                    text: msg.params[1].clone(),
                                }).await;
                            }
                        }
                        "ERROR" => {
                            let text = msg.params.join(" ");
                            let _ = event_tx.send(Event::ServerNotice { text }).await;
                        }
                        _ => {
                            // Error numerics: skip our nick (param 0), keep the rest.
                            if let Ok(num) = msg.command.parse::<u16>()
                                && (400..600).contains(&num)
                            {
                                let text = if msg.params.len() > 1 {
                                    msg.params[1..].join(" ")
                                } else {
                                    msg.params.join(" ")
                                };
                                let _ = event_tx.send(Event::ServerNotice { text }).await;
                            }
                        }
                    }
                }

                line_buf.clear();
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    // Every handle is gone; nobody can talk through this session.
                    let _ = send_line(&mut writer, "QUIT").await;
                    let _ = event_tx.send(Event::Disconnected { reason: "Handle dropped".to_string() }).await;
                    break;
                };
                let quitting = matches!(cmd, Command::Quit(_));
                if registered || quitting {
                    execute_command(&mut writer, cmd).await?;
                    if quitting {
                        let _ = event_tx.send(Event::Disconnected { reason: "Quit".to_string() }).await;
                        break;
                    }
                } else {
                    pending_commands.push(cmd);
                }
            }
            _ = tokio::time::sleep_until(next_ping) => {
                if last_activity.elapsed() >= PING_TIMEOUT {
                    let _ = event_tx.send(Event::Disconnected { reason: "Ping timeout".to_string() }).await;
                    break;
                }
                send_line(&mut writer, "PING :keepalive").await?;
                next_ping = Instant::now() + PING_INTERVAL;
            }
        }
    }

    let _ = writer.shutdown().await;
    Ok(())
}

/// Write one command to the wire.
async fn execute_command<W: AsyncWrite + Unpin>(writer: &mut W, cmd: Command) -> Result<()> {
    let line = match cmd {
        Command::Privmsg { target, text } => format!("PRIVMSG {target} :{text}"),
        Command::Raw(line) => line,
        Command::Quit(Some(msg)) => format!("QUIT :{msg}"),
        Command::Quit(None) => "QUIT".to_string(),
    };
    send_line(writer, &line).await
}

/// Write `line` terminated with CRLF. Embedded line breaks are stripped so
/// user text can't smuggle in a second command.
async fn send_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<()> {
    let mut wire: String = line.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    wire.push_str("\r\n");
    writer.write_all(wire.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
