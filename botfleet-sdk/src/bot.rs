//! `IrcBot`: an IRC session behind the fleet's `Bot` trait.
//!
//! `connect` spawns the session plus a small event pump on the runtime the
//! bot was created with and returns at once. The pump flips the online flag
//! on `Registered`/`Disconnected` and logs the session's lifecycle; the
//! fleet core never sees those events directly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use botfleet_core::{Bot, BotFactory};

use crate::client::{self, ClientHandle, ConnectConfig};
use crate::event::Event;

/// Quit message sent when a bot is removed from the fleet.
const QUIT_MESSAGE: &str = "botfleet: scaled down";

pub struct IrcBot {
    name: String,
    channel: String,
    runtime: Handle,
    online: Arc<AtomicBool>,
    session: Option<ClientHandle>,
}

impl IrcBot {
    /// A new, unconnected bot. Sessions are spawned on `runtime`.
    pub fn new(name: String, channel: String, runtime: Handle) -> Self {
        Self {
            name,
            channel,
            runtime,
            online: Arc::new(AtomicBool::new(false)),
            session: None,
        }
    }

    fn session(&self, what: &str) -> Option<&ClientHandle> {
        if self.session.is_none() {
            tracing::debug!(nick = %self.name, "No session, dropping {what}");
        }
        self.session.as_ref()
    }
}

impl Bot for IrcBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    fn connect(&mut self, host: &str, port: u16) {
        // A previous attempt that never registered is replaced outright.
        if let Some(stale) = self.session.take() {
            let _ = stale.quit(None);
        }

        let config = ConnectConfig {
            server_addr: server_addr(host, port),
            nick: self.name.clone(),
            user: self.name.clone(),
            realname: "botfleet bot".to_string(),
            channel: Some(self.channel.clone()).filter(|c| !c.is_empty()),
        };
        tracing::debug!(nick = %self.name, server = %config.server_addr, "Connecting");

        let _enter = self.runtime.enter();
        let (handle, events) = client::connect(config);
        self.runtime
            .spawn(pump_events(self.name.clone(), events, self.online.clone()));
        self.session = Some(handle);
    }

    fn disconnect(&mut self) {
        self.online.store(false, Ordering::Release);
        if let Some(session) = self.session.take()
            && let Err(e) = session.quit(Some(QUIT_MESSAGE))
        {
            tracing::debug!(nick = %self.name, error = %e, "Quit not delivered");
        }
    }

    fn send_message(&self, text: &str) {
        let Some(session) = self.session("message") else { return };
        if let Err(e) = session.privmsg(&self.channel, text) {
            tracing::warn!(nick = %self.name, error = %e, "Message not sent");
        }
    }

    fn execute_command(&self, text: &str) {
        let Some(line) = command_line(text) else {
            tracing::debug!(nick = %self.name, "Empty command ignored");
            return;
        };
        let Some(session) = self.session("command") else { return };
        if let Err(e) = session.raw(&line) {
            tracing::warn!(nick = %self.name, error = %e, "Command not sent");
        }
    }
}

/// Drain one session's events, tracking whether it is registered.
async fn pump_events(nick: String, mut events: mpsc::Receiver<Event>, online: Arc<AtomicBool>) {
    while let Some(event) = events.recv().await {
        match event {
            Event::Connected => tracing::debug!(nick = %nick, "TCP connected"),
            Event::Registered { nick: accepted } => {
                online.store(true, Ordering::Release);
                tracing::info!(nick = %nick, accepted = %accepted, "Bot connected");
            }
            Event::Joined { channel, nick: who } if who == nick => {
                tracing::debug!(nick = %nick, channel = %channel, "Joined");
            }
            Event::Joined { .. } => {}
            Event::Message { from, target, text } => {
                tracing::debug!(nick = %nick, from = %from, target = %target, "{text}");
            }
            Event::ServerNotice { text } => tracing::info!(nick = %nick, "{text}"),
            Event::Disconnected { reason } => {
                online.store(false, Ordering::Release);
                tracing::warn!(nick = %nick, reason = %reason, "Bot disconnected");
            }
        }
    }
    online.store(false, Ordering::Release);
}

/// `host:port`, bracketing bare IPv6 literals.
pub fn server_addr(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Turn a prefix-stripped command like `kick bob` into the raw line
/// `KICK bob`. Only the verb is uppercased; `None` for blank input.
pub fn command_line(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let line = match text.split_once(char::is_whitespace) {
        Some((verb, args)) => format!("{} {}", verb.to_ascii_uppercase(), args.trim_start()),
        None => text.to_ascii_uppercase(),
    };
    Some(line)
}

/// Builds [`IrcBot`]s that chat into `channel`, with sessions on `runtime`.
#[derive(Debug, Clone)]
pub struct IrcBotFactory {
    channel: String,
    runtime: Handle,
}

impl IrcBotFactory {
    pub fn new(channel: impl Into<String>, runtime: Handle) -> Self {
        Self {
            channel: channel.into(),
            runtime,
        }
    }
}

impl BotFactory for IrcBotFactory {
    type Bot = IrcBot;

    fn create(&self, name: String) -> IrcBot {
        IrcBot::new(name, self.channel.clone(), self.runtime.clone())
    }
}
