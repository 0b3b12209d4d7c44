//! The bot handle contract the core drives.
//!
//! A bot is owned by the [`crate::Registry`] from creation until it is popped
//! off the tail and disconnected. All calls are fire-and-forget: `connect`
//! returns before the session is up, and failures are reported through the
//! implementation's own logging, never back to the core.

/// One network client in the fleet, identified by its nickname.
pub trait Bot: Send + Sync {
    /// The nickname this handle was created with.
    fn name(&self) -> &str;

    /// Whether the session is currently registered with the server.
    fn is_online(&self) -> bool;

    /// Start a session against `host:port`. Must not block on the handshake.
    fn connect(&mut self, host: &str, port: u16);

    /// Tear the session down. Called exactly once before the handle is dropped.
    fn disconnect(&mut self);

    /// Send `text` as a chat message.
    fn send_message(&self, text: &str);

    /// Run `text` as a command (prefix already stripped).
    fn execute_command(&self, text: &str);
}

/// Builds a fresh, unconnected bot for a nickname drawn from the pool.
pub trait BotFactory: Send + Sync {
    type Bot: Bot;

    fn create(&self, name: String) -> Self::Bot;
}

impl<B, F> BotFactory for F
where
    B: Bot,
    F: Fn(String) -> B + Send + Sync,
{
    type Bot = B;

    fn create(&self, name: String) -> B {
        self(name)
    }
}
