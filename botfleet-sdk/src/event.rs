//! Events emitted by a bot session.

/// Lifecycle and traffic events from one session, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// TCP connection established; registration not yet complete.
    Connected,

    /// Registration complete. `nick` is the nick the server accepted, which
    /// may carry a numeric suffix if the requested one was taken.
    Registered {
        nick: String,
    },

    /// Someone (possibly us) joined a channel.
    Joined {
        channel: String,
        nick: String,
    },

    /// A channel or private message.
    Message {
        from: String,
        target: String,
        text: String,
    },

    /// Server notices, error numerics and `ERROR` lines.
    ServerNotice {
        text: String,
    },

    /// The session ended.
    Disconnected {
        reason: String,
    },
}
