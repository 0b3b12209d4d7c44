//! Routing user text to bots.
//!
//! The selector picks the targets: every bot, or the one whose name matches
//! exactly. The text decides the call: a leading `/` means a command (sent
//! without the slash), anything else is chat sent verbatim. Offline bots
//! are not skipped; what they do with the call is up to them.

use crate::bot::Bot;
use crate::registry::Registry;

pub const COMMAND_PREFIX: char = '/';

/// The selector label that targets every bot.
pub const SELECT_ALL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    All,
    Named(String),
}

impl Selector {
    /// `"All"` selects every bot; anything else is an exact nickname.
    pub fn parse(label: &str) -> Self {
        if label == SELECT_ALL {
            Self::All
        } else {
            Self::Named(label.to_string())
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(n) => n == name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => SELECT_ALL,
            Self::Named(n) => n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub selector: Selector,
    pub text: String,
}

impl CommandRequest {
    pub fn new(selector: Selector, text: impl Into<String>) -> Self {
        Self { selector, text: text.into() }
    }

    /// The command body if this request is a command.
    pub fn command(&self) -> Option<&str> {
        self.text.strip_prefix(COMMAND_PREFIX)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub matched: usize,
    pub commands: usize,
    pub chats: usize,
}

pub fn dispatch<B: Bot>(request: &CommandRequest, registry: &Registry<B>) -> DispatchReport {
    let mut report = DispatchReport::default();
    let command = request.command();

    for bot in registry.iter().filter(|b| request.selector.matches(b.name())) {
        report.matched += 1;
        match command {
            Some(cmd) => {
                bot.execute_command(cmd);
                report.commands += 1;
            }
            None => {
                bot.send_message(&request.text);
                report.chats += 1;
            }
        }
    }

    if report.matched == 0 {
        tracing::debug!(selector = %request.selector.label(), "No bot matched the selector");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, CallLog, MockBot};

    fn three_bots(log: &CallLog) -> Registry<MockBot> {
        let mut reg = Registry::new();
        for name in ["bot1", "bot2", "bot3"] {
            reg.push(MockBot::new(name, log));
        }
        reg
    }

    #[test]
    fn command_to_all() {
        let log = CallLog::default();
        let reg = three_bots(&log);

        let report = dispatch(&CommandRequest::new(Selector::All, "/kick bob"), &reg);

        assert_eq!(report, DispatchReport { matched: 3, commands: 3, chats: 0 });
        let expected: Vec<Call> = ["bot1", "bot2", "bot3"]
            .iter()
            .map(|n| Call::Command { name: n.to_string(), text: "kick bob".into() })
            .collect();
        assert_eq!(log.calls(), expected);
    }

    #[test]
    fn chat_to_one_bot() {
        let log = CallLog::default();
        let reg = three_bots(&log);

        let report = dispatch(&CommandRequest::new(Selector::parse("bot2"), "hello"), &reg);

        assert_eq!(report, DispatchReport { matched: 1, commands: 0, chats: 1 });
        assert_eq!(
            log.calls(),
            [Call::Message { name: "bot2".into(), text: "hello".into() }]
        );
    }

    #[test]
    fn lone_prefix_is_empty_command() {
        let log = CallLog::default();
        let reg = three_bots(&log);

        dispatch(&CommandRequest::new(Selector::parse("bot1"), "/"), &reg);

        assert_eq!(
            log.calls(),
            [Call::Command { name: "bot1".into(), text: String::new() }]
        );
    }

    #[test]
    fn only_leading_slash_is_stripped() {
        let log = CallLog::default();
        let reg = three_bots(&log);

        dispatch(&CommandRequest::new(Selector::parse("bot3"), "//say hi"), &reg);

        assert_eq!(
            log.calls(),
            [Call::Command { name: "bot3".into(), text: "/say hi".into() }]
        );
    }

    #[test]
    fn selector_is_case_sensitive() {
        let log = CallLog::default();
        let reg = three_bots(&log);

        let report = dispatch(&CommandRequest::new(Selector::parse("BOT2"), "hello"), &reg);

        assert_eq!(report.matched, 0);
        assert!(log.calls().is_empty());
    }

    #[test]
    fn offline_bots_still_receive() {
        let log = CallLog::default();
        let reg = three_bots(&log);
        assert_eq!(reg.online_count(), 0);

        let report = dispatch(&CommandRequest::new(Selector::All, "hi all"), &reg);

        assert_eq!(report.chats, 3);
    }

    #[test]
    fn text_with_inner_slash_is_chat() {
        let log = CallLog::default();
        let reg = three_bots(&log);

        let report = dispatch(&CommandRequest::new(Selector::All, "and/or"), &reg);

        assert_eq!(report.commands, 0);
        assert_eq!(report.chats, 3);
    }

    #[test]
    fn selector_parse_and_label() {
        assert_eq!(Selector::parse("All"), Selector::All);
        assert_eq!(Selector::parse("all"), Selector::Named("all".into()));
        assert_eq!(Selector::Named("bot9".into()).label(), "bot9");
        assert_eq!(Selector::All.label(), "All");
    }
}
