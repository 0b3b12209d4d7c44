//! Recording bot double shared by the unit tests.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::bot::Bot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { name: String, host: String, port: u16 },
    Disconnect { name: String },
    Message { name: String, text: String },
    Command { name: String, text: String },
}

/// Shared, ordered log of every call made on any [`MockBot`].
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn disconnects(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Disconnect { name } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn connects(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Connect { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.0.lock().push(call);
    }
}

#[derive(Debug)]
pub struct MockBot {
    name: String,
    online: bool,
    /// When false, `connect` is recorded but the bot stays offline.
    reachable: bool,
    log: CallLog,
}

impl MockBot {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            online: false,
            reachable: true,
            log: log.clone(),
        }
    }

    pub fn online(mut self) -> Self {
        self.online = true;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

impl Bot for MockBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_online(&self) -> bool {
        self.online
    }

    fn connect(&mut self, host: &str, port: u16) {
        self.log.push(Call::Connect {
            name: self.name.clone(),
            host: host.to_string(),
            port,
        });
        if self.reachable {
            self.online = true;
        }
    }

    fn disconnect(&mut self) {
        self.log.push(Call::Disconnect { name: self.name.clone() });
        self.online = false;
    }

    fn send_message(&self, text: &str) {
        self.log.push(Call::Message {
            name: self.name.clone(),
            text: text.to_string(),
        });
    }

    fn execute_command(&self, text: &str) {
        self.log.push(Call::Command {
            name: self.name.clone(),
            text: text.to_string(),
        });
    }
}

/// Factory producing reachable [`MockBot`]s that record into `log`.
pub fn factory(log: &CallLog) -> impl Fn(String) -> MockBot + Send + Sync + 'static {
    let log = log.clone();
    move |name: String| MockBot::new(&name, &log)
}

struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return everything it logged.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || Capture(writer.clone()))
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let out = buf.lock().clone();
    String::from_utf8_lossy(&out).into_owned()
}
