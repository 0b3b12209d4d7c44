//! End-to-end fleet behaviour through the public API: nickname file on disk,
//! reconcile up and down, dispatch to a subset.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;

use botfleet_core::{Bot, FleetService, NicknamePool, Selector};

/// (bot, what it received)
type Inbox = Arc<Mutex<Vec<(String, String)>>>;

struct EchoBot {
    name: String,
    online: bool,
    inbox: Inbox,
}

impl Bot for EchoBot {
    fn name(&self) -> &str {
        &self.name
    }
    fn is_online(&self) -> bool {
        self.online
    }
    fn connect(&mut self, _host: &str, _port: u16) {
        self.online = true;
    }
    fn disconnect(&mut self) {
        self.online = false;
        self.inbox.lock().push((self.name.clone(), "<quit>".into()));
    }
    fn send_message(&self, text: &str) {
        self.inbox.lock().push((self.name.clone(), format!("chat:{text}")));
    }
    fn execute_command(&self, text: &str) {
        self.inbox.lock().push((self.name.clone(), format!("cmd:{text}")));
    }
}

fn nickname_file(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

fn fleet(pool: NicknamePool, inbox: &Inbox) -> FleetService<impl botfleet_core::BotFactory<Bot = EchoBot>> {
    let inbox = inbox.clone();
    FleetService::with_rng(
        move |name: String| EchoBot { name, online: false, inbox: inbox.clone() },
        pool,
        StdRng::seed_from_u64(99),
    )
}

#[test]
fn nickname_file_is_filtered() {
    let file = nickname_file(&["ab", "valid1", "way_too_long_identifier_over16", "ok12", "good"]);
    let pool = NicknamePool::load_file(file.path());
    assert_eq!(pool.names(), ["valid1", "ok12", "good"]);
}

#[test]
fn garbled_line_does_not_discard_the_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"alice\n\xff\xfe\nbobby\n").unwrap();
    let pool = NicknamePool::load_file(file.path());
    assert_eq!(pool.names(), ["alice", "bobby"]);
}

#[test]
fn grow_shrink_and_dispatch() {
    let file = nickname_file(&["alice", "bobby", "carol", "david"]);
    let inbox = Inbox::default();
    let fleet = fleet(NicknamePool::load_file(file.path()), &inbox);

    let report = fleet.request_reconcile(3, "127.0.0.1", 6667).unwrap();
    assert_eq!(report.created, 3);
    assert_eq!(fleet.online_count(), 3);
    let names = fleet.names();

    let sent = fleet.request_dispatch(Selector::All, "/kick bob");
    assert_eq!(sent.commands, 3);
    let sent = fleet.request_dispatch(Selector::parse(&names[1]), "hello");
    assert_eq!(sent.chats, 1);

    let report = fleet.request_reconcile(1, "127.0.0.1", 6667).unwrap();
    assert_eq!(report.removed, 2);
    assert_eq!(fleet.names(), [names[0].clone()]);

    let received = inbox.lock().clone();
    let expected = vec![
        (names[0].clone(), "cmd:kick bob".to_string()),
        (names[1].clone(), "cmd:kick bob".to_string()),
        (names[2].clone(), "cmd:kick bob".to_string()),
        (names[1].clone(), "chat:hello".to_string()),
        (names[2].clone(), "<quit>".to_string()),
        (names[1].clone(), "<quit>".to_string()),
    ];
    assert_eq!(received, expected);
}

#[test]
fn consumed_names_are_not_returned_to_pool() {
    let inbox = Inbox::default();
    let fleet = fleet(NicknamePool::parse("alice\nbobby\n"), &inbox);

    fleet.request_reconcile(2, "h", 1).unwrap();
    fleet.request_reconcile(0, "h", 1).unwrap();
    let report = fleet.request_reconcile(2, "h", 1).unwrap();

    assert!(report.pool_exhausted);
    assert_eq!(report.created, 0);
    assert!(fleet.is_empty());
}
