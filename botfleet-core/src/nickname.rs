//! Nickname pool: validated candidate names, drawn at random without replacement.
//!
//! The source is one candidate per line. Lines are trimmed and kept only if
//! they are 4 to 16 ASCII letters or digits. Source order is preserved and
//! duplicates are kept as-is.

use std::io::BufRead;
use std::path::Path;

use rand::Rng;

use crate::error::FleetError;

pub const MIN_NICK_LEN: usize = 4;
pub const MAX_NICK_LEN: usize = 16;

/// Whether `name` is usable as a bot nickname.
pub fn is_valid_nickname(name: &str) -> bool {
    (MIN_NICK_LEN..=MAX_NICK_LEN).contains(&name.len())
        && name.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NicknamePool {
    names: Vec<String>,
}

impl NicknamePool {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Build a pool from in-memory text.
    pub fn parse(source: &str) -> Self {
        Self::load(std::io::Cursor::new(source)).unwrap_or_default()
    }

    /// Build a pool from a line-oriented reader.
    ///
    /// Bytes that are not valid UTF-8 are replaced, so a garbled line is
    /// dropped by validation without costing the lines around it. Only a
    /// failing reader is an error.
    pub fn load<R: BufRead>(reader: R) -> Result<Self, FleetError> {
        let mut names = Vec::new();
        for line in reader.split(b'\n') {
            let line = line?;
            let line = String::from_utf8_lossy(&line);
            let candidate = line.trim();
            if is_valid_nickname(candidate) {
                names.push(candidate.to_string());
            }
        }
        let pool = Self { names };
        pool.warn_if_empty();
        Ok(pool)
    }

    /// Load a nickname file. Read failures are logged and yield an empty pool.
    pub fn load_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::File::open(path)
            .map_err(FleetError::from)
            .and_then(|file| Self::load(std::io::BufReader::new(file)));
        match loaded {
            Ok(pool) => {
                tracing::debug!(path = %path.display(), count = pool.len(), "Loaded nicknames");
                pool
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read nicknames file");
                let pool = Self::default();
                pool.warn_if_empty();
                pool
            }
        }
    }

    fn warn_if_empty(&self) {
        if self.names.is_empty() {
            tracing::warn!("No valid nicknames found in the source");
        }
    }

    /// Remove and return a uniformly random nickname.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<String, FleetError> {
        if self.names.is_empty() {
            return Err(FleetError::PoolExhausted);
        }
        let idx = rng.gen_range(0..self.names.len());
        Ok(self.names.remove(idx))
    }

    /// Keep only the names for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.names.retain(|n| keep(n));
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn validation_bounds() {
        assert!(!is_valid_nickname("abc"));
        assert!(is_valid_nickname("abcd"));
        assert!(is_valid_nickname("a234567890123456"));
        assert!(!is_valid_nickname("a2345678901234567"));
        assert!(!is_valid_nickname("bad_name"));
        assert!(!is_valid_nickname("spa ce"));
        assert!(!is_valid_nickname("ünïcode"));
        assert!(!is_valid_nickname(""));
    }

    #[test]
    fn parse_filters_and_preserves_order() {
        let pool = NicknamePool::parse("ab\nvalid1\nway_too_long_identifier_over16\nok12\ngood\n");
        assert_eq!(pool.names(), ["valid1", "ok12", "good"]);
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let pool = NicknamePool::parse("  alice  \r\n\tbobby\n\n");
        assert_eq!(pool.names(), ["alice", "bobby"]);
    }

    #[test]
    fn parse_keeps_duplicates() {
        let pool = NicknamePool::parse("alice\nalice\n");
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn load_from_reader_matches_parse() {
        let text = "ab\nvalid1\nok12\n";
        let pool = NicknamePool::load(std::io::Cursor::new(text)).unwrap();
        assert_eq!(pool, NicknamePool::parse(text));
    }

    #[test]
    fn load_missing_file_is_empty() {
        let pool = NicknamePool::load_file("/definitely/not/here/nicknames.txt");
        assert!(pool.is_empty());
    }

    #[test]
    fn missing_file_logs_error_then_empty_warning() {
        let logs = testing::capture_logs(|| {
            NicknamePool::load_file("/definitely/not/here/nicknames.txt");
        });
        let error = logs.find("Failed to read nicknames file").expect("error logged");
        let warning = logs.find("No valid nicknames found").expect("warning logged");
        assert!(error < warning, "{logs}");
    }

    #[test]
    fn load_replaces_invalid_utf8_and_keeps_other_lines() {
        let pool = NicknamePool::load(&b"alice\n\xff\xfe\nbob\xffby\nbobby\n"[..]).unwrap();
        assert_eq!(pool.names(), ["alice", "bobby"]);
    }

    #[test]
    fn draw_removes_until_exhausted() {
        let mut pool = NicknamePool::parse("alice\nbobby\ncarol\n");
        let mut rng = StdRng::seed_from_u64(7);
        let mut drawn = Vec::new();
        for _ in 0..3 {
            drawn.push(pool.draw(&mut rng).unwrap());
        }
        drawn.sort();
        assert_eq!(drawn, ["alice", "bobby", "carol"]);
        assert!(pool.is_empty());
        assert!(matches!(pool.draw(&mut rng), Err(FleetError::PoolExhausted)));
    }

    #[test]
    fn draw_is_deterministic_for_a_seed() {
        let source = "alice\nbobby\ncarol\ndavid\nerin1\n";
        let run = |seed| {
            let mut pool = NicknamePool::parse(source);
            let mut rng = StdRng::seed_from_u64(seed);
            (0..5).map(|_| pool.draw(&mut rng).unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn retain_drops_names() {
        let mut pool = NicknamePool::parse("alice\nbobby\n");
        pool.retain(|n| n != "alice");
        assert_eq!(pool.names(), ["bobby"]);
    }
}
