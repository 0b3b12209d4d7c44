//! Persistent configuration for the botfleet front end.
//!
//! Config file lives at `~/.config/botfleet/tui.toml`. The form values in
//! effect when the UI quits are written back to it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6667;
pub const DEFAULT_CLIENTS: usize = 1;
pub const DEFAULT_NICKNAMES: &str = "nicknames.txt";
pub const DEFAULT_CHANNEL: &str = "#bots";

/// User configuration (persisted in tui.toml).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Server host name or address.
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Fleet size to request.
    pub clients: Option<usize>,
    /// Nickname list, one candidate per line.
    pub nicknames: Option<PathBuf>,
    /// Channel the bots chat into.
    pub channel: Option<String>,
    /// Seed for nickname draws.
    pub seed: Option<u64>,
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("botfleet")
        .join("tui.toml")
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Read `path`, falling back to defaults if it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(s) => match toml::from_str(&s) {
                Ok(c) => return c,
                Err(e) => tracing::warn!("Bad config file {}: {e}", path.display()),
            },
            Err(e) => tracing::warn!("Can't read {}: {e}", path.display()),
        }
        Self::default()
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let s = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Effective settings after merging CLI args > config file > defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub host: String,
    pub port: u16,
    pub clients: usize,
    pub nicknames: PathBuf,
    pub channel: String,
    pub seed: Option<u64>,
}

impl Resolved {
    pub fn merge(cli: &super::Cli, config: &Config) -> Self {
        let host = cli.host.clone()
            .or_else(|| config.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(config.port).unwrap_or(DEFAULT_PORT);
        let clients = cli.clients.or(config.clients).unwrap_or(DEFAULT_CLIENTS);
        let nicknames = cli.nicknames.clone()
            .or_else(|| config.nicknames.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NICKNAMES));

        // Channel names without a sigil get '#'
        let channel = cli.channel.clone()
            .or_else(|| config.channel.clone())
            .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
        let channel = if channel.is_empty() || channel.starts_with(['#', '&']) {
            channel
        } else {
            format!("#{channel}")
        };

        let seed = cli.seed.or(config.seed);

        Self { host, port, clients, nicknames, channel, seed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> super::super::Cli {
        super::super::Cli::parse_from(std::iter::once("botfleet").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_when_nothing_set() {
        let r = Resolved::merge(&cli(&[]), &Config::default());
        assert_eq!(r.host, DEFAULT_HOST);
        assert_eq!(r.port, 6667);
        assert_eq!(r.clients, 1);
        assert_eq!(r.nicknames, PathBuf::from("nicknames.txt"));
        assert_eq!(r.channel, "#bots");
        assert_eq!(r.seed, None);
    }

    #[test]
    fn cli_beats_config() {
        let config = Config {
            host: Some("irc.example.org".into()),
            port: Some(7000),
            clients: Some(8),
            seed: Some(1),
            ..Default::default()
        };
        let r = Resolved::merge(&cli(&["--port", "6697", "--clients", "3"]), &config);
        assert_eq!(r.host, "irc.example.org");
        assert_eq!(r.port, 6697);
        assert_eq!(r.clients, 3);
        assert_eq!(r.seed, Some(1));
    }

    #[test]
    fn channel_gets_sigil() {
        let r = Resolved::merge(&cli(&["--channel", "lobby"]), &Config::default());
        assert_eq!(r.channel, "#lobby");
        let r = Resolved::merge(&cli(&["--channel", "&local"]), &Config::default());
        assert_eq!(r.channel, "&local");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tui.toml");
        let config = Config {
            host: Some("10.0.0.2".into()),
            clients: Some(12),
            nicknames: Some(PathBuf::from("/tmp/names.txt")),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tui.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        assert_eq!(Config::load_from(&dir.path().join("missing.toml")), Config::default());
    }
}
