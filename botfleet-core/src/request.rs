//! Parsing of user-entered reconcile parameters.
//!
//! These checks run before the core is touched; a rejected request
//! leaves the fleet exactly as it was.

use crate::error::FleetError;

/// A validated "bring the fleet to N bots at host:port" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    pub target: usize,
    pub host: String,
    pub port: u16,
}

impl ReconcileRequest {
    pub fn parse(target: &str, host: &str, port: &str) -> Result<Self, FleetError> {
        let port = parse_port(port)?;
        let target = parse_target(target)?;
        let host = host.trim();
        if host.is_empty() {
            return Err(FleetError::InvalidInput("the host must not be empty".into()));
        }
        Ok(Self { target, host: host.to_string(), port })
    }
}

pub fn parse_port(input: &str) -> Result<u16, FleetError> {
    input
        .trim()
        .parse::<u16>()
        .map_err(|_| FleetError::InvalidInput(format!("the port must be a number from 0 to 65535, got {input:?}")))
}

pub fn parse_target(input: &str) -> Result<usize, FleetError> {
    let n: i64 = input
        .trim()
        .parse()
        .map_err(|_| FleetError::InvalidInput(format!("the number of clients must be a number, got {input:?}")))?;
    usize::try_from(n)
        .map_err(|_| FleetError::InvalidInput("the number of clients must be 0 or higher".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_request() {
        let req = ReconcileRequest::parse(" 5 ", " example.org ", "6667").unwrap();
        assert_eq!(req, ReconcileRequest { target: 5, host: "example.org".into(), port: 6667 });
    }

    #[test]
    fn rejects_bad_port() {
        assert!(matches!(parse_port("abc"), Err(FleetError::InvalidInput(_))));
        assert!(matches!(parse_port("65536"), Err(FleetError::InvalidInput(_))));
        assert!(matches!(parse_port("-1"), Err(FleetError::InvalidInput(_))));
        assert_eq!(parse_port("0").unwrap(), 0);
        assert_eq!(parse_port("65535").unwrap(), 65535);
    }

    #[test]
    fn rejects_bad_target() {
        assert!(matches!(parse_target("ten"), Err(FleetError::InvalidInput(_))));
        let err = parse_target("-3").unwrap_err();
        assert!(err.to_string().contains("0 or higher"));
        assert_eq!(parse_target("0").unwrap(), 0);
    }

    #[test]
    fn rejects_empty_host() {
        assert!(matches!(
            ReconcileRequest::parse("1", "   ", "6667"),
            Err(FleetError::InvalidInput(_))
        ));
    }
}
