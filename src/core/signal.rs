//! # Termination signals understood by the harness.
//!
//! **Unix platforms:** `SIGHUP`, `SIGINT`, `SIGTERM`, each bound independently.
//!
//! **Other platforms:** only [`ShutdownSignal::Interrupt`] can be bound (via
//! [`tokio::signal::ctrl_c`]).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Process-level termination signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShutdownSignal {
    /// `SIGHUP`: controlling terminal closed.
    Hangup,
    /// `SIGINT`: Ctrl-C in a terminal.
    Interrupt,
    /// `SIGTERM`: default kill signal (systemd, Kubernetes).
    Terminate,
}

impl ShutdownSignal {
    /// Every signal the harness binds by default.
    pub const ALL: [ShutdownSignal; 3] = [
        ShutdownSignal::Hangup,
        ShutdownSignal::Interrupt,
        ShutdownSignal::Terminate,
    ];

    /// Conventional signal name, e.g. `"SIGTERM"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ShutdownSignal::Hangup => "SIGHUP",
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
        }
    }

    /// POSIX signal number.
    pub fn number(self) -> i32 {
        match self {
            ShutdownSignal::Hangup => 1,
            ShutdownSignal::Interrupt => 2,
            ShutdownSignal::Terminate => 15,
        }
    }

    #[cfg(unix)]
    pub(crate) fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            ShutdownSignal::Hangup => SignalKind::hangup(),
            ShutdownSignal::Interrupt => SignalKind::interrupt(),
            ShutdownSignal::Terminate => SignalKind::terminate(),
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown signal name passed to [`ShutdownSignal::from_str`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown shutdown signal {0:?} (expected one of: hup, int, term)")]
pub struct ParseSignalError(String);

impl FromStr for ShutdownSignal {
    type Err = ParseSignalError;

    /// Accepts `SIGHUP`, `HUP`, `hangup`, `1` and the equivalents for the other signals,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("SIG").unwrap_or(&upper);
        match bare {
            "HUP" | "HANGUP" | "1" => Ok(ShutdownSignal::Hangup),
            "INT" | "INTERRUPT" | "2" => Ok(ShutdownSignal::Interrupt),
            "TERM" | "TERMINATE" | "15" => Ok(ShutdownSignal::Terminate),
            _ => Err(ParseSignalError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("SIGHUP".parse(), Ok(ShutdownSignal::Hangup));
        assert_eq!("int".parse(), Ok(ShutdownSignal::Interrupt));
        assert_eq!(" Terminate ".parse(), Ok(ShutdownSignal::Terminate));
        assert_eq!("15".parse(), Ok(ShutdownSignal::Terminate));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "SIGKILL".parse::<ShutdownSignal>().unwrap_err();
        assert!(err.to_string().contains("SIGKILL"));
    }

    #[test]
    fn test_numbers_and_names() {
        let names: Vec<_> = ShutdownSignal::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["SIGHUP", "SIGINT", "SIGTERM"]);
        assert_eq!(ShutdownSignal::Terminate.number(), 15);
    }
}
