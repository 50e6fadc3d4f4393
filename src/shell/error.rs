//! Shell result codes

/// Result of a command handler.
pub type ShellResult = Result<(), ShellError>;

/// Shell error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellError {
    /// 1: No command matched the token
    UnknownCommand,
    /// 2: Out of memory (or buffer)
    Overflow,
    /// Application-defined code, rendered as nothing
    Custom(u8),
}

impl ShellError {
    /// Numeric code
    pub fn code(&self) -> u8 {
        match self {
            Self::UnknownCommand => 1,
            Self::Overflow => 2,
            Self::Custom(code) => *code,
        }
    }

    /// Line shown on the terminal, if any
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::UnknownCommand => {
                Some("Command not found. Type HELP to see all available commands.\r\n")
            }
            Self::Overflow => Some("OVERFLOW\r\n"),
            Self::Custom(_) => None,
        }
    }
}

impl core::fmt::Display for ShellError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownCommand => f.write_str("unknown command"),
            Self::Overflow => f.write_str("overflow"),
            Self::Custom(code) => write!(f, "error {}", code),
        }
    }
}

/// Terminal text for a result. `None` means render nothing.
pub fn result_text(result: &ShellResult) -> Option<&'static str> {
    match result {
        Ok(()) => Some("OK\r\n"),
        Err(e) => e.message(),
    }
}
