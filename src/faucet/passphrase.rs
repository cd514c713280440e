//! Where unlock passphrases come from.

use secrecy::{ExposeSecret, Secret};
use std::io;

/// Supplies a passphrase for one unlock attempt.
///
/// Implementations may block (terminal prompts), so callers run them on the
/// blocking pool.
pub trait PassphraseSource: Send + Sync {
    /// Passphrase for the attempt described by `prompt`, or `None` when the
    /// source has nothing to offer.
    fn passphrase(&self, prompt: &str) -> Option<Secret<String>>;
}

/// A passphrase fixed in configuration.
pub struct ConfiguredPassphrase(Secret<String>);

impl ConfiguredPassphrase {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(Secret::new(passphrase.into()))
    }
}

impl PassphraseSource for ConfiguredPassphrase {
    fn passphrase(&self, _prompt: &str) -> Option<Secret<String>> {
        Some(Secret::new(self.0.expose_secret().clone()))
    }
}

/// Reads the passphrase from the controlling terminal without echo.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PassphraseSource for TerminalPrompt {
    fn passphrase(&self, prompt: &str) -> Option<Secret<String>> {
        println!("{prompt}");
        match rpassword::prompt_password("Enter passphrase: ") {
            Ok(entered) => Some(Secret::new(entered)),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read passphrase from terminal");
                None
            }
        }
    }
}

/// Ask for a new passphrase twice and insist both entries match.
pub fn read_new_passphrase() -> io::Result<Secret<String>> {
    let first = rpassword::prompt_password("Enter new passphrase: ")?;
    let second = rpassword::prompt_password("Repeat passphrase: ")?;
    if first != second {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "passphrases do not match",
        ));
    }
    Ok(Secret::new(first))
}

impl std::fmt::Debug for ConfiguredPassphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConfiguredPassphrase(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_passphrase_repeats() {
        let source = ConfiguredPassphrase::new("hunter2");
        for _ in 0..3 {
            let secret = source.passphrase("unlock").unwrap();
            assert_eq!(secret.expose_secret(), "hunter2");
        }
        assert!(!format!("{:?}", source).contains("hunter2"));
    }
}
