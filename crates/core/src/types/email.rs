//! Validated email addresses for login, registration and checkout forms.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound from RFC 5321.
const MAX_LEN: usize = 254;

/// Why a form's email field was rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is blank")]
    Blank,
    #[error("email is longer than {MAX_LEN} characters")]
    TooLong,
    #[error("email must look like name@domain")]
    Malformed,
    /// `jane@localhost` and friends. The backend would accept them but no
    /// confirmation mail could ever arrive.
    #[error("email domain must contain a dot")]
    BareDomain,
}

/// A trimmed email address with a lowercased domain.
///
/// Login and registration forms validate through this type before a request
/// is sent, so obviously broken input never reaches the backend.
///
/// ```
/// use kiosk_core::Email;
///
/// let email = Email::parse("  Jane.Doe@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "Jane.Doe@example.com");
///
/// assert!(Email::parse("jane").is_err());
/// assert!(Email::parse("jane@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Normalize raw form input.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmailError`] the input runs into.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let raw = raw.trim();
        match raw.len() {
            0 => return Err(EmailError::Blank),
            n if n > MAX_LEN => return Err(EmailError::TooLong),
            _ => {}
        }

        let Some((local, domain)) = raw.rsplit_once('@') else {
            return Err(EmailError::Malformed);
        };
        if local.is_empty() || domain.is_empty() || domain.contains(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }
        if !domain.contains('.') || domain.split('.').any(str::is_empty) {
            return Err(EmailError::BareDomain);
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_storefront_addresses_accepted() {
        for raw in [
            "customer42@example.com",
            "orders+kiosk@shop.example.co.uk",
            "a@b.c",
        ] {
            assert_eq!(Email::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_only_domain_is_lowercased() {
        let email = Email::parse("\tMixed.Case@SHOP.Example\n").unwrap();
        assert_eq!(email.to_string(), "Mixed.Case@shop.example");
    }

    #[test]
    fn test_form_input_rejected() {
        let cases = [
            ("   ", EmailError::Blank),
            ("no-at-symbol", EmailError::Malformed),
            ("@example.com", EmailError::Malformed),
            ("user@", EmailError::Malformed),
            ("user@exa mple.com", EmailError::Malformed),
            ("user@localhost", EmailError::BareDomain),
            ("user@example.", EmailError::BareDomain),
            ("user@.example.com", EmailError::BareDomain),
            ("user@example..com", EmailError::BareDomain),
        ];
        for (raw, expected) in cases {
            assert_eq!(Email::parse(raw), Err(expected), "{raw:?}");
        }
    }

    #[test]
    fn test_length_limit() {
        let at_limit = format!("{}@example.com", "a".repeat(MAX_LEN - 12));
        assert!(Email::parse(&at_limit).is_ok());
        let over = format!("a{at_limit}");
        assert_eq!(Email::parse(&over), Err(EmailError::TooLong));
    }
}
