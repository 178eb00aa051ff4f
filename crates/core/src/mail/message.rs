//! Transport-agnostic email model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::MailError;

/// A mailbox, optionally with a display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Display name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Email address.
    pub address: String,
}

impl Address {
    /// Creates an address without a display name.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            address: address.into(),
        }
    }

    /// Creates an address with a display name.
    #[must_use]
    pub fn named(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.address)
        } else {
            write!(f, "{} <{}>", self.name, self.address)
        }
    }
}

/// An email as the host hands it over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender; the transport's default sender applies when absent.
    #[serde(default)]
    pub from: Option<Address>,
    /// Primary recipients.
    #[serde(default)]
    pub to: Vec<Address>,
    /// Carbon-copy recipients.
    #[serde(default)]
    pub cc: Vec<Address>,
    /// Blind carbon-copy recipients.
    #[serde(default)]
    pub bcc: Vec<Address>,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// HTML body.
    #[serde(default)]
    pub html: Option<String>,
    /// Plain-text body.
    #[serde(default)]
    pub text: Option<String>,
}

impl Message {
    /// Starts a message to a single recipient.
    #[must_use]
    pub fn new(recipient: Address, subject: impl Into<String>) -> Self {
        Self {
            to: vec![recipient],
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Sets the sender.
    #[must_use]
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.from = Some(sender);
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn with_html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// HTML body, if present and non-empty.
    #[must_use]
    pub fn html_body(&self) -> Option<&str> {
        self.html.as_deref().filter(|body| !body.is_empty())
    }

    /// Text body, if present and non-empty.
    #[must_use]
    pub fn text_body(&self) -> Option<&str> {
        self.text.as_deref().filter(|body| !body.is_empty())
    }

    /// Host-side pre-validation: at least one recipient and one body.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMessage` describing the first problem found.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty() {
            return Err(MailError::InvalidMessage("no recipients".to_string()));
        }
        if let Some(empty) = self
            .to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .find(|addr| addr.address.trim().is_empty())
        {
            return Err(MailError::InvalidMessage(format!(
                "empty recipient address for {:?}",
                empty.name
            )));
        }
        if self.html_body().is_none() && self.text_body().is_none() {
            return Err(MailError::InvalidMessage("no body".to_string()));
        }
        Ok(())
    }
}
