//! Transactional mail adapter.
//!
//! [`MailTransport`] translates a host [`Message`] into one outbound call on
//! a [`MailClient`]. [`SesMailClient`] is the Amazon SES v2 implementation.
//! Failures are returned to the caller; deciding to fall back to the host's
//! local mailer happens in the orchestrator's hook binding.

mod error;
mod message;
mod ses;
mod transport;

#[cfg(test)]
mod tests;

pub use error::MailError;
pub use message::{Address, Message};
pub use ses::SesMailClient;
pub use transport::{MailClient, MailTransport, OutboundEmail};

#[cfg(test)]
pub use transport::MockMailClient;
