//! Amazon SES v2 client.

use async_trait::async_trait;
use aws_sdk_sesv2::Client;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use skyhook_shared::MailSettings;

use super::error::MailError;
use super::transport::{MailClient, OutboundEmail};
use crate::aws::load_sdk_config;

const CHARSET: &str = "UTF-8";

/// SES v2 implementation of [`MailClient`].
#[derive(Debug, Clone)]
pub struct SesMailClient {
    client: Client,
}

impl SesMailClient {
    /// Builds a client for the configured region and credentials.
    pub async fn from_settings(settings: &MailSettings) -> Self {
        let config = load_sdk_config(&settings.region, &settings.credentials).await;
        Self {
            client: Client::new(&config),
        }
    }

    fn content(data: String) -> Result<Content, MailError> {
        Content::builder()
            .data(data)
            .charset(CHARSET)
            .build()
            .map_err(|e| MailError::Send(e.to_string()))
    }

    /// Simple message; absent bodies are left out of the request.
    fn message(
        subject: String,
        html: Option<String>,
        text: Option<String>,
    ) -> Result<Message, MailError> {
        let mut body = Body::builder();
        if let Some(html) = html {
            body = body.html(Self::content(html)?);
        }
        if let Some(text) = text {
            body = body.text(Self::content(text)?);
        }

        Ok(Message::builder()
            .subject(Self::content(subject)?)
            .body(body.build())
            .build())
    }
}

#[async_trait]
impl MailClient for SesMailClient {
    async fn send_email(&self, email: OutboundEmail) -> Result<(), MailError> {
        let message = Self::message(email.subject, email.html, email.text)?;

        let destination = Destination::builder()
            .set_to_addresses(Some(email.to))
            .set_cc_addresses(Some(email.cc))
            .set_bcc_addresses(Some(email.bcc))
            .build();

        self.client
            .send_email()
            .from_email_address(email.source)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| MailError::Send(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
