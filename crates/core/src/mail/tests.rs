//! Mail transport tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rstest::rstest;

use super::*;

const DEFAULT_FROM: &str = "noreply@example.com";

fn transport_with(client: MockMailClient) -> MailTransport {
    MailTransport::with_client(Arc::new(client), DEFAULT_FROM)
}

fn transport() -> MailTransport {
    transport_with(MockMailClient::new())
}

fn base_message() -> Message {
    Message::new(Address::new("jane@example.com"), "Welcome")
}

#[test]
fn test_both_bodies_are_included() {
    let message = base_message()
        .with_html("<p>Hello</p>")
        .with_text("Hello");

    let email = transport().build_outbound(&message);
    assert_eq!(email.html.as_deref(), Some("<p>Hello</p>"));
    assert_eq!(email.text.as_deref(), Some("Hello"));
}

#[rstest]
#[case(Some("<p>Hi</p>"), None, true, false)]
#[case(None, Some("Hi"), false, true)]
#[case(Some(""), Some("Hi"), false, true)]
#[case(Some("<p>Hi</p>"), Some(""), true, false)]
fn test_empty_body_is_omitted(
    #[case] html: Option<&str>,
    #[case] text: Option<&str>,
    #[case] has_html: bool,
    #[case] has_text: bool,
) {
    let message = Message {
        html: html.map(str::to_string),
        text: text.map(str::to_string),
        ..base_message()
    };

    let email = transport().build_outbound(&message);
    assert_eq!(email.html.is_some(), has_html);
    assert_eq!(email.text.is_some(), has_text);
}

#[rstest]
#[case(None, DEFAULT_FROM)]
#[case(Some(Address::named("Support", "support@example.com")), "Support <support@example.com>")]
#[case(Some(Address::new("support@example.com")), "support@example.com")]
#[case(Some(Address::named("Nobody", "")), DEFAULT_FROM)]
fn test_sender_resolution(#[case] from: Option<Address>, #[case] expected: &str) {
    let message = Message {
        from,
        ..base_message().with_text("x")
    };

    assert_eq!(transport().build_outbound(&message).source, expected);
}

#[test]
fn test_recipient_lists_are_mapped_to_addresses() {
    let message = Message {
        cc: vec![Address::named("Ops", "ops@example.com")],
        bcc: vec![Address::new("audit@example.com")],
        ..base_message().with_text("x")
    };

    let email = transport().build_outbound(&message);
    assert_eq!(email.to, vec!["jane@example.com"]);
    assert_eq!(email.cc, vec!["ops@example.com"]);
    assert_eq!(email.bcc, vec!["audit@example.com"]);
    assert_eq!(email.subject, "Welcome");
}

#[tokio::test]
async fn test_send_hands_outbound_email_to_client() {
    let mut client = MockMailClient::new();
    client
        .expect_send_email()
        .withf(|email| {
            email.source == DEFAULT_FROM
                && email.to == ["jane@example.com"]
                && email.html.is_none()
                && email.text.as_deref() == Some("Hello")
        })
        .times(1)
        .returning(|_| Ok(()));

    let message = base_message().with_text("Hello");
    transport_with(client).send(&message).await.expect("send");
}

#[tokio::test]
async fn test_send_surfaces_client_error() {
    let mut client = MockMailClient::new();
    client
        .expect_send_email()
        .times(1)
        .returning(|_| Err(MailError::Send("throttled".to_string())));

    let err = transport_with(client)
        .send(&base_message().with_text("Hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, MailError::Send(reason) if reason == "throttled"));
}

struct StalledClient;

#[async_trait]
impl MailClient for StalledClient {
    async fn send_email(&self, _email: OutboundEmail) -> Result<(), MailError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_send_times_out() {
    let transport = MailTransport::with_client(Arc::new(StalledClient), DEFAULT_FROM)
        .with_timeout(Duration::from_millis(20));

    let err = transport
        .send(&base_message().with_text("Hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, MailError::Timeout(after) if after == Duration::from_millis(20)));
}

#[test]
fn test_message_validation() {
    assert!(base_message().with_text("x").validate().is_ok());
    assert!(base_message().validate().is_err());
    assert!(base_message().with_html("").validate().is_err());

    let no_recipients = Message {
        to: Vec::new(),
        ..base_message().with_text("x")
    };
    assert!(no_recipients.validate().is_err());

    let blank_recipient = Message::new(Address::named("Jane", " "), "Hi").with_text("x");
    assert!(blank_recipient.validate().is_err());
}

#[test]
fn test_error_maps_to_integration_taxonomy() {
    use skyhook_shared::{CapabilityKind, IntegrationError};

    let err: IntegrationError = MailError::Timeout(Duration::from_secs(30)).into();
    assert!(matches!(
        err,
        IntegrationError::RemoteCallFailed {
            capability: CapabilityKind::Mail,
            ..
        }
    ));

    let err: IntegrationError = MailError::Configuration("bad".into()).into();
    assert_eq!(err.error_code(), "CONSTRUCTION_FAILED");
}
