//! Brevo transactional email API client.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::{MailError, Mailer, OutgoingEmail};

/// Default Brevo endpoint for sending a single transactional email.
pub const DEFAULT_BREVO_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    html_content: String,
    text_content: String,
}

/// Sends mail through Brevo's HTTPS API.
#[derive(Debug, Clone)]
pub struct BrevoMailer {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    sender_email: String,
    sender_name: Option<String>,
}

impl BrevoMailer {
    pub fn new(
        api_key: &str,
        sender_email: &str,
        sender_name: Option<&str>,
    ) -> Result<Self, MailError> {
        Self::with_endpoint(DEFAULT_BREVO_URL, api_key, sender_email, sender_name)
    }

    pub fn with_endpoint(
        endpoint: &str,
        api_key: &str,
        sender_email: &str,
        sender_name: Option<&str>,
    ) -> Result<Self, MailError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(MailError::Config("BREVO_API_KEY is required".into()));
        }
        let sender_email = sender_email.trim();
        if sender_email.is_empty() {
            return Err(MailError::Config("sender email is required".into()));
        }
        let endpoint = Url::parse(endpoint)
            .map_err(|e| MailError::Config(format!("invalid mail endpoint: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.to_string(),
            sender_email: sender_email.to_string(),
            sender_name: sender_name.map(str::to_string),
        })
    }

    fn body(&self, email: &OutgoingEmail) -> BrevoSendEmailBody {
        BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: email.to.clone(),
                name: None,
            }],
            subject: email.subject.clone(),
            html_content: email.html.clone(),
            text_content: email.text.clone(),
        }
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&self.body(email))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            debug!(to = %email.to, "mail accepted by provider");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_api_key() {
        let err = BrevoMailer::new("  ", "aviator@example.com", None).unwrap_err();
        assert!(matches!(err, MailError::Config(_)));
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let err = BrevoMailer::with_endpoint("not a url", "key", "aviator@example.com", None)
            .unwrap_err();
        assert!(matches!(err, MailError::Config(_)));
    }

    #[test]
    fn body_uses_camel_case_fields() {
        let mailer = BrevoMailer::new("key", "aviator@example.com", Some("Aviator")).unwrap();
        let body = mailer.body(&OutgoingEmail::otp("a@x.com", "4821"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["sender"]["email"], "aviator@example.com");
        assert_eq!(json["sender"]["name"], "Aviator");
        assert_eq!(json["to"][0]["email"], "a@x.com");
        assert!(json["to"][0].get("name").is_none());
        assert_eq!(json["textContent"], "Your OTP is 4821");
        assert!(json["htmlContent"].as_str().unwrap().contains("4821"));
    }
}
