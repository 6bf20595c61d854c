// src/mailer.rs

use crate::config::EmailConfig;
use crate::domain::ListingFilter;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error: {0}")]
    ApiError(String),
}

pub struct BrevoMailer {
    config: EmailConfig,
    client: Client,
}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoAttachment {
    name: String,
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: String,
    html_content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachment: Vec<BrevoAttachment>,
}

pub fn results_subject(count: usize) -> String {
    format!("Filtered Foreclosure Listings - {count} Results")
}

fn results_body(filter: &ListingFilter, count: usize) -> String {
    format!(
        r#"
        <h2>Filtered Foreclosure Listings</h2>
        <p><strong>City:</strong> {}</p>
        <p><strong>Date range:</strong> {} to {}</p>
        <p><strong>Results:</strong> {count}</p>
        <p>The matching listings are attached as a CSV file.</p>
    "#,
        filter.city_label(),
        filter.start,
        filter.end,
    )
}

impl BrevoMailer {
    pub fn new(config: EmailConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Send filtered results with the matching rows attached as `csv`.
    pub fn send_results(
        &self,
        recipient_email: &str,
        filter: &ListingFilter,
        count: usize,
        csv: &[u8],
    ) -> Result<(), MailerError> {
        let payload = BrevoPayload {
            sender: BrevoSender {
                name: &self.config.sender_name,
                email: &self.config.sender_email,
            },
            to: vec![BrevoRecipient {
                email: recipient_email,
            }],
            subject: results_subject(count),
            html_content: results_body(filter, count),
            attachment: vec![BrevoAttachment {
                name: format!(
                    "foreclosure_listings_{}.csv",
                    chrono::Local::now().format("%Y%m%d")
                ),
                content: STANDARD.encode(csv),
            }],
        };

        let resp = self
            .client
            .post(BREVO_SEND_URL)
            .header("api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let error_body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MailerError::ApiError(format!(
                "Failed to send email: {}",
                error_body
            )));
        }

        Ok(())
    }
}
