// src/services/email.rs
//
// Cliente da API transacional da Brevo. Sem API key configurada o envio é
// apenas logado (modo de desenvolvimento).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::Value;

use crate::common::error::AppError;

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    Sent { message_id: Option<String> },
    Mocked,
}

#[derive(Serialize)]
struct Contact<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoAttachment<'a> {
    name: &'a str,
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoRequest<'a> {
    sender: Contact<'a>,
    to: Vec<Contact<'a>>,
    subject: &'a str,
    html_content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<Vec<BrevoAttachment<'a>>>,
}

#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    sender_name: String,
    sender_email: String,
}

impl EmailClient {
    pub fn new(api_url: &str, api_key: Option<String>, sender_name: String, sender_email: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            sender_name,
            sender_email,
        }
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<EmailOutcome, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!(
                "[mock] e-mail para {} <{}>: \"{}\" (anexo: {:?})",
                message.to_name,
                message.to_email,
                message.subject,
                message.attachment.as_ref().map(|a| a.filename.as_str())
            );
            return Ok(EmailOutcome::Mocked);
        };

        let body = BrevoRequest {
            sender: Contact { name: &self.sender_name, email: &self.sender_email },
            to: vec![Contact { name: &message.to_name, email: &message.to_email }],
            subject: &message.subject,
            html_content: &message.html,
            attachment: message.attachment.as_ref().map(|a| {
                vec![BrevoAttachment { name: &a.filename, content: STANDARD.encode(&a.content) }]
            }),
        };

        let response = self
            .http
            .post(format!("{}/smtp/email", self.api_url))
            .header("api-key", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Brevo: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!("Brevo {}: {}", status, detail)));
        }

        // Resposta esperada: {"messageId": "<...>"}
        let message_id = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("messageId").and_then(Value::as_str).map(str::to_string));

        tracing::info!("E-mail enviado para {} ({:?})", message.to_email, message_id);
        Ok(EmailOutcome::Sent { message_id })
    }
}

/// Escapa texto do usuário antes de entrar no HTML do e-mail.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> EmailMessage {
        EmailMessage {
            to_email: "billing@acme.test".into(),
            to_name: "Acme".into(),
            subject: "Invoice INV-20260001 from Freelance Hub".into(),
            html: "<p>Hi</p>".into(),
            attachment: Some(Attachment { filename: "Invoice-INV-20260001.pdf".into(), content: b"%PDF".to_vec() }),
        }
    }

    fn client(url: &str, key: Option<&str>) -> EmailClient {
        EmailClient::new(
            url,
            key.map(str::to_string),
            "Freelance Hub".into(),
            "billing@freelancehub.local".into(),
        )
    }

    #[tokio::test]
    async fn posts_message_with_base64_attachment() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/smtp/email"))
            .and(header("api-key", "secret"))
            .and(body_partial_json(serde_json::json!({
                "sender": { "name": "Freelance Hub", "email": "billing@freelancehub.local" },
                "to": [{ "email": "billing@acme.test", "name": "Acme" }],
                "htmlContent": "<p>Hi</p>",
                "attachment": [{ "name": "Invoice-INV-20260001.pdf", "content": "JVBERg==" }]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "messageId": "<42@brevo>" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server.uri(), Some("secret")).send(&message()).await.unwrap();
        assert_eq!(outcome, EmailOutcome::Sent { message_id: Some("<42@brevo>".into()) });
    }

    #[tokio::test]
    async fn provider_errors_become_external_service_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/smtp/email"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid sender"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri(), Some("secret")).send(&message()).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(msg) if msg.contains("invalid sender")));
    }

    #[tokio::test]
    async fn without_api_key_nothing_is_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server.uri(), None).send(&message()).await.unwrap();
        assert_eq!(outcome, EmailOutcome::Mocked);
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("Tom & <Jerry>"), "Tom &amp; &lt;Jerry&gt;");
    }
}
