// src/services/signing.rs
//
// Cliente DocuSeal: cria uma submissão a partir do PDF gerado.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::common::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigningSubmission {
    #[schema(example = "1024")]
    pub id: String,
    pub slug: Option<String>,
    /// Link de assinatura do primeiro signatário, quando o provedor devolve
    pub signing_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Signer {
    pub name: String,
    pub email: String,
}

#[derive(Clone)]
pub struct SigningClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SigningClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub async fn create_submission(
        &self,
        document_name: &str,
        pdf: &[u8],
        signers: &[Signer],
    ) -> Result<SigningSubmission, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!(
                "[mock] assinatura de \"{}\" para {:?}",
                document_name,
                signers.iter().map(|s| s.email.as_str()).collect::<Vec<_>>()
            );
            return Ok(SigningSubmission {
                id: "mock-submission-id".into(),
                slug: Some("mock-slug".into()),
                signing_url: None,
            });
        };

        let submitters: Vec<Value> = signers
            .iter()
            .map(|s| json!({ "name": s.name, "email": s.email, "role": "First Party" }))
            .collect();
        let body = json!({
            "name": document_name,
            "send_email": true,
            "documents": [{ "name": document_name, "file": STANDARD.encode(pdf) }],
            "submitters": submitters,
        });

        let response = self
            .http
            .post(format!("{}/api/submissions/pdf", self.base_url))
            .header("X-Auth-Token", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("DocuSeal: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!("DocuSeal {}: {}", status, detail)));
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| AppError::ExternalService(format!("DocuSeal: resposta inválida: {}", e)))?;

        parse_submission(&payload)
            .ok_or_else(|| AppError::ExternalService("DocuSeal: resposta sem id de submissão".into()))
    }
}

/// O formato da resposta varia entre versões: objeto da submissão ou
/// lista de signatários (cada um com `submission_id`).
fn parse_submission(payload: &Value) -> Option<SigningSubmission> {
    let id_of = |v: &Value| match v {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    };

    let (id, first_submitter) = match payload {
        Value::Array(submitters) => {
            let first = submitters.first()?;
            (id_of(first.get("submission_id")?)?, Some(first))
        }
        Value::Object(_) => (
            id_of(payload.get("id")?)?,
            payload.get("submitters").and_then(|s| s.get(0)),
        ),
        _ => return None,
    };

    let field = |name: &str| {
        first_submitter
            .and_then(|s| s.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    Some(SigningSubmission { id, slug: field("slug"), signing_url: field("embed_src") })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signer() -> Vec<Signer> {
        vec![Signer { name: "Acme".into(), email: "billing@acme.test".into() }]
    }

    #[tokio::test]
    async fn creates_submission_from_pdf() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/submissions/pdf"))
            .and(header("X-Auth-Token", "token"))
            .and(body_partial_json(json!({
                "documents": [{ "name": "Quote Q-1", "file": "JVBERg==" }],
                "submitters": [{ "email": "billing@acme.test" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 77,
                "submitters": [{ "slug": "abc123", "embed_src": "https://sign.test/s/abc123" }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = SigningClient::new(&mock_server.uri(), Some("token".into()));
        let submission = client.create_submission("Quote Q-1", b"%PDF", &signer()).await.unwrap();

        assert_eq!(submission.id, "77");
        assert_eq!(submission.slug.as_deref(), Some("abc123"));
        assert_eq!(submission.signing_url.as_deref(), Some("https://sign.test/s/abc123"));
    }

    #[tokio::test]
    async fn failure_status_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&mock_server)
            .await;

        let client = SigningClient::new(&mock_server.uri(), Some("bad".into()));
        let err = client.create_submission("Quote Q-1", b"%PDF", &signer()).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[tokio::test]
    async fn mock_submission_without_api_key() {
        let client = SigningClient::new("http://127.0.0.1:9", None);
        let submission = client.create_submission("Quote Q-1", b"%PDF", &signer()).await.unwrap();
        assert_eq!(submission.id, "mock-submission-id");
        assert_eq!(submission.slug.as_deref(), Some("mock-slug"));
    }

    #[test]
    fn submitter_list_response_is_understood() {
        let payload = json!([{ "submission_id": 5, "slug": "xyz" }]);
        let submission = parse_submission(&payload).unwrap();
        assert_eq!(submission.id, "5");
        assert_eq!(submission.slug.as_deref(), Some("xyz"));
        assert!(parse_submission(&json!({ "error": "x" })).is_none());
    }
}
