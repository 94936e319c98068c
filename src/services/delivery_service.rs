// src/services/delivery_service.rs
//
// Envio de documentos por e-mail e para assinatura eletrônica.

use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BillRepository, InvoiceRepository, QuoteRepository},
    models::{document::InvoiceStatus, quote::QuoteStatus},
    services::{
        document_service::{DocumentKind, DocumentService, RenderedDocument},
        email::{escape_html, Attachment, EmailClient, EmailMessage, EmailOutcome},
        signing::{Signer, SigningClient, SigningSubmission},
    },
};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    pub kind: DocumentKind,
    pub id: Uuid,
    pub number: String,
    #[schema(example = "billing@acme.test")]
    pub recipient: String,
    pub message_id: Option<String>,
    /// false quando o envio foi apenas simulado (sem API key)
    pub delivered: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignatureReceipt {
    pub quote_id: Uuid,
    pub number: String,
    pub submission: SigningSubmission,
}

pub fn email_for(document: &RenderedDocument, sender_name: &str) -> Result<EmailMessage, AppError> {
    let to_email = document
        .client
        .email
        .clone()
        .filter(|e| !e.trim().is_empty())
        .ok_or(AppError::ClientHasNoEmail)?;

    let label = document.kind.label();
    let html = format!(
        "<p>Dear {},</p><p>Please find attached {} {}.</p><p>Kind regards,<br>{}</p>",
        escape_html(&document.client.name),
        label.to_lowercase(),
        escape_html(&document.number),
        escape_html(sender_name)
    );

    Ok(EmailMessage {
        to_email,
        to_name: document.client.name.clone(),
        subject: format!("{} {} from {}", label, document.number, sender_name),
        html,
        attachment: Some(Attachment { filename: document.filename.clone(), content: document.bytes.clone() }),
    })
}

#[derive(Clone)]
pub struct DeliveryService {
    documents: DocumentService,
    email: EmailClient,
    signing: SigningClient,
    quote_repo: QuoteRepository,
    invoice_repo: InvoiceRepository,
    bill_repo: BillRepository,
}

impl DeliveryService {
    pub fn new(
        documents: DocumentService,
        email: EmailClient,
        signing: SigningClient,
        quote_repo: QuoteRepository,
        invoice_repo: InvoiceRepository,
        bill_repo: BillRepository,
    ) -> Self {
        Self { documents, email, signing, quote_repo, invoice_repo, bill_repo }
    }

    /// Gera o PDF, envia ao cliente e marca o documento como SENT.
    pub async fn send(&self, pool: &PgPool, kind: DocumentKind, id: Uuid) -> Result<DeliveryReceipt, AppError> {
        let document = self.documents.render(pool, kind, id).await?;
        let message = email_for(&document, self.email.sender_name())?;

        let outcome = self.email.send(&message).await?;

        // Só depois do envio: falha no provedor não muda o status
        let updated = match kind {
            DocumentKind::Quote => self.quote_repo.set_status(pool, id, QuoteStatus::Sent).await?.is_some(),
            DocumentKind::Invoice => self.invoice_repo.set_status(pool, id, InvoiceStatus::Sent).await?.is_some(),
            DocumentKind::Bill => self.bill_repo.set_status(pool, id, InvoiceStatus::Sent).await?.is_some(),
        };
        if !updated {
            return Err(AppError::not_found(kind.label(), id));
        }

        tracing::info!("{} {} enviado para {}", kind.label(), document.number, message.to_email);

        let (message_id, delivered) = match outcome {
            EmailOutcome::Sent { message_id } => (message_id, true),
            EmailOutcome::Mocked => (None, false),
        };

        Ok(DeliveryReceipt {
            kind,
            id,
            number: document.number,
            recipient: message.to_email,
            message_id,
            delivered,
        })
    }

    pub async fn send_for_signature(&self, pool: &PgPool, quote_id: Uuid) -> Result<SignatureReceipt, AppError> {
        let document = self.documents.render(pool, DocumentKind::Quote, quote_id).await?;
        let email = document
            .client
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or(AppError::ClientHasNoEmail)?;

        let signers = [Signer { name: document.client.name.clone(), email }];
        let name = format!("Quote {}", document.number);
        let submission = self.signing.create_submission(&name, &document.bytes, &signers).await?;

        self.quote_repo
            .set_signature_submission(pool, quote_id, &submission.id)
            .await?
            .ok_or_else(|| AppError::not_found("Quote", quote_id))?;

        tracing::info!("Orçamento {} enviado para assinatura ({})", document.number, submission.id);

        Ok(SignatureReceipt { quote_id, number: document.number, submission })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::client::Client;
    use chrono::Utc;

    fn document(email: Option<&str>) -> RenderedDocument {
        RenderedDocument {
            kind: DocumentKind::Bill,
            id: Uuid::new_v4(),
            number: "B-1767225600000".into(),
            filename: "Bill-B-1767225600000.pdf".into(),
            client: Client {
                id: Uuid::new_v4(),
                name: "Smith & Sons".into(),
                email: email.map(str::to_string),
                phone: None,
                address: None,
                city: None,
                zip_code: None,
                country: None,
                vat_number: None,
                company_id: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            bytes: b"%PDF-1.7".to_vec(),
        }
    }

    #[test]
    fn email_carries_subject_and_attachment() {
        let message = email_for(&document(Some("ops@smith.test")), "Freelance Hub").unwrap();
        assert_eq!(message.subject, "Bill B-1767225600000 from Freelance Hub");
        assert_eq!(message.to_email, "ops@smith.test");
        assert!(message.html.contains("Dear Smith &amp; Sons"));
        let attachment = message.attachment.unwrap();
        assert_eq!(attachment.filename, "Bill-B-1767225600000.pdf");
        assert_eq!(attachment.content, b"%PDF-1.7");
    }

    #[test]
    fn client_without_email_cannot_receive_documents() {
        assert!(matches!(email_for(&document(None), "X"), Err(AppError::ClientHasNoEmail)));
        assert!(matches!(email_for(&document(Some("  ")), "X"), Err(AppError::ClientHasNoEmail)));
    }
}
