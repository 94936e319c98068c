// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Clients ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::search_clients,
        handlers::clients::get_client,
        handlers::clients::get_client_details,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Quotes ---
        handlers::quotes::create_quote,
        handlers::quotes::list_quotes,
        handlers::quotes::search_quotes,
        handlers::quotes::get_quote,
        handlers::quotes::update_quote,
        handlers::quotes::delete_quote,
        handlers::quotes::update_quote_status,
        handlers::quotes::send_quote,
        handlers::quotes::send_quote_for_signature,

        // --- Invoices ---
        handlers::invoices::create_invoice,
        handlers::invoices::list_invoices,
        handlers::invoices::get_invoice,
        handlers::invoices::update_invoice,
        handlers::invoices::delete_invoice,
        handlers::invoices::update_invoice_status,
        handlers::invoices::create_invoice_from_quote,
        handlers::invoices::create_retainer_invoice,
        handlers::invoices::create_balance_invoice,
        handlers::invoices::send_invoice,

        // --- Bills ---
        handlers::bills::create_bill,
        handlers::bills::list_bills,
        handlers::bills::get_bill,
        handlers::bills::update_bill,
        handlers::bills::delete_bill,
        handlers::bills::update_bill_status,
        handlers::bills::create_bill_from_quote,
        handlers::bills::send_bill,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::upload_logo,
        handlers::settings::list_templates,
        handlers::settings::seed_demo_data,
        handlers::settings::delete_test_data,

        // --- Documents / Dashboard / Cron ---
        handlers::documents::download_pdf,
        handlers::dashboard::get_summary,
        handlers::cron::process_recurring,
    ),
    components(
        schemas(
            // --- Documentos (comum) ---
            models::document::InvoiceStatus,
            models::document::RecurringInterval,
            models::document::LineItem,
            models::document::LineItemInput,
            models::document::UpdateStatusPayload,

            // --- Clients ---
            models::client::Client,
            models::client::ClientPayload,
            models::client::ClientOption,
            models::client::ClientDetails,

            // --- Quotes ---
            models::quote::QuoteStatus,
            models::quote::Quote,
            models::quote::QuoteSummary,
            models::quote::QuoteOption,
            models::quote::QuoteDetail,
            models::quote::QuotePayload,

            // --- Invoices ---
            models::invoice::Invoice,
            models::invoice::InvoiceSummary,
            models::invoice::InvoicePage,
            models::invoice::InvoiceDetail,
            models::invoice::InvoicePayload,
            models::invoice::RetainerPayload,

            // --- Bills ---
            models::bill::Bill,
            models::bill::BillSummary,
            models::bill::BillDetail,
            models::bill::BillPayload,

            // --- Settings ---
            models::organization::Organization,
            models::organization::UpdateOrganizationRequest,
            services::document_service::TemplateInfo,
            services::settings_service::SeedRequest,
            services::settings_service::SeedReport,
            services::settings_service::CleanupReport,

            // --- Entrega / Assinatura ---
            services::document_service::DocumentKind,
            services::delivery_service::DeliveryReceipt,
            services::delivery_service::SignatureReceipt,
            services::signing::SigningSubmission,

            // --- Dashboard / Cron ---
            models::dashboard::DashboardSummary,
            models::recurring::RecurringKind,
            models::recurring::RecurringResult,
            models::recurring::RecurringFailure,
            models::recurring::RecurringRunReport,
        )
    ),
    tags(
        (name = "Clients", description = "Cadastro de Clientes"),
        (name = "Quotes", description = "Orçamentos, envio e assinatura"),
        (name = "Invoices", description = "Faturas, adiantamentos e saldos"),
        (name = "Bills", description = "Contas"),
        (name = "Settings", description = "Configurações da Organização"),
        (name = "Dev", description = "Dados de demonstração"),
        (name = "Documents", description = "Exportação em PDF"),
        (name = "Dashboard", description = "Indicadores"),
        (name = "Cron", description = "Geração de documentos recorrentes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cron_secret",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_billing_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/api/invoices/{id}/balance", "/api/pdf/{kind}/{id}", "/api/cron/process-recurring"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
