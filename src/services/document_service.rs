// src/services/document_service.rs
//
// Geração de PDF (genpdf) para orçamentos, faturas e contas.
// A montagem dos textos (`build_view`) é separada da renderização para
// poder ser testada sem fontes instaladas.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::NaiveDate;
use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Acquire, Executor, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        money::{format_currency, format_price},
    },
    db::OrganizationRepository,
    models::{
        bill::BillDetail,
        client::Client,
        document::LineItem,
        invoice::InvoiceDetail,
        organization::Organization,
        quote::QuoteDetail,
    },
    services::{bill_service::BillService, invoice_service::InvoiceService, quote_service::QuoteService},
};

// =============================================================================
//  TIPOS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quote,
    Invoice,
    Bill,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Quote => "Quote",
            DocumentKind::Invoice => "Invoice",
            DocumentKind::Bill => "Bill",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quote" => Ok(DocumentKind::Quote),
            "invoice" => Ok(DocumentKind::Invoice),
            "bill" => Ok(DocumentKind::Bill),
            other => Err(AppError::BadRequest(format!("Unknown document type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Classic,
    Minimal,
}

impl Template {
    pub fn from_setting(value: Option<&str>) -> Self {
        match value {
            Some("minimal") => Template::Minimal,
            _ => Template::Classic,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    #[schema(example = "classic")]
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub fn available_templates() -> Vec<TemplateInfo> {
    vec![
        TemplateInfo {
            id: "classic",
            name: "Classic",
            description: "Framed item table, bank details and SEPA payment QR code",
        },
        TemplateInfo {
            id: "minimal",
            name: "Minimal",
            description: "Plain layout without bank details",
        },
    ]
}

/// Dados de qualquer documento, já com cliente e itens.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub kind: DocumentKind,
    pub id: Uuid,
    pub number: String,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub total: Decimal,
    pub retainer_deduction: Option<Decimal>,
    pub retainer_number: Option<String>,
    pub client: Client,
    pub items: Vec<LineItem>,
}

impl From<QuoteDetail> for DocumentSource {
    fn from(d: QuoteDetail) -> Self {
        Self {
            kind: DocumentKind::Quote,
            id: d.header.id,
            number: d.header.number,
            date: d.header.date,
            due_date: d.header.due_date,
            notes: d.header.notes,
            total: d.header.total,
            retainer_deduction: None,
            retainer_number: None,
            client: d.client,
            items: d.items,
        }
    }
}

impl From<InvoiceDetail> for DocumentSource {
    fn from(d: InvoiceDetail) -> Self {
        let retainer_deduction = if d.header.is_balance { d.header.retainer_deduction_amount } else { None };
        Self {
            kind: DocumentKind::Invoice,
            id: d.header.id,
            number: d.header.number,
            date: d.header.date,
            due_date: d.header.due_date,
            notes: d.header.notes,
            total: d.header.total,
            retainer_deduction,
            retainer_number: d.retainer_invoice_number,
            client: d.client,
            items: d.items,
        }
    }
}

impl From<BillDetail> for DocumentSource {
    fn from(d: BillDetail) -> Self {
        Self {
            kind: DocumentKind::Bill,
            id: d.header.id,
            number: d.header.number,
            date: d.header.date,
            due_date: d.header.due_date,
            notes: d.header.notes,
            total: d.header.total,
            retainer_deduction: None,
            retainer_number: None,
            client: d.client,
            items: d.items,
        }
    }
}

// =============================================================================
//  VIEW MODEL
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ItemRow {
    pub label: String,
    pub detail: Option<String>,
    pub quantity: String,
    pub price: String,
    pub vat: String,
    pub total: String,
}

#[derive(Debug, Clone)]
pub struct DocumentView {
    pub kind: DocumentKind,
    pub number: String,
    pub filename: String,
    pub template: Template,
    pub logo_path: Option<PathBuf>,
    pub date: String,
    pub due_date: Option<String>,
    pub seller_name: String,
    pub seller_lines: Vec<String>,
    pub client_name: String,
    pub client_lines: Vec<String>,
    pub rows: Vec<ItemRow>,
    pub total: String,
    /// (rótulo, valor) da dedução do adiantamento
    pub deduction: Option<(String, String)>,
    pub amount_due: Option<String>,
    pub notes: Option<String>,
    pub bank_lines: Vec<String>,
    pub payment_qr: Option<String>,
}

/// Payload EPC069-12 ("GiroCode") para transferência SEPA.
pub fn epc_payload(bic: Option<&str>, beneficiary: &str, iban: &str, amount: Decimal, reference: &str) -> Option<String> {
    let amount = amount.round_dp(2);
    if amount < Decimal::new(1, 2) || amount > Decimal::new(99_999_999_999, 2) {
        return None;
    }

    let name: String = beneficiary.chars().take(70).collect();
    let reference: String = reference.chars().take(140).collect();
    let iban = iban.replace(' ', "").to_uppercase();

    Some(format!(
        "BCD\n002\n1\nSCT\n{}\n{}\n{}\nEUR{:.2}\n\n\n{}",
        bic.unwrap_or_default(),
        name,
        iban,
        amount,
        reference
    ))
}

fn format_date(date: NaiveDate, decimal_separator: &str) -> String {
    if decimal_separator == "," {
        date.format("%d/%m/%Y").to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

fn format_quantity(quantity: Decimal, decimal_separator: &str) -> String {
    let plain = quantity.normalize().to_string();
    if decimal_separator == "," { plain.replace('.', ",") } else { plain }
}

fn non_empty(values: impl IntoIterator<Item = Option<String>>) -> Vec<String> {
    values
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn city_line(zip: &Option<String>, city: &Option<String>) -> Option<String> {
    let joined = [zip.as_deref(), city.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    Some(joined).filter(|l| !l.trim().is_empty())
}

pub fn build_view(source: &DocumentSource, org: Option<&Organization>) -> DocumentView {
    let currency = org.map(|o| o.currency.as_str()).unwrap_or("EUR");
    let sep = org.map(|o| o.decimal_separator.as_str()).unwrap_or(",");
    let price = |amount: Decimal| format_price(amount, currency, sep);

    let template_setting = org.and_then(|o| match source.kind {
        DocumentKind::Quote => o.quote_template.as_deref(),
        _ => o.invoice_template.as_deref(),
    });
    let template = Template::from_setting(template_setting);

    let rows = source
        .items
        .iter()
        .map(|item| {
            let title = item.title.clone().filter(|t| !t.trim().is_empty());
            let description = Some(item.description.clone()).filter(|d| !d.trim().is_empty());
            let (label, detail) = match title {
                Some(t) => (t, description),
                None => (description.unwrap_or_default(), None),
            };
            ItemRow {
                label,
                detail,
                quantity: format_quantity(item.quantity, sep),
                price: price(item.price),
                vat: format!("{}%", format_quantity(item.vat, sep)),
                total: price(item.total),
            }
        })
        .collect();

    let (deduction, amount_due) = match source.retainer_deduction {
        Some(d) => {
            let label = match &source.retainer_number {
                Some(n) => format!("Retainer invoice {}", n),
                None => "Retainer".to_string(),
            };
            (Some((label, format!("-{}", price(d)))), Some(price(source.total - d)))
        }
        None => (None, None),
    };
    let payable = source.total - source.retainer_deduction.unwrap_or_default();

    let (seller_name, seller_lines) = match org {
        Some(o) => (
            o.name.clone(),
            non_empty([
                o.address.clone(),
                city_line(&o.zip_code, &o.city),
                o.country.clone(),
                o.vat_number.clone().map(|v| format!("VAT: {}", v)),
                o.company_id.clone().map(|c| format!("Company ID: {}", c)),
                o.email.clone(),
                o.phone.clone(),
                o.website.clone(),
            ]),
        ),
        None => (String::new(), Vec::new()),
    };

    let c = &source.client;
    let client_lines = non_empty([
        c.address.clone(),
        city_line(&c.zip_code, &c.city),
        c.country.clone(),
        c.vat_number.clone().map(|v| format!("VAT: {}", v)),
        c.company_id.clone().map(|v| format!("Company ID: {}", v)),
        c.email.clone(),
    ]);

    // Bloco bancário e QR só em documentos de cobrança
    let payable_document = source.kind != DocumentKind::Quote && template == Template::Classic;
    let (bank_lines, payment_qr) = match org {
        Some(o) if payable_document => {
            let beneficiary = o.bank_beneficiary.clone().unwrap_or_else(|| o.name.clone());
            let lines = if o.iban.is_some() {
                non_empty([
                    Some(format!("Beneficiary: {}", beneficiary)),
                    o.bank_name.clone().map(|b| format!("Bank: {}", b)),
                    o.iban.clone().map(|i| format!("IBAN: {}", i)),
                    o.bic.clone().map(|b| format!("BIC: {}", b)),
                    Some(format!("Reference: {}", source.number)),
                ])
            } else {
                Vec::new()
            };
            let qr = match (&o.iban, o.currency.as_str()) {
                (Some(iban), "EUR") => epc_payload(o.bic.as_deref(), &beneficiary, iban, payable, &source.number),
                _ => None,
            };
            (lines, qr)
        }
        _ => (Vec::new(), None),
    };

    DocumentView {
        kind: source.kind,
        number: source.number.clone(),
        filename: format!("{}-{}.pdf", source.kind.label(), source.number),
        template,
        logo_path: org.and_then(|o| o.logo_url.as_ref()).map(PathBuf::from),
        date: format_date(source.date, sep),
        due_date: source.due_date.map(|d| format_date(d, sep)),
        seller_name,
        seller_lines,
        client_name: c.name.clone(),
        client_lines,
        rows,
        total: price(source.total),
        deduction,
        amount_due,
        notes: source.notes.clone().filter(|n| !n.trim().is_empty()),
        bank_lines,
        payment_qr,
    }
}

// =============================================================================
//  RENDERIZAÇÃO
// =============================================================================

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::PdfError(e.to_string())
}

fn text_block(lines: &[String], size: u8) -> elements::LinearLayout {
    let mut layout = elements::LinearLayout::vertical();
    for line in lines {
        layout.push(elements::Paragraph::new(line.as_str()).styled(style::Style::new().with_font_size(size)));
    }
    layout
}

fn logo_element(path: &Path) -> Option<elements::Image> {
    if !path.exists() {
        return None;
    }
    // genpdf não aceita canal alfa
    let logo = match image::open(path) {
        Ok(img) => image::DynamicImage::ImageRgb8(img.to_rgb8()),
        Err(e) => {
            tracing::warn!("Logo ignorado ({}): {}", path.display(), e);
            return None;
        }
    };
    elements::Image::from_dynamic_image(logo)
        .map(|img| img.with_scale(genpdf::Scale::new(0.4, 0.4)))
        .map_err(|e| tracing::warn!("Logo ignorado: {}", e))
        .ok()
}

fn qr_element(payload: &str) -> Result<elements::Image, AppError> {
    let code = QrCode::new(payload.as_bytes()).map_err(pdf_error)?;
    let buffer = code.render::<Luma<u8>>().build();
    let image = image::DynamicImage::ImageLuma8(buffer);

    elements::Image::from_dynamic_image(image)
        .map(|img| img.with_scale(genpdf::Scale::new(0.5, 0.5)))
        .map_err(pdf_error)
}

pub fn render_pdf(view: &DocumentView, fonts_dir: &Path) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|e| AppError::FontNotFound(format!("{}: {}", fonts_dir.display(), e)))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("{} {}", view.kind.label(), view.number));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(if view.template == Template::Minimal { 15 } else { 10 });
    doc.set_page_decorator(decorator);

    let bold = style::Style::new().bold();

    // --- CABEÇALHO ---
    if let Some(logo) = view.logo_path.as_deref().and_then(logo_element) {
        doc.push(logo);
    }
    if !view.seller_name.is_empty() {
        doc.push(elements::Paragraph::new(view.seller_name.as_str()).styled(bold.with_font_size(16)));
        doc.push(text_block(&view.seller_lines, 9));
    }
    doc.push(elements::Break::new(1.5));

    let title = format!("{} {}", view.kind.label().to_uppercase(), view.number);
    doc.push(elements::Paragraph::new(title).styled(bold.with_font_size(14)));
    doc.push(elements::Paragraph::new(format!("Date: {}", view.date)));
    if let Some(due) = &view.due_date {
        doc.push(elements::Paragraph::new(format!("Due date: {}", due)));
    }
    doc.push(elements::Break::new(1));

    // --- CLIENTE ---
    doc.push(elements::Paragraph::new("Bill to").styled(style::Style::new().italic().with_font_size(9)));
    doc.push(elements::Paragraph::new(view.client_name.as_str()).styled(bold));
    doc.push(text_block(&view.client_lines, 9));
    doc.push(elements::Break::new(2));

    // --- ITENS ---
    // Pesos: Descrição (5), Qtd (1), Preço (2), IVA (1), Total (2)
    let mut table = elements::TableLayout::new(vec![5, 1, 2, 1, 2]);
    if view.template == Template::Classic {
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    }
    table
        .row()
        .element(elements::Paragraph::new("Description").styled(bold))
        .element(elements::Paragraph::new("Qty").styled(bold))
        .element(elements::Paragraph::new("Price").styled(bold))
        .element(elements::Paragraph::new("VAT").styled(bold))
        .element(elements::Paragraph::new("Total").styled(bold))
        .push()
        .map_err(pdf_error)?;

    for row in &view.rows {
        let mut description = elements::LinearLayout::vertical();
        description.push(elements::Paragraph::new(row.label.as_str()));
        if let Some(detail) = &row.detail {
            description.push(elements::Paragraph::new(detail.as_str()).styled(style::Style::new().with_font_size(8)));
        }
        table
            .row()
            .element(description)
            .element(elements::Paragraph::new(row.quantity.as_str()))
            .element(elements::Paragraph::new(row.price.as_str()))
            .element(elements::Paragraph::new(row.vat.as_str()))
            .element(elements::Paragraph::new(row.total.as_str()).aligned(Alignment::Right))
            .push()
            .map_err(pdf_error)?;
    }
    doc.push(table);
    doc.push(elements::Break::new(1));

    // --- TOTAIS ---
    doc.push(
        elements::Paragraph::new(format!("Total: {}", view.total))
            .aligned(Alignment::Right)
            .styled(bold.with_font_size(12)),
    );
    if let (Some((label, amount)), Some(due)) = (&view.deduction, &view.amount_due) {
        doc.push(elements::Paragraph::new(format!("{}: {}", label, amount)).aligned(Alignment::Right));
        doc.push(
            elements::Paragraph::new(format!("Amount due: {}", due))
                .aligned(Alignment::Right)
                .styled(bold.with_font_size(12)),
        );
    }

    if let Some(notes) = &view.notes {
        doc.push(elements::Break::new(1.5));
        doc.push(elements::Paragraph::new(notes.as_str()).styled(style::Style::new().italic().with_font_size(9)));
    }

    // --- PAGAMENTO ---
    if !view.bank_lines.is_empty() {
        doc.push(elements::Break::new(2));
        doc.push(elements::Paragraph::new("Payment details").styled(bold));
        doc.push(text_block(&view.bank_lines, 9));
    }
    if let Some(payload) = &view.payment_qr {
        doc.push(elements::Break::new(1));
        doc.push(qr_element(payload)?);
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub id: Uuid,
    pub number: String,
    pub filename: String,
    pub client: Client,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentService {
    quote_service: QuoteService,
    invoice_service: InvoiceService,
    bill_service: BillService,
    org_repo: OrganizationRepository,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        quote_service: QuoteService,
        invoice_service: InvoiceService,
        bill_service: BillService,
        org_repo: OrganizationRepository,
        fonts_dir: PathBuf,
    ) -> Self {
        Self { quote_service, invoice_service, bill_service, org_repo, fonts_dir }
    }

    pub async fn render<'e, E>(&self, executor: E, kind: DocumentKind, id: Uuid) -> Result<RenderedDocument, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let source: DocumentSource = match kind {
            DocumentKind::Quote => self.quote_service.get(&mut *conn, id).await?.into(),
            DocumentKind::Invoice => self.invoice_service.get(&mut *conn, id).await?.into(),
            DocumentKind::Bill => self.bill_service.get(&mut *conn, id).await?.into(),
        };
        let org = self.org_repo.get(&mut *conn).await?;
        drop(conn);

        let view = build_view(&source, org.as_ref());
        let bytes = render_pdf(&view, &self.fonts_dir)?;
        tracing::debug!("PDF {} gerado ({} bytes)", view.filename, bytes.len());

        Ok(RenderedDocument {
            kind,
            id: source.id,
            number: source.number,
            filename: view.filename,
            client: source.client,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn client() -> Client {
        Client {
            id: Uuid::new_v4(),
            name: "Acme Corp".into(),
            email: Some("billing@acme.test".into()),
            phone: None,
            address: Some("Rue Haute 1".into()),
            city: Some("Brussels".into()),
            zip_code: Some("1000".into()),
            country: None,
            vat_number: None,
            company_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn organization() -> Organization {
        Organization {
            id: Uuid::new_v4(),
            name: "Freelance Hub SRL".into(),
            company_id: None,
            vat_number: Some("BE0123456789".into()),
            default_vat: d("21"),
            address: None,
            city: None,
            zip_code: None,
            country: None,
            email: None,
            phone: None,
            website: None,
            language: "en".into(),
            currency: "EUR".into(),
            decimal_separator: ",".into(),
            bank_name: None,
            bank_beneficiary: None,
            iban: Some("BE71096123456769".into()),
            bic: Some("GKCCBEBB".into()),
            logo_url: None,
            invoice_template: None,
            quote_template: None,
            invoice_prefix: "INV-".into(),
            invoice_include_prefix: true,
            invoice_include_year: true,
            invoice_include_month: false,
            invoice_sequence: 1,
            invoice_digits: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn source(kind: DocumentKind) -> DocumentSource {
        DocumentSource {
            kind,
            id: Uuid::new_v4(),
            number: "INV-20260007".into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 11, 15),
            notes: Some("  ".into()),
            total: d("1210.00"),
            retainer_deduction: None,
            retainer_number: None,
            client: client(),
            items: vec![LineItem {
                id: Uuid::new_v4(),
                position: 0,
                title: Some("Website redesign".into()),
                description: "Two pages".into(),
                quantity: d("2.000"),
                price: d("500.00"),
                vat: d("21.00"),
                total: d("1210.00"),
            }],
        }
    }

    #[test]
    fn kind_parsing_rejects_unknown_types() {
        assert_eq!("bill".parse::<DocumentKind>().unwrap(), DocumentKind::Bill);
        assert!(matches!("receipt".parse::<DocumentKind>(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn epc_payload_layout() {
        let payload = epc_payload(Some("GKCCBEBB"), "Freelance Hub SRL", "be71 0961 2345 6769", d("847"), "INV-20260007").unwrap();
        assert_eq!(
            payload,
            "BCD\n002\n1\nSCT\nGKCCBEBB\nFreelance Hub SRL\nBE71096123456769\nEUR847.00\n\n\nINV-20260007"
        );
    }

    #[test]
    fn epc_payload_rejects_zero_amounts() {
        assert!(epc_payload(None, "X", "BE71096123456769", Decimal::ZERO, "R").is_none());
    }

    #[test]
    fn invoice_view_formats_with_organization_settings() {
        let org = organization();
        let view = build_view(&source(DocumentKind::Invoice), Some(&org));

        assert_eq!(view.filename, "Invoice-INV-20260007.pdf");
        assert_eq!(view.date, "16/10/2026");
        assert_eq!(view.total, "1 210,00 EUR");
        assert_eq!(view.rows[0].quantity, "2");
        assert_eq!(view.rows[0].vat, "21%");
        assert_eq!(view.rows[0].detail.as_deref(), Some("Two pages"));
        assert_eq!(view.client_lines, vec!["Rue Haute 1", "1000 Brussels", "billing@acme.test"]);
        assert!(view.notes.is_none());
        assert!(view.payment_qr.as_deref().unwrap().ends_with("EUR1210.00\n\n\nINV-20260007"));
        assert!(view.bank_lines.iter().any(|l| l == "IBAN: BE71096123456769"));
    }

    #[test]
    fn balance_invoice_shows_deduction_and_amount_due() {
        let mut src = source(DocumentKind::Invoice);
        src.retainer_deduction = Some(d("363.00"));
        src.retainer_number = Some("INV-20260003".into());

        let view = build_view(&src, Some(&organization()));
        let (label, amount) = view.deduction.unwrap();
        assert_eq!(label, "Retainer invoice INV-20260003");
        assert_eq!(amount, "-363,00 EUR");
        assert_eq!(view.amount_due.as_deref(), Some("847,00 EUR"));
        assert!(view.payment_qr.unwrap().contains("EUR847.00"));
    }

    #[test]
    fn quotes_and_minimal_template_have_no_payment_block() {
        let mut org = organization();
        let quote = build_view(&source(DocumentKind::Quote), Some(&org));
        assert!(quote.bank_lines.is_empty());
        assert!(quote.payment_qr.is_none());

        org.invoice_template = Some("minimal".into());
        let invoice = build_view(&source(DocumentKind::Invoice), Some(&org));
        assert_eq!(invoice.template, Template::Minimal);
        assert!(invoice.payment_qr.is_none());
    }

    #[test]
    fn qr_needs_euro_currency() {
        let mut org = organization();
        org.currency = "USD".into();
        org.decimal_separator = ".".into();
        let view = build_view(&source(DocumentKind::Bill), Some(&org));
        assert!(view.payment_qr.is_none());
        assert_eq!(view.total, "1,210.00 USD");
        assert_eq!(view.date, "2026-10-16");
    }

    #[test]
    fn without_organization_defaults_apply() {
        let view = build_view(&source(DocumentKind::Invoice), None);
        assert_eq!(view.seller_name, "");
        assert_eq!(view.total, "1 210,00 EUR");
        assert!(view.payment_qr.is_none());
    }
}
