// src/config.rs

use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        BillRepository, ClientRepository, DashboardRepository, InvoiceRepository, OrganizationRepository,
        QuoteRepository,
    },
    services::{
        bill_service::BillService, client_service::ClientService, dashboard_service::DashboardService,
        delivery_service::DeliveryService, document_service::DocumentService, email::EmailClient,
        invoice_service::InvoiceService, numbering::NumberingService, quote_service::QuoteService,
        recurring_service::RecurringService, settings_service::SettingsService, signing::SigningClient,
    },
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_BREVO_API_URL: &str = "https://api.brevo.com/v3";
pub const DEFAULT_DOCUSEAL_URL: &str = "http://localhost:3002";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub brevo_api_key: Option<String>,
    pub brevo_api_url: String,
    pub email_sender_name: String,
    pub email_sender_address: String,
    pub docuseal_url: String,
    pub docuseal_api_key: Option<String>,
    /// Sem segredo a rota do cron fica aberta
    pub cron_secret: Option<String>,
    /// Intervalo do agendador interno; ausente = só via rota do cron
    pub recurring_poll: Option<Duration>,
    pub fonts_dir: PathBuf,
    pub upload_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave → valor.
    /// Valores vazios contam como ausentes.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {}", raw))?,
            None => 5,
        };

        let recurring_poll = match get("RECURRING_POLL_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .with_context(|| format!("RECURRING_POLL_SECS inválido: {}", raw))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections,
            brevo_api_key: get("BREVO_API_KEY"),
            brevo_api_url: get("BREVO_API_URL").unwrap_or_else(|| DEFAULT_BREVO_API_URL.to_string()),
            email_sender_name: get("EMAIL_SENDER_NAME").unwrap_or_else(|| "Billing".to_string()),
            email_sender_address: get("EMAIL_SENDER_ADDRESS").unwrap_or_else(|| "billing@example.com".to_string()),
            docuseal_url: get("DOCUSEAL_URL").unwrap_or_else(|| DEFAULT_DOCUSEAL_URL.to_string()),
            docuseal_api_key: get("DOCUSEAL_API_KEY"),
            cron_secret: get("CRON_SECRET"),
            recurring_poll,
            fonts_dir: get("FONTS_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./fonts")),
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("./uploads")),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,

    pub client_service: ClientService,
    pub quote_service: QuoteService,
    pub invoice_service: InvoiceService,
    pub bill_service: BillService,
    pub recurring_service: RecurringService,
    pub document_service: DocumentService,
    pub delivery_service: DeliveryService,
    pub settings_service: SettingsService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        // --- Repositórios ---
        let client_repo = ClientRepository::new(db_pool.clone());
        let quote_repo = QuoteRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let bill_repo = BillRepository::new(db_pool.clone());
        let org_repo = OrganizationRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        // --- Serviços ---
        let numbering = NumberingService::new(org_repo.clone());

        let client_service = ClientService::new(
            client_repo.clone(),
            quote_repo.clone(),
            invoice_repo.clone(),
            bill_repo.clone(),
        );
        let quote_service = QuoteService::new(quote_repo.clone(), client_repo.clone(), org_repo.clone());
        let invoice_service = InvoiceService::new(
            invoice_repo.clone(),
            quote_repo.clone(),
            client_repo.clone(),
            org_repo.clone(),
            numbering.clone(),
        );
        let bill_service = BillService::new(bill_repo.clone(), quote_repo.clone(), client_repo.clone(), org_repo.clone());
        let recurring_service = RecurringService::new(
            invoice_repo.clone(),
            bill_repo.clone(),
            invoice_service.clone(),
            bill_service.clone(),
        );
        let document_service = DocumentService::new(
            quote_service.clone(),
            invoice_service.clone(),
            bill_service.clone(),
            org_repo.clone(),
            config.fonts_dir.clone(),
        );

        let email = EmailClient::new(
            &config.brevo_api_url,
            config.brevo_api_key.clone(),
            config.email_sender_name.clone(),
            config.email_sender_address.clone(),
        );
        let signing = SigningClient::new(&config.docuseal_url, config.docuseal_api_key.clone());
        let delivery_service = DeliveryService::new(
            document_service.clone(),
            email,
            signing,
            quote_repo.clone(),
            invoice_repo.clone(),
            bill_repo.clone(),
        );

        let settings_service = SettingsService::new(
            org_repo,
            client_repo,
            quote_repo.clone(),
            invoice_repo.clone(),
            numbering,
            config.upload_dir.clone(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo, quote_repo, invoice_repo, bill_repo);

        Self {
            db_pool,
            config,
            client_service,
            quote_service,
            invoice_service,
            bill_service,
            recurring_service,
            document_service,
            delivery_service,
            settings_service,
            dashboard_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_is_set() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/billing")]).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(cfg.db_max_connections, 5);
        assert_eq!(cfg.docuseal_url, DEFAULT_DOCUSEAL_URL);
        assert_eq!(cfg.fonts_dir, PathBuf::from("./fonts"));
        assert_eq!(cfg.upload_dir, PathBuf::from("./uploads"));
        assert!(cfg.brevo_api_key.is_none());
        assert!(cfg.cron_secret.is_none());
        assert!(cfg.recurring_poll.is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("DATABASE_URL", "  ")]).is_err());
    }

    #[test]
    fn blank_secrets_count_as_unset() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/billing"),
            ("CRON_SECRET", ""),
            ("BREVO_API_KEY", "xkeysib-123"),
        ])
        .unwrap();
        assert!(cfg.cron_secret.is_none());
        assert_eq!(cfg.brevo_api_key.as_deref(), Some("xkeysib-123"));
    }

    #[test]
    fn poll_interval_and_pool_size_are_parsed() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://localhost/billing"),
            ("RECURRING_POLL_SECS", "3600"),
            ("DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(cfg.recurring_poll, Some(Duration::from_secs(3600)));
        assert_eq!(cfg.db_max_connections, 12);

        let zero = config(&[("DATABASE_URL", "x"), ("RECURRING_POLL_SECS", "0")]).unwrap();
        assert!(zero.recurring_poll.is_none());

        assert!(config(&[("DATABASE_URL", "x"), ("DB_MAX_CONNECTIONS", "many")]).is_err());
    }
}
