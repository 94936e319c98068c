//src/main.rs

use anyhow::Context;
use chrono::Utc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

#[cfg(all(test, feature = "db-tests"))]
mod testing;

use crate::config::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let Some(period) = app_state.config.recurring_poll {
        spawn_recurring_ticker(app_state.clone(), period);
    }

    let addr = app_state.config.bind_addr.clone();
    let app = routes::app(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}

/// Agendador interno opcional; faz o mesmo que a rota do cron.
fn spawn_recurring_ticker(app_state: AppState, period: std::time::Duration) {
    tracing::info!("⏱️ Processamento de recorrentes a cada {:?}", period);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let today = Utc::now().date_naive();

            match app_state.recurring_service.process_due(&app_state.db_pool, today).await {
                Ok(report) => tracing::info!(
                    "Recorrentes: {} gerados, {} falhas, {} vencidos",
                    report.processed,
                    report.failures.len(),
                    report.overdue_marked
                ),
                Err(e) => tracing::error!("🔥 Falha no processamento de recorrentes: {:?}", e),
            }
        }
    });
}
