// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::cron::cron_guard};

pub fn app(app_state: AppState) -> Router {
    let client_routes = Router::new()
        .route("/"
               ,post(handlers::clients::create_client)
               .get(handlers::clients::list_clients)
        )
        .route("/search", get(handlers::clients::search_clients))
        .route("/{id}"
               ,get(handlers::clients::get_client)
               .put(handlers::clients::update_client)
               .delete(handlers::clients::delete_client)
        )
        .route("/{id}/details", get(handlers::clients::get_client_details));

    let quote_routes = Router::new()
        .route("/"
               ,post(handlers::quotes::create_quote)
               .get(handlers::quotes::list_quotes)
        )
        .route("/search", get(handlers::quotes::search_quotes))
        .route("/{id}"
               ,get(handlers::quotes::get_quote)
               .put(handlers::quotes::update_quote)
               .delete(handlers::quotes::delete_quote)
        )
        .route("/{id}/status", patch(handlers::quotes::update_quote_status))
        .route("/{id}/send", post(handlers::quotes::send_quote))
        .route("/{id}/sign", post(handlers::quotes::send_quote_for_signature));

    let invoice_routes = Router::new()
        .route("/"
               ,post(handlers::invoices::create_invoice)
               .get(handlers::invoices::list_invoices)
        )
        .route("/retainer", post(handlers::invoices::create_retainer_invoice))
        .route("/from-quote/{quote_id}", post(handlers::invoices::create_invoice_from_quote))
        .route("/{id}"
               ,get(handlers::invoices::get_invoice)
               .put(handlers::invoices::update_invoice)
               .delete(handlers::invoices::delete_invoice)
        )
        .route("/{id}/status", patch(handlers::invoices::update_invoice_status))
        .route("/{id}/balance", post(handlers::invoices::create_balance_invoice))
        .route("/{id}/send", post(handlers::invoices::send_invoice));

    let bill_routes = Router::new()
        .route("/"
               ,post(handlers::bills::create_bill)
               .get(handlers::bills::list_bills)
        )
        .route("/from-quote/{quote_id}", post(handlers::bills::create_bill_from_quote))
        .route("/{id}"
               ,get(handlers::bills::get_bill)
               .put(handlers::bills::update_bill)
               .delete(handlers::bills::delete_bill)
        )
        .route("/{id}/status", patch(handlers::bills::update_bill_status))
        .route("/{id}/send", post(handlers::bills::send_bill));

    let settings_routes = Router::new()
        .route("/"
               ,get(handlers::settings::get_settings)
               .put(handlers::settings::update_settings)
        )
        .route("/logo", post(handlers::settings::upload_logo))
        .route("/templates", get(handlers::settings::list_templates));

    let dev_routes = Router::new()
        .route("/seed", post(handlers::settings::seed_demo_data))
        .route("/test-data", axum::routing::delete(handlers::settings::delete_test_data));

    // Protegido por CRON_SECRET (quando configurado)
    let cron_routes = Router::new()
        .route("/process-recurring"
               ,get(handlers::cron::process_recurring)
               .post(handlers::cron::process_recurring)
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            cron_guard,
        ));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(handlers::dashboard::get_summary))
        .route("/api/pdf/{kind}/{id}", get(handlers::documents::download_pdf))
        .nest("/api/clients", client_routes)
        .nest("/api/quotes", quote_routes)
        .nest("/api/invoices", invoice_routes)
        .nest("/api/bills", bill_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/dev", dev_routes)
        .nest("/api/cron", cron_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
