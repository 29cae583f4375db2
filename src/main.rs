// src/main.rs

use axum::{routing::get, routing::post, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let company_routes = Router::new()
        .route(
            "/",
            post(handlers::company::create_company).get(handlers::company::list_companies),
        )
        .route(
            "/{id}",
            get(handlers::company::get_company_by_id).put(handlers::company::update_company),
        )
        .route("/{id}/sectors", get(handlers::company::list_company_sectors));

    let sector_routes = Router::new()
        .route(
            "/",
            post(handlers::sector::create_sector).get(handlers::sector::list_sectors),
        )
        .route(
            "/{id}",
            get(handlers::sector::get_sector_by_id).put(handlers::sector::update_sector),
        );

    let address_routes = Router::new()
        .route(
            "/",
            post(handlers::address::create_address).get(handlers::address::list_addresses),
        )
        .route(
            "/{id}",
            get(handlers::address::get_address_by_id).put(handlers::address::update_address),
        );

    let notice_routes = Router::new()
        .route(
            "/",
            post(handlers::notice::create_notice).get(handlers::notice::list_notices),
        )
        .route(
            "/{id}",
            get(handlers::notice::get_notice_by_id).put(handlers::notice::update_notice),
        );

    let auth_routes = Router::new()
        .route(
            "/pessoas",
            post(handlers::auth::create_pessoa).get(handlers::auth::list_pessoas),
        )
        .route(
            "/pessoa/{id}",
            get(handlers::auth::get_pessoa_by_id).put(handlers::auth::update_pessoa),
        )
        .route("/login/{companyId}", post(handlers::auth::login));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/api/companies", company_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/sectors", sector_routes)
        .nest("/api/addresses", address_routes)
        .nest("/api/notices", notice_routes)
        .with_state(app_state.clone());

    let addr = format!("0.0.0.0:{}", app_state.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
