#[tokio::main]
async fn main() {
    fluxo_observability::init();

    let jwt_secret = std::env::var("FLUXO_JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("FLUXO_JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let app = fluxo_api::app::build_app(jwt_secret).await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
