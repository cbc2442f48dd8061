use chrono::{Duration as ChronoDuration, Utc};
use fluxo_auth::JwtClaims;
use fluxo_core::ContaId;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        // Store URLs are not configured in tests, so this runs on the
        // in-memory stores.
        let app = fluxo_api::app::build_app(jwt_secret.to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, username: &str) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: ContaId::new(),
        username: username.to_string(),
        iat: now,
        exp: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn create_empresa(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    cnpj: &str,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/empresas", base_url))
        .bearer_auth(token)
        .json(&json!({
            "nome": "Distribuidora Alfa",
            "cnpj": cnpj,
            "tipo": ["Medicamentos"],
            "licitacao": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_token_is_rejected_never_treated_as_anonymous() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let client = reqwest::Client::new();

    // A protected route.
    let res = client
        .get(format!("{}/empresas", srv.base_url))
        .bearer_auth("nao-e-um-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Even the anonymous-accessible login route: a presented-but-invalid
    // credential is rejected, not downgraded to anonymous.
    let res = client
        .post(format!("{}/auth/token", srv.base_url))
        .bearer_auth("nao-e-um-jwt")
        .json(&json!({ "username": "x.view", "senha": "y" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // A token signed with the wrong secret is just as invalid.
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(mint_jwt("other-secret", "ana.dev"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reports_identity_role_and_routed_store() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(mint_jwt(jwt_secret, "ana.dev"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "ana.dev");
    assert_eq!(body["papel"], "dev");
    assert_eq!(body["store"], "testes");

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(mint_jwt(jwt_secret, "bruno.gestor"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["papel"], "gestor");
    assert_eq!(body["store"], "primario");

    // Unrecognized suffix: authenticated, but no role, primary store.
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(mint_jwt(jwt_secret, "dora"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["papel"], "none");
    assert_eq!(body["store"], "primario");
}

#[tokio::test]
async fn dev_requests_are_routed_to_the_tests_store() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let dev = mint_jwt(jwt_secret, "ana.dev");
    let gestor = mint_jwt(jwt_secret, "bruno.gestor");

    create_empresa(&client, &srv.base_url, &dev, "11.111.111/0001-11").await;

    // The gestor looks at the primary store and sees nothing.
    let res = client
        .get(format!("{}/empresas", srv.base_url))
        .bearer_auth(&gestor)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 0);

    // The dev sees the record in the sandbox.
    let res = client
        .get(format!("{}/empresas", srv.base_url))
        .bearer_auth(&dev)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn same_cnpj_may_exist_in_both_stores_but_not_twice_in_one() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let dev = mint_jwt(jwt_secret, "ana.dev");
    let gestor = mint_jwt(jwt_secret, "bruno.gestor");
    let cnpj = "22.222.222/0001-22";

    create_empresa(&client, &srv.base_url, &dev, cnpj).await;
    create_empresa(&client, &srv.base_url, &gestor, cnpj).await;

    let res = client
        .post(format!("{}/empresas", srv.base_url))
        .bearer_auth(&gestor)
        .json(&json!({ "nome": "Duplicada", "cnpj": cnpj }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn view_role_is_read_only() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let view = mint_jwt(jwt_secret, "carla.view");

    let res = client
        .get(format!("{}/empresas", srv.base_url))
        .bearer_auth(&view)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/empresas", srv.base_url))
        .bearer_auth(&view)
        .json(&json!({ "nome": "Bloqueada", "cnpj": "33.333.333/0001-33" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Sem permissão.");
}

#[tokio::test]
async fn account_creation_follows_the_role_table() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let dev = mint_jwt(jwt_secret, "ana.dev");
    let gestor = mint_jwt(jwt_secret, "alice.gestor");
    let view = mint_jwt(jwt_secret, "alice.view");

    // Gestor creating a dev: denied with the gestor-specific reason.
    let res = client
        .post(format!("{}/usuarios", srv.base_url))
        .bearer_auth(&gestor)
        .json(&json!({ "username": "bob.dev", "senha": "s3nh4" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Gestores só podem criar usuários do tipo Visitante (.view)."
    );

    // Gestor creating a visitor: allowed.
    let res = client
        .post(format!("{}/usuarios", srv.base_url))
        .bearer_auth(&gestor)
        .json(&json!({ "username": "bob.view", "senha": "s3nh4" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // View creating anything: denied.
    let res = client
        .post(format!("{}/usuarios", srv.base_url))
        .bearer_auth(&view)
        .json(&json!({ "username": "carol.view", "senha": "s3nh4" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Unrecognized target suffix: a format error, whoever asks.
    for token in [&dev, &gestor] {
        let res = client
            .post(format!("{}/usuarios", srv.base_url))
            .bearer_auth(token)
            .json(&json!({ "username": "bob.admin", "senha": "s3nh4" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["message"], "O usuário deve terminar em .dev, .gestor ou .view");
    }

    // Dev creating a gestor: allowed.
    let res = client
        .post(format!("{}/usuarios", srv.base_url))
        .bearer_auth(&dev)
        .json(&json!({ "username": "bob.gestor", "senha": "s3nh4" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // The stored hash never leaks.
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body.get("senha_hash").is_none());
}

#[tokio::test]
async fn created_account_can_exchange_credentials_for_a_token() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let dev = mint_jwt(jwt_secret, "ana.dev");

    let res = client
        .post(format!("{}/usuarios", srv.base_url))
        .bearer_auth(&dev)
        .json(&json!({ "username": "novo.view", "senha": "correta" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Wrong password: 401.
    let res = client
        .post(format!("{}/auth/token", srv.base_url))
        .json(&json!({ "username": "novo.view", "senha": "errada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Right password: a working token.
    let res = client
        .post(format!("{}/auth/token", srv.base_url))
        .json(&json!({ "username": "novo.view", "senha": "correta" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let access = body["access"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "novo.view");
    assert_eq!(body["papel"], "view");
}

#[tokio::test]
async fn transacao_dates_are_validated_with_all_violations_listed() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let gestor = mint_jwt(jwt_secret, "bruno.gestor");
    let empresa = create_empresa(&client, &srv.base_url, &gestor, "44.444.444/0001-44").await;
    let empresa_id = empresa["id"].as_str().unwrap();

    let amanha = (Utc::now().date_naive() + ChronoDuration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    let depois = (Utc::now().date_naive() + ChronoDuration::days(2))
        .format("%Y-%m-%d")
        .to_string();

    // Future entrada alone.
    let res = client
        .post(format!("{}/transacoes", srv.base_url))
        .bearer_auth(&gestor)
        .json(&json!({
            "empresa": empresa_id,
            "tipo": "entrada",
            "valor_centavos": 125000,
            "data_entrada": amanha
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["campos"]["data_entrada"].is_array());

    // Chronological violation.
    let res = client
        .post(format!("{}/transacoes", srv.base_url))
        .bearer_auth(&gestor)
        .json(&json!({
            "empresa": empresa_id,
            "tipo": "entrada",
            "valor_centavos": 125000,
            "data_entrada": "2024-01-10",
            "data_saida": "2024-01-05"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["campos"]["data_saida"].is_array());

    // Two bad fields: both reported, not just the first.
    let res = client
        .post(format!("{}/transacoes", srv.base_url))
        .bearer_auth(&gestor)
        .json(&json!({
            "empresa": empresa_id,
            "tipo": "entrada",
            "valor_centavos": 125000,
            "data_entrada": amanha,
            "data_saida": depois
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["campos"]["data_entrada"].is_array());
    assert!(body["campos"]["data_saida"].is_array());
}

#[tokio::test]
async fn update_without_data_entrada_validates_against_the_stored_value() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let gestor = mint_jwt(jwt_secret, "bruno.gestor");
    let empresa = create_empresa(&client, &srv.base_url, &gestor, "55.555.555/0001-55").await;
    let empresa_id = empresa["id"].as_str().unwrap();

    // Backdated entry.
    let res = client
        .post(format!("{}/transacoes", srv.base_url))
        .bearer_auth(&gestor)
        .json(&json!({
            "empresa": empresa_id,
            "tipo": "entrada",
            "valor_centavos": 9900,
            "data_entrada": "2024-01-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let transacao: serde_json::Value = res.json().await.unwrap();
    let id = transacao["id"].as_str().unwrap();

    // Patch with a saida that is only valid against the *stored* entrada
    // (2024-01-01). Were the fallback wrongly "today", this would be a
    // chronological error.
    let res = client
        .patch(format!("{}/transacoes/{}", srv.base_url, id))
        .bearer_auth(&gestor)
        .json(&json!({ "status": "pago", "data_saida": "2024-01-05" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "pago");
    assert_eq!(body["data_entrada"], "2024-01-01");
    assert_eq!(body["data_saida"], "2024-01-05");
    assert_eq!(body["nome_empresa"], "Distribuidora Alfa");
}

#[tokio::test]
async fn transacao_defaults_entrada_to_creation_date() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let dev = mint_jwt(jwt_secret, "ana.dev");
    let empresa = create_empresa(&client, &srv.base_url, &dev, "66.666.666/0001-66").await;

    let res = client
        .post(format!("{}/transacoes", srv.base_url))
        .bearer_auth(&dev)
        .json(&json!({
            "empresa": empresa["id"],
            "tipo": "saida",
            "valor_centavos": 50000
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let hoje = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"], hoje.as_str());
    assert_eq!(body["data_entrada"], hoje.as_str());
    assert_eq!(body["status"], "pendente");
}

#[tokio::test]
async fn notifications_are_readable_by_any_authenticated_role() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let gestor = mint_jwt(jwt_secret, "bruno.gestor");
    let view = mint_jwt(jwt_secret, "carla.view");

    let res = client
        .post(format!("{}/notificacoes", srv.base_url))
        .bearer_auth(&gestor)
        .json(&json!({
            "titulo": "Manutenção Programada",
            "mensagem": "Sistema indisponível no sábado.",
            "tipo": "aviso",
            "alvo": "todos"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // The view role reads everything, including gestor-targeted entries.
    let res = client
        .get(format!("{}/notificacoes", srv.base_url))
        .bearer_auth(&view)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["tipo"], "aviso");

    // But cannot mutate them.
    let res = client
        .post(format!("{}/notificacoes", srv.base_url))
        .bearer_auth(&view)
        .json(&json!({
            "titulo": "x",
            "mensagem": "y",
            "tipo": "update",
            "alvo": "todos"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
