//! Request/response DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::Value;

use fluxo_registros::Transacao;

/// `POST /auth/token` request body.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub senha: String,
}

/// A transaction plus the company name clients display next to it.
pub fn transacao_to_json(transacao: &Transacao, nome_empresa: Option<&str>) -> Value {
    let mut value = serde_json::to_value(transacao).unwrap_or_else(|_| Value::Null);
    if let Value::Object(map) = &mut value {
        map.insert(
            "nome_empresa".to_string(),
            nome_empresa.map(Into::into).unwrap_or(Value::Null),
        );
    }
    value
}
