//! Chronological invariants on transaction dates.
//!
//! All rules are checked and every violation is reported, keyed by field;
//! callers surface the full list, never just the first hit. Enforced at
//! write time only.

use chrono::NaiveDate;
use serde::Serialize;

use crate::transacao::{AtualizaTransacao, NovaTransacao, Transacao};

/// One violated field, with a user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampoInvalido {
    pub campo: &'static str,
    pub mensagem: String,
}

impl CampoInvalido {
    fn new(campo: &'static str, mensagem: impl Into<String>) -> Self {
        Self {
            campo,
            mensagem: mensagem.into(),
        }
    }
}

/// Check the date rules for an effective (entrada, saida) pair.
///
/// - `data_entrada <= hoje`
/// - `data_saida <= hoje`, when set
/// - `data_saida >= data_entrada`, when both set
pub fn validar_datas(
    data_entrada: NaiveDate,
    data_saida: Option<NaiveDate>,
    hoje: NaiveDate,
) -> Vec<CampoInvalido> {
    let mut violacoes = Vec::new();

    if data_entrada > hoje {
        violacoes.push(CampoInvalido::new(
            "data_entrada",
            "A data de entrada não pode ser futura.",
        ));
    }

    if let Some(saida) = data_saida {
        if saida > hoje {
            violacoes.push(CampoInvalido::new(
                "data_saida",
                "A data de saída não pode ser futura.",
            ));
        }
        if saida < data_entrada {
            violacoes.push(CampoInvalido::new(
                "data_saida",
                "A data de saída não pode ser anterior à data de entrada.",
            ));
        }
    }

    violacoes
}

/// Validate a creation payload. An absent `data_entrada` defaults to the
/// creation date.
pub fn validar_nova(nova: &NovaTransacao, hoje: NaiveDate) -> Result<(), Vec<CampoInvalido>> {
    let entrada = nova.data_entrada.unwrap_or(hoje);
    let violacoes = validar_datas(entrada, nova.data_saida, hoje);
    if violacoes.is_empty() { Ok(()) } else { Err(violacoes) }
}

/// Validate an update against the stored record.
///
/// Fields absent from the payload fall back to the *persisted* values,
/// not to `hoje`. Defaulting an absent `data_entrada` to the current day
/// would silently change what is being validated.
pub fn validar_atualizacao(
    update: &AtualizaTransacao,
    existente: &Transacao,
    hoje: NaiveDate,
) -> Result<(), Vec<CampoInvalido>> {
    let entrada = update.data_entrada.unwrap_or(existente.data_entrada);
    let saida = match update.data_saida {
        None => existente.data_saida,
        Some(saida) => saida,
    };

    let violacoes = validar_datas(entrada, saida, hoje);
    if violacoes.is_empty() { Ok(()) } else { Err(violacoes) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transacao::{TipoTransacao, TipoMaterial, DestinoEntrada};
    use fluxo_core::EmpresaId;

    fn dia(ano: i32, mes: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, d).unwrap()
    }

    fn nova_em(entrada: Option<NaiveDate>, saida: Option<NaiveDate>) -> NovaTransacao {
        NovaTransacao {
            empresa: EmpresaId::new(),
            tipo: TipoTransacao::Entrada,
            status: None,
            nf: None,
            descricao: None,
            valor_centavos: 10_00,
            data_entrada: entrada,
            data_saida: saida,
            tipo_material: Some(TipoMaterial::Insumo),
            destino_entrada: Some(DestinoEntrada::Hospital),
            emenda_origem: None,
        }
    }

    #[test]
    fn future_entrada_is_rejected() {
        let hoje = dia(2024, 1, 10);
        let amanha = dia(2024, 1, 11);

        let err = validar_nova(&nova_em(Some(amanha), None), hoje).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].campo, "data_entrada");
    }

    #[test]
    fn saida_before_entrada_is_a_chronological_error() {
        let hoje = dia(2024, 1, 15);

        let err = validar_nova(
            &nova_em(Some(dia(2024, 1, 10)), Some(dia(2024, 1, 5))),
            hoje,
        )
        .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].campo, "data_saida");
        assert!(err[0].mensagem.contains("anterior"));
    }

    #[test]
    fn all_violations_are_reported_together() {
        let hoje = dia(2024, 1, 10);

        // Future entrada AND an even-later saida: both fields must show up.
        let err = validar_nova(
            &nova_em(Some(dia(2024, 1, 20)), Some(dia(2024, 1, 25))),
            hoje,
        )
        .unwrap_err();

        let campos: Vec<_> = err.iter().map(|v| v.campo).collect();
        assert!(campos.contains(&"data_entrada"));
        assert!(campos.contains(&"data_saida"));
    }

    #[test]
    fn absent_entrada_defaults_to_today_on_create() {
        let hoje = dia(2024, 1, 10);
        assert!(validar_nova(&nova_em(None, Some(hoje)), hoje).is_ok());
    }

    #[test]
    fn absent_entrada_falls_back_to_stored_value_on_update() {
        let hoje = dia(2024, 6, 1);
        let existente = Transacao::criar(
            nova_em(Some(dia(2024, 1, 1)), None),
            dia(2024, 1, 2),
        );

        // No data_entrada in the payload; the stored 2024-01-01 governs, so
        // a saida of 2024-05-30 is fine.
        let update = AtualizaTransacao {
            data_saida: Some(Some(dia(2024, 5, 30))),
            ..Default::default()
        };
        assert!(validar_atualizacao(&update, &existente, hoje).is_ok());

        // Had the fallback wrongly been `hoje` (2024-06-01), that same
        // saida would be rejected as before-entrada.
        assert!(!validar_datas(hoje, Some(dia(2024, 5, 30)), hoje).is_empty());
    }

    #[test]
    fn explicit_null_saida_skips_the_pair_rule() {
        let hoje = dia(2024, 6, 1);
        let existente = Transacao::criar(
            nova_em(Some(dia(2024, 5, 1)), Some(dia(2024, 5, 20))),
            dia(2024, 5, 20),
        );

        let update = AtualizaTransacao {
            data_saida: Some(None),
            ..Default::default()
        };
        assert!(validar_atualizacao(&update, &existente, hoje).is_ok());
    }
}
