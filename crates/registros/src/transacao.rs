//! Financial transaction records ("Transacao").

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use fluxo_core::{EmpresaId, TransacaoId};

/// Direction of the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoTransacao {
    Entrada,
    Saida,
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTransacao {
    #[default]
    Pendente,
    Pago,
}

/// Classification of received material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoMaterial {
    Laboratorio,
    Medicamentos,
    Insumo,
}

/// Where received material was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinoEntrada {
    Hospital,
    AtencaoPrimaria,
}

impl TipoTransacao {
    pub fn as_str(self) -> &'static str {
        match self {
            TipoTransacao::Entrada => "entrada",
            TipoTransacao::Saida => "saida",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entrada" => Some(TipoTransacao::Entrada),
            "saida" => Some(TipoTransacao::Saida),
            _ => None,
        }
    }
}

impl StatusTransacao {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusTransacao::Pendente => "pendente",
            StatusTransacao::Pago => "pago",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pendente" => Some(StatusTransacao::Pendente),
            "pago" => Some(StatusTransacao::Pago),
            _ => None,
        }
    }
}

impl TipoMaterial {
    pub fn as_str(self) -> &'static str {
        match self {
            TipoMaterial::Laboratorio => "laboratorio",
            TipoMaterial::Medicamentos => "medicamentos",
            TipoMaterial::Insumo => "insumo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "laboratorio" => Some(TipoMaterial::Laboratorio),
            "medicamentos" => Some(TipoMaterial::Medicamentos),
            "insumo" => Some(TipoMaterial::Insumo),
            _ => None,
        }
    }
}

impl DestinoEntrada {
    pub fn as_str(self) -> &'static str {
        match self {
            DestinoEntrada::Hospital => "hospital",
            DestinoEntrada::AtencaoPrimaria => "atencao_primaria",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hospital" => Some(DestinoEntrada::Hospital),
            "atencao_primaria" => Some(DestinoEntrada::AtencaoPrimaria),
            _ => None,
        }
    }
}

/// A financial transaction tied to a company in the same store.
///
/// Monetary values are centavos (smallest currency unit); no floats.
/// Date invariants are enforced at write time only, by
/// [`crate::datas`]; records are never re-validated on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transacao {
    pub id: TransacaoId,
    pub empresa: EmpresaId,
    pub tipo: TipoTransacao,
    pub status: StatusTransacao,

    /// Fiscal note number.
    pub nf: Option<String>,
    pub descricao: Option<String>,
    pub valor_centavos: i64,

    /// Creation date, server-assigned.
    pub data: NaiveDate,

    /// Date the material/payment entered. Back-datable, never future.
    pub data_entrada: NaiveDate,

    /// Settlement date, when known.
    pub data_saida: Option<NaiveDate>,

    pub tipo_material: Option<TipoMaterial>,
    pub destino_entrada: Option<DestinoEntrada>,

    /// Free-form reference to the budget amendment that funded this entry.
    pub emenda_origem: Option<String>,
}

impl Transacao {
    /// Build a record from a validated creation payload.
    ///
    /// `data` is always the creation date; `data_entrada` defaults to it
    /// when the payload leaves it out.
    pub fn criar(nova: NovaTransacao, hoje: NaiveDate) -> Transacao {
        Transacao {
            id: TransacaoId::new(),
            empresa: nova.empresa,
            tipo: nova.tipo,
            status: nova.status.unwrap_or_default(),
            nf: nova.nf,
            descricao: nova.descricao,
            valor_centavos: nova.valor_centavos,
            data: hoje,
            data_entrada: nova.data_entrada.unwrap_or(hoje),
            data_saida: nova.data_saida,
            tipo_material: nova.tipo_material,
            destino_entrada: nova.destino_entrada,
            emenda_origem: nova.emenda_origem,
        }
    }

    /// Apply a validated update to the mutable fields.
    ///
    /// `data` (the creation date) is immutable. `data_saida` distinguishes
    /// "not in the payload" (keep) from an explicit `null` (clear).
    pub fn aplicar(&mut self, update: AtualizaTransacao) {
        if let Some(tipo) = update.tipo {
            self.tipo = tipo;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(nf) = update.nf {
            self.nf = Some(nf);
        }
        if let Some(descricao) = update.descricao {
            self.descricao = Some(descricao);
        }
        if let Some(valor) = update.valor_centavos {
            self.valor_centavos = valor;
        }
        if let Some(entrada) = update.data_entrada {
            self.data_entrada = entrada;
        }
        if let Some(saida) = update.data_saida {
            self.data_saida = saida;
        }
        if let Some(material) = update.tipo_material {
            self.tipo_material = Some(material);
        }
        if let Some(destino) = update.destino_entrada {
            self.destino_entrada = Some(destino);
        }
        if let Some(emenda) = update.emenda_origem {
            self.emenda_origem = Some(emenda);
        }
    }
}

/// Creation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NovaTransacao {
    pub empresa: EmpresaId,
    pub tipo: TipoTransacao,
    #[serde(default)]
    pub status: Option<StatusTransacao>,
    #[serde(default)]
    pub nf: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    pub valor_centavos: i64,
    #[serde(default)]
    pub data_entrada: Option<NaiveDate>,
    #[serde(default)]
    pub data_saida: Option<NaiveDate>,
    #[serde(default)]
    pub tipo_material: Option<TipoMaterial>,
    #[serde(default)]
    pub destino_entrada: Option<DestinoEntrada>,
    #[serde(default)]
    pub emenda_origem: Option<String>,
}

/// Typed update payload.
///
/// `data_saida` is doubly optional: absent means "keep the stored value",
/// an explicit `null` clears the settlement date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtualizaTransacao {
    #[serde(default)]
    pub tipo: Option<TipoTransacao>,
    #[serde(default)]
    pub status: Option<StatusTransacao>,
    #[serde(default)]
    pub nf: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub valor_centavos: Option<i64>,
    #[serde(default)]
    pub data_entrada: Option<NaiveDate>,
    #[serde(default)]
    pub data_saida: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub tipo_material: Option<TipoMaterial>,
    #[serde(default)]
    pub destino_entrada: Option<DestinoEntrada>,
    #[serde(default)]
    pub emenda_origem: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dia(ano: i32, mes: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(ano, mes, d).unwrap()
    }

    fn nova(empresa: EmpresaId) -> NovaTransacao {
        NovaTransacao {
            empresa,
            tipo: TipoTransacao::Entrada,
            status: None,
            nf: Some("000.123".to_string()),
            descricao: None,
            valor_centavos: 1_250_00,
            data_entrada: None,
            data_saida: None,
            tipo_material: Some(TipoMaterial::Medicamentos),
            destino_entrada: Some(DestinoEntrada::Hospital),
            emenda_origem: None,
        }
    }

    #[test]
    fn criar_defaults_data_entrada_to_creation_date() {
        let hoje = dia(2024, 3, 15);
        let t = Transacao::criar(nova(EmpresaId::new()), hoje);

        assert_eq!(t.data, hoje);
        assert_eq!(t.data_entrada, hoje);
        assert_eq!(t.status, StatusTransacao::Pendente);
    }

    #[test]
    fn criar_keeps_backdated_entrada() {
        let hoje = dia(2024, 3, 15);
        let t = Transacao::criar(
            NovaTransacao {
                data_entrada: Some(dia(2024, 3, 1)),
                ..nova(EmpresaId::new())
            },
            hoje,
        );

        assert_eq!(t.data, hoje);
        assert_eq!(t.data_entrada, dia(2024, 3, 1));
    }

    #[test]
    fn update_distinguishes_absent_from_null_data_saida() {
        let hoje = dia(2024, 3, 15);
        let mut t = Transacao::criar(
            NovaTransacao {
                data_saida: Some(dia(2024, 3, 10)),
                ..nova(EmpresaId::new())
            },
            hoje,
        );

        // Absent: stored value survives.
        t.aplicar(AtualizaTransacao {
            status: Some(StatusTransacao::Pago),
            ..Default::default()
        });
        assert_eq!(t.data_saida, Some(dia(2024, 3, 10)));
        assert_eq!(t.status, StatusTransacao::Pago);

        // Explicit null: cleared.
        t.aplicar(AtualizaTransacao {
            data_saida: Some(None),
            ..Default::default()
        });
        assert_eq!(t.data_saida, None);
    }

    #[test]
    fn wire_values_match_the_database_convention() {
        assert_eq!(
            serde_json::to_value(TipoTransacao::Entrada).unwrap(),
            serde_json::json!("entrada")
        );
        assert_eq!(
            serde_json::to_value(StatusTransacao::Pago).unwrap(),
            serde_json::json!("pago")
        );
        assert_eq!(
            serde_json::to_value(DestinoEntrada::AtencaoPrimaria).unwrap(),
            serde_json::json!("atencao_primaria")
        );
        assert_eq!(
            serde_json::to_value(TipoMaterial::Laboratorio).unwrap(),
            serde_json::json!("laboratorio")
        );
    }

    #[test]
    fn as_str_agrees_with_the_serde_representation() {
        for tipo in [TipoTransacao::Entrada, TipoTransacao::Saida] {
            assert_eq!(
                serde_json::to_value(tipo).unwrap(),
                serde_json::json!(tipo.as_str())
            );
            assert_eq!(TipoTransacao::parse(tipo.as_str()), Some(tipo));
        }
        for status in [StatusTransacao::Pendente, StatusTransacao::Pago] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::json!(status.as_str())
            );
            assert_eq!(StatusTransacao::parse(status.as_str()), Some(status));
        }
        for material in [
            TipoMaterial::Laboratorio,
            TipoMaterial::Medicamentos,
            TipoMaterial::Insumo,
        ] {
            assert_eq!(
                serde_json::to_value(material).unwrap(),
                serde_json::json!(material.as_str())
            );
            assert_eq!(TipoMaterial::parse(material.as_str()), Some(material));
        }
        for destino in [DestinoEntrada::Hospital, DestinoEntrada::AtencaoPrimaria] {
            assert_eq!(
                serde_json::to_value(destino).unwrap(),
                serde_json::json!(destino.as_str())
            );
            assert_eq!(DestinoEntrada::parse(destino.as_str()), Some(destino));
        }
    }
}
