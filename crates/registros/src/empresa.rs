//! Company records ("Empresa").

use serde::{Deserialize, Serialize};

use fluxo_core::{DomainError, EmpresaId};

/// A registered company.
///
/// Owned by whichever physical store was selected for the request that
/// created it; the `cnpj` is unique *per store*, so the same CNPJ may
/// legitimately exist in both stores. That is a design property of the
/// routing scheme, not a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empresa {
    pub id: EmpresaId,
    pub nome: String,
    pub cnpj: String,

    /// Business categories, e.g. "Medicamentos", "Equipamentos".
    #[serde(default)]
    pub tipo: Vec<String>,

    /// Whether the company entered through public bidding.
    #[serde(default)]
    pub licitacao: bool,

    /// Budget-amendment references tied to this company.
    #[serde(default)]
    pub emendas: Vec<String>,
}

impl Empresa {
    /// Build a new record from a creation payload.
    pub fn criar(nova: NovaEmpresa) -> Result<Empresa, DomainError> {
        let nome = nova.nome.trim().to_string();
        if nome.is_empty() {
            return Err(DomainError::validation("nome não pode ser vazio"));
        }
        let cnpj = nova.cnpj.trim().to_string();
        if cnpj.is_empty() {
            return Err(DomainError::validation("cnpj não pode ser vazio"));
        }

        Ok(Empresa {
            id: EmpresaId::new(),
            nome,
            cnpj,
            tipo: nova.tipo,
            licitacao: nova.licitacao,
            emendas: nova.emendas,
        })
    }

    /// Apply a typed update to the mutable fields.
    pub fn aplicar(&mut self, update: AtualizaEmpresa) -> Result<(), DomainError> {
        if let Some(nome) = update.nome {
            let nome = nome.trim().to_string();
            if nome.is_empty() {
                return Err(DomainError::validation("nome não pode ser vazio"));
            }
            self.nome = nome;
        }
        if let Some(cnpj) = update.cnpj {
            let cnpj = cnpj.trim().to_string();
            if cnpj.is_empty() {
                return Err(DomainError::validation("cnpj não pode ser vazio"));
            }
            self.cnpj = cnpj;
        }
        if let Some(tipo) = update.tipo {
            self.tipo = tipo;
        }
        if let Some(licitacao) = update.licitacao {
            self.licitacao = licitacao;
        }
        if let Some(emendas) = update.emendas {
            self.emendas = emendas;
        }
        Ok(())
    }
}

/// Creation payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NovaEmpresa {
    pub nome: String,
    pub cnpj: String,
    #[serde(default)]
    pub tipo: Vec<String>,
    #[serde(default)]
    pub licitacao: bool,
    #[serde(default)]
    pub emendas: Vec<String>,
}

/// Typed update payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtualizaEmpresa {
    pub nome: Option<String>,
    pub cnpj: Option<String>,
    pub tipo: Option<Vec<String>>,
    pub licitacao: Option<bool>,
    pub emendas: Option<Vec<String>>,
}
