//! Physical store selection.

use serde::Serialize;

/// Handle of one of the two physical stores.
///
/// The stores themselves are external and opaque; this core only decides
/// which one an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreHandle {
    /// The default store for all traffic.
    Primario,
    /// The sandbox store that `.dev` identities read and write.
    Testes,
}

impl StoreHandle {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreHandle::Primario => "primario",
            StoreHandle::Testes => "testes",
        }
    }
}

impl core::fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
