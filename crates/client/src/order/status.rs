use serde::{Deserialize, Serialize};

/// Delivery lifecycle of a pedido as stored by the backend.
///
/// - `Pendente`: order placed, not yet delivered
/// - `Entregue`: order delivered to the client
/// - `Cancelado`: order cancelled, terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pendente,
    Entregue,
    Cancelado,
}

impl OrderStatus {
    pub const ALL: [Self; 3] = [Self::Pendente, Self::Entregue, Self::Cancelado];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::Entregue => "entregue",
            Self::Cancelado => "cancelado",
        }
    }

    /// Label used by the status picker ("Pendente", "Entregue", "Cancelado").
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::Entregue => "Entregue",
            Self::Cancelado => "Cancelado",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseOrderStatusError {
    #[error("Invalid order status: '{0}'. Expected one of: pendente, entregue, cancelado")]
    InvalidStatus(String),
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendente" => Ok(Self::Pendente),
            "entregue" => Ok(Self::Entregue),
            "cancelado" => Ok(Self::Cancelado),
            _ => Err(ParseOrderStatusError::InvalidStatus(s.to_string())),
        }
    }
}
