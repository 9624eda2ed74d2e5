use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod date;
pub mod status;

pub use status::{OrderStatus, ParseOrderStatusError};

/// Server-assigned identity of a pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pedido as returned by `GET /pedidos`.
///
/// Date fields are kept as the raw strings the backend sent; they may carry a
/// time component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub nome_cliente: String,
    pub data_pedido: String,
    pub data_entrega: String,
    #[serde(default)]
    pub status: OrderStatus,
}

/// Request body for create and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub nome_cliente: String,
    pub data_pedido: String,
    pub data_entrega: String,
    pub status: OrderStatus,
}

impl OrderDraft {
    pub fn new(
        nome_cliente: impl Into<String>,
        data_pedido: impl Into<String>,
        data_entrega: impl Into<String>,
        status: OrderStatus,
    ) -> Self {
        Self {
            nome_cliente: nome_cliente.into(),
            data_pedido: data_pedido.into(),
            data_entrega: data_entrega.into(),
            status,
        }
    }
}

impl From<&Order> for OrderDraft {
    /// Copies an order into a draft, keeping only the date portion of each
    /// date field.
    fn from(order: &Order) -> Self {
        Self {
            nome_cliente: order.nome_cliente.clone(),
            data_pedido: date::date_only(&order.data_pedido).to_string(),
            data_entrega: date::date_only(&order.data_entrega).to_string(),
            status: order.status,
        }
    }
}
