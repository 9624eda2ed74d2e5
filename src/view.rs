//! Display-ready projections of [`ScreenState`].
//!
//! Everything here is plain data; how it looks is up to the renderer.

use pedidos_client::order::date::display_date;
use pedidos_client::{Order, OrderId, OrderStatus};

use crate::alert::{Alert, DeleteConfirmation};
use crate::controller::{ScreenState, SyncPhase};
use crate::state::OrderFormState;

pub const EMPTY_TITLE: &str = "Nenhum pedido encontrado";
pub const EMPTY_HINT: &str = "Toque em \"Novo\" para adicionar um pedido";

/// Semantic emphasis of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Warning,
    Success,
    Danger,
}

impl From<OrderStatus> for StatusTone {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pendente => Self::Warning,
            OrderStatus::Entregue => Self::Success,
            OrderStatus::Cancelado => Self::Danger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCard {
    pub id: OrderId,
    pub id_label: String,
    pub nome_cliente: String,
    pub status_label: String,
    pub tone: StatusTone,
    pub data_pedido_label: String,
    pub data_entrega_label: String,
}

impl From<&Order> for OrderCard {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            id_label: format!("#{}", order.id),
            nome_cliente: order.nome_cliente.clone(),
            status_label: order.status.as_str().to_uppercase(),
            tone: order.status.into(),
            data_pedido_label: format!("Pedido: {}", display_date(&order.data_pedido)),
            data_entrega_label: format!("Entrega: {}", display_date(&order.data_entrega)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOption {
    pub status: OrderStatus,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: &'static str,
    pub nome_cliente: String,
    pub data_pedido: String,
    pub data_entrega: String,
    pub status_options: Vec<StatusOption>,
}

impl From<&OrderFormState> for FormView {
    fn from(form: &OrderFormState) -> Self {
        let buffer = form.buffer();
        let draft = &buffer.draft;

        Self {
            title: if buffer.is_update() {
                "Editar Pedido"
            } else {
                "Novo Pedido"
            },
            nome_cliente: draft.nome_cliente.clone(),
            data_pedido: draft.data_pedido.clone(),
            data_entrega: draft.data_entrega.clone(),
            status_options: OrderStatus::ALL
                .into_iter()
                .map(|status| StatusOption {
                    status,
                    label: status.label(),
                    selected: status == draft.status,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub cards: Vec<OrderCard>,
    /// `(title, hint)` when there is nothing to list.
    pub empty: Option<(&'static str, &'static str)>,
    /// Present while the edit surface is open.
    pub form: Option<FormView>,
    pub loading: bool,
    pub alert: Option<Alert>,
    pub confirmation: Option<DeleteConfirmation>,
}

impl From<&ScreenState> for ScreenView {
    fn from(state: &ScreenState) -> Self {
        Self {
            cards: state.list.orders().iter().map(OrderCard::from).collect(),
            empty: state.list.is_empty().then_some((EMPTY_TITLE, EMPTY_HINT)),
            form: state.form.is_visible().then(|| FormView::from(&state.form)),
            loading: state.phase == SyncPhase::Loading,
            alert: state.alerts.front().cloned(),
            confirmation: state.pending_delete.clone(),
        }
    }
}
