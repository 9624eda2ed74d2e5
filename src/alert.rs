use pedidos_client::OrderId;

pub const LOAD_FAILED: &str = "Não foi possível carregar os pedidos";
pub const SAVE_FAILED: &str = "Não foi possível salvar o pedido";
pub const SAVE_REJECTED: &str = "Erro ao salvar pedido";
pub const DELETE_FAILED: &str = "Não foi possível excluir o pedido";
pub const DELETE_REJECTED: &str = "Erro ao excluir pedido";
pub const SAVED: &str = "Pedido salvo com sucesso";
pub const DELETED: &str = "Pedido excluído com sucesso";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

/// User-facing notice produced by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: &'static str,
    pub message: String,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            title: "Sucesso",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            title: "Erro",
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == AlertKind::Error
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// Pending destructive action awaiting an explicit choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub id: OrderId,
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub confirm_label: &'static str,
}

impl DeleteConfirmation {
    pub const fn new(id: OrderId) -> Self {
        Self {
            id,
            title: "Confirmar Exclusão",
            message: "Tem certeza que deseja excluir este pedido?",
            cancel_label: "Cancelar",
            confirm_label: "Excluir",
        }
    }
}
