use pedidos_client::{Order, OrderDraft, OrderId, OrderStatus};

/// Read-through cache of the backend's order collection.
///
/// Only ever replaced wholesale; it is valid until the next fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderListState {
    orders: Vec<Order>,
}

impl OrderListState {
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn replace(&mut self, orders: Vec<Order>) {
        self.orders = orders;
    }

    pub fn find(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Draft backing the create/edit form.
///
/// `editing` is the back-reference to the order being edited: `None` means the
/// next save creates a new order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    pub draft: OrderDraft,
    pub editing: Option<OrderId>,
}

impl EditBuffer {
    pub fn from_order(order: &Order) -> Self {
        Self {
            draft: OrderDraft::from(order),
            editing: Some(order.id),
        }
    }

    pub const fn is_update(&self) -> bool {
        self.editing.is_some()
    }
}

/// Edit buffer plus visibility of the edit surface.
///
/// Every open and close starts a new session, so a save response can tell
/// whether the form it was issued from is still the one on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFormState {
    buffer: EditBuffer,
    visible: bool,
    session: u64,
}

impl OrderFormState {
    pub fn open_new(&mut self) {
        self.buffer = EditBuffer::default();
        self.visible = true;
        self.session += 1;
    }

    pub fn open_edit(&mut self, order: &Order) {
        self.buffer = EditBuffer::from_order(order);
        self.visible = true;
        self.session += 1;
    }

    /// Hides the edit surface and discards the draft.
    pub fn close(&mut self) {
        self.buffer = EditBuffer::default();
        self.visible = false;
        self.session += 1;
    }

    pub const fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn session(&self) -> u64 {
        self.session
    }

    pub fn set_nome_cliente(&mut self, value: String) {
        self.buffer.draft.nome_cliente = value;
    }

    pub fn set_data_pedido(&mut self, value: String) {
        self.buffer.draft.data_pedido = value;
    }

    pub fn set_data_entrega(&mut self, value: String) {
        self.buffer.draft.data_entrega = value;
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.buffer.draft.status = status;
    }
}
