use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::warn;

use crate::order::date::date_only;
use crate::{ClientError, Order, OrderClient, OrderDraft, OrderId};

/// Client operations, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Behaves like an unreachable backend.
    Transport,
    /// Behaves like a `success: false` envelope.
    Rejected(Option<String>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl CallCounts {
    pub const fn total(&self) -> usize {
        self.list + self.create + self.update + self.delete
    }

    fn bump(&mut self, operation: Operation) {
        match operation {
            Operation::List => self.list += 1,
            Operation::Create => self.create += 1,
            Operation::Update => self.update += 1,
            Operation::Delete => self.delete += 1,
        }
    }
}

#[derive(Debug)]
struct Store {
    orders: BTreeMap<OrderId, Order>,
    next_id: u64,
    calls: CallCounts,
    failures: HashMap<Operation, InjectedFailure>,
    latency: Option<Duration>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            orders: BTreeMap::new(),
            next_id: 1,
            calls: CallCounts::default(),
            failures: HashMap::new(),
            latency: None,
        }
    }
}

/// Process-local backend for dry-run mode and tests.
///
/// Clones share the same store, so a test can keep a handle for inspection
/// while the controller owns another. Dates are stored the way the real
/// backend returns them, as midnight UTC timestamps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderClient {
    store: Arc<Mutex<Store>>,
}

impl InMemoryOrderClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let client = Self::new();
        {
            let mut store = client.lock();
            for order in orders {
                store.next_id = store.next_id.max(order.id.0 + 1);
                store.orders.insert(order.id, order);
            }
        }
        client
    }

    /// Sets the id the next created order receives.
    #[must_use]
    pub fn with_next_id(self, next_id: u64) -> Self {
        self.lock().next_id = next_id;
        self
    }

    /// Delays every call, to let tests observe in-flight behaviour.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    pub fn fail(&self, operation: Operation, failure: InjectedFailure) {
        self.lock().failures.insert(operation, failure);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call and applies latency plus any injected failure.
    async fn begin(&self, operation: Operation) -> Result<(), ClientError> {
        let latency = {
            let mut store = self.lock();
            store.calls.bump(operation);
            store.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match self.lock().failures.get(&operation).cloned() {
            None => Ok(()),
            Some(InjectedFailure::Transport) => {
                warn!("[IN-MEMORY] Simulating unreachable backend for {operation:?}");
                Err(ClientError::Unavailable {
                    reason: "simulated transport failure".to_string(),
                })
            }
            Some(InjectedFailure::Rejected(message)) => {
                warn!("[IN-MEMORY] Simulating rejected {operation:?}");
                Err(ClientError::Rejected { message })
            }
        }
    }
}

fn as_timestamp(date: &str) -> String {
    if date.is_empty() || date_only(date) != date {
        date.to_string()
    } else {
        format!("{date}T00:00:00.000Z")
    }
}

fn not_found() -> ClientError {
    ClientError::Rejected {
        message: Some("Pedido não encontrado".to_string()),
    }
}

fn store_order(id: OrderId, draft: &OrderDraft) -> Order {
    Order {
        id,
        nome_cliente: draft.nome_cliente.clone(),
        data_pedido: as_timestamp(&draft.data_pedido),
        data_entrega: as_timestamp(&draft.data_entrega),
        status: draft.status,
    }
}

#[async_trait]
impl OrderClient for InMemoryOrderClient {
    async fn list(&self) -> Result<Vec<Order>, ClientError> {
        self.begin(Operation::List).await?;
        Ok(self.orders())
    }

    async fn create(&self, draft: &OrderDraft) -> Result<Option<String>, ClientError> {
        self.begin(Operation::Create).await?;

        let mut store = self.lock();
        let id = OrderId(store.next_id);
        store.next_id += 1;
        store.orders.insert(id, store_order(id, draft));

        warn!("[IN-MEMORY] Created pedido {id} for {}", draft.nome_cliente);
        Ok(Some("Pedido criado com sucesso".to_string()))
    }

    async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Option<String>, ClientError> {
        self.begin(Operation::Update).await?;

        let mut store = self.lock();
        let slot = store.orders.get_mut(&id).ok_or_else(not_found)?;
        *slot = store_order(id, draft);

        warn!("[IN-MEMORY] Updated pedido {id}");
        Ok(Some("Pedido atualizado com sucesso".to_string()))
    }

    async fn delete(&self, id: OrderId) -> Result<Option<String>, ClientError> {
        self.begin(Operation::Delete).await?;

        self.lock().orders.remove(&id).ok_or_else(not_found)?;

        warn!("[IN-MEMORY] Deleted pedido {id}");
        Ok(Some("Pedido excluído com sucesso".to_string()))
    }
}
