use async_trait::async_trait;
use std::sync::Arc;

mod envelope;
pub mod error;
pub mod http;
pub mod memory;
pub mod order;

pub use error::ClientError;
pub use http::HttpOrderClient;
pub use memory::{InMemoryOrderClient, InjectedFailure, Operation};
pub use order::{Order, OrderDraft, OrderId, OrderStatus, ParseOrderStatusError};

/// Remote pedidos resource.
///
/// Implementations only perform I/O; keeping local state in sync with the
/// backend is the caller's job. Mutations return the backend's human readable
/// message, when it sent one.
#[async_trait]
pub trait OrderClient: Send + Sync + 'static {
    /// `GET /pedidos`
    async fn list(&self) -> Result<Vec<Order>, ClientError>;

    /// `POST /pedidos`
    async fn create(&self, draft: &OrderDraft) -> Result<Option<String>, ClientError>;

    /// `PUT /pedidos/{id}`
    async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Option<String>, ClientError>;

    /// `DELETE /pedidos/{id}`
    async fn delete(&self, id: OrderId) -> Result<Option<String>, ClientError>;
}

/// Type alias for a dynamic client trait object wrapped in Arc
pub type DynOrderClient = Arc<dyn OrderClient>;

#[async_trait]
impl<C: OrderClient + ?Sized> OrderClient for Arc<C> {
    async fn list(&self) -> Result<Vec<Order>, ClientError> {
        (**self).list().await
    }

    async fn create(&self, draft: &OrderDraft) -> Result<Option<String>, ClientError> {
        (**self).create(draft).await
    }

    async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Option<String>, ClientError> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: OrderId) -> Result<Option<String>, ClientError> {
        (**self).delete(id).await
    }
}
