use pedidos_client::{ClientError, Order, OrderClient, OrderId, OrderStatus};
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::alert::{
    Alert, DELETE_FAILED, DELETE_REJECTED, DELETED, DeleteConfirmation, LOAD_FAILED, SAVE_FAILED,
    SAVE_REJECTED, SAVED,
};
use crate::lease::InFlight;
use crate::state::{EditBuffer, OrderFormState, OrderListState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPhase {
    #[default]
    Idle,
    Loading,
    /// An error alert is waiting for `acknowledge_alert`.
    ErrorDisplayed,
}

/// Result of a controller action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Option<Alert>),
    Failure(Alert),
    /// Another mutating request is still running; nothing was sent.
    Busy,
    /// The action did not apply to the current state; nothing was sent.
    Skipped,
}

impl Outcome {
    pub const fn alert(&self) -> Option<&Alert> {
        match self {
            Self::Success(alert) => alert.as_ref(),
            Self::Failure(alert) => Some(alert),
            Self::Busy | Self::Skipped => None,
        }
    }
}

/// Everything a renderer needs to draw the screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenState {
    pub list: OrderListState,
    pub form: OrderFormState,
    pub phase: SyncPhase,
    /// Oldest first; the renderer shows the front one.
    pub alerts: VecDeque<Alert>,
    pub pending_delete: Option<DeleteConfirmation>,
    /// Requests dispatched but not yet applied.
    pending: usize,
}

/// Alerts kept when nobody acknowledges them; older ones are dropped first.
pub const MAX_QUEUED_ALERTS: usize = 8;

impl ScreenState {
    fn push_alert(&mut self, alert: Alert) {
        if self.alerts.len() == MAX_QUEUED_ALERTS {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert);
    }

    fn begin_request(&mut self) {
        self.pending += 1;
        self.phase = SyncPhase::Loading;
    }

    /// Settles the phase once the last outstanding request has been applied.
    fn finish_request(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            self.settle();
        }
    }

    fn settle(&mut self) {
        self.phase = if self.alerts.iter().any(Alert::is_error) {
            SyncPhase::ErrorDisplayed
        } else {
            SyncPhase::Idle
        };
    }
}

fn failure_message(err: &ClientError, transport: &str, rejected: &str) -> String {
    err.server_message()
        .unwrap_or(if err.is_transport() { transport } else { rejected })
        .to_string()
}

/// Keeps the screen state in step with the backend.
///
/// The backend is the single source of truth: every successful mutation is
/// followed by a full list refetch, never a local patch. Failed requests leave
/// the collection and the edit buffer untouched.
///
/// State sits behind an async mutex that is never held across a request, so
/// the controller can be shared by reference between UI tasks. Save and
/// delete take an in-flight lease; a second invocation while one runs returns
/// [`Outcome::Busy`] without touching the network.
#[derive(Debug)]
pub struct OrderListSyncController<C> {
    client: C,
    state: Mutex<ScreenState>,
    in_flight: InFlight,
}

impl<C: OrderClient> OrderListSyncController<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: Mutex::new(ScreenState::default()),
            in_flight: InFlight::default(),
        }
    }

    /// Initial load when the screen appears.
    pub async fn mount(&self) -> Outcome {
        info!("Loading pedidos");
        self.refresh().await
    }

    /// Replaces the cached collection with the backend's current list.
    pub async fn refresh(&self) -> Outcome {
        self.state.lock().await.begin_request();

        let result = self.client.list().await;

        let mut state = self.state.lock().await;
        let outcome = match result {
            Ok(orders) => {
                debug!("Replacing cached collection with {} pedidos", orders.len());
                state.list.replace(orders);
                Outcome::Success(None)
            }
            Err(e) => {
                warn!("Failed to load pedidos: {e}");
                let alert = Alert::error(LOAD_FAILED);
                state.push_alert(alert.clone());
                Outcome::Failure(alert)
            }
        };
        state.finish_request();
        outcome
    }

    pub async fn open_new(&self) {
        self.state.lock().await.form.open_new();
    }

    /// Loads a cached order into the edit buffer.
    ///
    /// Returns `None`, leaving the form untouched, if the id is not in the
    /// cached collection.
    pub async fn open_edit(&self, id: OrderId) -> Option<EditBuffer> {
        let mut state = self.state.lock().await;
        let order = state.list.find(id)?.clone();
        state.form.open_edit(&order);
        Some(state.form.buffer().clone())
    }

    pub async fn set_nome_cliente(&self, value: impl Into<String>) {
        self.state.lock().await.form.set_nome_cliente(value.into());
    }

    pub async fn set_data_pedido(&self, value: impl Into<String>) {
        self.state.lock().await.form.set_data_pedido(value.into());
    }

    pub async fn set_data_entrega(&self, value: impl Into<String>) {
        self.state.lock().await.form.set_data_entrega(value.into());
    }

    pub async fn set_status(&self, status: OrderStatus) {
        self.state.lock().await.form.set_status(status);
    }

    pub async fn cancel_form(&self) {
        self.state.lock().await.form.close();
    }

    /// Creates or updates depending on the edit buffer's back-reference.
    ///
    /// On success the edit surface closes and the list is refetched. If the
    /// form was closed or reopened while the request ran, the newer form is
    /// left alone. On failure the form stays open with the draft intact.
    pub async fn save(&self) -> Outcome {
        let Some(_lease) = self.in_flight.try_acquire() else {
            debug!("Save ignored: another request is in flight");
            return Outcome::Busy;
        };

        let (buffer, session) = {
            let mut state = self.state.lock().await;
            if !state.form.is_visible() {
                debug!("Save ignored: edit surface is closed");
                return Outcome::Skipped;
            }
            state.begin_request();
            (state.form.buffer().clone(), state.form.session())
        };

        let result = match buffer.editing {
            None => {
                info!("Creating pedido for {}", buffer.draft.nome_cliente);
                self.client.create(&buffer.draft).await
            }
            Some(id) => {
                info!("Updating pedido {id}");
                self.client.update(id, &buffer.draft).await
            }
        };

        match result {
            Ok(message) => {
                let alert = Alert::success(message.unwrap_or_else(|| SAVED.to_string()));
                {
                    let mut state = self.state.lock().await;
                    state.push_alert(alert.clone());
                    if state.form.session() == session {
                        state.form.close();
                    } else {
                        debug!("Form changed while saving, keeping the newer draft");
                    }
                }
                self.refresh().await;
                self.state.lock().await.finish_request();
                Outcome::Success(Some(alert))
            }
            Err(e) => {
                warn!("Failed to save pedido: {e}");
                let alert = Alert::error(failure_message(&e, SAVE_FAILED, SAVE_REJECTED));
                let mut state = self.state.lock().await;
                state.push_alert(alert.clone());
                state.finish_request();
                Outcome::Failure(alert)
            }
        }
    }

    /// First step of deletion. Records the pending choice; no request is sent.
    pub async fn request_delete(&self, id: OrderId) -> DeleteConfirmation {
        let confirmation = DeleteConfirmation::new(id);
        self.state.lock().await.pending_delete = Some(confirmation.clone());
        confirmation
    }

    pub async fn cancel_delete(&self) {
        if let Some(confirmation) = self.state.lock().await.pending_delete.take() {
            debug!("Deletion of pedido {} cancelled", confirmation.id);
        }
    }

    /// Second step of deletion: sends the request for the pending id.
    pub async fn confirm_delete(&self) -> Outcome {
        let Some(_lease) = self.in_flight.try_acquire() else {
            debug!("Delete ignored: another request is in flight");
            return Outcome::Busy;
        };

        let id = {
            let mut state = self.state.lock().await;
            let Some(confirmation) = state.pending_delete.take() else {
                debug!("Delete ignored: nothing awaiting confirmation");
                return Outcome::Skipped;
            };
            state.begin_request();
            confirmation.id
        };

        info!("Deleting pedido {id}");

        match self.client.delete(id).await {
            Ok(message) => {
                let alert = Alert::success(message.unwrap_or_else(|| DELETED.to_string()));
                self.state.lock().await.push_alert(alert.clone());
                self.refresh().await;
                self.state.lock().await.finish_request();
                Outcome::Success(Some(alert))
            }
            Err(e) => {
                warn!("Failed to delete pedido {id}: {e}");
                let alert = Alert::error(failure_message(&e, DELETE_FAILED, DELETE_REJECTED));
                let mut state = self.state.lock().await;
                state.push_alert(alert.clone());
                state.finish_request();
                Outcome::Failure(alert)
            }
        }
    }

    /// Dismisses the oldest alert.
    pub async fn acknowledge_alert(&self) -> Option<Alert> {
        let mut state = self.state.lock().await;
        let alert = state.alerts.pop_front();
        if state.pending == 0 {
            state.settle();
        }
        alert
    }

    pub async fn snapshot(&self) -> ScreenState {
        self.state.lock().await.clone()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.list.orders().to_vec()
    }

    pub async fn phase(&self) -> SyncPhase {
        self.state.lock().await.phase
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedidos_client::memory::CallCounts;
    use pedidos_client::{InMemoryOrderClient, InjectedFailure, Operation, OrderDraft};
    use std::sync::Arc;
    use std::time::Duration;

    fn order(id: u64, nome: &str, data_pedido: &str, status: OrderStatus) -> Order {
        Order {
            id: OrderId(id),
            nome_cliente: nome.to_string(),
            data_pedido: data_pedido.to_string(),
            data_entrega: "2024-01-20T00:00:00.000Z".to_string(),
            status,
        }
    }

    fn seeded_client() -> InMemoryOrderClient {
        InMemoryOrderClient::with_orders(vec![
            order(1, "Ana", "2024-01-10T00:00:00.000Z", OrderStatus::Pendente),
            order(7, "Bruno", "2024-01-15T00:00:00.000Z", OrderStatus::Entregue),
        ])
    }

    async fn mounted(client: &InMemoryOrderClient) -> OrderListSyncController<InMemoryOrderClient> {
        let controller = OrderListSyncController::new(client.clone());
        assert_eq!(controller.mount().await, Outcome::Success(None));
        controller
    }

    #[tokio::test]
    async fn test_mount_replaces_collection_with_server_list() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        assert_eq!(controller.orders().await, client.orders());
        assert_eq!(controller.phase().await, SyncPhase::Idle);
        assert_eq!(client.calls().list, 1);
    }

    #[tokio::test]
    async fn test_refresh_does_not_merge_with_previous_state() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        let other = InMemoryOrderClient::with_orders(vec![order(
            30,
            "Carla",
            "2024-02-01",
            OrderStatus::Cancelado,
        )]);
        let second = OrderListSyncController::new(other.clone());
        second.mount().await;
        assert_eq!(second.orders().await, other.orders());

        client.delete(OrderId(1)).await.unwrap();
        controller.refresh().await;
        let ids: Vec<_> = controller.orders().await.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![OrderId(7)]);
    }

    #[tokio::test]
    async fn test_mount_failure_shows_generic_message_and_keeps_collection() {
        let client = seeded_client();
        let controller = mounted(&client).await;
        let before = controller.orders().await;

        client.fail(
            Operation::List,
            InjectedFailure::Rejected(Some("Banco fora do ar".to_string())),
        );
        let outcome = controller.refresh().await;

        assert_eq!(outcome, Outcome::Failure(Alert::error(LOAD_FAILED)));
        assert_eq!(controller.orders().await, before);
        assert_eq!(controller.phase().await, SyncPhase::ErrorDisplayed);

        let acknowledged = controller.acknowledge_alert().await.unwrap();
        assert_eq!(acknowledged.message, LOAD_FAILED);
        assert_eq!(controller.phase().await, SyncPhase::Idle);
    }

    #[tokio::test]
    async fn test_open_edit_truncates_dates() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        let buffer = controller.open_edit(OrderId(7)).await.unwrap();

        assert_eq!(buffer.editing, Some(OrderId(7)));
        assert_eq!(buffer.draft.data_pedido, "2024-01-15");
        assert_eq!(buffer.draft.data_entrega, "2024-01-20");
        assert!(controller.snapshot().await.form.is_visible());
    }

    #[tokio::test]
    async fn test_open_edit_unknown_id_leaves_form_alone() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        assert!(controller.open_edit(OrderId(99)).await.is_none());
        assert!(!controller.snapshot().await.form.is_visible());
    }

    #[tokio::test]
    async fn test_save_without_back_reference_creates() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        controller.open_new().await;
        controller.set_nome_cliente("Diego").await;
        controller.set_data_pedido("2024-05-01").await;
        controller.set_data_entrega("2024-05-03").await;
        let outcome = controller.save().await;

        assert_eq!(
            outcome,
            Outcome::Success(Some(Alert::success("Pedido criado com sucesso")))
        );
        assert_eq!(
            client.calls(),
            CallCounts {
                list: 2,
                create: 1,
                update: 0,
                delete: 0
            }
        );
        assert_eq!(controller.orders().await.len(), 3);

        let state = controller.snapshot().await;
        assert!(!state.form.is_visible());
        assert_eq!(state.form.buffer(), &EditBuffer::default());
        assert_eq!(state.phase, SyncPhase::Idle);
    }

    #[tokio::test]
    async fn test_save_with_back_reference_updates_that_id() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        controller.open_edit(OrderId(7)).await.unwrap();
        controller.set_status(OrderStatus::Cancelado).await;
        let outcome = controller.save().await;

        assert!(matches!(outcome, Outcome::Success(Some(_))));
        let calls = client.calls();
        assert_eq!((calls.create, calls.update, calls.list), (0, 1, 2));

        let updated = controller
            .orders()
            .await
            .into_iter()
            .find(|o| o.id == OrderId(7))
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Cancelado);
        assert_eq!(updated.nome_cliente, "Bruno");
    }

    #[tokio::test]
    async fn test_save_rejected_keeps_form_and_skips_refetch() {
        let client = seeded_client();
        let controller = mounted(&client).await;
        client.fail(
            Operation::Update,
            InjectedFailure::Rejected(Some("Data de entrega inválida".to_string())),
        );

        let buffer = controller.open_edit(OrderId(7)).await.unwrap();
        let outcome = controller.save().await;

        assert_eq!(
            outcome,
            Outcome::Failure(Alert::error("Data de entrega inválida"))
        );
        assert_eq!(client.calls().list, 1);

        let state = controller.snapshot().await;
        assert!(state.form.is_visible());
        assert_eq!(state.form.buffer(), &buffer);
        assert_eq!(state.phase, SyncPhase::ErrorDisplayed);
    }

    #[tokio::test]
    async fn test_save_rejected_without_message_uses_fallback() {
        let client = seeded_client();
        let controller = mounted(&client).await;
        client.fail(Operation::Create, InjectedFailure::Rejected(None));

        controller.open_new().await;
        let outcome = controller.save().await;

        assert_eq!(outcome, Outcome::Failure(Alert::error(SAVE_REJECTED)));
    }

    #[tokio::test]
    async fn test_save_transport_failure_uses_generic_message() {
        let client = seeded_client();
        let controller = mounted(&client).await;
        client.fail(Operation::Create, InjectedFailure::Transport);

        controller.open_new().await;
        controller.set_nome_cliente("Eva").await;
        let before = controller.snapshot().await;
        let outcome = controller.save().await;

        assert_eq!(outcome, Outcome::Failure(Alert::error(SAVE_FAILED)));
        let after = controller.snapshot().await;
        assert_eq!(after.list, before.list);
        assert_eq!(after.form, before.form);
    }

    #[tokio::test]
    async fn test_save_with_closed_form_is_skipped() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        assert_eq!(controller.save().await, Outcome::Skipped);
        assert_eq!(client.calls().total(), 1);
    }

    #[tokio::test]
    async fn test_cancel_form_discards_draft() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        controller.open_edit(OrderId(1)).await.unwrap();
        controller.set_nome_cliente("Alterado").await;
        controller.cancel_form().await;

        let state = controller.snapshot().await;
        assert!(!state.form.is_visible());
        assert_eq!(state.form.buffer(), &EditBuffer::default());
        assert_eq!(client.calls().total(), 1);
    }

    #[tokio::test]
    async fn test_request_delete_alone_sends_nothing() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        let confirmation = controller.request_delete(OrderId(1)).await;

        assert_eq!(confirmation, DeleteConfirmation::new(OrderId(1)));
        assert_eq!(client.calls().delete, 0);
        assert_eq!(
            controller.snapshot().await.pending_delete,
            Some(confirmation)
        );
    }

    #[tokio::test]
    async fn test_cancel_delete_then_confirm_is_skipped() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        controller.request_delete(OrderId(1)).await;
        controller.cancel_delete().await;

        assert_eq!(controller.confirm_delete().await, Outcome::Skipped);
        assert_eq!(client.calls().delete, 0);
        assert_eq!(controller.orders().await.len(), 2);
    }

    #[tokio::test]
    async fn test_confirm_delete_removes_and_refetches() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        controller.request_delete(OrderId(1)).await;
        let outcome = controller.confirm_delete().await;

        assert_eq!(
            outcome,
            Outcome::Success(Some(Alert::success("Pedido excluído com sucesso")))
        );
        let calls = client.calls();
        assert_eq!((calls.delete, calls.list), (1, 2));
        let ids: Vec<_> = controller.orders().await.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![OrderId(7)]);
        assert!(controller.snapshot().await.pending_delete.is_none());
    }

    #[tokio::test]
    async fn test_confirm_delete_failure_keeps_collection() {
        let client = seeded_client();
        let controller = mounted(&client).await;
        client.fail(Operation::Delete, InjectedFailure::Transport);

        controller.request_delete(OrderId(7)).await;
        let outcome = controller.confirm_delete().await;

        assert_eq!(outcome, Outcome::Failure(Alert::error(DELETE_FAILED)));
        assert_eq!(controller.orders().await.len(), 2);
        assert_eq!(client.calls().list, 1);
    }

    #[tokio::test]
    async fn test_confirm_delete_rejected_uses_server_message_or_fallback() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        controller.request_delete(OrderId(42)).await;
        let outcome = controller.confirm_delete().await;
        assert_eq!(outcome, Outcome::Failure(Alert::error("Pedido não encontrado")));

        client.fail(Operation::Delete, InjectedFailure::Rejected(None));
        controller.request_delete(OrderId(1)).await;
        let outcome = controller.confirm_delete().await;
        assert_eq!(outcome, Outcome::Failure(Alert::error(DELETE_REJECTED)));
    }

    #[tokio::test]
    async fn test_double_save_sends_single_request() {
        let client = seeded_client().with_latency(Duration::from_millis(50));
        let controller = mounted(&client).await;

        controller.open_new().await;
        controller.set_nome_cliente("Fabio").await;
        let (first, second) = tokio::join!(controller.save(), controller.save());

        assert!(matches!(first, Outcome::Success(Some(_))));
        assert_eq!(second, Outcome::Busy);
        assert_eq!(client.calls().create, 1);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_delete_blocked_while_save_in_flight() {
        let client = seeded_client().with_latency(Duration::from_millis(50));
        let controller = Arc::new(mounted(&client).await);

        controller.open_new().await;
        controller.request_delete(OrderId(1)).await;
        let (save, delete) = tokio::join!(controller.save(), controller.confirm_delete());

        assert!(matches!(save, Outcome::Success(_)));
        assert_eq!(delete, Outcome::Busy);
        assert_eq!(client.calls().delete, 0);
        assert!(controller.snapshot().await.pending_delete.is_some());
    }

    #[tokio::test]
    async fn test_form_reopened_during_save_is_not_reset() {
        let client = seeded_client().with_latency(Duration::from_millis(50));
        let controller = mounted(&client).await;

        controller.open_new().await;
        controller.set_nome_cliente("Gabi").await;

        let reopen = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.open_edit(OrderId(1)).await
        };
        let (outcome, reopened) = tokio::join!(controller.save(), reopen);

        assert!(matches!(outcome, Outcome::Success(_)));
        let state = controller.snapshot().await;
        assert!(state.form.is_visible());
        assert_eq!(state.form.buffer(), &reopened.unwrap());
        assert_eq!(state.list.len(), 3);
    }

    #[tokio::test]
    async fn test_overlapping_refresh_keeps_loading_while_save_runs() {
        let client = seeded_client().with_latency(Duration::from_millis(100));
        let controller = mounted(&client).await;

        controller.open_new().await;
        controller.set_nome_cliente("Gabi").await;

        let overlap = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let before = controller.phase().await;
            controller.refresh().await;
            (before, controller.phase().await, controller.is_busy())
        };
        let (outcome, (before, after, save_in_flight)) = tokio::join!(controller.save(), overlap);

        assert_eq!(before, SyncPhase::Loading);
        assert!(save_in_flight);
        assert_eq!(after, SyncPhase::Loading);
        assert!(matches!(outcome, Outcome::Success(_)));
        assert_eq!(controller.phase().await, SyncPhase::Idle);
    }

    #[test]
    fn test_unacknowledged_alerts_are_capped() {
        let mut state = ScreenState::default();

        for n in 0..MAX_QUEUED_ALERTS + 3 {
            state.push_alert(Alert::success(format!("alerta {n}")));
        }

        assert_eq!(state.alerts.len(), MAX_QUEUED_ALERTS);
        assert_eq!(state.alerts.front().unwrap().message, "alerta 3");
        assert_eq!(
            state.alerts.back().unwrap().message,
            format!("alerta {}", MAX_QUEUED_ALERTS + 2)
        );
    }

    #[tokio::test]
    async fn test_success_alert_then_failed_refetch_queues_both() {
        let client = seeded_client();
        let controller = mounted(&client).await;

        controller.open_new().await;
        client.fail(Operation::List, InjectedFailure::Transport);
        let outcome = controller.save().await;

        assert!(matches!(outcome, Outcome::Success(Some(_))));
        let state = controller.snapshot().await;
        assert_eq!(state.alerts.len(), 2);
        assert_eq!(state.phase, SyncPhase::ErrorDisplayed);

        controller.acknowledge_alert().await;
        assert_eq!(controller.phase().await, SyncPhase::ErrorDisplayed);
        controller.acknowledge_alert().await;
        assert_eq!(controller.phase().await, SyncPhase::Idle);
        assert!(controller.acknowledge_alert().await.is_none());
    }

    #[tokio::test]
    async fn test_create_round_trip_reproduces_fields() {
        let client = InMemoryOrderClient::new().with_next_id(12);
        let controller = mounted(&client).await;

        controller.open_new().await;
        controller.set_nome_cliente("Ana").await;
        controller.set_data_pedido("2024-03-01").await;
        controller.set_data_entrega("2024-03-10").await;
        controller.set_status(OrderStatus::Pendente).await;
        controller.save().await;

        let buffer = controller.open_edit(OrderId(12)).await.unwrap();
        assert_eq!(
            buffer.draft,
            OrderDraft::new("Ana", "2024-03-01", "2024-03-10", OrderStatus::Pendente)
        );
        assert_eq!(buffer.editing, Some(OrderId(12)));
    }
}
