pub mod alert;
pub mod cli;
pub mod controller;
pub mod env;
mod lease;
pub mod state;
pub mod telemetry;
pub mod view;

pub use alert::{Alert, AlertKind, DeleteConfirmation};
pub use controller::{OrderListSyncController, Outcome, ScreenState, SyncPhase};
pub use env::Env;
pub use state::{EditBuffer, OrderFormState, OrderListState};
pub use view::{FormView, OrderCard, ScreenView, StatusTone};
