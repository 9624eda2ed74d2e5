use clap::{Parser, Subcommand};
use pedidos_client::{OrderClient, OrderId, OrderStatus};
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::{error, info};

use crate::alert::AlertKind;
use crate::controller::{OrderListSyncController, Outcome};
use crate::env::Env;
use crate::view::ScreenView;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Pedido {id} not found in the current list")]
    OrderNotFound { id: OrderId },
    #[error("{message}")]
    OperationFailed { message: String },
    #[error("Another request is still in flight")]
    Busy,
}

#[derive(Debug, Parser)]
#[command(name = "pedidos")]
#[command(about = "Manage pedidos through the pedidos REST API")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub env: Env,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all pedidos
    List,
    /// Create a new pedido
    Create {
        /// Client name
        #[arg(short = 'c', long = "cliente")]
        nome_cliente: String,
        /// Order date (YYYY-MM-DD)
        #[arg(long)]
        data_pedido: String,
        /// Delivery date (YYYY-MM-DD)
        #[arg(long)]
        data_entrega: String,
        /// pendente, entregue or cancelado
        #[arg(short, long, default_value = "pendente")]
        status: OrderStatus,
    },
    /// Edit an existing pedido; omitted fields keep their current value
    Update {
        #[arg(long)]
        id: u64,
        #[arg(short = 'c', long = "cliente")]
        nome_cliente: Option<String>,
        #[arg(long)]
        data_pedido: Option<String>,
        #[arg(long)]
        data_entrega: Option<String>,
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Delete a pedido after confirmation
    Delete {
        #[arg(long)]
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run_command(env: Env, command: Commands) -> anyhow::Result<()> {
    let client = env.get_client()?;
    let controller = OrderListSyncController::new(client);
    let stdin = std::io::stdin();

    run_command_with_writers(
        &controller,
        command,
        &mut std::io::stdout(),
        &mut stdin.lock(),
    )
    .await
}

async fn run_command_with_writers<C: OrderClient, W: Write, R: BufRead>(
    controller: &OrderListSyncController<C>,
    command: Commands,
    stdout: &mut W,
    stdin: &mut R,
) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            let outcome = controller.mount().await;
            drain_alerts(controller, stdout).await?;
            finish(outcome)?;
            render_list(controller, stdout).await?;
        }
        Commands::Create {
            nome_cliente,
            data_pedido,
            data_entrega,
            status,
        } => {
            controller.mount().await;
            drain_alerts(controller, stdout).await?;

            info!("Processing create: cliente={nome_cliente}, status={status}");
            controller.open_new().await;
            controller.set_nome_cliente(nome_cliente).await;
            controller.set_data_pedido(data_pedido).await;
            controller.set_data_entrega(data_entrega).await;
            controller.set_status(status).await;

            save_and_render(controller, stdout).await?;
        }
        Commands::Update {
            id,
            nome_cliente,
            data_pedido,
            data_entrega,
            status,
        } => {
            let changes = OrderChanges {
                nome_cliente,
                data_pedido,
                data_entrega,
                status,
            };
            update_order(controller, OrderId(id), changes, stdout).await?;
        }
        Commands::Delete { id, yes } => {
            delete_order(controller, OrderId(id), yes, stdout, stdin).await?;
        }
    }

    info!("CLI operation completed successfully");
    Ok(())
}

/// Fields given on the command line for `update`; `None` keeps the current value.
struct OrderChanges {
    nome_cliente: Option<String>,
    data_pedido: Option<String>,
    data_entrega: Option<String>,
    status: Option<OrderStatus>,
}

async fn update_order<C: OrderClient, W: Write>(
    controller: &OrderListSyncController<C>,
    id: OrderId,
    changes: OrderChanges,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let outcome = controller.mount().await;
    drain_alerts(controller, stdout).await?;
    finish(outcome)?;

    info!("Processing update: id={id}");
    if controller.open_edit(id).await.is_none() {
        writeln!(stdout, "❌ Pedido #{id} não encontrado")?;
        return Err(CliError::OrderNotFound { id }.into());
    }
    if let Some(nome_cliente) = changes.nome_cliente {
        controller.set_nome_cliente(nome_cliente).await;
    }
    if let Some(data_pedido) = changes.data_pedido {
        controller.set_data_pedido(data_pedido).await;
    }
    if let Some(data_entrega) = changes.data_entrega {
        controller.set_data_entrega(data_entrega).await;
    }
    if let Some(status) = changes.status {
        controller.set_status(status).await;
    }

    save_and_render(controller, stdout).await
}

async fn delete_order<C: OrderClient, W: Write, R: BufRead>(
    controller: &OrderListSyncController<C>,
    id: OrderId,
    skip_prompt: bool,
    stdout: &mut W,
    stdin: &mut R,
) -> anyhow::Result<()> {
    controller.mount().await;
    drain_alerts(controller, stdout).await?;

    info!("Processing delete: id={id}");
    let confirmation = controller.request_delete(id).await;
    let view = ScreenView::from(&controller.snapshot().await);
    if let Some(card) = view.cards.iter().find(|card| card.id == id) {
        writeln!(
            stdout,
            "{} [{}] {}",
            card.id_label, card.status_label, card.nome_cliente
        )?;
    }

    let confirmed = skip_prompt || {
        writeln!(stdout, "{}: {}", confirmation.title, confirmation.message)?;
        write!(
            stdout,
            "[{}/{}] Digite \"{}\" para confirmar: ",
            confirmation.cancel_label, confirmation.confirm_label, confirmation.confirm_label
        )?;
        stdout.flush()?;

        let mut answer = String::new();
        stdin.read_line(&mut answer)?;
        is_confirmation(&answer, confirmation.confirm_label)
    };

    if !confirmed {
        controller.cancel_delete().await;
        writeln!(stdout, "Exclusão cancelada")?;
        return Ok(());
    }

    let outcome = controller.confirm_delete().await;
    drain_alerts(controller, stdout).await?;
    finish(outcome)?;
    render_list(controller, stdout).await
}

fn is_confirmation(answer: &str, confirm_label: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case(confirm_label)
        || ["s", "sim", "y", "yes"]
            .iter()
            .any(|accepted| answer.eq_ignore_ascii_case(accepted))
}

async fn save_and_render<C: OrderClient, W: Write>(
    controller: &OrderListSyncController<C>,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let outcome = controller.save().await;
    drain_alerts(controller, stdout).await?;
    finish(outcome)?;
    render_list(controller, stdout).await
}

fn finish(outcome: Outcome) -> Result<(), CliError> {
    match outcome {
        Outcome::Success(_) | Outcome::Skipped => Ok(()),
        Outcome::Failure(alert) => {
            error!("Operation failed: {alert}");
            Err(CliError::OperationFailed {
                message: alert.message,
            })
        }
        Outcome::Busy => Err(CliError::Busy),
    }
}

/// Prints and dismisses every queued alert, oldest first.
async fn drain_alerts<C: OrderClient, W: Write>(
    controller: &OrderListSyncController<C>,
    stdout: &mut W,
) -> std::io::Result<()> {
    while let Some(alert) = controller.acknowledge_alert().await {
        let marker = match alert.kind {
            AlertKind::Success => "✅",
            AlertKind::Error => "❌",
        };
        writeln!(stdout, "{marker} {alert}")?;
    }
    Ok(())
}

async fn render_list<C: OrderClient, W: Write>(
    controller: &OrderListSyncController<C>,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let view = ScreenView::from(&controller.snapshot().await);

    for card in &view.cards {
        writeln!(
            stdout,
            "{} [{}] {}",
            card.id_label, card.status_label, card.nome_cliente
        )?;
        writeln!(
            stdout,
            "    {}  {}",
            card.data_pedido_label, card.data_entrega_label
        )?;
    }

    if let Some((title, hint)) = view.empty {
        writeln!(stdout, "{title}")?;
        writeln!(stdout, "{hint}")?;
    }

    Ok(())
}
