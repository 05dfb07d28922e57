//! Order list, detail, cancellation and status commands.

use gearhub_client::ApiClient;
use gearhub_client::mirror::{OrderDetailScreen, OrderListScreen, OrderScope};
use gearhub_core::models::HasOrderStatus;
use gearhub_core::{OrderId, OrderStatus};

use super::{CommandError, money};

/// Whose orders a command works on.
#[derive(Debug, Clone, Copy)]
pub enum Audience {
    Mine,
    Staff,
    Admin,
}

impl From<Audience> for OrderScope {
    fn from(audience: Audience) -> Self {
        match audience {
            Audience::Mine => Self::Mine,
            Audience::Staff => Self::Staff,
            Audience::Admin => Self::Admin,
        }
    }
}

pub struct OrderFilters {
    pub status: String,
    pub page: u32,
    pub size: u32,
}

pub async fn list(
    client: &ApiClient,
    audience: Audience,
    filters: &OrderFilters,
) -> Result<(), CommandError> {
    let mut screen = OrderListScreen::new(audience.into(), filters.size);
    screen.set_filter_text(&filters.status)?;
    screen.set_page(filters.page);
    screen.refresh(client).await?;

    let Some(page) = screen.page() else {
        return Ok(());
    };
    tracing::info!(
        "Page {} of {} ({} orders)",
        page.page + 1,
        page.total_pages.max(1),
        page.total_elements
    );
    for order in &page.items {
        let placed = order
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let cancel = if screen.can_cancel(order.order_id) {
            " [cancellable]"
        } else {
            ""
        };
        tracing::info!(
            "  #{:<6} {:<16} {:<12} {}{cancel}",
            order.order_id,
            placed,
            order.status_label(),
            money(order.total_price)
        );
    }
    Ok(())
}

pub async fn show(client: &ApiClient, audience: Audience, id: i64) -> Result<(), CommandError> {
    let mut screen = OrderDetailScreen::new(audience.into(), OrderId::new(id));
    screen.refresh(client).await?;

    let Some(order) = screen.order() else {
        return Ok(());
    };
    tracing::info!(
        "Order #{} - {} - {}",
        order.order_id,
        order.status_label(),
        money(order.total_price)
    );
    if let Some(address) = &order.shipping_address {
        tracing::info!("  Ship to: {address}");
    }
    if let Some(note) = &order.note {
        tracing::info!("  Note: {note}");
    }
    for line in &order.items {
        tracing::info!(
            "  {:<40} {:<16} {} x {} = {}",
            line.product_name,
            line.sku,
            line.quantity,
            money(line.unit_price),
            money(line.subtotal())
        );
    }
    if screen.can_cancel() {
        tracing::info!("  This order can still be cancelled");
    }
    Ok(())
}

pub async fn cancel(client: &ApiClient, id: i64, reason: &str) -> Result<(), CommandError> {
    let mut screen = OrderDetailScreen::new(OrderScope::Mine, OrderId::new(id));
    screen.refresh(client).await?;
    screen.cancel(client, reason).await?;
    tracing::info!("Order #{id} cancelled");
    Ok(())
}

pub async fn set_status(
    client: &ApiClient,
    audience: Audience,
    id: i64,
    status: &str,
) -> Result<(), CommandError> {
    let status: OrderStatus = status.parse().map_err(CommandError::InvalidArgument)?;
    let mut screen = OrderDetailScreen::new(audience.into(), OrderId::new(id));
    screen.update_status(client, status).await?;
    let label = screen
        .order()
        .map_or_else(|| status.label().to_string(), HasOrderStatus::status_label);
    tracing::info!("Order #{id} is now {label}");
    Ok(())
}
