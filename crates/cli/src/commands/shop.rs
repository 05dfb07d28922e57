//! Catalog, cart and checkout commands.

use gearhub_client::ApiClient;
use gearhub_client::mirror::{CartScreen, ProductDetailScreen, ProductKey, ProductListScreen, ProductScope};
use gearhub_core::models::{CheckoutRequest, ProductSummary};
use gearhub_core::{BrandId, CategoryId, Page, ProductId, VariantId};

use super::{CommandError, money, note_demo};

/// Catalog filters as given on the command line.
pub struct CatalogFilters {
    pub keyword: Option<String>,
    pub category: Option<i64>,
    pub brand: Option<i64>,
    pub sort: String,
    pub dir: String,
    pub page: u32,
    pub size: u32,
}

pub async fn products(client: &ApiClient, filters: CatalogFilters) -> Result<(), CommandError> {
    let direction = filters
        .dir
        .parse()
        .map_err(CommandError::InvalidArgument)?;

    let mut screen = ProductListScreen::new(ProductScope::Catalog, filters.size);
    screen.set_keyword(filters.keyword.as_deref().unwrap_or_default());
    screen.set_category(filters.category.map(CategoryId::new));
    screen.set_brand(filters.brand.map(BrandId::new));
    screen.set_sort(&filters.sort, direction);
    screen.set_page(filters.page);
    screen.refresh(client).await?;

    if let Some(page) = screen.page() {
        print_products(page);
    }
    note_demo(client);
    Ok(())
}

pub(super) fn print_products(page: &Page<ProductSummary>) {
    tracing::info!(
        "Page {} of {} ({} products)",
        page.page + 1,
        page.total_pages.max(1),
        page.total_elements
    );
    for product in &page.items {
        let price = product
            .min_price
            .or(product.default_price)
            .map_or_else(|| "-".to_string(), money);
        tracing::info!(
            "  #{:<5} {:<40} {:<12} {}",
            product.product_id,
            product.name,
            product.brand_name.as_deref().unwrap_or(""),
            price
        );
    }
}

pub async fn product(client: &ApiClient, key: &str) -> Result<(), CommandError> {
    let key = key
        .parse::<i64>()
        .map_or_else(|_| ProductKey::Slug(key.to_string()), |id| ProductKey::Id(ProductId::new(id)));
    let mut screen = ProductDetailScreen::new(key);
    screen.refresh(client).await?;

    let Some(product) = screen.product() else {
        return Ok(());
    };
    tracing::info!("{} (#{})", product.name, product.product_id);
    if let Some(description) = &product.short_description {
        tracing::info!("  {description}");
    }
    for variant in &product.variants {
        let availability = if variant.is_purchasable() {
            format!("{} in stock", variant.stock)
        } else {
            "unavailable".to_string()
        };
        tracing::info!(
            "  variant {:<5} {:<16} {:<24} {} ({availability})",
            variant.variant_id,
            variant.sku,
            variant.attributes.as_deref().unwrap_or(""),
            money(variant.price)
        );
    }
    for spec in &product.specifications {
        tracing::info!(
            "  {}: {}",
            spec.spec_key,
            spec.spec_value.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn print_cart(screen: &CartScreen) {
    let Some(cart) = screen.cart() else {
        return;
    };
    if cart.is_empty() {
        tracing::info!("Your cart is empty");
        return;
    }
    for line in &cart.items {
        tracing::info!(
            "  variant {:<5} {:<40} {} x {} = {}",
            line.variant_id,
            line.product_name,
            line.quantity,
            money(line.unit_price),
            money(line.subtotal)
        );
    }
    tracing::info!("{} items, total {}", cart.total_items, money(cart.total_price));
    if screen.is_pending_reconcile() {
        tracing::info!(
            "Estimated total {} until the cart is reloaded",
            money(screen.advisory_total())
        );
    } else if !screen.is_reconciled() {
        tracing::warn!(
            "Cart totals differ from line prices (local estimate {})",
            money(screen.advisory_total())
        );
    }
}

async fn loaded_cart(client: &ApiClient) -> Result<CartScreen, CommandError> {
    let mut screen = CartScreen::new();
    screen.refresh(client).await?;
    Ok(screen)
}

pub async fn cart_show(client: &ApiClient) -> Result<(), CommandError> {
    let screen = loaded_cart(client).await?;
    print_cart(&screen);
    Ok(())
}

pub async fn cart_add(client: &ApiClient, variant: i64, quantity: u32) -> Result<(), CommandError> {
    let mut screen = CartScreen::new();
    screen.add(client, VariantId::new(variant), quantity).await?;
    if let Some(message) = screen.mirror().message() {
        tracing::info!("{message}");
    }
    print_cart(&screen);
    Ok(())
}

pub async fn cart_update(client: &ApiClient, variant: i64, quantity: u32) -> Result<(), CommandError> {
    let mut screen = loaded_cart(client).await?;
    screen
        .change_quantity(client, VariantId::new(variant), quantity)
        .await?;
    print_cart(&screen);
    Ok(())
}

pub async fn cart_remove(client: &ApiClient, variant: i64) -> Result<(), CommandError> {
    let mut screen = loaded_cart(client).await?;
    screen.remove(client, VariantId::new(variant)).await?;
    print_cart(&screen);
    Ok(())
}

pub async fn cart_clear(client: &ApiClient) -> Result<(), CommandError> {
    let mut screen = CartScreen::new();
    screen.clear(client).await?;
    tracing::info!("Cart cleared");
    Ok(())
}

pub async fn checkout(client: &ApiClient, form: &CheckoutRequest) -> Result<(), CommandError> {
    let mut screen = loaded_cart(client).await?;
    let receipt = screen.checkout(client, form).await?;
    tracing::info!(
        "Order #{} placed, total {} ({})",
        receipt.order_id,
        money(receipt.total_price),
        receipt.status.as_deref().unwrap_or("PENDING")
    );
    Ok(())
}
