//! Back-office commands: products, categories and the local-only lists.
//!
//! # Usage
//!
//! ```bash
//! # Create a product with one variant and an image
//! gearhub admin products add --name "MX Master 3S" --brand 2 --category 2 \
//!     --sku MX3S-BLK --price 2490000 --stock 25 --image mx3s.png
//!
//! # Show the category tree
//! gearhub admin categories list
//! ```

use std::path::PathBuf;

use gearhub_client::mirror::{
    Access, CategoryScreen, LocalCollection, ProductListScreen, ProductScope,
};
use gearhub_client::{ApiClient, ImageUpload, ProductUpload, fallback};
use gearhub_core::models::{CategoryInput, NewProduct, NewVariant, ProductUpdate};
use gearhub_core::{BrandId, CategoryId, ProductId};
use rust_decimal::Decimal;

use super::{CommandError, money, note_demo, shop::print_products};

/// Which product desk a listing comes from.
#[derive(Debug, Clone, Copy)]
pub enum Desk {
    Staff,
    Admin,
}

pub struct ListFilters {
    pub keyword: Option<String>,
    pub page: u32,
    pub size: u32,
}

/// A new product with a single variant, as given on the command line.
pub struct ProductDraft {
    pub name: String,
    pub brand: i64,
    pub category: i64,
    pub sku: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    pub image: Option<PathBuf>,
}

impl ProductDraft {
    async fn into_upload(self) -> Result<ProductUpload, CommandError> {
        let image = match &self.image {
            Some(path) => Some(ImageUpload::from_path(path).await.map_err(|source| {
                CommandError::Image {
                    path: path.display().to_string(),
                    source,
                }
            })?),
            None => None,
        };
        Ok(ProductUpload {
            product: NewProduct {
                name: self.name,
                slug: None,
                short_description: self.description,
                full_description: None,
                brand_id: BrandId::new(self.brand),
                category_id: CategoryId::new(self.category),
                model_number: None,
                release_year: None,
                default_price: Some(self.price),
            },
            variants: vec![NewVariant {
                sku: self.sku,
                attributes: None,
                price: self.price,
                stock: self.stock,
                is_active: Some(true),
            }],
            specifications: Vec::new(),
            image,
        })
    }
}

fn admin_products() -> ProductListScreen {
    ProductListScreen::new(ProductScope::Admin, 10)
}

pub async fn products(client: &ApiClient, desk: Desk, filters: &ListFilters) -> Result<(), CommandError> {
    let scope = match desk {
        Desk::Staff => ProductScope::Staff,
        Desk::Admin => ProductScope::Admin,
    };
    let mut screen = ProductListScreen::new(scope, filters.size);
    screen.set_keyword(filters.keyword.as_deref().unwrap_or_default());
    screen.set_page(filters.page);
    screen.refresh(client).await?;
    if let Some(page) = screen.page() {
        print_products(page);
    }
    note_demo(client);
    Ok(())
}

pub async fn product(client: &ApiClient, id: i64) -> Result<(), CommandError> {
    Access::Admin.check(client).await?;
    let product = client.admin_get_product(ProductId::new(id)).await?.data;
    tracing::info!(
        "{} (#{}, slug {})",
        product.name,
        product.product_id,
        product.slug
    );
    tracing::info!(
        "  brand {} / category {}",
        product.brand_name.as_deref().unwrap_or("-"),
        product.category_name.as_deref().unwrap_or("-")
    );
    if let Some(url) = &product.image_url {
        tracing::info!("  image {url}");
    }
    for variant in &product.variants {
        tracing::info!(
            "  variant {:<5} {:<16} stock {:<5} {}{}",
            variant.variant_id,
            variant.sku,
            variant.stock,
            money(variant.price),
            if variant.is_active { "" } else { " (inactive)" }
        );
    }
    Ok(())
}

pub async fn create_product(client: &ApiClient, draft: ProductDraft) -> Result<(), CommandError> {
    let upload = draft.into_upload().await?;
    let mut screen = admin_products();
    let id = screen.create(client, upload).await?;
    tracing::info!("Created product #{id}");
    Ok(())
}

pub async fn update_product(
    client: &ApiClient,
    id: i64,
    update: &ProductUpdate,
) -> Result<(), CommandError> {
    let mut screen = admin_products();
    screen.update(client, ProductId::new(id), update).await?;
    tracing::info!("Updated product #{id}");
    Ok(())
}

pub async fn delete_product(client: &ApiClient, id: i64) -> Result<(), CommandError> {
    let mut screen = admin_products();
    screen.delete(client, ProductId::new(id)).await?;
    tracing::info!("Deleted product #{id}");
    Ok(())
}

pub async fn categories(client: &ApiClient) -> Result<(), CommandError> {
    let mut screen = CategoryScreen::new();
    screen.refresh(client).await?;
    for (depth, category) in screen.rows() {
        tracing::info!(
            "{}#{} {}",
            "  ".repeat(depth + 1),
            category.category_id,
            category.name
        );
    }
    Ok(())
}

pub async fn create_category(client: &ApiClient, input: &CategoryInput) -> Result<(), CommandError> {
    let mut screen = CategoryScreen::new();
    let id = screen.create(client, input).await?;
    tracing::info!("Created category #{id}");
    Ok(())
}

pub async fn update_category(
    client: &ApiClient,
    id: i64,
    input: &CategoryInput,
) -> Result<(), CommandError> {
    let mut screen = CategoryScreen::new();
    screen.update(client, CategoryId::new(id), input).await?;
    tracing::info!("Updated category #{id}");
    Ok(())
}

pub async fn delete_category(client: &ApiClient, id: i64) -> Result<(), CommandError> {
    let mut screen = CategoryScreen::new();
    screen.delete(client, CategoryId::new(id)).await?;
    tracing::info!("Deleted category #{id}");
    Ok(())
}

pub async fn vouchers(client: &ApiClient) -> Result<(), CommandError> {
    Access::Admin.check(client).await?;
    let vouchers = LocalCollection::new(fallback::vouchers());
    for voucher in vouchers.items() {
        let discount = match (voucher.discount_percent, voucher.discount_amount) {
            (Some(percent), _) => format!("{percent}%"),
            (None, Some(amount)) => money(amount),
            (None, None) => "-".to_string(),
        };
        tracing::info!(
            "  {:<12} {:<10} {}{}",
            voucher.code,
            discount,
            voucher.description.as_deref().unwrap_or(""),
            if voucher.is_active { "" } else { " (inactive)" }
        );
    }
    Ok(())
}

pub async fn faqs(client: &ApiClient) -> Result<(), CommandError> {
    Access::Admin.check(client).await?;
    let faqs = LocalCollection::new(fallback::faqs());
    for faq in faqs.items() {
        tracing::info!("  [{}] {}", faq.category, faq.question);
        tracing::info!("      {}", faq.answer);
    }
    Ok(())
}

pub async fn tickets(client: &ApiClient) -> Result<(), CommandError> {
    Access::Admin.check(client).await?;
    let tickets = LocalCollection::new(fallback::tickets());
    for ticket in tickets.items() {
        tracing::info!(
            "  #{:<4} {:<12?} {} ({} responses)",
            ticket.ticket_id,
            ticket.status,
            ticket.subject,
            ticket.responses.len()
        );
    }
    Ok(())
}
