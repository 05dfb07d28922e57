//! Back-office product and category management.
//!
//! Run with: cargo test -p gearhub-integration-tests --test admin

use gearhub_client::mirror::{CategoryScreen, MirrorError, ProductListScreen, ProductScope};
use gearhub_client::{ImageUpload, ProductUpload};
use gearhub_core::models::{CategoryInput, NewProduct, NewVariant, ProductUpdate, Specification};
use gearhub_core::{BrandId, CategoryId, ProductId};
use axum::http::StatusCode;
use gearhub_integration_tests::{Mode, SEEDED_PRODUCTS, StubBackend};
use rust_decimal::Decimal;

fn upload(image: Option<ImageUpload>) -> ProductUpload {
    ProductUpload {
        product: NewProduct {
            name: "Keychron Q1 Pro".to_string(),
            slug: None,
            short_description: Some("Wireless mechanical keyboard".to_string()),
            full_description: None,
            brand_id: BrandId::new(6),
            category_id: CategoryId::new(2),
            model_number: Some("Q1P-M1".to_string()),
            release_year: Some(2024),
            default_price: Some(Decimal::new(4_990_000, 0)),
        },
        variants: vec![
            NewVariant {
                sku: "Q1P-RED".to_string(),
                attributes: Some("Red switches".to_string()),
                price: Decimal::new(4_990_000, 0),
                stock: 12,
                is_active: Some(true),
            },
            NewVariant {
                sku: "Q1P-BRN".to_string(),
                attributes: Some("Brown switches".to_string()),
                price: Decimal::new(4_990_000, 0),
                stock: 0,
                is_active: None,
            },
        ],
        specifications: vec![Specification {
            spec_key: "Layout".to_string(),
            spec_value: Some("75%".to_string()),
        }],
        image,
    }
}

fn png() -> ImageUpload {
    ImageUpload {
        file_name: "q1-pro.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    }
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_multipart_create_then_fetch() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = ProductListScreen::new(ProductScope::Admin, 10);

    let id = screen
        .create(&client, upload(Some(png())))
        .await
        .expect("create");

    assert!(id.as_i64() > 0);
    let product = client.admin_get_product(id).await.expect("fetch").data;
    assert_eq!(product.product_id, id);
    assert_eq!(product.name, "Keychron Q1 Pro");
    assert_eq!(product.brand_id, BrandId::new(6));
    assert_eq!(product.category_id, CategoryId::new(2));
    assert_eq!(product.slug, "keychron-q1-pro");
    assert_eq!(product.variants.len(), 2);
    assert!(product.variants.iter().all(|v| v.variant_id.is_server_assigned()));
    assert_eq!(product.specifications.len(), 1);
    assert_eq!(product.image_url.as_deref(), Some("/uploads/q1-pro.png"));

    let image = stub.state().last_image.clone().expect("image part");
    assert_eq!(image.content_type, "image/png");
    assert_eq!(image.size, 8);

    let page = screen.page().expect("list reloaded");
    assert_eq!(page.total_elements, SEEDED_PRODUCTS as u64 + 1);
    assert_eq!(page.items.first().map(|p| p.product_id), Some(id));
}

#[tokio::test]
async fn test_create_returns_id_when_reload_fails() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = ProductListScreen::new(ProductScope::Admin, 10);
    stub.set_mode(Mode::OutageAfterWrite(StatusCode::SERVICE_UNAVAILABLE));

    let id = screen
        .create(&client, upload(None))
        .await
        .expect("create confirmed by the server");

    assert!(id.as_i64() > 0);
    assert!(screen.page().is_none());
    assert_eq!(screen.mirror().error(), Some("An error occurred"));
    assert!(!screen.mirror().is_mutating());

    stub.set_mode(Mode::Normal);
    let product = client.admin_get_product(id).await.expect("created").data;
    assert_eq!(product.name, "Keychron Q1 Pro");
    assert_eq!(
        stub.state()
            .products
            .iter()
            .filter(|p| p.name == "Keychron Q1 Pro")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_create_without_image() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;

    let created = client
        .admin_create_product(upload(None))
        .await
        .expect("create")
        .data;

    assert_eq!(created.variant_count, 2);
    assert_eq!(created.specification_count, 1);
    let product = client
        .admin_get_product(created.product_id)
        .await
        .expect("fetch")
        .data;
    assert!(product.image_url.is_none());
    assert!(stub.state().last_image.is_none());
}

#[tokio::test]
async fn test_update_and_delete_product() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = ProductListScreen::new(ProductScope::Admin, 10);
    screen.refresh(&client).await.expect("list");

    let update = ProductUpdate {
        name: Some("Logitech MX Master 3S for Mac".to_string()),
        ..ProductUpdate::default()
    };
    screen
        .update(&client, ProductId::new(1), &update)
        .await
        .expect("update");
    let product = client
        .admin_get_product(ProductId::new(1))
        .await
        .expect("fetch")
        .data;
    assert_eq!(product.name, "Logitech MX Master 3S for Mac");

    screen
        .delete(&client, ProductId::new(25))
        .await
        .expect("delete");
    let page = screen.page().expect("loaded");
    assert!(page.items.iter().all(|p| p.product_id != ProductId::new(25)));
    assert_eq!(page.total_elements, SEEDED_PRODUCTS as u64 - 1);

    let err = client
        .admin_get_product(ProductId::new(25))
        .await
        .expect_err("deleted");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_failed_delete_keeps_row() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = ProductListScreen::new(ProductScope::Admin, 10);
    screen.refresh(&client).await.expect("list");
    let before = screen.page().map(|p| p.items.len());

    let err = screen
        .delete(&client, ProductId::new(404))
        .await
        .expect_err("unknown product");

    assert_eq!(err.message(), "Product not found");
    assert_eq!(screen.page().map(|p| p.items.len()), before);
    assert_eq!(screen.mirror().error(), Some("Product not found"));
}

#[tokio::test]
async fn test_staff_listing_cannot_edit() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = ProductListScreen::new(ProductScope::Staff, 10);
    let before = stub.request_count();

    let err = screen
        .delete(&client, ProductId::new(1))
        .await
        .expect_err("staff desk is read-only");

    assert!(matches!(err, MirrorError::NotOffered(_)));
    assert_eq!(stub.request_count(), before);
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_tree_rows() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = CategoryScreen::new();

    screen.refresh(&client).await.expect("categories");

    let rows: Vec<(usize, &str)> = screen
        .rows()
        .into_iter()
        .map(|(depth, c)| (depth, c.name.as_str()))
        .collect();
    assert_eq!(rows.get(1), Some(&(0, "Peripherals")));
    assert_eq!(rows.get(2), Some(&(1, "Mice")));
    assert!(screen.find(CategoryId::new(6)).is_some());
}

#[tokio::test]
async fn test_create_child_category_refetches_tree() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = CategoryScreen::new();

    let id = screen
        .create(
            &client,
            &CategoryInput {
                name: Some("Keyboards".to_string()),
                description: None,
                parent_id: Some(CategoryId::new(2)),
            },
        )
        .await
        .expect("create");

    let created = screen.find(id).expect("in refetched tree");
    assert_eq!(created.parent_id, Some(CategoryId::new(2)));
    assert!(
        screen
            .rows()
            .iter()
            .any(|(depth, c)| *depth == 1 && c.category_id == id)
    );
}

#[tokio::test]
async fn test_category_create_survives_failed_reload() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = CategoryScreen::new();
    stub.set_mode(Mode::OutageAfterWrite(StatusCode::BAD_GATEWAY));

    let id = screen
        .create(
            &client,
            &CategoryInput {
                name: Some("Webcams".to_string()),
                description: None,
                parent_id: None,
            },
        )
        .await
        .expect("create confirmed by the server");

    assert!(id.as_i64() > 0);
    assert!(screen.mirror().error().is_some());
    assert!(stub.state().categories.iter().any(|c| c.category_id == id));
}

#[tokio::test]
async fn test_blank_category_name_refused_locally() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = CategoryScreen::new();
    let before = stub.request_count();

    let err = screen
        .create(&client, &CategoryInput::default())
        .await
        .expect_err("blank name");

    assert!(matches!(err, MirrorError::InvalidInput(_)));
    assert_eq!(stub.request_count(), before);
}

#[tokio::test]
async fn test_delete_category_in_use_is_refused_by_server() {
    let stub = StubBackend::spawn().await;
    let client = stub.signed_in("admin").await;
    let mut screen = CategoryScreen::new();
    screen.refresh(&client).await.expect("categories");

    let err = screen
        .delete(&client, CategoryId::new(1))
        .await
        .expect_err("laptops still listed");
    assert_eq!(err.message(), "Category still has products");
    assert!(screen.find(CategoryId::new(1)).is_some());

    screen
        .delete(&client, CategoryId::new(7))
        .await
        .expect("empty category");
    assert!(screen.find(CategoryId::new(7)).is_none());
}
