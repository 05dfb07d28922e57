//! Static demo dataset served when the backend is unreachable.
//!
//! Only login and product listing ever read from here, and only when the
//! demo fallback is enabled in [`ClientConfig`](crate::ClientConfig). The
//! back-office collections without server endpoints (vouchers, FAQs,
//! tickets) are also seeded from this dataset.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDate, NaiveDateTime};
use gearhub_core::models::{
    Faq, LoginResponse, ProductQuery, ProductSummary, SortDirection, SupportTicket, Voucher,
};
use gearhub_core::{
    ApiResponse, BrandId, CategoryId, FaqId, Page, ProductId, Role, TicketId, TicketStatus, UserId,
    VoucherId,
};
use rust_decimal::Decimal;

use crate::error::ClientError;

/// The one password every demo account accepts.
pub const DEMO_PASSWORD: &str = "password";
/// Envelope message for a demo login.
pub const DEMO_LOGIN_MESSAGE: &str = "Login successful (demo mode)";
/// Envelope message for demo product listings.
pub const DEMO_PRODUCTS_MESSAGE: &str = "Products retrieved (using demo data)";

/// Process-wide marker that some response came from demo data.
///
/// Once set it stays set until the process exits.
#[derive(Debug, Clone, Default)]
pub struct DemoMode(Arc<AtomicBool>);

impl DemoMode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&self) {
        if !self.0.swap(true, Ordering::SeqCst) {
            tracing::warn!("backend unavailable, serving demo data");
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A demo account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoUser {
    pub user_id: UserId,
    pub username: &'static str,
    pub email: &'static str,
    pub name: &'static str,
    pub role: Role,
}

/// Demo accounts, one per role.
#[must_use]
pub fn users() -> Vec<DemoUser> {
    vec![
        DemoUser {
            user_id: UserId::new(1),
            username: "admin",
            email: "admin@gearhub.test",
            name: "Store Administrator",
            role: Role::Admin,
        },
        DemoUser {
            user_id: UserId::new(2),
            username: "staff",
            email: "staff@gearhub.test",
            name: "Floor Staff",
            role: Role::Moderator,
        },
        DemoUser {
            user_id: UserId::new(3),
            username: "customer",
            email: "customer@gearhub.test",
            name: "Demo Customer",
            role: Role::User,
        },
        DemoUser {
            user_id: UserId::new(4),
            username: "guest",
            email: "guest@gearhub.test",
            name: "Guest Visitor",
            role: Role::Guest,
        },
    ]
}

/// Log in against the demo accounts.
///
/// # Errors
///
/// Returns `ClientError::Demo` with "Invalid credentials" when no account
/// matches the username or the password is not [`DEMO_PASSWORD`].
pub fn login(username: &str, password: &str) -> Result<ApiResponse<LoginResponse>, ClientError> {
    let user = users()
        .into_iter()
        .find(|u| u.username == username)
        .filter(|_| password == DEMO_PASSWORD)
        .ok_or_else(ClientError::invalid_credentials)?;

    let token = format!("demo_token_{}", chrono::Utc::now().timestamp_millis());
    Ok(ApiResponse::ok(
        DEMO_LOGIN_MESSAGE,
        LoginResponse {
            token,
            user_id: user.user_id,
            username: user.username.to_string(),
            email: user.email.to_string(),
            role_id: user.role,
            name: Some(user.name.to_string()),
        },
    ))
}

fn product(
    id: i64,
    name: &str,
    brand: (i64, &str),
    category: (i64, &str),
    price: i64,
    description: &str,
) -> ProductSummary {
    let slug = name
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    ProductSummary {
        product_id: ProductId::new(id),
        name: name.to_string(),
        slug,
        short_description: Some(description.to_string()),
        brand_id: BrandId::new(brand.0),
        brand_name: Some(brand.1.to_string()),
        category_id: CategoryId::new(category.0),
        category_name: Some(category.1.to_string()),
        default_price: Some(Decimal::new(price, 0)),
        image_url: Some(format!("/images/products/{id}.jpg")),
        min_price: Some(Decimal::new(price, 0)),
        max_price: Some(Decimal::new(price, 0)),
    }
}

/// Demo catalog, newest first.
#[must_use]
pub fn products() -> Vec<ProductSummary> {
    const ASUS: (i64, &str) = (1, "ASUS");
    const LOGITECH: (i64, &str) = (2, "Logitech");
    const SAMSUNG: (i64, &str) = (3, "Samsung");
    const SONY: (i64, &str) = (4, "Sony");
    const APPLE: (i64, &str) = (5, "Apple");

    const LAPTOPS: (i64, &str) = (1, "Laptops");
    const PERIPHERALS: (i64, &str) = (2, "Peripherals");
    const MONITORS: (i64, &str) = (3, "Monitors");
    const AUDIO: (i64, &str) = (4, "Audio");
    const PHONES: (i64, &str) = (5, "Phones");

    vec![
        product(12, "ROG Zephyrus G14", ASUS, LAPTOPS, 42_990_000, "14-inch gaming laptop"),
        product(11, "ZenBook 14 OLED", ASUS, LAPTOPS, 24_490_000, "Thin and light ultrabook"),
        product(10, "MacBook Air M3", APPLE, LAPTOPS, 27_990_000, "Fanless 13-inch laptop"),
        product(9, "MX Master 3S", LOGITECH, PERIPHERALS, 2_490_000, "Quiet-click wireless mouse"),
        product(8, "MX Keys S", LOGITECH, PERIPHERALS, 2_790_000, "Backlit wireless keyboard"),
        product(7, "G Pro X Superlight 2", LOGITECH, PERIPHERALS, 3_590_000, "Esports mouse"),
        product(6, "Odyssey G7 27\"", SAMSUNG, MONITORS, 12_990_000, "240 Hz curved monitor"),
        product(5, "ViewFinity S8 32\"", SAMSUNG, MONITORS, 9_490_000, "4K productivity monitor"),
        product(4, "ProArt PA279CV", ASUS, MONITORS, 8_990_000, "Colour-accurate 4K display"),
        product(3, "WH-1000XM5", SONY, AUDIO, 7_990_000, "Noise cancelling headphones"),
        product(2, "WF-1000XM5", SONY, AUDIO, 5_990_000, "Noise cancelling earbuds"),
        product(1, "Galaxy S24 Ultra", SAMSUNG, PHONES, 29_990_000, "Flagship phone with S Pen"),
    ]
}

/// Filter, sort and paginate the demo catalog like the backend would.
#[must_use]
pub fn product_page(query: &ProductQuery) -> ApiResponse<Page<ProductSummary>> {
    let keyword = query.keyword().map(str::to_lowercase);
    let mut matching: Vec<ProductSummary> = products()
        .into_iter()
        .filter(|p| {
            keyword.as_deref().is_none_or(|k| {
                p.name.to_lowercase().contains(k)
                    || p.brand_name
                        .as_deref()
                        .is_some_and(|b| b.to_lowercase().contains(k))
            })
        })
        .filter(|p| query.category_id.is_none_or(|c| p.category_id == c))
        .filter(|p| query.brand_id.is_none_or(|b| p.brand_id == b))
        .collect();

    match query.sort_by.as_str() {
        "name" => matching.sort_by(|a, b| a.name.cmp(&b.name)),
        "price" | "defaultPrice" => matching.sort_by_key(|p| p.default_price),
        // Dataset order is newest first.
        _ => matching.reverse(),
    }
    if query.sort_dir == SortDirection::Desc {
        matching.reverse();
    }

    ApiResponse::ok(
        DEMO_PRODUCTS_MESSAGE,
        Page::window(&matching, query.page, query.size),
    )
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|day| day.and_hms_opt(9, 0, 0))
}

/// Seed vouchers.
#[must_use]
pub fn vouchers() -> Vec<Voucher> {
    vec![
        Voucher {
            voucher_id: VoucherId::new(1),
            code: "WELCOME10".to_string(),
            discount_percent: Some(Decimal::new(10, 0)),
            discount_amount: None,
            description: Some("10% off the first order".to_string()),
            is_active: true,
        },
        Voucher {
            voucher_id: VoucherId::new(2),
            code: "FREESHIP".to_string(),
            discount_percent: None,
            discount_amount: Some(Decimal::new(30_000, 0)),
            description: Some("Shipping on us".to_string()),
            is_active: true,
        },
        Voucher {
            voucher_id: VoucherId::new(3),
            code: "TET2024".to_string(),
            discount_percent: Some(Decimal::new(15, 0)),
            discount_amount: None,
            description: Some("Lunar new year sale".to_string()),
            is_active: false,
        },
    ]
}

/// Seed FAQs.
#[must_use]
pub fn faqs() -> Vec<Faq> {
    vec![
        Faq {
            faq_id: FaqId::new(1),
            question: "How long does delivery take?".to_string(),
            answer: "Two to four business days in major cities.".to_string(),
            category: "Shipping".to_string(),
        },
        Faq {
            faq_id: FaqId::new(2),
            question: "Can I cancel an order?".to_string(),
            answer: "Yes, while it is pending or confirmed.".to_string(),
            category: "Orders".to_string(),
        },
        Faq {
            faq_id: FaqId::new(3),
            question: "What does the warranty cover?".to_string(),
            answer: "Manufacturing defects for the period listed on each product.".to_string(),
            category: "Warranty".to_string(),
        },
    ]
}

/// Seed support tickets.
#[must_use]
pub fn tickets() -> Vec<SupportTicket> {
    vec![
        SupportTicket {
            ticket_id: TicketId::new(1),
            user_id: Some(UserId::new(3)),
            subject: "Order arrived damaged".to_string(),
            message: "The monitor box was crushed on one corner.".to_string(),
            status: TicketStatus::Open,
            created_at: date(2024, 11, 4),
            responses: Vec::new(),
        },
        SupportTicket {
            ticket_id: TicketId::new(2),
            user_id: Some(UserId::new(3)),
            subject: "Invoice request".to_string(),
            message: "Please send a VAT invoice for my last order.".to_string(),
            status: TicketStatus::InProgress,
            created_at: date(2024, 10, 28),
            responses: vec!["We are preparing it now.".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_login_matches_role() {
        let response = login("staff", "password").expect("login");
        assert!(response.success);
        assert_eq!(response.message, "Login successful (demo mode)");
        assert_eq!(response.data.role_id, Role::Moderator);
        assert!(response.data.token.starts_with("demo_token_"));
    }

    #[test]
    fn test_demo_login_rejects_wrong_password_and_unknown_user() {
        for (user, pass) in [("staff", "hunter2"), ("nobody", "password")] {
            let err = login(user, pass).expect_err("rejected");
            assert!(matches!(err, ClientError::Demo(_)));
            assert_eq!(err.message(), "Invalid credentials");
        }
    }

    #[test]
    fn test_product_page_is_consistent() {
        let query = ProductQuery {
            page: 1,
            size: 5,
            ..ProductQuery::default()
        };
        let page = product_page(&query).data;
        assert_eq!(page.total_elements, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 5);
        assert!(!page.first);
        assert!(!page.last);
        assert!(page.is_consistent());
        // createdAt DESC is dataset order.
        assert_eq!(page.items[0].product_id, ProductId::new(7));
    }

    #[test]
    fn test_product_page_filters() {
        let query = ProductQuery {
            keyword: Some("  sony ".to_string()),
            ..ProductQuery::default()
        };
        let page = product_page(&query).data;
        assert_eq!(page.total_elements, 2);

        let query = ProductQuery {
            category_id: Some(CategoryId::new(3)),
            sort_by: "price".to_string(),
            sort_dir: SortDirection::Asc,
            ..ProductQuery::default()
        };
        let names: Vec<_> = product_page(&query)
            .data
            .items
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(
            names,
            vec!["ProArt PA279CV", "ViewFinity S8 32\"", "Odyssey G7 27\""]
        );
    }

    #[test]
    fn test_empty_result_is_single_page() {
        let query = ProductQuery {
            keyword: Some("toaster".to_string()),
            ..ProductQuery::default()
        };
        let page = product_page(&query).data;
        assert!(page.items.is_empty());
        assert!(page.first);
        assert!(page.last);
    }

    #[test]
    fn test_demo_mode_is_sticky() {
        let demo = DemoMode::new();
        let shared = demo.clone();
        assert!(!demo.is_active());
        shared.activate();
        assert!(demo.is_active());
        shared.activate();
        assert!(demo.is_active());
    }

    #[test]
    fn test_slugs() {
        let slugs: Vec<_> = products().into_iter().map(|p| p.slug).collect();
        assert!(slugs.contains(&"odyssey-g7-27".to_string()));
        assert!(slugs.contains(&"wh-1000xm5".to_string()));
    }
}
