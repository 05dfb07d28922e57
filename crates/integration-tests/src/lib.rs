//! Integration test support for GearHub.
//!
//! [`StubBackend`] serves the GearHub REST API from memory on an ephemeral
//! port. Tests drive a real [`ApiClient`] against it and inspect or tweak
//! the backend's state through [`StubBackend::state`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gearhub-integration-tests
//! ```
//!
//! # Accounts
//!
//! | username   | password      | role      |
//! |------------|---------------|-----------|
//! | `admin`    | `admin123`    | admin     |
//! | `staff`    | `staff123`    | moderator |
//! | `customer` | `customer123` | user      |

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use gearhub_client::{ApiClient, ClientConfig, SessionStore};
use gearhub_core::models::{
    Cart, CartLine, Category, CreatedProduct, NewProduct, NewVariant, OrderDetail, OrderLine,
    OrderSummary, ProductDetail, ProductSummary, ProductUpdate, ProductVariant, Profile,
    Specification,
};
use gearhub_core::{
    BrandId, CategoryId, OrderId, OrderStatus, Page, ProductId, Role, UserId, VariantId,
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Base path every route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Number of products in the seeded catalog.
pub const SEEDED_PRODUCTS: usize = 25;

/// `(username, password, user id, role)` of the stub's accounts.
pub const ACCOUNTS: [(&str, &str, i64, Role); 3] = [
    ("admin", "admin123", 1, Role::Admin),
    ("staff", "staff123", 2, Role::Moderator),
    ("customer", "customer123", 3, Role::User),
];

/// How the stub answers every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Serve the API.
    #[default]
    Normal,
    /// Answer with this status and an empty JSON body, as a failing
    /// gateway would.
    Outage(StatusCode),
    /// Answer with an HTML error page.
    Html,
    /// Serve the API until the next write has been answered, then switch
    /// to `Outage` with this status.
    OutageAfterWrite(StatusCode),
}

/// One request the stub received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// Uploaded image metadata from the last multipart create.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// In-memory backend data.
#[derive(Debug)]
pub struct StubState {
    pub mode: Mode,
    pub products: Vec<ProductDetail>,
    pub cart: Vec<CartLine>,
    pub orders: Vec<OrderDetail>,
    pub categories: Vec<Category>,
    pub profiles: Vec<Profile>,
    pub passwords: Vec<(String, String)>,
    pub requests: Vec<Recorded>,
    pub last_image: Option<StoredImage>,
    next_id: i64,
}

impl StubState {
    fn seeded() -> Self {
        Self {
            mode: Mode::Normal,
            products: seed_products(),
            cart: Vec::new(),
            orders: seed_orders(),
            categories: seed_categories(),
            profiles: ACCOUNTS
                .iter()
                .map(|(username, _, id, role)| Profile {
                    user_id: UserId::new(*id),
                    username: (*username).to_string(),
                    email: format!("{username}@gearhub.test"),
                    name: Some(format!("{username} account")),
                    phone: None,
                    shipping_address: None,
                    avatar_url: None,
                    role_id: Some(*role),
                })
                .collect(),
            passwords: ACCOUNTS
                .iter()
                .map(|(u, p, _, _)| ((*u).to_string(), (*p).to_string()))
                .collect(),
            requests: Vec::new(),
            last_image: None,
            next_id: 1000,
        }
    }

    const fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Requests whose path ends with `suffix`.
    #[must_use]
    pub fn requests_to(&self, suffix: &str) -> Vec<&Recorded> {
        self.requests
            .iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }

    fn cart(&self) -> Cart {
        let items = self.cart.clone();
        Cart {
            total_items: items.iter().map(|l| l.quantity).sum(),
            total_price: items.iter().map(|l| l.subtotal).sum(),
            items,
        }
    }

    fn variant(&self, id: VariantId) -> Option<(&ProductDetail, &ProductVariant)> {
        self.products
            .iter()
            .find_map(|p| p.variant(id).map(|v| (p, v)))
    }
}

type Shared = Arc<Mutex<StubState>>;

/// A stub GearHub backend bound to an ephemeral port.
pub struct StubBackend {
    base_url: Url,
    state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl StubBackend {
    /// Start the stub with the seeded data.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::seeded()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let base_url = Url::parse(&format!("http://{addr}{API_PREFIX}")).expect("base url");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Client configuration pointing at this stub.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone())
    }

    /// A signed-out client with an in-memory session.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config(), SessionStore::in_memory()).expect("client")
    }

    /// A client signed in as one of [`ACCOUNTS`].
    ///
    /// # Panics
    ///
    /// Panics if `username` is not a stub account or login fails.
    pub async fn signed_in(&self, username: &str) -> ApiClient {
        let password = ACCOUNTS
            .iter()
            .find(|(u, ..)| *u == username)
            .map(|(_, p, ..)| *p)
            .expect("known account");
        let client = self.client();
        client
            .login(username, &SecretString::from(password))
            .await
            .expect("login");
        client
    }

    /// Lock the backend state.
    pub fn state(&self) -> MutexGuard<'_, StubState> {
        lock(&self.state)
    }

    pub fn set_mode(&self, mode: Mode) {
        self.state().mode = mode;
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Configuration for a backend that refuses connections.
///
/// # Panics
///
/// Never; the URL is a literal.
#[must_use]
pub fn unreachable_config() -> ClientConfig {
    ClientConfig::new(Url::parse("http://127.0.0.1:1/api/v1").expect("literal url"))
        .with_timeout(std::time::Duration::from_secs(2))
}

fn lock(state: &Shared) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Router
// ============================================================================

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/user/profile", get(get_profile).put(update_profile))
        .route("/user/change-password", put(change_password))
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/products/slug/{slug}", get(get_product_by_slug))
        .route("/user/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route(
            "/user/cart/{variant_id}",
            put(update_cart_line).delete(remove_cart_line),
        )
        .route("/user/checkout", post(checkout))
        .route("/user/orders", get(my_orders))
        .route("/user/orders/{id}", get(my_order))
        .route("/user/orders/{id}/cancel", put(cancel_order))
        .route("/staff/product", get(staff_products))
        .route("/staff/product/{id}", get(staff_product))
        .route("/staff/order", get(staff_orders))
        .route("/staff/order/{id}", get(staff_order))
        .route("/staff/order/{id}/status", put(staff_order_status))
        .route("/admin/product", get(admin_products))
        .route("/admin/product/add", post(admin_create_product))
        .route(
            "/admin/product/{id}",
            get(admin_product)
                .put(admin_update_product)
                .delete(admin_delete_product),
        )
        .route("/admin/order", get(admin_orders))
        .route("/admin/order/{id}", get(admin_order))
        .route("/admin/order/{id}/status", put(admin_order_status))
        .route("/admin/category", get(list_categories).post(create_category))
        .route(
            "/admin/category/{id}",
            put(update_category).delete(delete_category),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

/// Record every request and apply the failure mode.
async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let mode = {
        let mut guard = lock(&state);
        guard.requests.push(Recorded {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        });
        guard.mode
    };

    match mode {
        Mode::Normal => next.run(request).await,
        Mode::OutageAfterWrite(status) => {
            let write = request.method() != Method::GET;
            let response = next.run(request).await;
            if write {
                lock(&state).mode = Mode::Outage(status);
            }
            response
        }
        Mode::Outage(status) => (status, Json(json!({}))).into_response(),
        Mode::Html => (
            StatusCode::BAD_GATEWAY,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            "<html><body><h1>502 Bad Gateway</h1></body></html>",
        )
            .into_response(),
    }
}

// ============================================================================
// Envelope helpers
// ============================================================================

fn ok(message: &str, data: impl serde::Serialize) -> Response {
    Json(json!({ "success": true, "message": message, "data": data })).into_response()
}

fn fail(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "code": code,
            "originMessage": status.canonical_reason(),
        })),
    )
        .into_response()
}

fn not_found(what: &str) -> Response {
    fail(StatusCode::NOT_FOUND, "RES_404", &format!("{what} not found"))
}

/// Serialize a page with its items under the resource's key.
fn page_json<T: serde::Serialize>(key: &str, page: &Page<T>) -> Value {
    let mut value = serde_json::to_value(page).unwrap_or(Value::Null);
    if let Some(object) = value.as_object_mut()
        && let Some(items) = object.remove("items")
    {
        object.insert(key.to_string(), items);
    }
    value
}

/// The caller's account, from the bearer token `token-<username>`.
fn caller(headers: &HeaderMap) -> Option<(i64, Role)> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer token-")?;
    ACCOUNTS
        .iter()
        .find(|(u, ..)| *u == token)
        .map(|(_, _, id, role)| (*id, *role))
}

fn require(headers: &HeaderMap, allowed: fn(Role) -> bool) -> Result<(i64, Role), Response> {
    let Some((id, role)) = caller(headers) else {
        return Err(fail(StatusCode::UNAUTHORIZED, "AUTH_401", "Unauthorized"));
    };
    if allowed(role) {
        Ok((id, role))
    } else {
        Err(fail(StatusCode::FORBIDDEN, "AUTH_403", "Access denied"))
    }
}

const fn any_role(_: Role) -> bool {
    true
}

const fn staff_role(role: Role) -> bool {
    role.can_staff()
}

const fn admin_role(role: Role) -> bool {
    role.can_administer()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    #[serde(default)]
    page: u32,
    #[serde(default = "default_size")]
    size: u32,
    keyword: Option<String>,
    category_id: Option<i64>,
    brand_id: Option<i64>,
    sort_by: Option<String>,
    sort_dir: Option<String>,
    status_id: Option<i64>,
}

const fn default_size() -> u32 {
    10
}

// ============================================================================
// Auth and profile
// ============================================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let state = lock(&state);
    let valid = state
        .passwords
        .iter()
        .any(|(u, p)| u == username && p == password);
    let account = ACCOUNTS.iter().find(|(u, ..)| *u == username);
    match account {
        Some((name, _, id, role)) if valid => ok(
            "Login successful",
            json!({
                "token": format!("token-{name}"),
                "userId": id,
                "username": name,
                "email": format!("{name}@gearhub.test"),
                "roleId": role,
            }),
        ),
        _ => fail(
            StatusCode::UNAUTHORIZED,
            "AUTH_001",
            "Invalid username or password",
        ),
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let mut state = lock(&state);
    if state.profiles.iter().any(|p| p.username == username) {
        return fail(StatusCode::CONFLICT, "USER_409", "Username already exists");
    }
    let id = state.next_id();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    state.profiles.push(Profile {
        user_id: UserId::new(id),
        username: username.clone(),
        email: email.clone(),
        name: body["name"].as_str().map(str::to_string),
        phone: None,
        shipping_address: None,
        avatar_url: None,
        role_id: Some(Role::User),
    });
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration successful",
            "data": { "userId": id, "username": username, "email": email },
        })),
    )
        .into_response()
}

async fn get_profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let (id, _) = match require(&headers, any_role) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let state = lock(&state);
    state
        .profiles
        .iter()
        .find(|p| p.user_id == UserId::new(id))
        .map_or_else(|| not_found("Profile"), |p| ok("Profile retrieved", p))
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(update): Json<gearhub_core::models::ProfileUpdate>,
) -> Response {
    let (id, _) = match require(&headers, any_role) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let mut state = lock(&state);
    let Some(profile) = state
        .profiles
        .iter_mut()
        .find(|p| p.user_id == UserId::new(id))
    else {
        return not_found("Profile");
    };
    if update.name.is_some() {
        profile.name = update.name;
    }
    if update.phone.is_some() {
        profile.phone = update.phone;
    }
    if update.shipping_address.is_some() {
        profile.shipping_address = update.shipping_address;
    }
    if update.avatar_url.is_some() {
        profile.avatar_url = update.avatar_url;
    }
    ok("Profile updated", &*profile)
}

async fn change_password(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let (id, _) = match require(&headers, any_role) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let Some((username, ..)) = ACCOUNTS.iter().find(|(_, _, i, _)| *i == id) else {
        return not_found("User");
    };
    let mut state = lock(&state);
    let Some(entry) = state.passwords.iter_mut().find(|(u, _)| u == username) else {
        return not_found("User");
    };
    if body["currentPassword"].as_str() != Some(entry.1.as_str()) {
        return fail(
            StatusCode::BAD_REQUEST,
            "AUTH_002",
            "Current password is incorrect",
        );
    }
    entry.1 = body["newPassword"].as_str().unwrap_or_default().to_string();
    ok("Password changed successfully", Value::Null)
}

// ============================================================================
// Catalog
// ============================================================================

fn summary(product: &ProductDetail) -> ProductSummary {
    let prices = product.variants.iter().map(|v| v.price);
    ProductSummary {
        product_id: product.product_id,
        name: product.name.clone(),
        slug: product.slug.clone(),
        short_description: product.short_description.clone(),
        brand_id: product.brand_id,
        brand_name: product.brand_name.clone(),
        category_id: product.category_id,
        category_name: product.category_name.clone(),
        default_price: product.default_price,
        image_url: product.image_url.clone(),
        min_price: prices.clone().min(),
        max_price: prices.max(),
    }
}

fn product_page(state: &StubState, params: &ListParams) -> Value {
    let keyword = params
        .keyword
        .as_deref()
        .map(str::to_lowercase)
        .filter(|k| !k.is_empty());
    let mut products: Vec<ProductSummary> = state
        .products
        .iter()
        .filter(|p| keyword.as_ref().is_none_or(|k| p.name.to_lowercase().contains(k)))
        .filter(|p| params.category_id.is_none_or(|c| p.category_id == CategoryId::new(c)))
        .filter(|p| params.brand_id.is_none_or(|b| p.brand_id == BrandId::new(b)))
        .map(summary)
        .collect();

    let ascending = params
        .sort_dir
        .as_deref()
        .is_some_and(|d| d.eq_ignore_ascii_case("asc"));
    match params.sort_by.as_deref() {
        Some("name") => products.sort_by(|a, b| a.name.cmp(&b.name)),
        Some("price" | "defaultPrice") => products.sort_by_key(|p| p.default_price),
        _ => products.sort_by_key(|p| p.product_id),
    }
    if !ascending {
        products.reverse();
    }

    page_json(
        "products",
        &Page::window(&products, params.page, params.size),
    )
}

async fn list_products(State(state): State<Shared>, Query(params): Query<ListParams>) -> Response {
    let state = lock(&state);
    ok("Products retrieved", product_page(&state, &params))
}

fn find_product(state: &Shared, id: i64) -> Response {
    lock(state)
        .products
        .iter()
        .find(|p| p.product_id == ProductId::new(id))
        .map_or_else(|| not_found("Product"), |p| ok("Product retrieved", p))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    find_product(&state, id)
}

async fn get_product_by_slug(State(state): State<Shared>, Path(slug): Path<String>) -> Response {
    lock(&state)
        .products
        .iter()
        .find(|p| p.slug == slug)
        .map_or_else(|| not_found("Product"), |p| ok("Product retrieved", p))
}

// ============================================================================
// Cart and checkout
// ============================================================================

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = require(&headers, any_role) {
        return response;
    }
    ok("Cart retrieved", lock(&state).cart())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartBody {
    variant_id: Option<VariantId>,
    quantity: u32,
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CartBody>,
) -> Response {
    if let Err(response) = require(&headers, any_role) {
        return response;
    }
    let Some(variant_id) = body.variant_id else {
        return fail(StatusCode::BAD_REQUEST, "VAL_400", "variantId is required");
    };
    let mut state = lock(&state);
    let Some((product, variant)) = state.variant(variant_id) else {
        return not_found("Variant");
    };
    let (product, variant) = (product.clone(), variant.clone());
    let existing = state
        .cart
        .iter()
        .find(|l| l.variant_id == variant_id)
        .map_or(0, |l| l.quantity);
    let wanted = existing + body.quantity;
    if !variant.is_active || i64::from(wanted) > i64::from(variant.stock) {
        return fail(StatusCode::BAD_REQUEST, "CART_001", "Insufficient stock");
    }

    if let Some(line) = state.cart.iter_mut().find(|l| l.variant_id == variant_id) {
        line.quantity = wanted;
        line.subtotal = line.unit_price * Decimal::from(wanted);
    } else {
        state.cart.push(CartLine {
            cart_id: None,
            variant_id,
            product_id: product.product_id,
            product_name: product.name,
            product_image_url: product.image_url,
            sku: variant.sku,
            attributes: variant.attributes,
            unit_price: variant.price,
            quantity: wanted,
            subtotal: variant.price * Decimal::from(wanted),
            stock: Some(variant.stock),
            is_active: Some(variant.is_active),
            added_at: None,
        });
    }
    ok("Product added to cart", state.cart())
}

async fn update_cart_line(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(variant_id): Path<i64>,
    Json(body): Json<CartBody>,
) -> Response {
    if let Err(response) = require(&headers, any_role) {
        return response;
    }
    let mut state = lock(&state);
    let Some(line) = state
        .cart
        .iter_mut()
        .find(|l| l.variant_id == VariantId::new(variant_id))
    else {
        return not_found("Cart item");
    };
    if line.stock.is_some_and(|s| i64::from(body.quantity) > i64::from(s)) {
        return fail(StatusCode::BAD_REQUEST, "CART_001", "Insufficient stock");
    }
    line.quantity = body.quantity;
    line.subtotal = line.unit_price * Decimal::from(body.quantity);
    ok("Cart updated", state.cart())
}

async fn remove_cart_line(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(variant_id): Path<i64>,
) -> Response {
    if let Err(response) = require(&headers, any_role) {
        return response;
    }
    let mut state = lock(&state);
    let before = state.cart.len();
    state.cart.retain(|l| l.variant_id != VariantId::new(variant_id));
    if state.cart.len() == before {
        return not_found("Cart item");
    }
    ok("Item removed from cart", Value::Null)
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = require(&headers, any_role) {
        return response;
    }
    lock(&state).cart.clear();
    ok("Cart cleared", Value::Null)
}

async fn checkout(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let (user, _) = match require(&headers, any_role) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let mut state = lock(&state);
    if state.cart.is_empty() {
        return fail(StatusCode::BAD_REQUEST, "ORDER_001", "Cart is empty");
    }
    let id = state.next_id();
    let cart = state.cart();
    let order = OrderDetail {
        order_id: OrderId::new(id),
        user_id: Some(UserId::new(user)),
        total_price: cart.total_price,
        shipping_address: body["shippingAddress"].as_str().map(str::to_string),
        status_id: Some(OrderStatus::Pending.id()),
        status_name: Some(OrderStatus::Pending.code().to_string()),
        note: body["note"].as_str().map(str::to_string),
        voucher_id: None,
        items: cart
            .items
            .iter()
            .map(|l| OrderLine {
                order_detail_id: None,
                variant_id: l.variant_id,
                product_id: l.product_id,
                product_name: l.product_name.clone(),
                sku: l.sku.clone(),
                attributes: l.attributes.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
                warranty_months: None,
            })
            .collect(),
        created_at: None,
    };
    state.orders.push(order);
    state.cart.clear();
    ok(
        "Order placed successfully",
        json!({
            "orderId": id,
            "totalPrice": cart.total_price,
            "status": "PENDING",
            "paymentStatus": "UNPAID",
        }),
    )
}

// ============================================================================
// Orders
// ============================================================================

fn order_page(state: &StubState, params: &ListParams, owner: Option<i64>) -> Value {
    let mut orders: Vec<OrderSummary> = state
        .orders
        .iter()
        .filter(|o| owner.is_none_or(|u| o.user_id == Some(UserId::new(u))))
        .filter(|o| params.status_id.is_none_or(|s| o.status_id == Some(s)))
        .map(|o| OrderSummary {
            order_id: o.order_id,
            user_id: o.user_id,
            total_price: o.total_price,
            shipping_address: o.shipping_address.clone(),
            status_id: o.status_id,
            status_name: o.status_name.clone(),
            created_at: o.created_at,
        })
        .collect();
    orders.sort_by_key(|o| std::cmp::Reverse(o.order_id));
    page_json("orders", &Page::window(&orders, params.page, params.size))
}

fn find_order(state: &Shared, id: i64, owner: Option<i64>) -> Response {
    lock(state)
        .orders
        .iter()
        .find(|o| o.order_id == OrderId::new(id))
        .filter(|o| owner.is_none_or(|u| o.user_id == Some(UserId::new(u))))
        .map_or_else(|| not_found("Order"), |o| ok("Order retrieved", o))
}

fn set_order_status(state: &Shared, id: i64, body: &Value) -> Response {
    let Some(status) = body["statusId"].as_i64().and_then(OrderStatus::from_id) else {
        return fail(StatusCode::BAD_REQUEST, "ORDER_002", "Invalid status");
    };
    let mut state = lock(state);
    let Some(order) = state
        .orders
        .iter_mut()
        .find(|o| o.order_id == OrderId::new(id))
    else {
        return not_found("Order");
    };
    order.status_id = Some(status.id());
    order.status_name = Some(status.code().to_string());
    ok("Order status updated", &*order)
}

async fn my_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    let (user, _) = match require(&headers, any_role) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    ok("Orders retrieved", order_page(&lock(&state), &params, Some(user)))
}

async fn my_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    match require(&headers, any_role) {
        Ok((user, _)) => find_order(&state, id, Some(user)),
        Err(response) => response,
    }
}

async fn cancel_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let (user, _) = match require(&headers, any_role) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    if body["reason"].as_str().is_none_or(|r| r.trim().is_empty()) {
        return fail(StatusCode::BAD_REQUEST, "VAL_400", "reason is required");
    }
    let mut state = lock(&state);
    let Some(order) = state
        .orders
        .iter_mut()
        .find(|o| o.order_id == OrderId::new(id) && o.user_id == Some(UserId::new(user)))
    else {
        return not_found("Order");
    };
    let cancellable = order
        .status_id
        .and_then(OrderStatus::from_id)
        .is_some_and(OrderStatus::is_cancellable);
    if !cancellable {
        return fail(
            StatusCode::BAD_REQUEST,
            "ORDER_003",
            "Order cannot be cancelled",
        );
    }
    order.status_id = Some(OrderStatus::Cancelled.id());
    order.status_name = Some(OrderStatus::Cancelled.code().to_string());
    ok("Order cancelled", Value::Null)
}

// ============================================================================
// Staff
// ============================================================================

async fn staff_products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    if let Err(response) = require(&headers, staff_role) {
        return response;
    }
    ok("Products retrieved", product_page(&lock(&state), &params))
}

async fn staff_product(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    match require(&headers, staff_role) {
        Ok(_) => find_product(&state, id),
        Err(response) => response,
    }
}

async fn staff_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    if let Err(response) = require(&headers, staff_role) {
        return response;
    }
    ok("Orders retrieved", order_page(&lock(&state), &params, None))
}

async fn staff_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    match require(&headers, staff_role) {
        Ok(_) => find_order(&state, id, None),
        Err(response) => response,
    }
}

async fn staff_order_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    match require(&headers, staff_role) {
        Ok(_) => set_order_status(&state, id, &body),
        Err(response) => response,
    }
}

// ============================================================================
// Admin
// ============================================================================

async fn admin_products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }
    ok("Products retrieved", product_page(&lock(&state), &params))
}

async fn admin_product(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    match require(&headers, admin_role) {
        Ok(_) => find_product(&state, id),
        Err(response) => response,
    }
}

async fn admin_create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }

    let mut product: Option<NewProduct> = None;
    let mut variants: Vec<NewVariant> = Vec::new();
    let mut specifications: Vec<Specification> = Vec::new();
    let mut image: Option<StoredImage> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("image").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let Ok(bytes) = field.bytes().await else {
                return fail(StatusCode::BAD_REQUEST, "VAL_400", "Unreadable image");
            };
            image = Some(StoredImage {
                file_name,
                content_type,
                size: bytes.len(),
            });
            continue;
        }
        let Ok(text) = field.text().await else {
            return fail(StatusCode::BAD_REQUEST, "VAL_400", "Unreadable part");
        };
        let parsed = match name.as_str() {
            "product" => serde_json::from_str(&text).map(|p| product = Some(p)),
            "variants" => serde_json::from_str(&text).map(|v| variants = v),
            "specifications" => serde_json::from_str(&text).map(|s| specifications = s),
            _ => Ok(()),
        };
        if parsed.is_err() {
            return fail(
                StatusCode::BAD_REQUEST,
                "VAL_400",
                &format!("Invalid {name} part"),
            );
        }
    }

    let Some(product) = product else {
        return fail(StatusCode::BAD_REQUEST, "VAL_400", "product part is required");
    };

    let mut state = lock(&state);
    let id = state.next_id();
    let mut detail_variants = Vec::with_capacity(variants.len());
    for variant in &variants {
        detail_variants.push(ProductVariant {
            variant_id: VariantId::new(state.next_id()),
            sku: variant.sku.clone(),
            attributes: variant.attributes.clone(),
            price: variant.price,
            stock: variant.stock,
            is_active: variant.is_active.unwrap_or(true),
        });
    }
    let slug = product
        .slug
        .clone()
        .unwrap_or_else(|| product.name.to_lowercase().replace(' ', "-"));
    state.products.push(ProductDetail {
        product_id: ProductId::new(id),
        name: product.name.clone(),
        slug: slug.clone(),
        short_description: product.short_description.clone(),
        full_description: product.full_description.clone(),
        brand_id: product.brand_id,
        brand_name: None,
        category_id: product.category_id,
        category_name: None,
        model_number: product.model_number.clone(),
        release_year: product.release_year,
        default_price: product.default_price,
        image_url: image.as_ref().map(|i| format!("/uploads/{}", i.file_name)),
        variants: detail_variants,
        specifications: specifications.clone(),
        created_at: None,
        updated_at: None,
    });
    state.last_image = image;

    let created = CreatedProduct {
        product_id: ProductId::new(id),
        name: product.name,
        slug: Some(slug),
        brand_id: product.brand_id,
        category_id: product.category_id,
        variant_count: u32::try_from(variants.len()).unwrap_or(u32::MAX),
        specification_count: u32::try_from(specifications.len()).unwrap_or(u32::MAX),
        created_at: None,
    };
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Product created", "data": created })),
    )
        .into_response()
}

async fn admin_update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<ProductUpdate>,
) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }
    let mut state = lock(&state);
    let Some(product) = state
        .products
        .iter_mut()
        .find(|p| p.product_id == ProductId::new(id))
    else {
        return not_found("Product");
    };
    if let Some(name) = update.name {
        product.name = name;
    }
    if let Some(price) = update.default_price {
        product.default_price = Some(price);
    }
    if update.short_description.is_some() {
        product.short_description = update.short_description;
    }
    ok("Product updated", &*product)
}

async fn admin_delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }
    let mut state = lock(&state);
    let before = state.products.len();
    state.products.retain(|p| p.product_id != ProductId::new(id));
    if state.products.len() == before {
        return not_found("Product");
    }
    ok("Product deleted", Value::Null)
}

async fn admin_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }
    ok("Orders retrieved", order_page(&lock(&state), &params, None))
}

async fn admin_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    match require(&headers, admin_role) {
        Ok(_) => find_order(&state, id, None),
        Err(response) => response,
    }
}

async fn admin_order_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    match require(&headers, admin_role) {
        Ok(_) => set_order_status(&state, id, &body),
        Err(response) => response,
    }
}

async fn list_categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }
    ok("Categories retrieved", &lock(&state).categories)
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(input): Json<gearhub_core::models::CategoryInput>,
) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }
    let Some(name) = input.name.filter(|n| !n.trim().is_empty()) else {
        return fail(StatusCode::BAD_REQUEST, "VAL_400", "name is required");
    };
    let mut state = lock(&state);
    let id = state.next_id();
    let category = Category {
        category_id: CategoryId::new(id),
        name,
        description: input.description,
        parent_id: input.parent_id,
        children: Vec::new(),
    };
    let parent = input
        .parent_id
        .and_then(|p| state.categories.iter().position(|c| c.category_id == p));
    match parent.and_then(|index| state.categories.get_mut(index)) {
        Some(parent) => parent.children.push(category.clone()),
        None => state.categories.push(category.clone()),
    }
    ok("Category created", category)
}

async fn update_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<gearhub_core::models::CategoryInput>,
) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }
    let mut state = lock(&state);
    let Some(category) = state
        .categories
        .iter_mut()
        .find(|c| c.category_id == CategoryId::new(id))
    else {
        return not_found("Category");
    };
    if let Some(name) = input.name {
        category.name = name;
    }
    if input.description.is_some() {
        category.description = input.description;
    }
    ok("Category updated", &*category)
}

async fn delete_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = require(&headers, admin_role) {
        return response;
    }
    let mut state = lock(&state);
    let id = CategoryId::new(id);
    if state.products.iter().any(|p| p.category_id == id) {
        return fail(
            StatusCode::CONFLICT,
            "CAT_409",
            "Category still has products",
        );
    }
    let before = state.categories.len();
    state.categories.retain(|c| c.category_id != id);
    if state.categories.len() == before {
        return not_found("Category");
    }
    ok("Category deleted", Value::Null)
}

// ============================================================================
// Seed data
// ============================================================================

fn variant(id: i64, sku: &str, price: i64, stock: i32, is_active: bool) -> ProductVariant {
    ProductVariant {
        variant_id: VariantId::new(id),
        sku: sku.to_string(),
        attributes: None,
        price: Decimal::new(price, 0),
        stock,
        is_active,
    }
}

fn product(
    id: i64,
    name: &str,
    brand: (i64, &str),
    category: (i64, &str),
    variants: Vec<ProductVariant>,
) -> ProductDetail {
    ProductDetail {
        product_id: ProductId::new(id),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        short_description: None,
        full_description: None,
        brand_id: BrandId::new(brand.0),
        brand_name: Some(brand.1.to_string()),
        category_id: CategoryId::new(category.0),
        category_name: Some(category.1.to_string()),
        model_number: None,
        release_year: None,
        default_price: variants.first().map(|v| v.price),
        image_url: None,
        variants,
        specifications: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

/// Three real products plus cables to fill out three pages of ten.
///
/// - product 1: variant 11 in stock (5), variant 12 out of stock
/// - product 2: variant 21 in stock (3)
/// - product 3: variant 31 in stock (10), variant 32 inactive
fn seed_products() -> Vec<ProductDetail> {
    let mut products = vec![
        product(
            1,
            "Logitech MX Master 3S",
            (2, "Logitech"),
            (2, "Peripherals"),
            vec![
                variant(11, "MX3S-BLK", 2_490_000, 5, true),
                variant(12, "MX3S-GRY", 2_490_000, 0, true),
            ],
        ),
        product(
            2,
            "ASUS ZenBook 14",
            (1, "ASUS"),
            (1, "Laptops"),
            vec![variant(21, "UX3402-16", 25_990_000, 3, true)],
        ),
        product(
            3,
            "Sony WH-1000XM5",
            (4, "Sony"),
            (4, "Audio"),
            vec![
                variant(31, "WH5-BLK", 8_490_000, 10, true),
                variant(32, "WH5-SLV", 8_490_000, 4, false),
            ],
        ),
    ];
    let fillers = SEEDED_PRODUCTS - products.len();
    for n in 1..=fillers {
        let id = i64::try_from(n).unwrap_or(0) + 3;
        products.push(product(
            id,
            &format!("USB-C Cable {n}"),
            (3, "Samsung"),
            (2, "Peripherals"),
            vec![variant(id * 10 + 1, &format!("USBC-{n}"), 150_000, 50, true)],
        ));
    }
    products
}

/// Orders of the `customer` account, one per early status.
fn seed_orders() -> Vec<OrderDetail> {
    [
        (101, OrderStatus::Pending),
        (102, OrderStatus::Confirmed),
        (103, OrderStatus::Shipped),
        (104, OrderStatus::Delivered),
    ]
    .into_iter()
    .map(|(id, status)| OrderDetail {
        order_id: OrderId::new(id),
        user_id: Some(UserId::new(3)),
        total_price: Decimal::new(2_490_000, 0),
        shipping_address: Some("12 Nguyen Hue, District 1".to_string()),
        status_id: Some(status.id()),
        status_name: Some(status.code().to_string()),
        note: None,
        voucher_id: None,
        items: vec![OrderLine {
            order_detail_id: None,
            variant_id: VariantId::new(11),
            product_id: ProductId::new(1),
            product_name: "Logitech MX Master 3S".to_string(),
            sku: "MX3S-BLK".to_string(),
            attributes: None,
            quantity: 1,
            unit_price: Decimal::new(2_490_000, 0),
            warranty_months: Some(12),
        }],
        created_at: None,
    })
    .collect()
}

fn seed_categories() -> Vec<Category> {
    let leaf = |id: i64, name: &str, parent: Option<i64>| Category {
        category_id: CategoryId::new(id),
        name: name.to_string(),
        description: None,
        parent_id: parent.map(CategoryId::new),
        children: Vec::new(),
    };
    let mut peripherals = leaf(2, "Peripherals", None);
    peripherals.children.push(leaf(6, "Mice", Some(2)));
    vec![
        leaf(1, "Laptops", None),
        peripherals,
        leaf(3, "Monitors", None),
        leaf(4, "Audio", None),
        leaf(5, "Phones", None),
        leaf(7, "Gift Cards", None),
    ]
}
