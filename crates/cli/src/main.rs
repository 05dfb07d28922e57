//! GearHub CLI - Storefront and back-office from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept in .gearhub/session.json)
//! gearhub login -u customer -p password
//!
//! # Browse the catalog
//! gearhub products --keyword mouse --sort price --dir asc
//!
//! # Shop
//! gearhub cart add 12 --quantity 2
//! gearhub checkout --address "12 Nguyen Hue, District 1" --payment COD
//!
//! # Staff and admin screens
//! gearhub staff orders --status pending
//! gearhub admin categories list
//! ```
//!
//! # Environment Variables
//!
//! - `GEARHUB_API_URL` - Backend base URL (default `http://localhost:8080/api/v1`)
//! - `GEARHUB_DEMO_FALLBACK` - Serve demo data when the backend is down
//! - `GEARHUB_HTTP_TIMEOUT_SECS` - Request timeout in seconds
//! - `GEARHUB_SESSION_FILE` - Where the session is persisted
//! - `SENTRY_DSN` - Error tracking (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gearhub_client::ClientConfig;
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "gearhub")]
#[command(author, version, about = "GearHub storefront and back-office")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "GEARHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long, env = "GEARHUB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse the catalog
    Products(CatalogArgs),
    /// Show one product by id or slug
    Product {
        /// Numeric id or slug
        key: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart
    Checkout {
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "COD")]
        payment: String,
        #[arg(long)]
        voucher: Option<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Your orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Staff screens (moderators and admins)
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
    /// Admin screens
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(clap::Args)]
struct CatalogArgs {
    #[arg(short, long)]
    keyword: Option<String>,
    #[arg(long)]
    category: Option<i64>,
    #[arg(long)]
    brand: Option<i64>,
    /// Sort field, e.g. `createdAt`, `name` or `price`
    #[arg(long, default_value = "createdAt")]
    sort: String,
    #[arg(long, default_value = "desc")]
    dir: String,
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = 12)]
    size: u32,
}

#[derive(clap::Args)]
struct ListArgs {
    #[arg(short, long)]
    keyword: Option<String>,
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    size: u32,
}

#[derive(clap::Args)]
struct OrderListArgs {
    /// `all` or a status name such as `pending`
    #[arg(short, long, default_value = "all")]
    status: String,
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    size: u32,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a variant
    Add {
        variant: i64,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity
    Update { variant: i64, quantity: u32 },
    /// Remove a line
    Remove { variant: i64 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List(OrderListArgs),
    /// Show one order
    Show { id: i64 },
    /// Cancel a pending or confirmed order
    Cancel {
        id: i64,
        #[arg(short, long)]
        reason: String,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show,
    /// Edit profile fields
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Change your password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Look up products
    Products(ListArgs),
    /// List all orders
    Orders(OrderListArgs),
    /// Show one order
    Order { id: i64 },
    /// Move an order to a new status
    Status { id: i64, status: String },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Product management
    Products {
        #[command(subcommand)]
        action: AdminProductAction,
    },
    /// List all orders
    Orders(OrderListArgs),
    /// Show one order
    Order { id: i64 },
    /// Move an order to a new status
    Status { id: i64, status: String },
    /// Category management
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Voucher list (local only)
    Vouchers,
    /// FAQ list (local only)
    Faqs,
    /// Support tickets (local only)
    Tickets,
}

#[derive(Subcommand)]
enum AdminProductAction {
    /// List products
    List(ListArgs),
    /// Show one product
    Show { id: i64 },
    /// Create a product with a single variant
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        brand: i64,
        #[arg(long)]
        category: i64,
        #[arg(long)]
        sku: String,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 0)]
        stock: i32,
        #[arg(long)]
        description: Option<String>,
        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Edit product fields
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a product
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Show the category tree
    List,
    /// Create a category
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Rename or move a category
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Delete a category
    Delete { id: i64 },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Sentry must be initialized before the tracing subscriber
    let config = ClientConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gearhub_cli=info,gearhub_client=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = commands::connect(config).await?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&client, &username, password).await?;
        }
        Commands::Register {
            username,
            email,
            name,
            password,
            phone,
            address,
        } => {
            let form = gearhub_core::models::RegisterRequest {
                username,
                email,
                confirm_password: password.clone(),
                password,
                name,
                phone: phone.unwrap_or_default(),
                shipping_address: address.unwrap_or_default(),
            };
            commands::auth::register(&client, &form).await?;
        }
        Commands::Logout => commands::auth::logout(&client).await?,
        Commands::Whoami => commands::auth::whoami(&client).await,
        Commands::Products(args) => commands::shop::products(&client, args.into()).await?,
        Commands::Product { key } => commands::shop::product(&client, &key).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::shop::cart_show(&client).await?,
            CartAction::Add { variant, quantity } => {
                commands::shop::cart_add(&client, variant, quantity).await?;
            }
            CartAction::Update { variant, quantity } => {
                commands::shop::cart_update(&client, variant, quantity).await?;
            }
            CartAction::Remove { variant } => commands::shop::cart_remove(&client, variant).await?,
            CartAction::Clear => commands::shop::cart_clear(&client).await?,
        },
        Commands::Checkout {
            address,
            payment,
            voucher,
            note,
        } => {
            let form = gearhub_core::models::CheckoutRequest {
                shipping_address: address,
                payment_method: payment,
                voucher_id: voucher.map(gearhub_core::VoucherId::new),
                note,
            };
            commands::shop::checkout(&client, &form).await?;
        }
        Commands::Orders { action } => match action {
            OrderAction::List(args) => {
                commands::orders::list(&client, commands::orders::Audience::Mine, &args.into())
                    .await?;
            }
            OrderAction::Show { id } => {
                commands::orders::show(&client, commands::orders::Audience::Mine, id).await?;
            }
            OrderAction::Cancel { id, reason } => {
                commands::orders::cancel(&client, id, &reason).await?;
            }
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::account::show(&client).await?,
            ProfileAction::Update {
                name,
                phone,
                address,
                avatar,
            } => {
                let update = gearhub_core::models::ProfileUpdate {
                    name,
                    phone,
                    shipping_address: address,
                    avatar_url: avatar,
                };
                commands::account::update(&client, &update).await?;
            }
            ProfileAction::Password {
                current,
                new,
                confirm,
            } => {
                let form = gearhub_core::models::ChangePasswordRequest {
                    current_password: current,
                    new_password: new,
                    confirm_password: confirm,
                };
                commands::account::change_password(&client, &form).await?;
            }
        },
        Commands::Staff { action } => match action {
            StaffAction::Products(args) => {
                commands::admin::products(&client, commands::admin::Desk::Staff, &args.into())
                    .await?;
            }
            StaffAction::Orders(args) => {
                commands::orders::list(&client, commands::orders::Audience::Staff, &args.into())
                    .await?;
            }
            StaffAction::Order { id } => {
                commands::orders::show(&client, commands::orders::Audience::Staff, id).await?;
            }
            StaffAction::Status { id, status } => {
                commands::orders::set_status(&client, commands::orders::Audience::Staff, id, &status)
                    .await?;
            }
        },
        Commands::Admin { action } => run_admin(&client, action).await?,
    }
    Ok(())
}

async fn run_admin(
    client: &gearhub_client::ApiClient,
    action: AdminAction,
) -> Result<(), Box<dyn std::error::Error>> {
    use commands::admin::{self, Desk};
    use commands::orders::{self, Audience};

    match action {
        AdminAction::Products { action } => match action {
            AdminProductAction::List(args) => admin::products(client, Desk::Admin, &args.into()).await?,
            AdminProductAction::Show { id } => admin::product(client, id).await?,
            AdminProductAction::Add {
                name,
                brand,
                category,
                sku,
                price,
                stock,
                description,
                image,
            } => {
                let draft = admin::ProductDraft {
                    name,
                    brand,
                    category,
                    sku,
                    price,
                    stock,
                    description,
                    image,
                };
                admin::create_product(client, draft).await?;
            }
            AdminProductAction::Update {
                id,
                name,
                price,
                description,
            } => {
                let update = gearhub_core::models::ProductUpdate {
                    name,
                    default_price: price,
                    short_description: description,
                    ..Default::default()
                };
                admin::update_product(client, id, &update).await?;
            }
            AdminProductAction::Delete { id } => admin::delete_product(client, id).await?,
        },
        AdminAction::Orders(args) => orders::list(client, Audience::Admin, &args.into()).await?,
        AdminAction::Order { id } => orders::show(client, Audience::Admin, id).await?,
        AdminAction::Status { id, status } => {
            orders::set_status(client, Audience::Admin, id, &status).await?;
        }
        AdminAction::Categories { action } => match action {
            CategoryAction::List => admin::categories(client).await?,
            CategoryAction::Add {
                name,
                description,
                parent,
            } => {
                let input = category_input(Some(name), description, parent);
                admin::create_category(client, &input).await?;
            }
            CategoryAction::Update {
                id,
                name,
                description,
                parent,
            } => {
                let input = category_input(name, description, parent);
                admin::update_category(client, id, &input).await?;
            }
            CategoryAction::Delete { id } => admin::delete_category(client, id).await?,
        },
        AdminAction::Vouchers => admin::vouchers(client).await?,
        AdminAction::Faqs => admin::faqs(client).await?,
        AdminAction::Tickets => admin::tickets(client).await?,
    }
    Ok(())
}

fn category_input(
    name: Option<String>,
    description: Option<String>,
    parent: Option<i64>,
) -> gearhub_core::models::CategoryInput {
    gearhub_core::models::CategoryInput {
        name,
        description,
        parent_id: parent.map(gearhub_core::CategoryId::new),
    }
}

impl From<CatalogArgs> for commands::shop::CatalogFilters {
    fn from(args: CatalogArgs) -> Self {
        Self {
            keyword: args.keyword,
            category: args.category,
            brand: args.brand,
            sort: args.sort,
            dir: args.dir,
            page: args.page,
            size: args.size,
        }
    }
}

impl From<ListArgs> for commands::admin::ListFilters {
    fn from(args: ListArgs) -> Self {
        Self {
            keyword: args.keyword,
            page: args.page,
            size: args.size,
        }
    }
}

impl From<OrderListArgs> for commands::orders::OrderFilters {
    fn from(args: OrderListArgs) -> Self {
        Self {
            status: args.status,
            page: args.page,
            size: args.size,
        }
    }
}
