// Terminal front-end commands

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use dialoguer::Password;
use serde::Serialize;
use std::path::PathBuf;

use crate::api::LemonApi;
use crate::models::{
    CartItem, ImageUpload, MenuItem, NewMenuItem, Order, OrderStatus, OrderUpdate,
};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the token pair
    Login {
        username: String,
        /// Password (prompted when omitted)
        #[arg(long, env = "LITTLELEMON_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Blacklist the refresh token and forget both tokens
    Logout,

    /// Create a customer account
    Register {
        username: String,
        #[arg(long)]
        email: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Show the logged-in user and their role
    Me,

    /// Browse the menu
    Menu,

    /// Manage the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Place and track orders
    #[command(subcommand)]
    Orders(OrdersCommand),

    /// Manager console
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
    /// List cart contents
    List,
    /// Add a menu item to the cart
    Add {
        menuitem_id: u64,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
    /// List your orders
    List,
    /// Show one order with its items
    Show { id: u64 },
    /// Turn the cart into an order
    Place,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List categories
    Categories,
    /// Create a category
    AddCategory { title: String },
    /// Create a menu item, optionally with an image
    AddItem {
        title: String,
        price: String,
        #[arg(long)]
        category: Option<u64>,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List all orders
    Orders,
    /// Assign a delivery crew member to an order
    Assign { order_id: u64, crew_id: u64 },
    /// Change the status of an order
    Status { order_id: u64, status: StatusArg },
    /// List delivery crew members
    Crew,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    InProgress,
    Delivered,
}

impl From<StatusArg> for OrderStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::InProgress => OrderStatus::InProgress,
            StatusArg::Delivered => OrderStatus::Delivered,
        }
    }
}

/// Execute one command against the backend
pub async fn run(api: &LemonApi, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt("Password")
                    .interact()
                    .context("Failed to read password")?,
            };
            api.login(&username, &password).await?;
            println!("{}", login_banner(api, &username).await);
        }

        Command::Logout => {
            api.logout().await?;
            println!("Logged out");
        }

        Command::Register {
            username,
            email,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .context("Failed to read password")?,
            };
            let created = api.register(&username, &password, email.as_deref()).await?;
            emit(json, &created, |_| {
                println!("Account {} created. Log in with `littlelemon login {}`", username, username)
            })?;
        }

        Command::Me => {
            let me = api.me().await?;
            emit(json, &me, |me| {
                println!("{} <{}>", me.username, me.email);
                println!("role: {}", me.role());
            })?;
        }

        Command::Menu => {
            let items = api.menu_items().await?;
            emit(json, &items, |items| print_menu(items))?;
        }

        Command::Cart(cmd) => run_cart(api, cmd, json).await?,
        Command::Orders(cmd) => run_orders(api, cmd, json).await?,
        Command::Admin(cmd) => {
            api.require_manager().await?;
            run_admin(api, cmd, json).await?
        }
    }

    Ok(())
}

async fn run_cart(api: &LemonApi, cmd: CartCommand, json: bool) -> Result<()> {
    match cmd {
        CartCommand::List => {
            let items = api.cart().await?;
            emit(json, &items, |items| print_cart(items))?;
        }
        CartCommand::Add {
            menuitem_id,
            quantity,
        } => {
            let item = api.add_to_cart(menuitem_id, quantity).await?;
            emit(json, &item, |item| {
                println!("Added {} x {} ({})", item.quantity, item.menuitem.title, item.price)
            })?;
        }
        CartCommand::Clear => {
            api.clear_cart().await?;
            println!("Cart cleared");
        }
    }
    Ok(())
}

async fn run_orders(api: &LemonApi, cmd: OrdersCommand, json: bool) -> Result<()> {
    match cmd {
        OrdersCommand::List => {
            let orders = api.orders().await?;
            emit(json, &orders, |orders| print_orders(orders))?;
        }
        OrdersCommand::Show { id } => {
            let order = api.order(id).await?;
            emit(json, &order, print_order_detail)?;
        }
        OrdersCommand::Place => {
            let order = api.place_order().await?;
            emit(json, &order, |order| {
                println!("Placed order #{} (total {})", order.id, order.total)
            })?;
        }
    }
    Ok(())
}

async fn run_admin(api: &LemonApi, cmd: AdminCommand, json: bool) -> Result<()> {
    match cmd {
        AdminCommand::Categories => {
            let categories = api.categories().await?;
            emit(json, &categories, |categories| {
                for c in categories {
                    println!("#{:<4} {}", c.id, c.title);
                }
            })?;
        }
        AdminCommand::AddCategory { title } => {
            let category = api.create_category(&title).await?;
            emit(json, &category, |c| println!("Created category #{} {}", c.id, c.title))?;
        }
        AdminCommand::AddItem {
            title,
            price,
            category,
            featured,
            image,
        } => {
            let image = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            let item = NewMenuItem {
                title,
                price,
                featured,
                category_id: category,
                image,
            };
            let created = api.create_menu_item(&item).await?;
            emit(json, &created, |m| println!("Created menu item #{} {}", m.id, m.title))?;
        }
        AdminCommand::Orders => {
            let orders = api.orders().await?;
            emit(json, &orders, |orders| print_orders(orders))?;
        }
        AdminCommand::Assign { order_id, crew_id } => {
            let update = OrderUpdate {
                delivery_crew_id: Some(crew_id),
                status: None,
            };
            let order = api.update_order(order_id, &update).await?;
            emit(json, &order, |o| {
                let courier = o.delivery_crew.as_ref().map_or("-", |u| u.username.as_str());
                println!("Order #{} assigned to {}", o.id, courier)
            })?;
        }
        AdminCommand::Status { order_id, status } => {
            let update = OrderUpdate {
                delivery_crew_id: None,
                status: Some(status.into()),
            };
            let order = api.update_order(order_id, &update).await?;
            emit(json, &order, |o| println!("Order #{} is {}", o.id, o.status))?;
        }
        AdminCommand::Crew => {
            let crew = api.delivery_crew().await?;
            emit(json, &crew, |crew| {
                for u in crew {
                    println!("#{:<4} {}", u.id, u.username);
                }
            })?;
        }
    }
    Ok(())
}

/// Greeting after a login; the role is shown only if the profile loads
async fn login_banner(api: &LemonApi, username: &str) -> String {
    match api.me().await {
        Ok(me) => format!("Logged in as {} ({})", me.username, me.role()),
        Err(e) => {
            tracing::warn!(error = %e, "Logged in but could not load the profile");
            format!("Logged in as {}", username)
        }
    }
}

async fn read_image(path: &std::path::Path) -> Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Image path has no file name")?;
    Ok(ImageUpload::new(file_name, bytes))
}

/// Print `value` as JSON or hand it to `text`
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to encode output")?
        );
    } else {
        text(value);
    }
    Ok(())
}

fn print_menu(items: &[MenuItem]) {
    if items.is_empty() {
        println!("The menu is empty");
        return;
    }
    for item in items {
        let category = item
            .category
            .as_ref()
            .and_then(|c| c.title())
            .unwrap_or("");
        let featured = if item.featured { " *" } else { "" };
        println!(
            "#{:<4} {:<30} {:>8}  {}{}",
            item.id, item.title, item.price, category, featured
        );
    }
}

fn print_cart(items: &[CartItem]) {
    if items.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for item in items {
        println!(
            "{:>3} x {:<30} {:>8}",
            item.quantity, item.menuitem.title, item.price
        );
    }
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders");
        return;
    }
    for order in orders {
        let courier = order
            .delivery_crew
            .as_ref()
            .map_or("unassigned", |u| u.username.as_str());
        println!(
            "#{:<5} {}  {:>8}  {:<12} {}",
            order.id,
            order.date.format("%Y-%m-%d %H:%M"),
            order.total,
            order.status.to_string(),
            courier
        );
    }
}

fn print_order_detail(order: &Order) {
    print_orders(std::slice::from_ref(order));
    for item in &order.items {
        println!(
            "      {:>3} x {:<30} {:>8}",
            item.quantity, item.menuitem.title, item.price
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;
    use crate::cache::QueryCache;
    use crate::http_client::ApiClient;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_login_banner_falls_back_to_username() {
        let mut server = mockito::Server::new_async().await;
        let me = server
            .mock("GET", "/api/me")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::with_http_client(
            reqwest::Client::new(),
            &server.url(),
            Arc::new(MemoryStore::with_pair("A1", "R1")),
        );
        let api = LemonApi::new(client, QueryCache::new(Duration::from_secs(30)));

        assert_eq!(login_banner(&api, "mario").await, "Logged in as mario");
        me.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_banner_shows_role() {
        let mut server = mockito::Server::new_async().await;
        let me = server
            .mock("GET", "/api/me")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 5, "username": "mario", "email": "", "is_manager": true}"#)
            .expect(1)
            .create_async()
            .await;

        let client = ApiClient::with_http_client(
            reqwest::Client::new(),
            &server.url(),
            Arc::new(MemoryStore::with_pair("A1", "R1")),
        );
        let api = LemonApi::new(client, QueryCache::new(Duration::from_secs(30)));

        let banner = login_banner(&api, "mario").await;
        assert_eq!(banner, "Logged in as mario (manager)");
        me.assert_async().await;
    }
}
