//! Application shell
//!
//! Single-threaded UI event loop. Network work runs on spawned tasks that
//! report back over an mpsc channel; every mutation invalidates the
//! affected queries and the pages re-fetch authoritative state instead of
//! predicting it.

use crate::config::ConsoleConfig;
use crate::pages::cart::{CartAction, CartPage};
use crate::pages::clients::{ClientsAction, ClientsPage};
use crate::pages::new_order::{NewOrderAction, NewOrderPage};
use crate::pages::orders::{OrdersAction, OrdersPage};
use crate::pages::products::{ProductsAction, ProductsPage};
use crate::pages::register::{RegisterAction, RegisterPage};
use crate::remote::Remote;
use crate::widgets::{centered_rect, dialog_block};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use mart_client::{ApiClient, ApiError, AuthError, AuthSession, Cart, QueryClient, QueryKey};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::{DefaultTerminal, Frame};
use shared::models::{Command, Product, RegisterResponse, User};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

/// How long a transient notice stays on screen
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Top-level routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Products,
    Orders,
    Cart,
    Clients,
    NewOrder,
    Register,
}

impl Route {
    fn title(&self) -> &'static str {
        match self {
            Route::Products => "Products",
            Route::Orders => "Orders",
            Route::Cart => "Cart",
            Route::Clients => "Clients",
            Route::NewOrder => "New order",
            Route::Register => "Register",
        }
    }

    fn admin_only(&self) -> bool {
        matches!(self, Route::Clients | Route::NewOrder)
    }
}

const ROUTES: [Route; 6] = [
    Route::Products,
    Route::Orders,
    Route::Cart,
    Route::Clients,
    Route::NewOrder,
    Route::Register,
];

/// Results coming back from spawned tasks
pub enum Msg {
    Products(Result<Vec<Product>, ApiError>),
    OrderProducts(Result<Vec<Product>, ApiError>),
    Commands(Result<Vec<Command>, ApiError>),
    Users(Result<Vec<User>, ApiError>),
    CheckoutDone(Result<Command, ApiError>),
    NewOrderDone(Result<Command, ApiError>),
    MutationDone {
        resource: &'static str,
        result: Result<(), ApiError>,
    },
    LoginDone(Result<(), AuthError>),
    RegisterDone(Result<RegisterResponse, ApiError>),
}

/// Cached view of the auth session for synchronous rendering
#[derive(Debug, Default, Clone)]
struct AuthView {
    is_authenticated: bool,
    username: Option<String>,
    is_admin: bool,
}

/// Login dialog state
struct LoginDialog {
    username: Input,
    password: Input,
    focus: usize,
    error: Option<String>,
    submitting: bool,
}

impl LoginDialog {
    fn new() -> Self {
        Self {
            username: Input::default(),
            password: Input::default(),
            focus: 0,
            error: None,
            submitting: false,
        }
    }
}

pub struct App {
    api: ApiClient,
    auth: Arc<AuthSession>,
    queries: Arc<QueryClient>,
    tx: mpsc::UnboundedSender<Msg>,

    route: Route,
    auth_view: AuthView,
    cart: Cart,
    login: Option<LoginDialog>,
    notice: Option<(String, bool, Instant)>,
    show_logs: bool,
    running: bool,

    products: ProductsPage,
    orders: OrdersPage,
    cart_page: CartPage,
    clients: ClientsPage,
    new_order: NewOrderPage,
    register: RegisterPage,
}

impl App {
    pub fn new(
        config: &ConsoleConfig,
        api: ApiClient,
        auth: Arc<AuthSession>,
        queries: Arc<QueryClient>,
    ) -> (Self, mpsc::UnboundedReceiver<Msg>) {
        tracing::info!(gateway = %config.api_base_url, "Console starting");
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Self {
            api,
            auth,
            queries,
            tx,
            route: Route::Products,
            auth_view: AuthView::default(),
            cart: Cart::new(),
            login: None,
            notice: None,
            show_logs: false,
            running: true,
            products: ProductsPage::default(),
            orders: OrdersPage::default(),
            cart_page: CartPage::default(),
            clients: ClientsPage::default(),
            new_order: NewOrderPage::default(),
            register: RegisterPage::default(),
        };
        (app, rx)
    }

    pub async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<Msg>,
        mut terminal: DefaultTerminal,
    ) -> Result<()> {
        self.refresh_auth().await;
        self.ensure_loaded();

        let mut tick = tokio::time::interval(Duration::from_millis(50));
        while self.running {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                _ = tick.tick() => {
                    self.expire_notice();
                    while crossterm::event::poll(Duration::ZERO)? {
                        if let Event::Key(key) = crossterm::event::read()? {
                            if key.kind == KeyEventKind::Press {
                                self.on_key(key).await;
                            }
                        }
                    }
                }
                Some(msg) = rx.recv() => self.on_msg(msg).await,
            }
        }
        Ok(())
    }

    // ========== Auth ==========

    async fn refresh_auth(&mut self) {
        self.auth_view = AuthView {
            is_authenticated: self.auth.is_authenticated().await,
            username: self.auth.username().await,
            is_admin: self.auth.is_admin().await,
        };
    }

    fn spawn_login(&self, username: String, password: String) {
        let auth = self.auth.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = auth.login(&username, &password).await;
            let _ = tx.send(Msg::LoginDone(result));
        });
    }

    async fn logout(&mut self) {
        self.auth.logout().await;
        self.queries.clear();
        self.refresh_auth().await;
        self.orders.data = Remote::Idle;
        self.clients.data = Remote::Idle;
        if self.route.admin_only() || self.route == Route::Orders {
            self.route = Route::Products;
        }
        self.ensure_loaded();
        self.notice("Logged out".into(), false);
    }

    // ========== Data loading ==========

    /// Fetch the current route's data if nothing was loaded yet
    fn ensure_loaded(&mut self) {
        match self.route {
            Route::Products if matches!(self.products.data, Remote::Idle) => {
                self.load_products(false)
            }
            Route::Orders if matches!(self.orders.data, Remote::Idle) => self.load_orders(false),
            Route::Clients if matches!(self.clients.data, Remote::Idle) => self.load_users(false),
            Route::NewOrder if matches!(self.new_order.data, Remote::Idle) => {
                self.load_order_products(false)
            }
            _ => {}
        }
    }

    fn load_products(&mut self, force: bool) {
        self.products.data = Remote::Loading;
        let api = self.api.clone();
        let queries = self.queries.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let key = QueryKey::products();
            let result = if force {
                queries.refetch(key, || api.list_products()).await
            } else {
                queries.fetch(key, || api.list_products()).await
            };
            let _ = tx.send(Msg::Products(result));
        });
    }

    fn load_order_products(&mut self, force: bool) {
        self.new_order.data = Remote::Loading;
        let api = self.api.clone();
        let queries = self.queries.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let key = QueryKey::products();
            let result = if force {
                queries.refetch(key, || api.list_products()).await
            } else {
                queries.fetch(key, || api.list_products()).await
            };
            let _ = tx.send(Msg::OrderProducts(result));
        });
    }

    fn load_orders(&mut self, force: bool) {
        self.orders.data = Remote::Loading;
        let filter = self.orders.filter;
        let api = self.api.clone();
        let queries = self.queries.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let key = QueryKey::commands(filter);
            let result = if force {
                queries.refetch(key, || api.list_commands(filter)).await
            } else {
                queries.fetch(key, || api.list_commands(filter)).await
            };
            let _ = tx.send(Msg::Commands(result));
        });
    }

    fn load_users(&mut self, force: bool) {
        self.clients.data = Remote::Loading;
        let api = self.api.clone();
        let queries = self.queries.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let key = QueryKey::users();
            let result = if force {
                queries.refetch(key, || api.list_users()).await
            } else {
                queries.fetch(key, || api.list_users()).await
            };
            let _ = tx.send(Msg::Users(result));
        });
    }

    fn spawn_mutation<F>(&self, resource: &'static str, fut: F)
    where
        F: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fut.await;
            let _ = tx.send(Msg::MutationDone { resource, result });
        });
    }

    // ========== Key handling ==========

    async fn on_key(&mut self, key: KeyEvent) {
        if let Some(dialog) = &mut self.login {
            match key.code {
                KeyCode::Esc => self.login = None,
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
                    dialog.focus = 1 - dialog.focus
                }
                KeyCode::Enter => {
                    if !dialog.submitting {
                        let username = dialog.username.value().trim().to_string();
                        let password = dialog.password.value().to_string();
                        if username.is_empty() || password.is_empty() {
                            dialog.error = Some("username and password are required".into());
                        } else {
                            dialog.submitting = true;
                            dialog.error = None;
                            self.spawn_login(username, password);
                        }
                    }
                }
                _ => {
                    let field = if dialog.focus == 0 {
                        &mut dialog.username
                    } else {
                        &mut dialog.password
                    };
                    field.handle_event(&Event::Key(key));
                }
            }
            return;
        }

        // Pages with an open dialog (or a full-page form) consume keys first
        let page_captures = match self.route {
            Route::Products => self.products.has_dialog(),
            Route::Orders => self.orders.has_dialog(),
            Route::Clients => self.clients.has_dialog(),
            Route::Register => !matches!(key.code, KeyCode::Esc),
            _ => false,
        };
        if page_captures {
            self.dispatch_to_page(key).await;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Esc if self.route == Route::Register => self.route = Route::Products,
            KeyCode::F(12) => self.show_logs = !self.show_logs,
            KeyCode::Char('l') => {
                if !self.auth_view.is_authenticated {
                    self.login = Some(LoginDialog::new());
                }
            }
            KeyCode::Char('L') => {
                if self.auth_view.is_authenticated {
                    self.logout().await;
                }
            }
            KeyCode::Char(c @ '1'..='6') => {
                let route = ROUTES[(c as usize) - ('1' as usize)];
                if route.admin_only() && !self.auth_view.is_admin {
                    self.notice("Admin role required".into(), true);
                } else {
                    self.route = route;
                    self.ensure_loaded();
                }
            }
            _ => self.dispatch_to_page(key).await,
        }
    }

    async fn dispatch_to_page(&mut self, key: KeyEvent) {
        match self.route {
            Route::Products => {
                let action = self.products.on_key(key, self.auth_view.is_admin);
                if let Some(action) = action {
                    self.on_products_action(action);
                }
            }
            Route::Orders => {
                let action = self.orders.on_key(key, self.auth_view.is_admin);
                if let Some(action) = action {
                    self.on_orders_action(action);
                }
            }
            Route::Cart => {
                let action = self.cart_page.on_key(key, &self.cart);
                if let Some(action) = action {
                    self.on_cart_action(action);
                }
            }
            Route::Clients => {
                let action = self.clients.on_key(key);
                if let Some(action) = action {
                    self.on_clients_action(action);
                }
            }
            Route::NewOrder => {
                let action = self.new_order.on_key(key);
                if let Some(action) = action {
                    self.on_new_order_action(action);
                }
            }
            Route::Register => {
                let action = self.register.on_key(key);
                if let Some(RegisterAction::Submit(request)) = action {
                    self.register.submitting = true;
                    let api = self.api.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = api.register(&request).await;
                        let _ = tx.send(Msg::RegisterDone(result));
                    });
                }
            }
        }
    }

    fn on_products_action(&mut self, action: ProductsAction) {
        match action {
            ProductsAction::Reload => self.load_products(true),
            ProductsAction::AddToCart(product) => {
                self.cart.add(&product, 1);
                let quantity = self.cart.quantity_of(product.product_id);
                self.notice(
                    format!("{} x{quantity} in cart", product.name),
                    false,
                );
            }
            ProductsAction::Submit { editing, request } => {
                let api = self.api.clone();
                self.spawn_mutation("products", async move {
                    match editing {
                        Some(id) => api.update_product(id, &request).await.map(|_| ()),
                        None => api.create_product(&request).await.map(|_| ()),
                    }
                });
            }
            ProductsAction::Delete(id) => {
                let api = self.api.clone();
                self.spawn_mutation("products", async move { api.delete_product(id).await });
            }
        }
    }

    fn on_orders_action(&mut self, action: OrdersAction) {
        match action {
            OrdersAction::Reload => self.load_orders(true),
            OrdersAction::FilterChanged => self.load_orders(false),
            OrdersAction::SetStatus(id, status) => {
                let api = self.api.clone();
                self.spawn_mutation("commands", async move {
                    api.update_command_status(id, status).await.map(|_| ())
                });
            }
            OrdersAction::Cancel(id) => {
                let api = self.api.clone();
                self.spawn_mutation("commands", async move { api.cancel_command(id).await });
            }
            OrdersAction::Delete(id) => {
                let api = self.api.clone();
                self.spawn_mutation("commands", async move { api.delete_command(id).await });
            }
        }
    }

    fn on_cart_action(&mut self, action: CartAction) {
        match action {
            CartAction::Increment(id) => {
                let quantity = self.cart.quantity_of(id);
                self.cart.set_quantity(id, quantity + 1);
            }
            CartAction::Decrement(id) => {
                let quantity = self.cart.quantity_of(id);
                self.cart.set_quantity(id, quantity.saturating_sub(1));
            }
            CartAction::Remove(id) => self.cart.remove(id),
            CartAction::Clear => self.cart.clear(),
            CartAction::Checkout => {
                if !self.auth_view.is_authenticated {
                    self.notice("Log in to place an order".into(), true);
                    return;
                }
                self.cart_page.submitting = true;
                let request = self.cart.to_command_request();
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.create_command(&request).await;
                    let _ = tx.send(Msg::CheckoutDone(result));
                });
            }
        }
    }

    fn on_clients_action(&mut self, action: ClientsAction) {
        match action {
            ClientsAction::Reload => self.load_users(true),
            ClientsAction::Create(request) => {
                let api = self.api.clone();
                self.spawn_mutation("users", async move {
                    api.create_user(&request).await.map(|_| ())
                });
            }
            ClientsAction::SetEnabled(id, enabled) => {
                let api = self.api.clone();
                self.spawn_mutation("users", async move {
                    api.set_user_enabled(&id, enabled).await.map(|_| ())
                });
            }
            ClientsAction::Delete(id) => {
                let api = self.api.clone();
                self.spawn_mutation("users", async move { api.delete_user(&id).await });
            }
        }
    }

    fn on_new_order_action(&mut self, action: NewOrderAction) {
        match action {
            NewOrderAction::Reload => self.load_order_products(true),
            NewOrderAction::Submit(request) => {
                self.new_order.submitting = true;
                let api = self.api.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.create_command(&request).await;
                    let _ = tx.send(Msg::NewOrderDone(result));
                });
            }
        }
    }

    // ========== Message handling ==========

    async fn on_msg(&mut self, msg: Msg) {
        match msg {
            Msg::Products(result) => {
                self.products.data = match result {
                    Ok(products) => Remote::Ready(products),
                    Err(e) => Remote::Failed(e),
                };
            }
            Msg::OrderProducts(result) => {
                self.new_order.data = match result {
                    Ok(products) => Remote::Ready(products),
                    Err(e) => Remote::Failed(e),
                };
            }
            Msg::Commands(result) => {
                self.orders.data = match result {
                    Ok(commands) => Remote::Ready(commands),
                    Err(e) => Remote::Failed(e),
                };
            }
            Msg::Users(result) => {
                self.clients.data = match result {
                    Ok(users) => Remote::Ready(users),
                    Err(e) => Remote::Failed(e),
                };
            }
            Msg::CheckoutDone(result) => {
                self.cart_page.submitting = false;
                match result {
                    Ok(command) => {
                        tracing::info!(command_id = command.command_id, "Order placed");
                        self.cart.clear();
                        self.cart_page.confirmation = Some(command);
                        self.invalidate_after_order();
                    }
                    Err(e) => self.notice(format!("Checkout failed: {e}"), true),
                }
            }
            Msg::NewOrderDone(result) => {
                self.new_order.submitting = false;
                match result {
                    Ok(command) => {
                        self.new_order.quantities.clear();
                        self.invalidate_after_order();
                        self.notice(format!("Order #{} created", command.command_id), false);
                    }
                    Err(e) => self.notice(format!("Order failed: {e}"), true),
                }
            }
            Msg::MutationDone { resource, result } => match result {
                Ok(()) => {
                    self.queries.invalidate(resource);
                    match resource {
                        "products" => {
                            self.products.data = Remote::Idle;
                            self.new_order.data = Remote::Idle;
                        }
                        "commands" => self.orders.data = Remote::Idle,
                        "users" => self.clients.data = Remote::Idle,
                        _ => {}
                    }
                    self.ensure_loaded();
                    self.notice("Saved".into(), false);
                }
                Err(e) => self.notice(format!("Request failed: {e}"), true),
            },
            Msg::LoginDone(result) => match result {
                Ok(()) => {
                    self.login = None;
                    self.refresh_auth().await;
                    // Order history is user-scoped
                    self.queries.invalidate("commands");
                    self.orders.data = Remote::Idle;
                    self.ensure_loaded();
                    let who = self.auth_view.username.clone().unwrap_or_default();
                    self.notice(format!("Welcome back, {who}"), false);
                }
                Err(e) => {
                    if let Some(dialog) = &mut self.login {
                        dialog.submitting = false;
                        dialog.error = Some(e.to_string());
                    }
                }
            },
            Msg::RegisterDone(result) => {
                self.register.submitting = false;
                match result {
                    Ok(response) => {
                        self.register = RegisterPage::default();
                        self.register.created = Some(response.username);
                    }
                    Err(e) => self.register.error = Some(e.to_string()),
                }
            }
        }
    }

    /// A placed order changes stock and the order list
    fn invalidate_after_order(&mut self) {
        self.queries.invalidate("commands");
        self.queries.invalidate("products");
        self.orders.data = Remote::Idle;
        self.products.data = Remote::Idle;
        self.new_order.data = Remote::Idle;
        self.ensure_loaded();
    }

    // ========== Notices ==========

    fn notice(&mut self, message: String, is_error: bool) {
        self.notice = Some((message, is_error, Instant::now()));
    }

    fn expire_notice(&mut self) {
        if let Some((_, _, since)) = &self.notice {
            if since.elapsed() > NOTICE_TTL {
                self.notice = None;
            }
        }
    }

    // ========== Rendering ==========

    fn draw(&self, frame: &mut Frame) {
        let constraints = if self.show_logs {
            vec![
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(8),
                Constraint::Length(1),
            ]
        } else {
            vec![Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)]
        };
        let areas = Layout::vertical(constraints).split(frame.area());

        self.draw_header(frame, areas[0]);
        self.draw_body(frame, areas[1]);
        let footer_area = if self.show_logs {
            let logs = tui_logger::TuiLoggerWidget::default()
                .block(Block::default().borders(Borders::ALL).title(" Logs (F12) "));
            frame.render_widget(logs, areas[2]);
            areas[3]
        } else {
            areas[2]
        };
        self.draw_footer(frame, footer_area);

        if let Some(dialog) = &self.login {
            self.draw_login(frame, dialog);
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let [tabs_area, status_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(34)]).areas(area);

        let titles: Vec<Line> = ROUTES
            .iter()
            .map(|route| {
                let label = if *route == Route::Cart && self.cart.total_items() > 0 {
                    format!("{} ({})", route.title(), self.cart.total_items())
                } else {
                    route.title().to_string()
                };
                if route.admin_only() && !self.auth_view.is_admin {
                    Line::styled(label, Style::default().fg(Color::DarkGray))
                } else {
                    Line::raw(label)
                }
            })
            .collect();
        let selected = ROUTES.iter().position(|r| *r == self.route).unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title(" TrustMart "));
        frame.render_widget(tabs, tabs_area);

        let status = if self.auth_view.is_authenticated {
            let name = self.auth_view.username.as_deref().unwrap_or("?");
            let role = if self.auth_view.is_admin { " [ADMIN]" } else { "" };
            Line::from(vec![
                Span::raw(format!("{name}{role}  ")),
                Span::styled("L: logout", Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::styled("not logged in - l: login", Style::default().fg(Color::DarkGray))
        };
        let status = Paragraph::new(status).block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, status_area);
    }

    fn draw_body(&self, frame: &mut Frame, area: Rect) {
        match self.route {
            Route::Products => self
                .products
                .render(frame, area, &self.cart, self.auth_view.is_admin),
            Route::Orders => self.orders.render(frame, area, self.auth_view.is_admin),
            Route::Cart => self.cart_page.render(frame, area, &self.cart),
            Route::Clients => self.clients.render(frame, area),
            Route::NewOrder => self.new_order.render(frame, area),
            Route::Register => self.register.render(frame, area),
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.notice {
            Some((message, is_error, _)) => {
                let color = if *is_error { Color::Red } else { Color::Green };
                Line::styled(message.clone(), Style::default().fg(color))
            }
            None => Line::styled(
                "1-6: pages, q: quit, F12: logs",
                Style::default().fg(Color::DarkGray),
            ),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_login(&self, frame: &mut Frame, dialog: &LoginDialog) {
        let area = centered_rect(44, 10, frame.area());
        let inner = dialog_block(frame, area, "Login");
        let slots = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

        let fields = [("Username", &dialog.username, false), ("Password", &dialog.password, true)];
        for (i, (label, input, mask)) in fields.iter().enumerate() {
            let style = if i == dialog.focus {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value = if *mask {
                "*".repeat(input.value().len())
            } else {
                input.value().to_string()
            };
            let field = Paragraph::new(value).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(*label)
                    .style(style),
            );
            frame.render_widget(field, slots[i]);
        }

        let footer = match (&dialog.error, dialog.submitting) {
            (_, true) => Paragraph::new("signing in...").style(Style::default().fg(Color::DarkGray)),
            (Some(error), _) => Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
            (None, _) => Paragraph::new("enter: sign in, esc: cancel")
                .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(footer, slots[2]);
    }
}
