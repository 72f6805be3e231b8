//! Products page
//!
//! Storefront view of the catalog with add-to-cart; admins also get
//! create/edit/delete dialogs.

use crate::pages::move_selection;
use crate::remote::Remote;
use crate::widgets::{
    centered_rect, dialog_block, format_money, render_empty, render_error, render_loading,
};
use crossterm::event::{Event, KeyCode, KeyEvent};
use mart_client::Cart;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use rust_decimal::Decimal;
use shared::models::{Product, ProductRequest};
use std::str::FromStr;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

const FORM_FIELDS: [&str; 4] = ["Name", "Description", "Price", "Stock"];

/// Admin create/edit dialog state
pub struct ProductForm {
    /// Product being edited, None when creating
    pub editing: Option<u64>,
    pub fields: [Input; 4],
    pub focus: usize,
    pub error: Option<String>,
}

impl ProductForm {
    fn blank() -> Self {
        Self {
            editing: None,
            fields: std::array::from_fn(|_| Input::default()),
            focus: 0,
            error: None,
        }
    }

    fn for_product(product: &Product) -> Self {
        let mut form = Self::blank();
        form.editing = Some(product.product_id);
        form.fields = [
            Input::new(product.name.clone()),
            Input::new(product.description.clone().unwrap_or_default()),
            Input::new(product.price.to_string()),
            Input::new(product.stock.to_string()),
        ];
        form
    }

    /// Validate the fields into a request payload
    fn build(&self) -> Result<ProductRequest, String> {
        let name = self.fields[0].value().trim();
        if name.is_empty() {
            return Err("name is required".into());
        }
        let description = self.fields[1].value().trim();
        let price = Decimal::from_str(self.fields[2].value().trim())
            .map_err(|_| "price must be a number".to_string())?;
        if price < Decimal::ZERO {
            return Err("price cannot be negative".into());
        }
        let stock: u32 = self.fields[3]
            .value()
            .trim()
            .parse()
            .map_err(|_| "stock must be a non-negative integer".to_string())?;

        Ok(ProductRequest {
            name: name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            price,
            stock,
        })
    }
}

/// What the app should do in response to a key press
pub enum ProductsAction {
    Reload,
    AddToCart(Product),
    Submit {
        editing: Option<u64>,
        request: ProductRequest,
    },
    Delete(u64),
}

/// Products page state
#[derive(Default)]
pub struct ProductsPage {
    pub data: Remote<Vec<Product>>,
    pub selected: usize,
    pub form: Option<ProductForm>,
}

impl ProductsPage {
    pub fn selected_product(&self) -> Option<&Product> {
        self.data.ready()?.get(self.selected)
    }

    pub fn has_dialog(&self) -> bool {
        self.form.is_some()
    }

    pub fn on_key(&mut self, key: KeyEvent, is_admin: bool) -> Option<ProductsAction> {
        if let Some(form) = &mut self.form {
            match key.code {
                KeyCode::Esc => {
                    self.form = None;
                }
                KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % FORM_FIELDS.len(),
                KeyCode::BackTab | KeyCode::Up => {
                    form.focus = (form.focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len()
                }
                KeyCode::Enter => match form.build() {
                    Ok(request) => {
                        let editing = form.editing;
                        self.form = None;
                        return Some(ProductsAction::Submit { editing, request });
                    }
                    Err(message) => form.error = Some(message),
                },
                _ => {
                    form.fields[form.focus].handle_event(&Event::Key(key));
                }
            }
            return None;
        }

        let len = self.data.ready().map_or(0, Vec::len);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = move_selection(self.selected, len, -1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = move_selection(self.selected, len, 1),
            KeyCode::Char('r') => return Some(ProductsAction::Reload),
            KeyCode::Enter | KeyCode::Char('a') => {
                if let Some(product) = self.selected_product() {
                    return Some(ProductsAction::AddToCart(product.clone()));
                }
            }
            KeyCode::Char('n') if is_admin => self.form = Some(ProductForm::blank()),
            KeyCode::Char('e') if is_admin => {
                if let Some(product) = self.selected_product() {
                    self.form = Some(ProductForm::for_product(product));
                }
            }
            KeyCode::Char('d') if is_admin => {
                if let Some(product) = self.selected_product() {
                    return Some(ProductsAction::Delete(product.product_id));
                }
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, cart: &Cart, is_admin: bool) {
        match &self.data {
            Remote::Idle | Remote::Loading => render_loading(frame, area, "products"),
            Remote::Failed(error) => render_error(frame, area, error),
            Remote::Ready(products) if products.is_empty() => {
                render_empty(frame, area, "No products yet")
            }
            Remote::Ready(products) => {
                let rows = products.iter().map(|product| {
                    let in_cart = cart.quantity_of(product.product_id);
                    let stock_style = if product.stock == 0 {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default()
                    };
                    Row::new(vec![
                        product.name.clone(),
                        product.description.clone().unwrap_or_default(),
                        format_money(product.price),
                        format!("{}", product.stock),
                        if in_cart > 0 {
                            format!("x{in_cart}")
                        } else {
                            String::new()
                        },
                    ])
                    .style(stock_style)
                });

                let help = if is_admin {
                    " Products (enter: add to cart, n: new, e: edit, d: delete) "
                } else {
                    " Products (enter: add to cart) "
                };
                let table = Table::new(
                    rows,
                    [
                        Constraint::Percentage(30),
                        Constraint::Percentage(34),
                        Constraint::Length(12),
                        Constraint::Length(7),
                        Constraint::Length(6),
                    ],
                )
                .header(
                    Row::new(vec!["Name", "Description", "Price", "Stock", "Cart"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .row_highlight_style(Style::default().bg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(help));

                let mut state = TableState::default().with_selected(Some(self.selected));
                frame.render_stateful_widget(table, area, &mut state);
            }
        }

        if let Some(form) = &self.form {
            self.render_form(frame, area, form);
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, form: &ProductForm) {
        let title = if form.editing.is_some() {
            "Edit product"
        } else {
            "New product"
        };
        let dialog = centered_rect(50, (FORM_FIELDS.len() as u16) * 3 + 3, area);
        let inner = dialog_block(frame, dialog, title);

        let mut constraints = vec![Constraint::Length(3); FORM_FIELDS.len()];
        constraints.push(Constraint::Length(1));
        let slots = Layout::vertical(constraints).split(inner);

        for (i, label) in FORM_FIELDS.iter().enumerate() {
            let style = if i == form.focus {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let field = Paragraph::new(form.fields[i].value().to_string()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(*label)
                    .style(style),
            );
            frame.render_widget(field, slots[i]);
        }

        let footer = match &form.error {
            Some(error) => Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
            None => Paragraph::new("enter: save, esc: cancel")
                .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(footer, slots[FORM_FIELDS.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn product(id: u64, stock: u32) -> Product {
        Product {
            product_id: id,
            name: format!("p{id}"),
            description: None,
            price: Decimal::from(2),
            stock,
        }
    }

    #[test]
    fn enter_adds_the_selected_product() {
        let mut page = ProductsPage::default();
        page.data = Remote::Ready(vec![product(1, 5), product(2, 5)]);
        page.on_key(key(KeyCode::Down), false);

        match page.on_key(key(KeyCode::Enter), false) {
            Some(ProductsAction::AddToCart(p)) => assert_eq!(p.product_id, 2),
            _ => panic!("expected add-to-cart action"),
        }
    }

    #[test]
    fn admin_keys_are_ignored_for_clients() {
        let mut page = ProductsPage::default();
        page.data = Remote::Ready(vec![product(1, 5)]);

        assert!(page.on_key(key(KeyCode::Char('n')), false).is_none());
        assert!(page.form.is_none());

        page.on_key(key(KeyCode::Char('n')), true);
        assert!(page.form.is_some());
    }

    #[test]
    fn form_rejects_bad_numbers() {
        let mut form = ProductForm::blank();
        form.fields = [
            Input::new("Widget".into()),
            Input::default(),
            Input::new("cheap".into()),
            Input::new("3".into()),
        ];
        assert!(form.build().is_err());

        form.fields[2] = Input::new("9.99".into());
        let request = form.build().unwrap();
        assert_eq!(request.name, "Widget");
        assert_eq!(request.stock, 3);
        assert!(request.description.is_none());
    }
}
