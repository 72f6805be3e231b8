//! New order page (admin)
//!
//! Compose an order directly from the catalog: pick quantities per product
//! and submit once. Quantities are clamped to stock the same way the cart
//! clamps them.

use crate::pages::move_selection;
use crate::remote::Remote;
use crate::widgets::{format_money, render_empty, render_error, render_loading};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use shared::models::{CommandItemRequest, CommandRequest, Product};
use std::collections::HashMap;

pub enum NewOrderAction {
    Reload,
    Submit(CommandRequest),
}

/// New-order page state
#[derive(Default)]
pub struct NewOrderPage {
    pub data: Remote<Vec<Product>>,
    pub selected: usize,
    /// Chosen quantity per product id
    pub quantities: HashMap<u64, u32>,
    pub submitting: bool,
}

impl NewOrderPage {
    fn selected_product(&self) -> Option<&Product> {
        self.data.ready()?.get(self.selected)
    }

    fn adjust(&mut self, delta: i64) {
        let Some(product) = self.selected_product() else {
            return;
        };
        let id = product.product_id;
        let stock = product.stock;
        let current = self.quantities.get(&id).copied().unwrap_or(0) as i64;
        let next = (current + delta).clamp(0, stock as i64) as u32;
        if next == 0 {
            self.quantities.remove(&id);
        } else {
            self.quantities.insert(id, next);
        }
    }

    /// Lines with a non-zero quantity, in catalog order
    fn request(&self) -> CommandRequest {
        let items = self
            .data
            .ready()
            .map(|products| {
                products
                    .iter()
                    .filter_map(|product| {
                        let quantity = self.quantities.get(&product.product_id).copied()?;
                        Some(CommandItemRequest {
                            product_id: product.product_id,
                            quantity,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        CommandRequest { items }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<NewOrderAction> {
        if self.submitting {
            return None;
        }
        let len = self.data.ready().map_or(0, Vec::len);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = move_selection(self.selected, len, -1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = move_selection(self.selected, len, 1),
            KeyCode::Char('r') => return Some(NewOrderAction::Reload),
            KeyCode::Char('+') | KeyCode::Right => self.adjust(1),
            KeyCode::Char('-') | KeyCode::Left => self.adjust(-1),
            KeyCode::Enter => {
                let request = self.request();
                if !request.items.is_empty() {
                    return Some(NewOrderAction::Submit(request));
                }
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match &self.data {
            Remote::Idle | Remote::Loading => render_loading(frame, area, "products"),
            Remote::Failed(error) => render_error(frame, area, error),
            Remote::Ready(products) if products.is_empty() => {
                render_empty(frame, area, "No products to order")
            }
            Remote::Ready(products) => {
                let [table_area, footer_area] =
                    Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

                let rows = products.iter().map(|product| {
                    let quantity = self.quantities.get(&product.product_id).copied().unwrap_or(0);
                    let style = if quantity > 0 {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default()
                    };
                    Row::new(vec![
                        product.name.clone(),
                        format_money(product.price),
                        format!("{}", product.stock),
                        format!("{quantity}"),
                    ])
                    .style(style)
                });
                let title = if self.submitting {
                    " New order (submitting...) "
                } else {
                    " New order (+/-: quantity, enter: submit) "
                };
                let table = Table::new(
                    rows,
                    [
                        Constraint::Percentage(50),
                        Constraint::Length(12),
                        Constraint::Length(7),
                        Constraint::Length(7),
                    ],
                )
                .header(
                    Row::new(vec!["Name", "Price", "Stock", "Qty"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .row_highlight_style(Style::default().bg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(title));

                let mut state = TableState::default().with_selected(Some(self.selected));
                frame.render_stateful_widget(table, table_area, &mut state);

                let picked: u32 = self.quantities.values().sum();
                let footer = Paragraph::new(format!("{picked} units across {} products", self.quantities.len()))
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(footer, footer_area);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use rust_decimal::Decimal;

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
            price: Decimal::ONE,
            stock,
        }
    }

    #[test]
    fn quantities_clamp_to_stock_and_zero_drops_the_line() {
        let mut page = NewOrderPage::default();
        page.data = Remote::Ready(vec![product(1, 2)]);

        page.on_key(key(KeyCode::Char('+')));
        page.on_key(key(KeyCode::Char('+')));
        page.on_key(key(KeyCode::Char('+')));
        assert_eq!(page.quantities.get(&1), Some(&2));

        page.on_key(key(KeyCode::Char('-')));
        page.on_key(key(KeyCode::Char('-')));
        assert!(page.quantities.is_empty());
    }

    #[test]
    fn submit_needs_at_least_one_line() {
        let mut page = NewOrderPage::default();
        page.data = Remote::Ready(vec![product(1, 2)]);
        assert!(page.on_key(key(KeyCode::Enter)).is_none());

        page.on_key(key(KeyCode::Char('+')));
        match page.on_key(key(KeyCode::Enter)) {
            Some(NewOrderAction::Submit(request)) => {
                assert_eq!(request.items.len(), 1);
                assert_eq!(request.items[0].quantity, 1);
            }
            _ => panic!("expected a submit action"),
        }
    }
}
