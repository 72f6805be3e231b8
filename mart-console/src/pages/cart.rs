//! Cart page
//!
//! Renders the session cart, adjusts quantities within stock, and submits
//! checkout. On success the app clears the cart and this page shows the
//! confirmation until dismissed.

use crate::pages::move_selection;
use crate::widgets::{format_money, render_empty, status_style};
use crossterm::event::{KeyCode, KeyEvent};
use mart_client::Cart;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use shared::models::Command;

pub enum CartAction {
    Increment(u64),
    Decrement(u64),
    Remove(u64),
    Clear,
    Checkout,
}

/// Cart page state (the cart itself lives on the app)
#[derive(Default)]
pub struct CartPage {
    pub selected: usize,
    /// Set after a successful checkout
    pub confirmation: Option<Command>,
    /// True while the checkout request is outstanding
    pub submitting: bool,
}

impl CartPage {
    pub fn on_key(&mut self, key: KeyEvent, cart: &Cart) -> Option<CartAction> {
        if self.confirmation.is_some() {
            // Any key dismisses the confirmation view
            self.confirmation = None;
            return None;
        }
        if self.submitting {
            return None;
        }

        let len = cart.lines().len();
        self.selected = self.selected.min(len.saturating_sub(1));
        let selected_id = cart
            .lines()
            .get(self.selected)
            .map(|line| line.product.product_id);

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = move_selection(self.selected, len, -1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = move_selection(self.selected, len, 1),
            KeyCode::Char('+') | KeyCode::Right => return selected_id.map(CartAction::Increment),
            KeyCode::Char('-') | KeyCode::Left => return selected_id.map(CartAction::Decrement),
            KeyCode::Char('d') | KeyCode::Delete => return selected_id.map(CartAction::Remove),
            KeyCode::Char('x') => {
                if len > 0 {
                    return Some(CartAction::Clear);
                }
            }
            KeyCode::Enter => {
                if len > 0 {
                    return Some(CartAction::Checkout);
                }
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, cart: &Cart) {
        if let Some(command) = &self.confirmation {
            self.render_confirmation(frame, area, command);
            return;
        }

        if cart.is_empty() {
            render_empty(frame, area, "Your cart is empty - add products from the catalog");
            return;
        }

        let [table_area, totals_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

        let rows = cart.lines().iter().map(|line| {
            Row::new(vec![
                line.product.name.clone(),
                format_money(line.product.price),
                format!("{} / {}", line.quantity, line.product.stock),
                format_money(line.product.price * rust_decimal::Decimal::from(line.quantity)),
            ])
        });
        let title = if self.submitting {
            " Cart (placing order...) "
        } else {
            " Cart (+/-: quantity, d: remove, x: clear, enter: checkout) "
        };
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(45),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(12),
            ],
        )
        .header(
            Row::new(vec!["Product", "Unit", "Qty/Stock", "Subtotal"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title));

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, table_area, &mut state);

        let totals = Paragraph::new(format!(
            "{} items - total {}",
            cart.total_items(),
            format_money(cart.total_price())
        ))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(totals, totals_area);
    }

    fn render_confirmation(&self, frame: &mut Frame, area: Rect, command: &Command) {
        let mut lines = vec![
            Line::styled(
                format!("Order #{} placed!", command.command_id),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
            Line::styled(command.status.to_string(), status_style(command.status)),
            Line::raw(format!("Total: {}", format_money(command.total_price))),
            Line::raw(""),
        ];
        for item in &command.items {
            lines.push(Line::raw(format!(
                "  product {} x{} @ {}",
                item.product_id,
                item.quantity,
                format_money(item.price)
            )));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "press any key to continue shopping",
            Style::default().fg(Color::DarkGray),
        ));

        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Order confirmed "));
        frame.render_widget(panel, area);
    }
}
