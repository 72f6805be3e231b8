//! Shared rendering helpers

use mart_client::ApiError;
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use rust_decimal::Decimal;
use shared::models::CommandStatus;

/// Badge color for an order status
pub fn status_style(status: CommandStatus) -> Style {
    let color = match status {
        CommandStatus::Pending => Color::Yellow,
        CommandStatus::Confirmed => Color::Cyan,
        CommandStatus::Processing => Color::Blue,
        CommandStatus::Shipped => Color::Magenta,
        CommandStatus::Delivered => Color::Green,
        CommandStatus::Cancelled => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Format a price for display
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2} €", amount)
}

/// Format a gateway timestamp for display, falling back to the raw string
pub fn format_date(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        })
        .unwrap_or_else(|_| raw.to_string())
}

/// Centered overlay area for dialogs
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// Loading placeholder
pub fn render_loading(frame: &mut Frame, area: Rect, what: &str) {
    let text = Paragraph::new(format!("Loading {what}..."))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(text, area);
}

/// Error panel with the retry affordance
pub fn render_error(frame: &mut Frame, area: Rect, error: &ApiError) {
    let lines = vec![
        Line::styled("Request failed", Style::default().fg(Color::Red)),
        Line::raw(error.to_string()),
        Line::raw(""),
        Line::styled("press r to retry", Style::default().fg(Color::DarkGray)),
    ];
    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Error "));
    frame.render_widget(panel, area);
}

/// Placeholder for an empty collection
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(text, area);
}

/// Dialog frame: clears the area and draws a titled border
pub fn dialog_block(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title(format!(" {title} "));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn money_has_two_decimals() {
        assert_eq!(format_money(Decimal::from_str("19.98").unwrap()), "19.98 €");
        assert_eq!(format_money(Decimal::from(5)), "5.00 €");
    }

    #[test]
    fn dates_fall_back_to_raw() {
        assert_eq!(format_date("2026-08-01T10:30:00Z"), "2026-08-01 10:30");
        assert_eq!(format_date("2026-08-01T10:30:00.123"), "2026-08-01 10:30");
        assert_eq!(format_date("whenever"), "whenever");
    }
}
