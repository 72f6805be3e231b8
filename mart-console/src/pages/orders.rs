//! Orders page
//!
//! Lists the caller's orders (the gateway scopes non-admins to their own),
//! with an optional status filter. Admins can request status transitions,
//! cancel, or delete. Legal transitions are not validated here - the
//! server decides.

use crate::pages::move_selection;
use crate::remote::Remote;
use crate::widgets::{
    centered_rect, dialog_block, format_date, format_money, render_empty, render_error,
    render_loading, status_style,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Row, Table, TableState};
use shared::models::{Command, CommandStatus};

pub enum OrdersAction {
    Reload,
    /// Filter changed; re-fetch under the new key
    FilterChanged,
    SetStatus(u64, CommandStatus),
    Cancel(u64),
    Delete(u64),
}

/// Orders page state
#[derive(Default)]
pub struct OrdersPage {
    pub data: Remote<Vec<Command>>,
    pub selected: usize,
    pub filter: Option<CommandStatus>,
    /// Open status picker: index into CommandStatus::ALL
    pub picker: Option<usize>,
}

impl OrdersPage {
    pub fn selected_command(&self) -> Option<&Command> {
        self.data.ready()?.get(self.selected)
    }

    pub fn has_dialog(&self) -> bool {
        self.picker.is_some()
    }

    /// Advance the status filter: all -> PENDING -> ... -> CANCELLED -> all
    fn cycle_filter(&mut self) {
        self.filter = match self.filter {
            None => Some(CommandStatus::ALL[0]),
            Some(current) => CommandStatus::ALL
                .iter()
                .position(|s| *s == current)
                .and_then(|i| CommandStatus::ALL.get(i + 1))
                .copied(),
        };
        self.selected = 0;
    }

    pub fn on_key(&mut self, key: KeyEvent, is_admin: bool) -> Option<OrdersAction> {
        if let Some(picker) = &mut self.picker {
            match key.code {
                KeyCode::Esc => self.picker = None,
                KeyCode::Up | KeyCode::Char('k') => {
                    *picker = move_selection(*picker, CommandStatus::ALL.len(), -1)
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    *picker = move_selection(*picker, CommandStatus::ALL.len(), 1)
                }
                KeyCode::Enter => {
                    let status = CommandStatus::ALL[*picker];
                    self.picker = None;
                    if let Some(command) = self.selected_command() {
                        return Some(OrdersAction::SetStatus(command.command_id, status));
                    }
                }
                _ => {}
            }
            return None;
        }

        let len = self.data.ready().map_or(0, Vec::len);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = move_selection(self.selected, len, -1),
            KeyCode::Down | KeyCode::Char('j') => self.selected = move_selection(self.selected, len, 1),
            KeyCode::Char('r') => return Some(OrdersAction::Reload),
            KeyCode::Char('f') => {
                self.cycle_filter();
                return Some(OrdersAction::FilterChanged);
            }
            KeyCode::Char('s') if is_admin => {
                if self.selected_command().is_some() {
                    self.picker = Some(0);
                }
            }
            KeyCode::Char('c') => {
                if let Some(command) = self.selected_command() {
                    if command.status != CommandStatus::Cancelled {
                        return Some(OrdersAction::Cancel(command.command_id));
                    }
                }
            }
            KeyCode::Char('d') if is_admin => {
                if let Some(command) = self.selected_command() {
                    return Some(OrdersAction::Delete(command.command_id));
                }
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, is_admin: bool) {
        let filter_label = self
            .filter
            .map_or_else(|| "all".to_string(), |s| s.to_string());
        let help = if is_admin {
            format!(" Orders [{filter_label}] (f: filter, s: status, c: cancel, d: delete) ")
        } else {
            format!(" Orders [{filter_label}] (f: filter, c: cancel) ")
        };

        match &self.data {
            Remote::Idle | Remote::Loading => render_loading(frame, area, "orders"),
            Remote::Failed(error) => render_error(frame, area, error),
            Remote::Ready(commands) if commands.is_empty() => {
                render_empty(frame, area, "No orders yet")
            }
            Remote::Ready(commands) => {
                let rows = commands.iter().map(|command| {
                    Row::new(vec![
                        Line::raw(format!("#{}", command.command_id)),
                        Line::raw(format_date(&command.date)),
                        Line::styled(command.status.to_string(), status_style(command.status)),
                        Line::raw(command.username.clone()),
                        Line::raw(format!("{} items", command.items.len())),
                        Line::raw(format_money(command.total_price)),
                    ])
                });
                let table = Table::new(
                    rows,
                    [
                        Constraint::Length(8),
                        Constraint::Length(18),
                        Constraint::Length(12),
                        Constraint::Percentage(25),
                        Constraint::Length(10),
                        Constraint::Length(12),
                    ],
                )
                .header(
                    Row::new(vec!["Order", "Date", "Status", "Customer", "Lines", "Total"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .row_highlight_style(Style::default().bg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(help));

                let mut state = TableState::default().with_selected(Some(self.selected));
                frame.render_stateful_widget(table, area, &mut state);
            }
        }

        if let Some(picker) = self.picker {
            let dialog = centered_rect(30, CommandStatus::ALL.len() as u16 + 2, area);
            let inner = dialog_block(frame, dialog, "Set status");
            let items = CommandStatus::ALL
                .iter()
                .map(|status| ListItem::new(Line::styled(status.to_string(), status_style(*status))));
            let list = List::new(items)
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol("> ");
            let mut state = ListState::default().with_selected(Some(picker));
            frame.render_stateful_widget(list, inner, &mut state);
        }
    }
}
