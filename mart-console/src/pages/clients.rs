//! Clients page (admin)
//!
//! User administration over the gateway's identity-provider proxy: list,
//! create, toggle enabled, delete.

use crate::pages::move_selection;
use crate::remote::Remote;
use crate::widgets::{centered_rect, dialog_block, render_empty, render_error, render_loading};
use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use shared::models::{CreateUserRequest, User};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

const FORM_FIELDS: [&str; 5] = ["Username", "Email", "First name", "Last name", "Password"];

/// Create-user dialog state
pub struct ClientForm {
    pub fields: [Input; 5],
    pub focus: usize,
    pub error: Option<String>,
}

impl ClientForm {
    fn blank() -> Self {
        Self {
            fields: std::array::from_fn(|_| Input::default()),
            focus: 0,
            error: None,
        }
    }

    fn build(&self) -> Result<CreateUserRequest, String> {
        let values: Vec<&str> = self.fields.iter().map(|f| f.value().trim()).collect();
        if values.iter().any(|v| v.is_empty()) {
            return Err("all fields are required".into());
        }
        if !values[1].contains('@') {
            return Err("email looks invalid".into());
        }
        if values[4].len() < 8 {
            return Err("password must be at least 8 characters".into());
        }
        Ok(CreateUserRequest {
            username: values[0].to_string(),
            email: values[1].to_string(),
            first_name: values[2].to_string(),
            last_name: values[3].to_string(),
            password: values[4].to_string(),
        })
    }
}

pub enum ClientsAction {
    Reload,
    Create(CreateUserRequest),
    SetEnabled(String, bool),
    Delete(String),
}

/// Clients page state
#[derive(Default)]
pub struct ClientsPage {
    pub data: Remote<Vec<User>>,
    pub selected: usize,
    pub form: Option<ClientForm>,
}

impl ClientsPage {
    pub fn selected_user(&self) -> Option<&User> {
        self.data.ready()?.get(self.selected)
    }

    pub fn has_dialog(&self) -> bool {
        self.form.is_some()
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<ClientsAction> {
        if let Some(form) = &mut self.form {
            match key.code {
                KeyCode::Esc => self.form = None,
                KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % FORM_FIELDS.len(),
                KeyCode::BackTab | KeyCode::Up => {
                    form.focus = (form.focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len()
                }
                KeyCode::Enter => match form.build() {
                    Ok(request) => {
                        self.form = None;
                        return Some(ClientsAction::Create(request));
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
            KeyCode::Char('r') => return Some(ClientsAction::Reload),
            KeyCode::Char('n') => self.form = Some(ClientForm::blank()),
            KeyCode::Char('t') => {
                if let Some(user) = self.selected_user() {
                    return Some(ClientsAction::SetEnabled(user.id.clone(), !user.enabled));
                }
            }
            KeyCode::Char('d') => {
                if let Some(user) = self.selected_user() {
                    return Some(ClientsAction::Delete(user.id.clone()));
                }
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match &self.data {
            Remote::Idle | Remote::Loading => render_loading(frame, area, "clients"),
            Remote::Failed(error) => render_error(frame, area, error),
            Remote::Ready(users) if users.is_empty() => render_empty(frame, area, "No clients"),
            Remote::Ready(users) => {
                let rows = users.iter().map(|user| {
                    let style = if user.enabled {
                        Style::default()
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    Row::new(vec![
                        user.username.clone(),
                        user.email.clone(),
                        format!("{} {}", user.first_name, user.last_name),
                        if user.enabled { "enabled" } else { "disabled" }.to_string(),
                    ])
                    .style(style)
                });
                let table = Table::new(
                    rows,
                    [
                        Constraint::Percentage(25),
                        Constraint::Percentage(35),
                        Constraint::Percentage(25),
                        Constraint::Length(10),
                    ],
                )
                .header(
                    Row::new(vec!["Username", "Email", "Name", "Status"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .row_highlight_style(Style::default().bg(Color::DarkGray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Clients (n: new, t: toggle enabled, d: delete) "),
                );

                let mut state = TableState::default().with_selected(Some(self.selected));
                frame.render_stateful_widget(table, area, &mut state);
            }
        }

        if let Some(form) = &self.form {
            let dialog = centered_rect(50, (FORM_FIELDS.len() as u16) * 3 + 3, area);
            let inner = dialog_block(frame, dialog, "New client");

            let mut constraints = vec![Constraint::Length(3); FORM_FIELDS.len()];
            constraints.push(Constraint::Length(1));
            let slots = Layout::vertical(constraints).split(inner);

            for (i, label) in FORM_FIELDS.iter().enumerate() {
                let style = if i == form.focus {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                let value = if *label == "Password" {
                    "*".repeat(form.fields[i].value().len())
                } else {
                    form.fields[i].value().to_string()
                };
                let field = Paragraph::new(value).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(*label)
                        .style(style),
                );
                frame.render_widget(field, slots[i]);
            }

            let footer = match &form.error {
                Some(error) => Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
                None => Paragraph::new("enter: create, esc: cancel")
                    .style(Style::default().fg(Color::DarkGray)),
            };
            frame.render_widget(footer, slots[FORM_FIELDS.len()]);
        }
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

    fn user(id: &str, enabled: bool) -> User {
        User {
            id: id.into(),
            username: "bob".into(),
            email: "bob@example.com".into(),
            first_name: "Bob".into(),
            last_name: "B".into(),
            enabled,
            email_verified: true,
            created_timestamp: 0,
        }
    }

    #[test]
    fn toggle_flips_the_enabled_flag() {
        let mut page = ClientsPage::default();
        page.data = Remote::Ready(vec![user("u-1", true)]);

        match page.on_key(key(KeyCode::Char('t'))) {
            Some(ClientsAction::SetEnabled(id, enabled)) => {
                assert_eq!(id, "u-1");
                assert!(!enabled);
            }
            _ => panic!("expected a toggle action"),
        }
    }

    #[test]
    fn form_requires_every_field() {
        let form = ClientForm::blank();
        assert!(form.build().is_err());
    }
}
