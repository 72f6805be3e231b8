//! Registration page
//!
//! Public sign-up form. Validation runs client-side and failures stay in
//! the form as a transient notice; only a valid payload reaches the
//! network layer.

use crate::widgets::{centered_rect, dialog_block};
use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use shared::models::CreateUserRequest;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;
use validator::Validate;

const FORM_FIELDS: [&str; 6] = [
    "Username",
    "Email",
    "First name",
    "Last name",
    "Password",
    "Confirm password",
];

/// Form payload under validation
#[derive(Debug, Validate)]
struct RegistrationData {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    username: String,
    #[validate(email(message = "email looks invalid"))]
    email: String,
    #[validate(length(min = 1, message = "first name is required"))]
    first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    last_name: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    confirm: String,
}

pub enum RegisterAction {
    Submit(CreateUserRequest),
}

/// Registration page state
#[derive(Default)]
pub struct RegisterPage {
    pub fields: [Input; 6],
    pub focus: usize,
    pub error: Option<String>,
    /// Username created on success
    pub created: Option<String>,
    pub submitting: bool,
}

impl RegisterPage {
    fn validate(&self) -> Result<CreateUserRequest, String> {
        let data = RegistrationData {
            username: self.fields[0].value().trim().to_string(),
            email: self.fields[1].value().trim().to_string(),
            first_name: self.fields[2].value().trim().to_string(),
            last_name: self.fields[3].value().trim().to_string(),
            password: self.fields[4].value().to_string(),
            confirm: self.fields[5].value().to_string(),
        };

        data.validate().map_err(first_message)?;

        Ok(CreateUserRequest {
            username: data.username,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            password: data.password,
        })
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<RegisterAction> {
        if self.submitting {
            return None;
        }
        if self.created.is_some() {
            self.created = None;
            return None;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % FORM_FIELDS.len(),
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len()
            }
            KeyCode::Enter => match self.validate() {
                Ok(request) => {
                    self.error = None;
                    return Some(RegisterAction::Submit(request));
                }
                Err(message) => self.error = Some(message),
            },
            _ => {
                self.fields[self.focus].handle_event(&Event::Key(key));
            }
        }
        None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if let Some(username) = &self.created {
            let panel = Paragraph::new(vec![
                ratatui::text::Line::styled(
                    format!("Account '{username}' created!"),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                ratatui::text::Line::raw("You can now log in with your credentials."),
                ratatui::text::Line::styled(
                    "press any key to continue",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
            .block(Block::default().borders(Borders::ALL).title(" Registered "));
            frame.render_widget(panel, area);
            return;
        }

        let dialog = centered_rect(54, (FORM_FIELDS.len() as u16) * 3 + 3, area);
        let inner = dialog_block(frame, dialog, "Create account");

        let mut constraints = vec![Constraint::Length(3); FORM_FIELDS.len()];
        constraints.push(Constraint::Length(1));
        let slots = Layout::vertical(constraints).split(inner);

        for (i, label) in FORM_FIELDS.iter().enumerate() {
            let style = if i == self.focus {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value = if label.contains("assword") {
                "*".repeat(self.fields[i].value().len())
            } else {
                self.fields[i].value().to_string()
            };
            let field = Paragraph::new(value).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(*label)
                    .style(style),
            );
            frame.render_widget(field, slots[i]);
        }

        let footer = match (&self.error, self.submitting) {
            (_, true) => Paragraph::new("registering...").style(Style::default().fg(Color::DarkGray)),
            (Some(error), _) => Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red)),
            (None, _) => Paragraph::new("enter: register, esc: back")
                .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(footer, slots[FORM_FIELDS.len()]);
    }
}

/// First human-readable message out of the validation errors
fn first_message(errors: validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .into_values()
        .flat_map(|errors| errors.iter())
        .filter_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "invalid input".into())
}
