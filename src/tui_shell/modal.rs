use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(super) fn draw_modal(frame: &mut ratatui::Frame, modal: &super::Modal) {
    let area = frame.area();
    let w = area.width.saturating_sub(6).clamp(20, 90);
    let h = area.height.saturating_sub(6).clamp(8, 24);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let box_area = ratatui::layout::Rect {
        x,
        y,
        width: w,
        height: h,
    };

    frame.render_widget(ratatui::widgets::Clear, box_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(modal.title.as_str());
    frame.render_widget(block.clone(), box_area);
    let inner = block.inner(box_area);

    let lines: Vec<Line> = modal.lines.iter().map(|s| Line::from(s.as_str())).collect();
    let scroll = modal.scroll.min(modal.lines.len().saturating_sub(1)) as u16;
    let text = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    match &modal.kind {
        super::ModalKind::Viewer | super::ModalKind::Confirm { .. } => {
            frame.render_widget(text, inner);
        }

        super::ModalKind::TextInput { prompt, .. } => {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(inner);
            frame.render_widget(text, parts[0]);

            let input_line = Line::from(vec![
                Span::styled(*prompt, Style::default().fg(Color::Yellow)),
                Span::raw(modal.input.buf.as_str()),
            ]);
            frame.render_widget(
                Paragraph::new(input_line)
                    .block(Block::default().borders(Borders::ALL).title("Edit")),
                parts[1],
            );

            let x = (prompt.chars().count() + modal.input.cursor) as u16;
            let y = parts[1].y + 1;
            frame.set_cursor_position((parts[1].x + 1 + x, y));
        }
    }
}

pub(super) fn handle_modal_key(app: &mut super::App, key: KeyEvent) {
    enum ModalAction {
        None,
        Close,
        Cancel,
        Confirm,
        SubmitText,
    }

    let action = {
        let Some(m) = app.modal.as_mut() else {
            return;
        };

        match &m.kind {
            super::ModalKind::Viewer => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                    ModalAction::Close
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    m.scroll = m.scroll.saturating_sub(1);
                    ModalAction::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    m.scroll = (m.scroll + 1).min(m.lines.len().saturating_sub(1));
                    ModalAction::None
                }
                _ => ModalAction::None,
            },

            super::ModalKind::Confirm { .. } => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => ModalAction::Confirm,
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('q') => ModalAction::Cancel,
                _ => ModalAction::None,
            },

            super::ModalKind::TextInput { .. } => match key.code {
                KeyCode::Esc => ModalAction::Cancel,
                KeyCode::Enter => ModalAction::SubmitText,
                KeyCode::Backspace => {
                    m.input.backspace();
                    ModalAction::None
                }
                KeyCode::Delete => {
                    m.input.delete();
                    ModalAction::None
                }
                KeyCode::Left => {
                    m.input.move_left();
                    ModalAction::None
                }
                KeyCode::Right => {
                    m.input.move_right();
                    ModalAction::None
                }
                KeyCode::Home => {
                    m.input.home();
                    ModalAction::None
                }
                KeyCode::End => {
                    m.input.end();
                    ModalAction::None
                }
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    m.input.clear();
                    ModalAction::None
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    m.input.insert_char(c);
                    ModalAction::None
                }
                _ => ModalAction::None,
            },
        }
    };

    match action {
        ModalAction::None => {}
        ModalAction::Close => {
            app.modal = None;
        }
        ModalAction::Cancel => {
            app.modal = None;
            app.session.note("cancelled");
        }
        ModalAction::Confirm => {
            if let Some(super::Modal {
                kind: super::ModalKind::Confirm { plan },
                ..
            }) = app.modal.take()
            {
                app.confirm(plan);
            }
        }
        ModalAction::SubmitText => {
            if let Some(modal) = app.modal.take()
                && let super::ModalKind::TextInput { purpose, .. } = modal.kind
            {
                app.submit_text(purpose, modal.input.buf);
            }
        }
    }
}
