use super::*;

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let hints = app.keys.continuations().collect::<Vec<_>>();
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Split::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(8),
            Constraint::Length(if hints.is_empty() {
                0
            } else {
                hints.len() as u16 + 2
            }),
            Constraint::Length(1),
        ])
        .split(area);
    let now = OffsetDateTime::now_utc();

    // Header
    let mut spans = vec![
        Span::styled("jjdag", Style::default().fg(Color::Black).bg(Color::White)),
        Span::raw("  "),
        Span::raw(app.repository.display().to_string()),
        Span::raw("  revset: "),
        Span::styled(
            app.session.revset().to_string(),
            Style::default().fg(Color::Cyan),
        ),
    ];
    let filter = app.session.selection().filter();
    if *filter != crate::selection::NodeFilter::All {
        spans.push(Span::raw("  filter: "));
        spans.push(Span::styled(filter.label(), Style::default().fg(Color::Yellow)));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    // Graph
    let rows = graph_rows(&app.session, now);
    let total = app.session.model().len();
    let title = if rows.lines.len() == total {
        format!("graph ({total})")
    } else {
        format!("graph ({}/{total} shown)", rows.lines.len())
    };
    let mut state = ListState::default();
    state.select(rows.cursor);
    let items = if rows.lines.is_empty() {
        vec![ListItem::new(if app.session.fetching() {
            "(loading...)"
        } else {
            "(no changesets)"
        })]
    } else {
        rows.lines.into_iter().map(ListItem::new).collect()
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, chunks[1], &mut state);

    // Details
    frame.render_widget(
        Paragraph::new(detail_lines(&app.session, now))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::TOP).title("details")),
        chunks[2],
    );

    // Pending key sequence
    if !hints.is_empty() {
        let lines = hints
            .iter()
            .map(|b| {
                Line::from(vec![
                    Span::styled(format!("{:<4}", b.keys), Style::default().fg(Color::Cyan)),
                    Span::raw(b.help),
                ])
            })
            .collect::<Vec<_>>();
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{}…", app.keys.pending())),
            ),
            chunks[3],
        );
    }

    frame.render_widget(Paragraph::new(status_line(app)), chunks[4]);

    if let Some(m) = &app.modal {
        modal::draw_modal(frame, m);
    }
}

fn status_line(app: &App) -> Line<'static> {
    let mut spans = Vec::new();
    if app.session.busy() {
        spans.push(Span::styled(
            "[running] ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if app.session.fetching() {
        spans.push(Span::styled("[fetching] ", Style::default().fg(Color::Gray)));
    }
    if app.session.ignore_immutable() {
        spans.push(Span::styled(
            "[ignore-immutable] ",
            Style::default().fg(Color::Red),
        ));
    }
    if app.pick.is_some() {
        spans.push(Span::styled("[pick] ", Style::default().fg(Color::Cyan)));
    }
    let selected = app.session.selection().selected().len();
    if selected > 0 {
        spans.push(Span::styled(
            format!("[{selected} selected] "),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(status) = app.session.status() {
        let style = match status.kind {
            StatusKind::Info => Style::default(),
            StatusKind::Error => Style::default().fg(Color::Red),
        };
        spans.push(Span::styled(status.message.clone(), style));
    }
    Line::from(spans)
}
