use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Gauge;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Tabs;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::AuthState;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::TaskDraft;
use crate::domain::models::TaskFilter;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

fn render_signin<B: Backend>(frame: &mut Frame<B>, app_state: &AppState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Percentage(40),
            Constraint::Min(6),
            Constraint::Percentage(40),
        ])
        .split(frame.size());

    let mut lines = vec![
        Line::from(Span::styled(
            "chores",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match app_state.auth_state {
        AuthState::Unknown => {
            lines.push(Line::from("Restoring session..."));
        }
        AuthState::Authenticating => {
            if let Some(prompt) = &app_state.login_prompt {
                lines.push(Line::from(format!(
                    "Open {url} in a browser",
                    url = prompt.verification_url
                )));
                lines.push(Line::from(Span::styled(
                    format!("and enter the code {code}", code = prompt.user_code),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from("Contacting Google..."));
            }

            if let Some(profile) = &app_state.login_preview {
                lines.push(Line::from(format!(
                    "Verifying {email}...",
                    email = profile.email
                )));
            }
        }
        _ => {
            lines.push(Line::from("Press Enter to sign in with Google"));
        }
    }

    if let Some(error) = &app_state.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        layout[1],
    );
}

fn render_header<B: Backend>(frame: &mut Frame<B>, app_state: &AppState, rect: Rect) {
    let mut spans = vec![Span::styled(
        "chores",
        Style::default().add_modifier(Modifier::BOLD),
    )];

    if let Some(profile) = &app_state.profile {
        spans.push(Span::raw(format!(
            "  {name} <{email}>",
            name = profile.name,
            email = profile.email
        )));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), rect);
}

fn render_filter_tabs<B: Backend>(frame: &mut Frame<B>, app_state: &AppState, rect: Rect) {
    let counts = app_state.counts();
    let titles = vec![
        format!("All ({})", counts.total),
        format!("Active ({})", counts.active),
        format!("Completed ({})", counts.completed),
    ];

    let selected = match app_state.filter {
        TaskFilter::All => 0,
        TaskFilter::Active => 1,
        TaskFilter::Completed => 2,
    };

    frame.render_widget(
        Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED)),
        rect,
    );
}

fn render_list<B: Backend>(frame: &mut Frame<B>, app_state: &AppState, rect: Rect) {
    let visible = app_state.visible();
    if visible.is_empty() {
        frame.render_widget(
            Paragraph::new(app_state.filter.empty_hint())
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::DIM)),
            rect,
        );
        return;
    }

    let items = visible
        .iter()
        .map(|task| {
            let checkbox = if task.completed { "[x]" } else { "[ ]" };
            let mut style = Style::default();
            if task.completed {
                style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
            }

            return ListItem::new(Line::from(vec![
                Span::raw(format!("{checkbox} ")),
                Span::styled(task.title.to_string(), style),
            ]));
        })
        .collect::<Vec<ListItem>>();

    let mut state = ListState::default();
    state.select(Some(app_state.selected));

    frame.render_stateful_widget(
        List::new(items)
            .highlight_symbol("> ")
            .highlight_style(Style::default().add_modifier(Modifier::BOLD)),
        rect,
        &mut state,
    );
}

fn render_progress<B: Backend>(frame: &mut Frame<B>, app_state: &AppState, rect: Rect) {
    let counts = app_state.counts();
    if counts.total == 0 {
        return;
    }

    frame.render_widget(
        Gauge::default()
            .ratio(counts.progress())
            .label(format!("{}/{} done", counts.completed, counts.total))
            .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray)),
        rect,
    );
}

fn render_status<B: Backend>(frame: &mut Frame<B>, app_state: &AppState, rect: Rect) {
    if let Some(error) = &app_state.error {
        frame.render_widget(
            Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red)),
            rect,
        );
        return;
    }

    frame.render_widget(
        Paragraph::new(
            "Enter: add  Tab: filter  ^T: toggle  ^X: delete  ^R: refresh  ^O: sign out  ^C: quit",
        )
        .style(Style::default().add_modifier(Modifier::DIM)),
        rect,
    );
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    events: &mut EventsService,
    tx: mpsc::UnboundedSender<Action>,
) -> Result<()> {
    let mut textarea = TextArea::default();
    let loading = Loading::default();

    #[cfg(feature = "dev")]
    {
        use tui_textarea::Input;
        use tui_textarea::Key;
        for char in "Walk the dog".chars() {
            textarea.input(Input {
                key: Key::Char(char),
                ctrl: false,
                alt: false,
            });
        }
    }

    loop {
        terminal.draw(|frame| {
            if app_state.auth_state != AuthState::Authenticated {
                render_signin(frame, app_state);
                return;
            }

            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(1),
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .split(frame.size());

            render_header(frame, app_state, layout[0]);
            if app_state.syncing {
                loading.render(frame, layout[1], "Syncing with the task server...");
            } else {
                frame.render_widget(textarea.widget(), layout[1]);
            }
            render_filter_tabs(frame, app_state, layout[2]);
            render_list(frame, app_state, layout[3]);
            render_progress(frame, app_state, layout[4]);
            render_status(frame, app_state, layout[5]);
        })?;

        match events.next().await? {
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardEnter() => {
                if app_state.auth_state == AuthState::Unauthenticated {
                    tx.send(Action::BeginLogin())?;
                    continue;
                }
                if app_state.auth_state != AuthState::Authenticated || app_state.syncing {
                    continue;
                }

                let input_str = textarea.lines().join("\n");
                textarea = TextArea::default();

                // Whitespace-only input resets the field without touching the
                // server.
                if TaskDraft::from_input(&input_str).is_none() {
                    continue;
                }

                app_state.syncing = true;
                tx.send(Action::CreateTask(input_str))?;
            }
            Event::KeyboardCharInput(input) => {
                if app_state.auth_state == AuthState::Authenticated {
                    textarea.input(input);
                }
            }
            Event::KeyboardPaste(text) => {
                if app_state.auth_state == AuthState::Authenticated {
                    textarea.insert_str(&text.replace('\n', " "));
                }
            }
            Event::SelectionUp() => {
                app_state.select_up();
            }
            Event::SelectionDown() => {
                app_state.select_down();
            }
            Event::FilterNext() => {
                app_state.next_filter();
            }
            Event::ToggleSelected() => {
                if app_state.syncing {
                    continue;
                }
                if let Some(task) = app_state.selected_task() {
                    app_state.syncing = true;
                    tx.send(Action::ToggleTask(task))?;
                }
            }
            Event::DeleteSelected() => {
                if app_state.syncing {
                    continue;
                }
                if let Some(task) = app_state.selected_task() {
                    app_state.syncing = true;
                    tx.send(Action::RemoveTask(task.id))?;
                }
            }
            Event::RefreshRequested() => {
                if app_state.auth_state == AuthState::Authenticated && !app_state.syncing {
                    app_state.syncing = true;
                    tx.send(Action::RefreshTasks())?;
                }
            }
            Event::SignOutRequested() => {
                if app_state.auth_state == AuthState::Authenticated {
                    tx.send(Action::Logout())?;
                }
            }
            Event::UIResize() | Event::UITick() => {}
            event => {
                app_state.handle_worker_event(event);
            }
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    disable_raw_mode().unwrap();
    crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture).unwrap();
    crossterm::execute!(io::stdout(), cursor::Show).unwrap();
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let mut app_state = AppState::default();
    let mut events = EventsService::new(rx);

    start_loop(&mut terminal, &mut app_state, &mut events, tx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
