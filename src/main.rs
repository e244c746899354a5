use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points, Rectangle};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use tracing::{error, info};

use match_narrator::config::ReportConfig;
use match_narrator::fetch::SofascoreSource;
use match_narrator::http_client::http_client;
use match_narrator::logging;
use match_narrator::narrative::OllamaGenerator;
use match_narrator::present;
use match_narrator::report::{MatchReport, ReportStage, build_report_with_progress};
use match_narrator::state::{AppState, Screen};
use match_narrator::stats::{ShotOutcome, Side};

struct App {
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new(report: MatchReport) -> Self {
        let mut state = AppState::new(report);
        state.push_log(format!("[INFO] Report ready for {}", state.report.id));
        state.push_log(format!(
            "[INFO] Prompt {} bytes, narrative {} chars",
            state.report.prompt.len(),
            state.report.narrative.as_str().chars().count()
        ));
        if let Some(path) = logging::log_file_path() {
            state.push_log(format!("[INFO] Log file {}", path.display()));
        }
        Self {
            state,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(ch @ '1'..='5') => {
                if let Some(screen) = Screen::from_digit(ch) {
                    self.state.set_screen(screen);
                }
            }
            KeyCode::Tab => self.state.next_screen(),
            KeyCode::Char('h') => {
                self.state.cycle_period();
                let label = self.state.period_label();
                self.state.push_log(format!("[INFO] Team stats: {label}"));
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let _log_guard = logging::init_logging();

    let config = ReportConfig::from_process()?;
    info!(match_id = %config.match_id, model = %config.endpoint.model, "starting report");

    let client = http_client()?;
    let source = SofascoreSource::new(client.clone(), config.api_base.clone());
    let generator = OllamaGenerator::new(client, config.endpoint.clone());

    let progress = |stage: ReportStage| match stage {
        ReportStage::Fetching => eprintln!("{} for {} ...", stage.label(), config.match_id),
        ReportStage::Generating => eprintln!(
            "{} with {} at {} (this can take a while) ...",
            stage.label(),
            config.endpoint.model,
            config.endpoint.url
        ),
        ReportStage::Normalizing | ReportStage::BuildingPrompt => {
            eprintln!("{} ...", stage.label())
        }
    };
    let report = match build_report_with_progress(
        &source,
        &generator,
        &config.match_id,
        &config.limits,
        progress,
    ) {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "report failed");
            return Err(err.into());
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(report);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Overview => render_overview(frame, chunks[1], &app.state),
        Screen::Players => render_players(frame, chunks[1], &app.state),
        Screen::Shots => render_shots(frame, chunks[1], &app.state),
        Screen::Momentum => render_momentum(frame, chunks[1], &app.state),
        Screen::Prompt => render_prompt(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "1 Overview | 2 Players | 3 Shots | 4 Momentum | 5 Prompt | Tab Next | h Half | j/k Scroll | ? Help | q Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let tabs = Screen::ALL
        .iter()
        .map(|s| {
            if *s == state.screen {
                format!("[{}]", s.label())
            } else {
                s.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let line1 = format!("  .-.  MATCH NARRATOR | {tabs}");
    let line2 = format!(" /___\\ {}", present::title_line(&state.report.stats));
    format!("{line1}\n{line2}")
}

fn render_overview(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(48), Constraint::Min(30)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(16), Constraint::Min(1)])
        .split(columns[0]);

    let stats = &state.report.stats;
    let header = Row::new(vec![
        Cell::from("Stat"),
        Cell::from(stats.home.name.clone()),
        Cell::from(stats.away.name.clone()),
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let stat_rows = match state.selected_period() {
        Some(period) => present::period_stat_rows(period),
        None => present::team_stat_rows(stats),
    };
    let rows = stat_rows
        .into_iter()
        .map(|[label, home, away]| Row::new(vec![Cell::from(label), Cell::from(home), Cell::from(away)]));
    let table = Table::new(
        rows,
        [Constraint::Length(16), Constraint::Length(14), Constraint::Length(14)],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!("Team Stats: {} (* = default, h = half)", state.period_label()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, left[0]);

    let derived = Paragraph::new(present::derived_lines(stats).join("\n"))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Derived").borders(Borders::ALL));
    frame.render_widget(derived, left[1]);

    let narrative = Paragraph::new(state.report.narrative.as_str())
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0))
        .block(Block::default().title("Generated Report").borders(Borders::ALL));
    frame.render_widget(narrative, columns[1]);
}

fn render_players(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (side, col) in [(Side::Home, cols[0]), (Side::Away, cols[1])] {
        let team = state.report.stats.team(side);
        let paragraph = Paragraph::new(present::players_text(team))
            .scroll((state.scroll, 0))
            .block(Block::default().title(team.name.clone()).borders(Borders::ALL));
        frame.render_widget(paragraph, col);
    }
}

fn render_shots(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let stats = &state.report.stats;
    let home_pts = shot_points(state, Side::Home, false);
    let home_goals = shot_points(state, Side::Home, true);
    let away_pts = shot_points(state, Side::Away, false);
    let away_goals = shot_points(state, Side::Away, true);
    let title = format!(
        "Shot Map ({} attacks right, {} attacks left)",
        stats.home.name, stats.away.name
    );

    let canvas = Canvas::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(move |ctx| {
            ctx.draw(&Rectangle {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 100.0,
                color: Color::DarkGray,
            });
            ctx.draw(&CanvasLine {
                x1: 50.0,
                y1: 0.0,
                x2: 50.0,
                y2: 100.0,
                color: Color::DarkGray,
            });
            ctx.draw(&Circle {
                x: 50.0,
                y: 50.0,
                radius: 9.0,
                color: Color::DarkGray,
            });
            ctx.draw(&Rectangle {
                x: 0.0,
                y: 21.0,
                width: 16.0,
                height: 58.0,
                color: Color::DarkGray,
            });
            ctx.draw(&Rectangle {
                x: 84.0,
                y: 21.0,
                width: 16.0,
                height: 58.0,
                color: Color::DarkGray,
            });
            ctx.draw(&Points {
                coords: &home_pts,
                color: Color::Green,
            });
            ctx.draw(&Points {
                coords: &away_pts,
                color: Color::Red,
            });
            ctx.draw(&Points {
                coords: &home_goals,
                color: Color::LightGreen,
            });
            ctx.draw(&Points {
                coords: &away_goals,
                color: Color::LightRed,
            });
        });
    frame.render_widget(canvas, cols[0]);

    let lines = present::shot_lines(stats);
    let text = if lines.is_empty() {
        "No shot data".to_string()
    } else {
        lines.join("\n")
    };
    let list = Paragraph::new(text)
        .scroll((state.scroll, 0))
        .block(Block::default().title("Shots").borders(Borders::ALL));
    frame.render_widget(list, cols[1]);
}

// Home attacks the right-hand goal, away the left.
fn shot_points(state: &AppState, side: Side, goals: bool) -> Vec<(f64, f64)> {
    state
        .report
        .stats
        .shots
        .iter()
        .filter(|s| s.side == side && s.located)
        .filter(|s| (s.outcome == ShotOutcome::Goal) == goals)
        .map(|s| match side {
            Side::Home => (100.0 - s.x, s.y),
            Side::Away => (s.x, 100.0 - s.y),
        })
        .collect()
}

fn render_momentum(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let stats = &state.report.stats;
    let block = Block::default()
        .title(format!(
            "Momentum ({} green, {} red)",
            stats.home.name, stats.away.name
        ))
        .borders(Borders::ALL);

    if stats.momentum.is_empty() {
        let empty = Paragraph::new("No momentum data")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, rows[0]);
    } else {
        let inner_width = rows[0].width.saturating_sub(2) as usize;
        let start = (state.scroll as usize).min(stats.momentum.len().saturating_sub(1));
        let bars: Vec<Bar> = stats
            .momentum
            .iter()
            .skip(start)
            .take(inner_width.max(1))
            .map(|p| {
                let color = if p.value >= 0.0 { Color::Green } else { Color::Red };
                Bar::default()
                    .value(p.value.abs().round() as u64)
                    .text_value(String::new())
                    .style(Style::default().fg(color))
            })
            .collect();
        let chart = BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(1)
            .bar_gap(0)
            .group_gap(0)
            .max(100);
        frame.render_widget(chart, rows[0]);
    }

    let summary = Paragraph::new(present::momentum_summary(stats));
    frame.render_widget(summary, rows[1]);
}

fn render_prompt(frame: &mut Frame, area: Rect, state: &AppState) {
    let prompt = Paragraph::new(state.report.prompt.as_str())
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0))
        .block(
            Block::default()
                .title(format!("Prompt sent to model ({} bytes)", state.report.prompt.len()))
                .borders(Borders::ALL),
        );
    frame.render_widget(prompt, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Match Narrator - Help",
        "",
        "  1            Overview (team stats + report)",
        "  2            Players by position",
        "  3            Shot map",
        "  4            Momentum",
        "  5            Prompt sent to the model",
        "  Tab          Next screen",
        "  h            Team stats: full match / each half",
        "  j/k or ↑/↓   Scroll",
        "  ? / Esc      Toggle / close help",
        "  q            Quit",
        "",
        "Values marked * were missing from the source.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
