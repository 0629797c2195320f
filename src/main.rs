use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::sync::{Mutex, mpsc};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use brasileirao_terminal::error::FixtureError;
use brasileirao_terminal::format::{
    format_fraction, format_goal_diff, format_naive_date, format_number, format_percentage,
    format_timestamp, kickoff_label,
};
use brasileirao_terminal::league::{AppConfig, League};
use brasileirao_terminal::provider::spawn_provider;
use brasileirao_terminal::state::{
    AppState, Delta, LeagueStatus, ProviderCommand, Tab, apply_delta,
};
use brasileirao_terminal::tables::{
    BarLevel, FixtureRow, FormMark, LeagueView, ProbabilityRow, VenueRow,
};
use brasileirao_terminal::win_prob::{OutcomeDistribution, ProbabilitySource};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    reload_every: Duration,
    last_reload: HashMap<League, Instant>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, reload_every: Duration) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            reload_every,
            last_reload: HashMap::new(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::Char('t') => self.state.cycle_tab(),
            KeyCode::Char('1') => self.state.set_tab(Tab::Probabilities),
            KeyCode::Char('2') => self.state.set_tab(Tab::Standings),
            KeyCode::Char('3') => self.state.set_tab(Tab::Fixtures),
            KeyCode::Char('4') => self.state.set_tab(Tab::Stats),
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.state.toggle_league();
                if self.state.needs_load() {
                    self.request_load(true);
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_load(true),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_load(&mut self, announce: bool) {
        let league = self.state.league;
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Data loading unavailable");
            }
            return;
        };
        if tx.send(ProviderCommand::Load { league }).is_err() {
            if announce {
                self.state.push_log("[WARN] Load request failed");
            }
        } else {
            if announce {
                self.state
                    .push_log(format!("[INFO] {} load requested", league.label()));
            }
            self.last_reload.insert(league, Instant::now());
        }
    }

    fn maybe_reload(&mut self) {
        let due = self
            .last_reload
            .get(&self.state.league)
            .map(|t| t.elapsed() >= self.reload_every)
            .unwrap_or(true);
        if due {
            self.request_load(false);
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    // stdout belongs to the terminal UI; tracing goes to a file or nowhere.
    if let Some(path) = &config.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let reload_every = config.reload_every;
    spawn_provider(config, tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx), reload_every);
    let res = run_app(&mut terminal, &mut app, rx);

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

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_reload();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
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
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_body(frame, chunks[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Log").borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let tabs = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| {
            if *t == state.tab {
                format!("[{} {}]", i + 1, t.label())
            } else {
                format!(" {} {} ", i + 1, t.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let status = match state.status() {
        None => "idle".to_string(),
        Some(LeagueStatus::Loading) => "loading".to_string(),
        Some(LeagueStatus::Failed { .. }) => "unavailable".to_string(),
        Some(LeagueStatus::Loaded { view, loaded_at }) => match view.updated_at {
            Some(ts) => format!("updated {}", format_timestamp(ts)),
            None => {
                let local: DateTime<Local> = (*loaded_at).into();
                format!("loaded {}", local.format("%H:%M"))
            }
        },
    };
    let line1 = format!("  BRASILEIRÃO | {} | {}", state.league.label(), status);
    let line2 = format!("  {tabs}");
    format!("{line1}\n{line2}")
}

fn footer_text() -> &'static str {
    "1-4/Tab Tabs | l League | r Reload | j/k/↑/↓ Scroll | ? Help | q Quit"
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = match state.status() {
        None | Some(LeagueStatus::Loading) => {
            let p = Paragraph::new("Loading…").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(p, area);
            return;
        }
        Some(LeagueStatus::Failed { reason }) => {
            let p = Paragraph::new(format!(
                "Could not load {} data.\n{reason}\n\nPress r to retry.",
                state.league.label()
            ))
            .style(Style::default().fg(Color::Red));
            frame.render_widget(p, area);
            return;
        }
        Some(LeagueStatus::Loaded { view, .. }) => view,
    };

    match state.tab {
        Tab::Probabilities => render_probabilities(frame, area, view, state.scroll),
        Tab::Standings => render_standings(frame, area, view, state.scroll),
        Tab::Fixtures => render_fixtures(frame, area, view, state.scroll),
        Tab::Stats => render_stats(frame, area, view, state.scroll),
    }
}

fn render_probabilities(frame: &mut Frame, area: Rect, view: &LeagueView, scroll: u16) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let panels = [
        ("Title", &view.title),
        (view.qualification_label, &view.qualification),
        ("Relegation", &view.relegation),
    ];
    for (i, (title, rows)) in panels.into_iter().enumerate() {
        let p = Paragraph::new(probability_lines(rows))
            .block(Block::default().title(title).borders(Borders::ALL))
            .scroll((scroll, 0));
        frame.render_widget(p, cols[i]);
    }
}

fn probability_lines(rows: &[ProbabilityRow]) -> Vec<Line<'static>> {
    if rows.is_empty() {
        return vec![Line::styled("No data", Style::default().fg(Color::DarkGray))];
    }
    rows.iter()
        .map(|r| {
            let filled = ((r.pct / 10.0).round() as usize).min(10);
            let bar = format!("{}{}", "█".repeat(filled), "·".repeat(10 - filled));
            Line::from(vec![
                Span::raw(format!("{:>2} {:<18} ", r.position, truncate(&r.team, 18))),
                Span::styled(bar, Style::default().fg(level_color(r.level))),
                Span::raw(format!(" {:>6}", format_percentage(r.pct))),
            ])
        })
        .collect()
}

fn render_standings(frame: &mut Frame, area: Rect, view: &LeagueView, scroll: u16) {
    let mut lines = vec![Line::styled(
        format!(
            "{:>3}  {:<22} {:>4} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5}",
            "Pos", "Team", "Pts", "P", "W", "D", "L", "GF", "GA", "GD"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if view.standings.is_empty() {
        lines.push(Line::styled(
            "No standings available",
            Style::default().fg(Color::DarkGray),
        ));
    }
    for (i, s) in view.standings.iter().enumerate() {
        lines.push(Line::raw(format!(
            "{:>3}  {:<22} {:>4} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>5}",
            i + 1,
            truncate(&s.team, 22),
            s.points,
            s.played,
            s.wins,
            s.draws,
            s.losses,
            s.goals_for,
            s.goals_against,
            format_goal_diff(s.goal_diff)
        )));
    }
    let p = Paragraph::new(lines)
        .block(Block::default().title("Standings").borders(Borders::ALL))
        .scroll((scroll, 0));
    frame.render_widget(p, area);
}

fn render_fixtures(frame: &mut Frame, area: Rect, view: &LeagueView, scroll: u16) {
    let title = match view.next_round {
        Some(round) => format!("Round {round}"),
        None => "Upcoming fixtures".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = match &view.fixtures {
        Ok(rows) => rows,
        Err(FixtureError::NoFixtures) => {
            let empty = Paragraph::new("No upcoming fixtures")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, inner);
            return;
        }
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let widths = fixture_columns();
    render_fixture_header(frame, sections[0], &widths);

    let list_area = sections[1];
    if list_area.height == 0 {
        return;
    }
    let visible = list_area.height as usize;
    let max_start = rows.len().saturating_sub(visible);
    let start = (scroll as usize).min(max_start);
    let end = (start + visible).min(rows.len());

    for (i, row) in rows[start..end].iter().enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        render_fixture_row(frame, row_area, row, &widths);
    }
}

fn fixture_columns() -> [Constraint; 6] {
    [
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Min(28),
        Constraint::Length(12),
        Constraint::Length(22),
        Constraint::Length(4),
    ]
}

fn render_fixture_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Date", style);
    render_cell_text(frame, cols[1], "Time", style);
    render_cell_text(frame, cols[2], "Match", style);
    render_cell_text(frame, cols[3], "H/D/A", style);
    render_cell_text(frame, cols[4], "Home  Draw  Away", style);
    render_cell_text(frame, cols[5], "Src", style);
}

fn render_fixture_row(frame: &mut Frame, area: Rect, row: &FixtureRow, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);

    let dist = row.outcome.dist;
    let style = Style::default();
    let match_name = format!("{} vs {}", row.home_team, row.away_team);
    let pcts = format!(
        "{:>6} {:>6} {:>6}",
        format_fraction(dist.home),
        format_fraction(dist.draw),
        format_fraction(dist.away)
    );
    let src = match row.outcome.source {
        ProbabilitySource::Upstream => "sim",
        ProbabilitySource::Estimated => "est",
    };

    render_cell_text(frame, cols[0], &format_naive_date(row.date), style);
    render_cell_text(
        frame,
        cols[1],
        &kickoff_label(row.kickoff_time.as_deref()),
        style,
    );
    render_cell_text(frame, cols[2], &match_name, style);
    frame.render_widget(outcome_bar_chart(&dist), cols[3]);
    render_cell_text(frame, cols[4], &pcts, style);
    render_cell_text(frame, cols[5], src, Style::default().fg(Color::DarkGray));
}

fn outcome_bar_chart(dist: &OutcomeDistribution) -> BarChart<'static> {
    let bar = |p: f64, color: Color| {
        Bar::default()
            .value((p * 100.0).round() as u64)
            .text_value(String::new())
            .style(Style::default().fg(color))
    };

    BarChart::default()
        .data(BarGroup::default().bars(&[
            bar(dist.home, Color::Green),
            bar(dist.draw, Color::Yellow),
            bar(dist.away, Color::Red),
        ]))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
        .max(100)
}

fn render_stats(frame: &mut Frame, area: Rect, view: &LeagueView, scroll: u16) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    render_summary_cards(frame, rows[0], view);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let home_away = Paragraph::new(home_away_lines(view))
        .block(Block::default().title("Home / Away").borders(Borders::ALL))
        .scroll((scroll, 0));
    frame.render_widget(home_away, cols[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(cols[1]);

    let form = Paragraph::new(form_lines(view))
        .block(Block::default().title("Form (last 5)").borders(Borders::ALL))
        .scroll((scroll, 0));
    frame.render_widget(form, right[0]);

    let rounds = Paragraph::new(last_round_lines(view))
        .block(Block::default().title("Last rounds").borders(Borders::ALL))
        .scroll((scroll, 0));
    frame.render_widget(rounds, right[1]);
}

fn render_summary_cards(frame: &mut Frame, area: Rect, view: &LeagueView) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);
    let summary = view.summary.unwrap_or_default();
    let cards = [
        ("Total games", format_number(summary.total_games)),
        ("Avg goals", format!("{:.2}", summary.avg_goals)),
        ("Simulations", format_number(summary.simulations)),
    ];
    for (i, (title, value)) in cards.into_iter().enumerate() {
        let p = Paragraph::new(value)
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(p, cols[i]);
    }
}

fn home_away_lines(view: &LeagueView) -> Vec<Line<'static>> {
    if view.home_away.is_empty() {
        return vec![Line::styled("No data", Style::default().fg(Color::DarkGray))];
    }
    let mut lines = vec![Line::styled(
        format!(
            "{:<18} {:^25} {:^25}",
            "Team", "Home P W D L Pts %", "Away P W D L Pts %"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for row in &view.home_away {
        let mut spans = vec![Span::raw(format!("{:<18} ", truncate(&row.team, 18)))];
        spans.extend(venue_spans(&row.home));
        spans.push(Span::raw("  "));
        spans.extend(venue_spans(&row.away));
        lines.push(Line::from(spans));
    }
    lines
}

fn venue_spans(v: &VenueRow) -> Vec<Span<'static>> {
    let color = if v.low_efficiency {
        Color::Red
    } else {
        Color::Green
    };
    vec![
        Span::raw(format!(
            "{:>3}{:>3}{:>3}{:>3}{:>4} ",
            v.played, v.wins, v.draws, v.losses, v.points
        )),
        Span::styled(
            format!("{:>6}", format_percentage(v.efficiency)),
            Style::default().fg(color),
        ),
    ]
}

fn form_lines(view: &LeagueView) -> Vec<Line<'static>> {
    if view.form.is_empty() {
        return vec![Line::styled("No data", Style::default().fg(Color::DarkGray))];
    }
    view.form
        .iter()
        .map(|f| {
            let mut spans = vec![Span::raw(format!("{:<18} ", truncate(&f.team, 18)))];
            if f.marks.is_empty() {
                spans.push(Span::styled("-", Style::default().fg(Color::DarkGray)));
            }
            for mark in &f.marks {
                let color = match mark {
                    FormMark::Win => Color::Green,
                    FormMark::Draw => Color::Yellow,
                    FormMark::Loss => Color::Red,
                };
                spans.push(Span::styled(
                    format!("{} ", mark.letter()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
            }
            Line::from(spans)
        })
        .collect()
}

fn last_round_lines(view: &LeagueView) -> Vec<Line<'static>> {
    if view.last_rounds.is_empty() {
        return vec![Line::styled("No data", Style::default().fg(Color::DarkGray))];
    }
    let mut lines = Vec::new();
    for (label, results) in &view.last_rounds {
        lines.push(Line::styled(
            label.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for r in results {
            let score = |s: Option<u32>| s.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
            lines.push(Line::raw(format!(
                "  {} {} x {} {}",
                r.home_team,
                score(r.home_score),
                score(r.away_score),
                r.away_team
            )));
        }
    }
    lines
}

fn level_color(level: BarLevel) -> Color {
    match level {
        BarLevel::High => Color::Green,
        BarLevel::Medium => Color::Yellow,
        BarLevel::Low => Color::Red,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, text_area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Brasileirão Terminal - Help",
        "",
        "  1-4 / Tab    Switch tab",
        "  l            Toggle Série A / Série B",
        "  r            Reload league data",
        "  j/k or ↑/↓   Scroll",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Fixtures:",
        "  sim          Probabilities from the simulation",
        "  est          Tier-based estimate (no simulated odds)",
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
