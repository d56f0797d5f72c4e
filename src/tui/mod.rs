//! TUI module - Terminal dashboard with ratatui

use anyhow::Result;
use chrono::{Datelike, Local, Weekday};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};
use tracing::warn;

use crate::calendar::DayCell;
use crate::dates::{parse_date, weekday_abbr};
use crate::db::{KeyValueStore, Measurement};
use crate::exercises::builtin_body_parts;
use crate::session::Session;
use crate::settings::Settings;
use crate::stats::DEFAULT_PROGRESS_LIMIT;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Calendar columns
const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Colours derived from the dark-mode flag
struct Theme {
    text: Color,
    muted: Color,
    accent: Color,
    background: Color,
}

impl Theme {
    fn from_settings(settings: &Settings) -> Self {
        if settings.dark_mode {
            Self {
                text: Color::White,
                muted: Color::Gray,
                accent: Color::LightBlue,
                background: Color::Black,
            }
        } else {
            Self {
                text: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                background: Color::White,
            }
        }
    }
}

/// App state for TUI
pub struct App<S: KeyValueStore> {
    session: Session<S>,
    settings: Settings,
    body_parts: Vec<&'static str>,
    body_part_idx: usize,
    notice: Option<String>,
    /// Workout id waiting for a second `x`
    pending_delete: Option<String>,
    should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(session: Session<S>, settings: Settings) -> Self {
        Self {
            session,
            settings,
            body_parts: builtin_body_parts().collect(),
            body_part_idx: 0,
            notice: None,
            pending_delete: None,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn body_part(&self) -> &'static str {
        self.body_parts.get(self.body_part_idx).copied().unwrap_or("Chest")
    }

    fn render(&self, frame: &mut Frame) {
        let theme = Theme::from_settings(&self.settings);
        let today = Local::now().date_naive();
        let base = Style::default().fg(theme.text).bg(theme.background);

        frame.render_widget(Block::default().style(base), frame.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(9),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(frame.area());

        // Header
        let header = Paragraph::new(format!(
            "liftlog - {} | {}",
            self.settings.greeting(),
            self.session.month().label()
        ))
        .style(Style::default().fg(theme.accent).bold())
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        let grid = self.session.month_grid(today);
        frame.render_widget(calendar_table(&grid, &theme), chunks[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);
        frame.render_widget(self.day_table(&theme), body[0]);
        frame.render_widget(self.progress_chart(&theme), body[1]);

        // Footer
        let footer_text = match &self.notice {
            Some(notice) => notice.clone(),
            None => "q: quit | ←/→: day | [/]: month | t: today | b: body part | x x: delete | d: dark mode"
                .to_string(),
        };
        let footer_color = if self.notice.is_some() { Color::Red } else { theme.muted };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(footer_color))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn day_table(&self, theme: &Theme) -> Table<'static> {
        let selected = self.session.selected_date().to_string();
        let rows: Vec<Row> = self
            .session
            .workouts_on(&selected)
            .into_iter()
            .map(|w| {
                let value = match w.measurement() {
                    Measurement::Weight(kg) => self.settings.format_weight(kg),
                    Measurement::Duration(min) => format!("{} min", min),
                    Measurement::Unmeasured => "-".to_string(),
                };
                Row::new(vec![
                    Cell::from(w.timestamp.clone()),
                    Cell::from(w.body_part.clone()),
                    Cell::from(w.exercise_name.clone()),
                    Cell::from(value),
                ])
            })
            .collect();

        let title = match parse_date(&selected) {
            Some(date) => format!("Workouts for {}", date.format("%B %-d, %Y")),
            None => "Workouts".to_string(),
        };

        Table::new(
            rows,
            [
                Constraint::Length(9),
                Constraint::Length(10),
                Constraint::Min(14),
                Constraint::Length(10),
            ],
        )
        .header(Row::new(vec!["Time", "Body Part", "Exercise", "Value"]).style(Style::default().bold()))
        .style(Style::default().fg(theme.text))
        .block(Block::default().borders(Borders::ALL).title(title))
    }

    fn progress_chart(&self, theme: &Theme) -> BarChart<'static> {
        let body_part = self.body_part();
        let series = self.session.progress(body_part, DEFAULT_PROGRESS_LIMIT);

        let bars: Vec<Bar> = series
            .points()
            .map(|(date, value)| {
                // Label with day of month, the full date doesn't fit under a bar
                let label = parse_date(date)
                    .map(|d| format!("{}/{}", d.month(), d.day()))
                    .unwrap_or_default();
                Bar::default()
                    .value(value.round().max(0.0) as u64)
                    .text_value(format!("{}", value))
                    .label(Line::from(label))
            })
            .collect();

        BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Progress - {}", body_part)),
            )
            .data(BarGroup::default().bars(&bars))
            .bar_width(5)
            .bar_gap(1)
            .bar_style(Style::default().fg(theme.accent))
            .value_style(Style::default().fg(theme.background).bg(theme.accent))
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.on_key(key.code);
        }
        Ok(())
    }

    fn on_key(&mut self, code: KeyCode) {
        self.notice = None;
        // Any key other than a second `x` cancels a pending delete
        let pending = self.pending_delete.take();
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left => self.session.select_relative_day(-1),
            KeyCode::Right => self.session.select_relative_day(1),
            KeyCode::Char('[') => self.session.previous_month(),
            KeyCode::Char(']') => self.session.next_month(),
            KeyCode::Char('t') => self.session.select_date(Local::now().date_naive()),
            KeyCode::Char('b') => {
                self.body_part_idx = (self.body_part_idx + 1) % self.body_parts.len().max(1);
            }
            KeyCode::Char('x') => match pending {
                Some(id) => self.delete_workout(&id),
                None => self.confirm_delete(),
            },
            KeyCode::Char('d') => {
                if let Err(e) = self.settings.toggle_dark_mode(self.session.store()) {
                    warn!("Failed to save theme preference: {}", e);
                    self.notice = Some(format!("Theme not saved: {}", e));
                }
            }
            _ => {}
        }
    }

    /// Arm deletion of the selected day's first workout
    fn confirm_delete(&mut self) {
        let selected = self.session.selected_date().to_string();
        let Some(w) = self.session.workouts_on(&selected).first().copied() else {
            return;
        };
        self.notice = Some(format!(
            "Delete {} - {}? Press x again to confirm, any other key cancels",
            w.body_part, w.exercise_name
        ));
        self.pending_delete = Some(w.id.clone());
    }

    fn delete_workout(&mut self, id: &str) {
        match self.session.delete_workout(id) {
            Ok(outcome) => self.notice = outcome.notice(),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }
}

/// Month as week rows, Sunday first
fn calendar_table(grid: &[DayCell], theme: &Theme) -> Table<'static> {
    let leading = grid
        .first()
        .map(|c| c.weekday.num_days_from_sunday() as usize)
        .unwrap_or(0);

    let mut cells: Vec<Cell> = (0..leading).map(|_| Cell::from("")).collect();
    cells.extend(grid.iter().map(|c| {
        let mut style = Style::default().fg(theme.text);
        if c.has_entry {
            style = style.fg(theme.accent).bold();
        }
        if c.is_today {
            style = style.underlined();
        }
        if c.is_selected {
            style = style.reversed();
        }
        let marker = if c.has_entry { "•" } else { " " };
        Cell::from(format!("{:>2}{}", c.day, marker)).style(style)
    }));

    let rows: Vec<Row> = cells
        .chunks(7)
        .map(|week| Row::new(week.to_vec()))
        .collect();

    let header = Row::new(WEEK.iter().map(|d| Cell::from(weekday_abbr(*d))).collect::<Vec<_>>())
        .style(Style::default().fg(theme.muted));

    Table::new(rows, [Constraint::Length(4); 7])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Calendar"))
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
