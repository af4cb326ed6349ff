//! `shelfwatch dash` — interactive inventory dashboard.
//!
//! Metric cards, a status-composition bar chart, and a sortable SKU table
//! over one analysis pass. The raw load sits behind the engine's TTL
//! cache; scope and filter changes recompute from the cached tables, and a
//! stale cache reloads on the next tick.

pub mod data;

use std::io::stdout;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use shelfwatch_engine::config::AnalysisConfig;
use shelfwatch_engine::model::{AnalysisResult, Scope, StockStatus};
use shelfwatch_engine::source::{build_input, load_sources, TableCache};
use shelfwatch_engine::ViewFilter;

use crate::exit_codes::analysis_exit_code;
use crate::{report, util, CliError};

const EXPORT_FILE: &str = "shelfwatch_export.csv";

fn status_color(status: StockStatus) -> Color {
    match status {
        StockStatus::Critical => Color::Red,
        StockStatus::NeedReorder => Color::Yellow,
        StockStatus::Healthy => Color::Green,
        StockStatus::GoodBuffer => Color::Cyan,
        StockStatus::Overstock => Color::Magenta,
        StockStatus::NewDeadStock => Color::DarkGray,
    }
}

fn status_short(status: StockStatus) -> &'static str {
    match status {
        StockStatus::Critical => "Crit",
        StockStatus::NeedReorder => "Reorder",
        StockStatus::Healthy => "Healthy",
        StockStatus::GoodBuffer => "Buffer",
        StockStatus::Overstock => "Over",
        StockStatus::NewDeadStock => "Dead",
    }
}

/// One rendered pass: the (filtered, sorted) result plus its table shape.
struct DashView {
    result: AnalysisResult,
    table: data::DashTable,
}

struct DashApp {
    config: AnalysisConfig,
    base_dir: PathBuf,
    cache: TableCache,
    ttl: Duration,
    loaded_at: Instant,

    /// All-stores first, then every known store name.
    scopes: Vec<Scope>,
    scope_idx: usize,
    status_filter: Option<StockStatus>,
    sort: data::SortKey,

    /// A failed render (e.g. no sales in scope) keeps the app alive.
    view: Result<DashView, String>,

    cursor_row: usize,
    scroll_row: usize,
    should_quit: bool,
    show_help: bool,
    notice: Option<String>,
}

impl DashApp {
    fn new(config: AnalysisConfig, base_dir: PathBuf, initial_store: Option<String>) -> Self {
        let ttl = Duration::from_secs(config.cache.ttl_secs);
        let mut app = Self {
            cache: TableCache::new(ttl),
            ttl,
            loaded_at: Instant::now(),
            config,
            base_dir,
            scopes: vec![Scope::AllStores],
            scope_idx: 0,
            status_filter: None,
            sort: data::SortKey::Urgency,
            view: Err("loading".into()),
            cursor_row: 0,
            scroll_row: 0,
            should_quit: false,
            show_help: false,
            notice: None,
        };
        app.refresh(false);
        if let Some(store) = initial_store {
            let wanted = Scope::Store(store);
            if let Some(idx) = app.scopes.iter().position(|s| *s == wanted) {
                app.scope_idx = idx;
                app.refresh(false);
            }
        }
        app
    }

    /// Recompute the view. `reload` drops the cached raw tables first;
    /// otherwise the TTL decides whether the sources are re-read.
    fn refresh(&mut self, reload: bool) {
        if reload {
            self.cache.invalidate();
        }

        let config = &self.config;
        let base_dir = &self.base_dir;
        let scope = self.scopes[self.scope_idx].clone();

        let view = (|| {
            let tables = self
                .cache
                .get_or_load(|| load_sources(config, base_dir).map(|(t, _)| t))?;
            let (input, _) = build_input(&tables)?;

            // Scope list follows the data, not the config
            let mut scopes = vec![Scope::AllStores];
            scopes.extend(
                shelfwatch_engine::engine::store_names(&input)
                    .into_iter()
                    .map(Scope::Store),
            );
            self.scopes = scopes;
            if self.scope_idx >= self.scopes.len() {
                self.scope_idx = 0;
            }

            let mut result = shelfwatch_engine::run(config, &input, &scope)?;
            if let Some(status) = self.status_filter {
                let filter = ViewFilter {
                    statuses: vec![status],
                    ..Default::default()
                };
                result.records = filter.apply(&result.records);
            }
            data::sort_records(&mut result.records, self.sort);
            let table = data::build_table(&result.records);
            Ok::<_, shelfwatch_engine::AnalysisError>(DashView { result, table })
        })();

        self.view = view.map_err(|e| e.to_string());
        self.loaded_at = Instant::now();

        let num_rows = self.num_rows();
        if self.cursor_row >= num_rows {
            self.cursor_row = num_rows.saturating_sub(1);
        }
        self.scroll_row = self.scroll_row.min(self.cursor_row);
    }

    fn num_rows(&self) -> usize {
        self.view.as_ref().map(|v| v.table.rows.len()).unwrap_or(0)
    }

    fn next_scope(&mut self, back: bool) {
        let len = self.scopes.len();
        if len < 2 {
            return;
        }
        self.scope_idx = if back {
            (self.scope_idx + len - 1) % len
        } else {
            (self.scope_idx + 1) % len
        };
        self.cursor_row = 0;
        self.scroll_row = 0;
        self.refresh(false);
    }

    fn cycle_status_filter(&mut self) {
        self.status_filter = match self.status_filter {
            None => Some(StockStatus::ALL[0]),
            Some(current) => StockStatus::ALL
                .iter()
                .position(|s| *s == current)
                .and_then(|i| StockStatus::ALL.get(i + 1))
                .copied(),
        };
        self.cursor_row = 0;
        self.scroll_row = 0;
        self.refresh(false);
    }

    fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.refresh(false);
    }

    fn export_csv(&mut self) {
        let Ok(view) = &self.view else {
            return;
        };
        let scope_label = self.scopes[self.scope_idx].label().to_string();
        match report::render_csv(&view.result.records, &scope_label) {
            Ok(csv_str) => match std::fs::write(EXPORT_FILE, csv_str) {
                Ok(()) => self.notice = Some(format!("wrote {EXPORT_FILE}")),
                Err(e) => self.notice = Some(format!("export failed: {e}")),
            },
            Err(e) => self.notice = Some(format!("export failed: {}", e.message)),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        self.notice = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.next_scope(key.modifiers.contains(KeyModifiers::SHIFT)),
            KeyCode::BackTab => self.next_scope(true),
            KeyCode::Char('s') => self.cycle_status_filter(),
            KeyCode::Char('o') => self.cycle_sort(),
            KeyCode::Char('r') => self.refresh(true),
            KeyCode::Char('e') => self.export_csv(),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-20),
            KeyCode::PageDown => self.move_cursor(20),
            KeyCode::Home | KeyCode::Char('g') => self.cursor_row = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.cursor_row = self.num_rows().saturating_sub(1);
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: i32) {
        let num_rows = self.num_rows();
        if num_rows == 0 {
            return;
        }
        self.cursor_row = (self.cursor_row as i32 + delta)
            .max(0)
            .min(num_rows as i32 - 1) as usize;
    }

    fn ensure_visible(&mut self, visible_rows: usize) {
        if self.cursor_row < self.scroll_row {
            self.scroll_row = self.cursor_row;
        }
        if visible_rows > 0 && self.cursor_row >= self.scroll_row + visible_rows {
            self.scroll_row = self.cursor_row - visible_rows + 1;
        }
    }

    // -- drawing ------------------------------------------------------------

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(2), // metric cards
            Constraint::Length(6), // status bar chart
            Constraint::Min(3),    // SKU table
            Constraint::Length(1), // status line
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_cards(frame, chunks[1]);
        self.draw_chart(frame, chunks[2]);
        self.draw_table(frame, chunks[3]);
        self.draw_status(frame, chunks[4]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let scope = self.scopes[self.scope_idx].label();
        let title = format!(" shelfwatch: {} | {} ", self.config.name, scope);
        let para = Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_cards(&self, frame: &mut Frame, area: Rect) {
        let lines = match &self.view {
            Ok(view) => {
                let s = &view.result.summary;
                let m = &view.result.meta;
                vec![
                    Line::from(vec![
                        Span::styled(" SKUs ", Style::default().fg(Color::DarkGray)),
                        Span::styled(
                            format!("{}", s.active_skus),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled("   units ", Style::default().fg(Color::DarkGray)),
                        Span::styled(
                            format!("{}", s.total_stock_qty),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled("   value ", Style::default().fg(Color::DarkGray)),
                        Span::styled(
                            format!("{:.0}", s.total_stock_value),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled("   healthy ", Style::default().fg(Color::DarkGray)),
                        Span::styled(
                            format!("{:.1}%", s.healthy_ratio_pct),
                            Style::default()
                                .fg(Color::Green)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!(
                            " window {} .. {}   last sale {}",
                            m.window_start, m.reference_date, s.last_sales_date
                        ),
                        Style::default().fg(Color::DarkGray),
                    )),
                ]
            }
            Err(msg) => vec![
                Line::from(Span::styled(
                    format!(" {msg}"),
                    Style::default().fg(Color::Red),
                )),
                Line::default(),
            ],
        };
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect) {
        let Ok(view) = &self.view else {
            return;
        };
        let counts = &view.result.summary.status_counts;

        let bars: Vec<Bar> = StockStatus::ALL
            .iter()
            .map(|status| {
                let count = counts.get(status.as_str()).copied().unwrap_or(0);
                Bar::default()
                    .value(count as u64)
                    .label(Line::from(status_short(*status)))
                    .style(Style::default().fg(status_color(*status)))
            })
            .collect();

        let chart = BarChart::default()
            .block(Block::default().borders(Borders::NONE))
            .bar_width(8)
            .bar_gap(1)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let Ok(view) = &self.view else {
            let msg = Paragraph::new("(no data)").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, area);
            return;
        };
        let table = &view.table;
        if table.rows.is_empty() {
            let msg = Paragraph::new("(no records match)")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, area);
            return;
        }

        let mut header_spans = Vec::new();
        for (c, header) in table.headers.iter().enumerate() {
            let w = table.col_widths[c];
            header_spans.push(Span::styled(
                format!("{} ", util::pad_right(header, w)),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let visible_rows = (area.height as usize).saturating_sub(1);
        let end_row = (self.scroll_row + visible_rows).min(table.rows.len());

        let mut lines: Vec<Line> = Vec::with_capacity(visible_rows + 1);
        lines.push(Line::from(header_spans));

        for r in self.scroll_row..end_row {
            let is_cursor = r == self.cursor_row;
            let color = status_color(table.statuses[r]);
            let mut spans = Vec::with_capacity(table.headers.len());
            for (c, cell) in table.rows[r].iter().enumerate() {
                let w = table.col_widths[c];
                // Numeric columns right-aligned, text columns left-aligned
                let padded = if (2..=6).contains(&c) {
                    util::pad_left(cell, w)
                } else {
                    util::pad_right(cell, w)
                };
                let style = if is_cursor {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else if c == 7 {
                    Style::default().fg(color)
                } else {
                    Style::default().fg(Color::Gray)
                };
                spans.push(Span::styled(format!("{padded} "), style));
            }
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let filter = match self.status_filter {
            Some(status) => status.as_str(),
            None => "all",
        };
        let age = self.loaded_at.elapsed().as_secs();
        let left = match &self.notice {
            Some(notice) => format!(" {notice}"),
            None => format!(
                " sort: {}  filter: {}  loaded {}s ago",
                self.sort.label(),
                filter,
                age
            ),
        };
        let right = format!(
            "{}/{}  Tab: store  s: status  o: sort  e: csv  ?: help ",
            (self.cursor_row + 1).min(self.num_rows()),
            self.num_rows(),
        );

        let padding = (area.width as usize)
            .saturating_sub(util::display_width(&left) + util::display_width(&right));
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Navigation",
            "  ----------",
            "  arrows / jk       Move cursor",
            "  PgUp / PgDn       Page up/down",
            "  Home / g          First row",
            "  End  / G          Last row",
            "",
            "  View",
            "  ----",
            "  Tab / Shift+Tab   Next/prev store scope",
            "  s                 Cycle status filter",
            "  o                 Cycle sort order",
            "  r                 Reload sources now",
            "  e                 Export visible rows as CSV",
            "",
            "  General",
            "  -------",
            "  q / Esc           Quit",
            "  ?                 Toggle this help",
            "",
        ];
        let help_width: u16 = 44;
        let help_height: u16 = help_lines.len() as u16;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

pub fn cmd_dash(config_path: PathBuf, store: Option<String>) -> Result<(), CliError> {
    let config = crate::analysis::load_config(&config_path)?;
    let base_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    // Fail fast on a fatal source before entering the alternate screen
    load_sources(&config, &base_dir).map_err(|e| CliError {
        code: analysis_exit_code(&e),
        message: e.to_string(),
        hint: None,
    })?;

    let app = DashApp::new(config, base_dir, store);
    run_app(app)
}

fn run_app(mut app: DashApp) -> Result<(), CliError> {
    terminal::enable_raw_mode()
        .map_err(|e| CliError::io(format!("failed to enable raw mode: {e}")))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| CliError::io(format!("failed to enter alternate screen: {e}")))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| CliError::io(format!("failed to create terminal: {e}")))?;

    loop {
        // The TTL cache reloads stale sources on the next recompute
        if app.loaded_at.elapsed() >= app.ttl {
            app.refresh(false);
        }

        let term_size = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        // Chrome: title + cards + chart + table header + status line
        let visible_rows = term_size.height.saturating_sub(11) as usize;
        app.ensure_visible(visible_rows);

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| CliError::io(format!("draw error: {e}")))?;

        if event::poll(Duration::from_millis(250))
            .map_err(|e| CliError::io(format!("event poll error: {e}")))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| CliError::io(format!("event read error: {e}")))?
            {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
