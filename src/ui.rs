use std::io::{self, Stdout};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::chat;
use crate::news::{CategoryFilter, NewsRecord};
use crate::session::{reduce, Command, Effect, Session, Speaker, NO_COMMENTS_PLACEHOLDER};

/// Color set picked by the `ui.theme` config key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    bg: Color,
    panel_bg: Color,
    selected_bg: Color,
    border_idle: Color,
    border_focused: Color,
    text_primary: Color,
    text_secondary: Color,
    accent: Color,
    success: Color,
    error: Color,
}

const DARK: Palette = Palette {
    bg: Color::Rgb(30, 30, 46),
    panel_bg: Color::Rgb(24, 24, 36),
    selected_bg: Color::Rgb(69, 71, 90),
    border_idle: Color::Rgb(49, 50, 68),
    border_focused: Color::Rgb(137, 180, 250),
    text_primary: Color::Rgb(205, 214, 244),
    text_secondary: Color::Rgb(166, 173, 200),
    accent: Color::Rgb(137, 180, 250),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
};

const LIGHT: Palette = Palette {
    bg: Color::Rgb(239, 241, 245),
    panel_bg: Color::Rgb(230, 233, 239),
    selected_bg: Color::Rgb(188, 192, 204),
    border_idle: Color::Rgb(172, 176, 190),
    border_focused: Color::Rgb(30, 102, 245),
    text_primary: Color::Rgb(76, 79, 105),
    text_secondary: Color::Rgb(92, 95, 119),
    accent: Color::Rgb(30, 102, 245),
    success: Color::Rgb(64, 160, 43),
    error: Color::Rgb(210, 15, 57),
};

impl Palette {
    /// Unknown names fall back to the dark palette.
    fn named(name: &str) -> Palette {
        match name {
            "light" => LIGHT,
            _ => DARK,
        }
    }
}

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INDONESIAN_MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const NO_RESULTS_MESSAGE: &str = "Tidak ada berita yang cocok.";
const CHAT_TITLE: &str = "Asisten Sekolah";
const CHAT_DISABLED_MESSAGE: &str =
    "Chat nonaktif. Isi chat.api_key pada berkas konfigurasi untuk mengaktifkan.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Navigation,
    Feed,
    Reader,
}

impl Pane {
    fn title(&self) -> &'static str {
        match self {
            Pane::Navigation => "Kategori",
            Pane::Feed => "Berita",
            Pane::Reader => "Baca",
        }
    }

    fn next(&self) -> Pane {
        match self {
            Pane::Navigation => Pane::Feed,
            Pane::Feed => Pane::Reader,
            Pane::Reader => Pane::Reader,
        }
    }

    fn previous(&self) -> Pane {
        match self {
            Pane::Navigation => Pane::Navigation,
            Pane::Feed => Pane::Navigation,
            Pane::Reader => Pane::Feed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
    Comment,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommentField {
    Name,
    Text,
}

#[derive(Default)]
struct CommentForm {
    name: String,
    text: String,
    focus_text: bool,
}

impl CommentForm {
    fn focused(&self) -> CommentField {
        if self.focus_text {
            CommentField::Text
        } else {
            CommentField::Name
        }
    }

    fn focused_buffer(&mut self) -> &mut String {
        if self.focus_text {
            &mut self.text
        } else {
            &mut self.name
        }
    }

    fn clear(&mut self) {
        self.name.clear();
        self.text.clear();
        self.focus_text = false;
    }
}

struct Spinner {
    frame: usize,
}

impl Spinner {
    fn new() -> Self {
        Self { frame: 0 }
    }

    fn advance(&mut self) {
        self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
    }

    fn reset(&mut self) {
        self.frame = 0;
    }

    fn current(&self) -> &'static str {
        SPINNER_FRAMES[self.frame]
    }
}

enum AsyncResponse {
    Chat(Result<String, chat::ChatError>),
}

pub struct Options {
    pub status_message: String,
    pub session: Session,
    pub chat_client: Option<Arc<chat::Client>>,
    pub config_path: String,
    pub theme: String,
}

pub struct Model {
    session: Session,
    chat_client: Option<Arc<chat::Client>>,
    status_message: String,
    config_path: String,
    palette: Palette,
    focused_pane: Pane,
    mode: Mode,
    nav_labels: Vec<String>,
    selected_nav: usize,
    selected_feed: usize,
    reader_scroll: u16,
    search_input: String,
    comment_form: CommentForm,
    chat_input: String,
    spinner: Spinner,
    needs_redraw: bool,
    response_tx: Sender<AsyncResponse>,
    response_rx: Receiver<AsyncResponse>,
}

impl Model {
    pub fn new(opts: Options) -> Self {
        let (response_tx, response_rx) = unbounded();
        let nav_labels = opts.session.store().navigation_labels();
        Self {
            session: opts.session,
            chat_client: opts.chat_client,
            status_message: opts.status_message,
            config_path: opts.config_path,
            palette: Palette::named(&opts.theme),
            focused_pane: Pane::Feed,
            mode: Mode::Browse,
            nav_labels,
            selected_nav: 0,
            selected_feed: 0,
            reader_scroll: 0,
            search_input: String::new(),
            comment_form: CommentForm::default(),
            chat_input: String::new(),
            spinner: Spinner::new(),
            needs_redraw: true,
            response_tx,
            response_rx,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(120);

        loop {
            self.poll_async();

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key.code) {
                        break;
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
                if self.session.chat.is_pending() {
                    self.spinner.advance();
                    self.mark_dirty();
                } else {
                    self.spinner.reset();
                }
            }
        }

        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Routes a command through the session reducer and performs whatever
    /// effects come back. The only effect today is the chat dispatch.
    fn dispatch(&mut self, command: Command) {
        let effects = reduce(&mut self.session, command);
        for effect in effects {
            self.perform(effect);
        }
        self.mark_dirty();
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::DispatchChat { contents } => {
                let Some(client) = self.chat_client.clone() else {
                    // Unreachable via the UI: sends are blocked when no
                    // client is configured. Resolve the turn anyway so the
                    // pending counter cannot leak.
                    self.dispatch(Command::ChatCompleted(Err(chat::ChatError::Malformed(
                        "chat client not configured",
                    ))));
                    return;
                };
                let tx = self.response_tx.clone();
                thread::spawn(move || {
                    let result = client.generate(&contents);
                    let _ = tx.send(AsyncResponse::Chat(result));
                });
            }
        }
    }

    fn poll_async(&mut self) {
        while let Ok(response) = self.response_rx.try_recv() {
            match response {
                AsyncResponse::Chat(result) => {
                    let failed = result.is_err();
                    self.dispatch(Command::ChatCompleted(result));
                    if failed {
                        // Diagnostics go to the status line; the transcript
                        // only ever shows the fixed apology.
                        if let Some(err) = self.session.chat.last_error() {
                            self.status_message = format!("Chat gagal: {err}");
                        }
                    }
                }
            }
        }
    }

    fn visible_ids(&self) -> Vec<u32> {
        self.session
            .feed
            .matches()
            .map(|ids| ids.to_vec())
            .unwrap_or_default()
    }

    fn selected_record_id(&self) -> Option<u32> {
        self.visible_ids().get(self.selected_feed).copied()
    }

    fn clamp_feed_selection(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            self.selected_feed = 0;
        } else if self.selected_feed >= len {
            self.selected_feed = len - 1;
        }
    }

    // Returns true when the application should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match self.mode {
            Mode::Browse => return self.handle_browse_key(code),
            Mode::Search => self.handle_search_key(code),
            Mode::Comment => self.handle_comment_key(code),
            Mode::Chat => self.handle_chat_key(code),
        }
        false
    }

    fn handle_browse_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                self.search_input = self.session.feed.query.clone();
                self.status_message =
                    "Ketik untuk mencari judul dan isi berita. Enter/Esc selesai.".to_string();
                self.mark_dirty();
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.mode = Mode::Chat;
                self.status_message = if self.chat_client.is_some() {
                    "Chat dengan asisten sekolah. Enter kirim, Esc tutup.".to_string()
                } else {
                    CHAT_DISABLED_MESSAGE.to_string()
                };
                self.mark_dirty();
            }
            KeyCode::Char('c') => {
                if let Some(id) = self.selected_record_id() {
                    if self.session.feed.is_expanded(id) {
                        self.mode = Mode::Comment;
                        self.status_message =
                            "Tulis komentar. Tab ganti kolom, Enter kirim, Esc batal.".to_string();
                    } else {
                        self.status_message =
                            "Buka berita dulu (Enter) sebelum menulis komentar.".to_string();
                    }
                    self.mark_dirty();
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                let previous = self.focused_pane.previous();
                if previous != self.focused_pane {
                    self.focused_pane = previous;
                    self.mark_dirty();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                let next = self.focused_pane.next();
                if next != self.focused_pane {
                    self.focused_pane = next;
                    self.mark_dirty();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
            }
            KeyCode::Enter => match self.focused_pane {
                Pane::Navigation => {
                    if let Some(label) = self.nav_labels.get(self.selected_nav).cloned() {
                        self.dispatch(Command::CategorySelected(CategoryFilter::from_label(
                            &label,
                        )));
                        self.selected_feed = 0;
                        self.reader_scroll = 0;
                        self.status_message = format!("Kategori: {label}");
                    }
                }
                Pane::Feed | Pane::Reader => {
                    if let Some(id) = self.selected_record_id() {
                        self.dispatch(Command::ToggleRequested(id));
                        self.reader_scroll = 0;
                        self.status_message = match self.session.feed.is_expanded(id) {
                            true => "Menampilkan isi lengkap dan komentar.".to_string(),
                            false => "Kembali ke ringkasan.".to_string(),
                        };
                    }
                }
            },
            _ => {}
        }
        false
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.mode = Mode::Browse;
                self.status_message = "Pencarian diterapkan.".to_string();
                self.mark_dirty();
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                let query = self.search_input.clone();
                self.dispatch(Command::SearchChanged(query));
                self.clamp_feed_selection();
            }
            KeyCode::Char(ch) => {
                self.search_input.push(ch);
                let query = self.search_input.clone();
                self.dispatch(Command::SearchChanged(query));
                self.clamp_feed_selection();
            }
            _ => {}
        }
    }

    fn handle_comment_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.comment_form.clear();
                self.mode = Mode::Browse;
                self.status_message = "Komentar dibatalkan.".to_string();
                self.mark_dirty();
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.comment_form.focus_text = !self.comment_form.focus_text;
                self.mark_dirty();
            }
            KeyCode::Enter => {
                let Some(id) = self.selected_record_id() else {
                    return;
                };
                self.dispatch(Command::CommentSubmitted {
                    id,
                    name: self.comment_form.name.clone(),
                    text: self.comment_form.text.clone(),
                });
                if self.session.feed.comment_error(id).is_none() {
                    // Accepted: the reducer appended the comment, so the
                    // form clears the way the web form did.
                    self.comment_form.clear();
                    self.mode = Mode::Browse;
                    self.status_message = "Komentar terkirim.".to_string();
                }
                self.mark_dirty();
            }
            KeyCode::Backspace => {
                self.comment_form.focused_buffer().pop();
                self.mark_dirty();
            }
            KeyCode::Char(ch) => {
                self.comment_form.focused_buffer().push(ch);
                self.mark_dirty();
            }
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                // Hides the overlay only; an in-flight request keeps
                // running and lands in the transcript when it completes.
                self.mode = Mode::Browse;
                self.mark_dirty();
            }
            KeyCode::Enter => {
                if self.chat_client.is_none() {
                    self.status_message = CHAT_DISABLED_MESSAGE.to_string();
                    self.mark_dirty();
                    return;
                }
                let text = std::mem::take(&mut self.chat_input);
                self.dispatch(Command::ChatSendRequested(text));
            }
            KeyCode::Backspace => {
                self.chat_input.pop();
                self.mark_dirty();
            }
            KeyCode::Char(ch) => {
                self.chat_input.push(ch);
                self.mark_dirty();
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: i64) {
        match self.focused_pane {
            Pane::Navigation => {
                self.selected_nav = step(self.selected_nav, delta, self.nav_labels.len());
            }
            Pane::Feed => {
                let len = self.visible_ids().len();
                let moved = step(self.selected_feed, delta, len);
                if moved != self.selected_feed {
                    self.selected_feed = moved;
                    self.reader_scroll = 0;
                }
            }
            Pane::Reader => {
                self.reader_scroll = if delta > 0 {
                    self.reader_scroll.saturating_add(1)
                } else {
                    self.reader_scroll.saturating_sub(1)
                };
            }
        }
        self.mark_dirty();
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        frame.render_widget(
            Block::default().style(Style::default().bg(self.palette.bg)),
            area,
        );

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Percentage(40),
                Constraint::Percentage(40),
            ])
            .split(rows[0]);

        self.draw_navigation(frame, panes[0]);
        self.draw_feed(frame, panes[1]);
        self.draw_reader(frame, panes[2]);
        self.draw_status(frame, rows[1]);

        if self.mode == Mode::Chat {
            self.draw_chat_overlay(frame, area);
        }
    }

    fn pane_block(&self, pane: Pane, title: String) -> Block<'static> {
        let border = if self.focused_pane == pane && self.mode == Mode::Browse {
            self.palette.border_focused
        } else {
            self.palette.border_idle
        };
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(self.palette.panel_bg))
            .padding(Padding::horizontal(1))
    }

    fn draw_navigation(&self, frame: &mut Frame, area: Rect) {
        let active = self.session.feed.category.display();
        let items: Vec<ListItem> = self
            .nav_labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let marker = if label == active { "● " } else { "  " };
                let mut style = Style::default().fg(self.palette.text_primary);
                if index == self.selected_nav {
                    style = style.bg(self.palette.selected_bg).add_modifier(Modifier::BOLD);
                }
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(self.palette.accent)),
                    Span::styled(label.clone(), style),
                ]))
            })
            .collect();

        let block = self.pane_block(Pane::Navigation, Pane::Navigation.title().to_string());
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_feed(&self, frame: &mut Frame, area: Rect) {
        let title = if self.session.feed.query.is_empty() {
            Pane::Feed.title().to_string()
        } else {
            format!("{} — cari: {}", Pane::Feed.title(), self.session.feed.query)
        };
        let block = self.pane_block(Pane::Feed, title);

        let ids = self.visible_ids();
        if ids.is_empty() {
            let paragraph = Paragraph::new(NO_RESULTS_MESSAGE)
                .style(Style::default().fg(self.palette.text_secondary))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = ids
            .iter()
            .enumerate()
            .filter_map(|(index, id)| self.session.store().get(*id).map(|record| (index, record)))
            .map(|(index, record)| self.feed_row(index, record, width))
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }

    fn feed_row(&self, index: usize, record: &NewsRecord, width: usize) -> ListItem<'static> {
        let selected = index == self.selected_feed;
        let mut title_style = Style::default().fg(self.palette.text_primary);
        let mut meta_style = Style::default().fg(self.palette.text_secondary);
        if selected {
            title_style = title_style
                .bg(self.palette.selected_bg)
                .add_modifier(Modifier::BOLD);
            meta_style = meta_style.bg(self.palette.selected_bg);
        }

        let marker = if self.session.feed.is_expanded(record.id) {
            "▾ "
        } else {
            "▸ "
        };
        let meta = format!(
            "  {} · {} · {} komentar",
            record.category,
            format_date(record.date),
            record.comments.len()
        );
        ListItem::new(vec![
            Line::from(Span::styled(
                truncate_to_width(&format!("{marker}{}", record.title), width),
                title_style,
            )),
            Line::from(Span::styled(truncate_to_width(&meta, width), meta_style)),
        ])
    }

    fn draw_reader(&self, frame: &mut Frame, area: Rect) {
        let block = self.pane_block(Pane::Reader, Pane::Reader.title().to_string());
        let Some(record) = self
            .selected_record_id()
            .and_then(|id| self.session.store().get(id))
        else {
            let paragraph = Paragraph::new("Pilih berita untuk dibaca.")
                .style(Style::default().fg(self.palette.text_secondary))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let lines = self.reader_lines(record);
        let paragraph = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .scroll((self.reader_scroll, 0))
            .block(block);
        frame.render_widget(paragraph, area);
    }

    fn reader_lines(&self, record: &NewsRecord) -> Vec<Line<'static>> {
        let expanded = self.session.feed.is_expanded(record.id);
        let mut lines = vec![
            Line::from(Span::styled(
                record.title.clone(),
                Style::default()
                    .fg(self.palette.text_primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} · {}", record.category, format_date(record.date)),
                Style::default().fg(self.palette.text_secondary),
            )),
            Line::from(Span::styled(
                format!("[gambar: {}]", record.image),
                Style::default().fg(self.palette.text_secondary),
            )),
            Line::default(),
        ];

        let body = if expanded {
            record.content.clone()
        } else {
            record.snippet.clone()
        };
        lines.push(Line::from(Span::styled(
            body,
            Style::default().fg(self.palette.text_primary),
        )));
        lines.push(Line::default());

        if expanded {
            lines.push(Line::from(Span::styled(
                "Komentar:".to_string(),
                Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::BOLD),
            )));
            if record.comments.is_empty() {
                lines.push(Line::from(Span::styled(
                    NO_COMMENTS_PLACEHOLDER.to_string(),
                    Style::default().fg(self.palette.text_secondary),
                )));
            } else {
                for comment in &record.comments {
                    lines.push(Line::from(Span::styled(
                        format!("{} — {}", comment.name, format_timestamp(comment.date)),
                        Style::default()
                            .fg(self.palette.success)
                            .add_modifier(Modifier::BOLD),
                    )));
                    for wrapped in wrap(&comment.text, 70) {
                        lines.push(Line::from(Span::styled(
                            format!("  {wrapped}"),
                            Style::default().fg(self.palette.text_primary),
                        )));
                    }
                }
            }
            lines.push(Line::default());
            self.push_comment_form_lines(record.id, &mut lines);
        }

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("[Enter] {}", self.session.feed.toggle_label(record.id)),
            Style::default().fg(self.palette.accent),
        )));
        lines
    }

    fn push_comment_form_lines(&self, id: u32, lines: &mut Vec<Line<'static>>) {
        if self.mode == Mode::Comment {
            let focus = self.comment_form.focused();
            let field = |label: &str, value: &str, focused: bool| {
                let cursor = if focused { "▏" } else { "" };
                let style = if focused {
                    Style::default().fg(self.palette.text_primary).bg(self.palette.selected_bg)
                } else {
                    Style::default().fg(self.palette.text_secondary)
                };
                Line::from(Span::styled(format!("{label}: {value}{cursor}"), style))
            };
            lines.push(Line::from(Span::styled(
                "Tambahkan komentar:".to_string(),
                Style::default().fg(self.palette.accent),
            )));
            lines.push(field(
                "Nama",
                &self.comment_form.name,
                focus == CommentField::Name,
            ));
            lines.push(field(
                "Komentar",
                &self.comment_form.text,
                focus == CommentField::Text,
            ));
        } else {
            lines.push(Line::from(Span::styled(
                "[c] Tambahkan komentar".to_string(),
                Style::default().fg(self.palette.text_secondary),
            )));
        }

        if let Some(message) = self.session.feed.comment_error(id) {
            lines.push(Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(self.palette.error),
            )));
        }
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        if self.session.chat.is_pending() {
            spans.push(Span::styled(
                format!("{} ", self.spinner.current()),
                Style::default().fg(self.palette.accent),
            ));
        }
        let message = match self.mode {
            Mode::Search => format!("Cari: {}▏", self.search_input),
            _ => self.status_message.clone(),
        };
        spans.push(Span::styled(
            message,
            Style::default().fg(self.palette.text_secondary),
        ));
        spans.push(Span::styled(
            format!("  ({})", self.config_path),
            Style::default().fg(self.palette.border_idle),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_chat_overlay(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(70, 70, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .title(CHAT_TITLE)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.border_focused))
            .style(Style::default().bg(self.palette.panel_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let width = rows[0].width.saturating_sub(1).max(20) as usize;
        let mut lines: Vec<Line> = Vec::new();
        if self.session.chat.transcript().is_empty() {
            let intro = if self.chat_client.is_some() {
                "Tanyakan apa saja tentang sekolah."
            } else {
                CHAT_DISABLED_MESSAGE
            };
            lines.push(Line::from(Span::styled(
                intro,
                Style::default().fg(self.palette.text_secondary),
            )));
        }
        for entry in self.session.chat.transcript() {
            let (prefix, color) = match entry.speaker {
                Speaker::User => ("Anda", self.palette.accent),
                Speaker::Assistant => ("Asisten", self.palette.success),
                Speaker::Notice => ("!", self.palette.error),
            };
            lines.push(Line::from(Span::styled(
                format!("{prefix} · {}", format_timestamp(entry.at)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for wrapped in wrap(&entry.text, width) {
                lines.push(Line::from(Span::styled(
                    wrapped.into_owned(),
                    Style::default().fg(self.palette.text_primary),
                )));
            }
        }

        // Pin the tail of the transcript to the bottom of the viewport.
        let height = rows[0].height as usize;
        let skip = lines.len().saturating_sub(height);
        let visible: Vec<Line> = lines.into_iter().skip(skip).collect();
        frame.render_widget(Paragraph::new(Text::from(visible)), rows[0]);

        let pending = if self.session.chat.is_pending() {
            format!(" {}", self.spinner.current())
        } else {
            String::new()
        };
        let input = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.palette.accent)),
            Span::styled(
                format!("{}▏{pending}", self.chat_input),
                Style::default().fg(self.palette.text_primary),
            ),
        ]);
        frame.render_widget(Paragraph::new(input), rows[1]);
    }
}

fn step(current: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    if delta > 0 {
        current.saturating_add(delta as usize).min(last)
    } else {
        current.saturating_sub(delta.unsigned_abs() as usize)
    }
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

/// "2024-05-30" renders as "30 Mei 2024".
fn format_date(date: NaiveDate) -> String {
    let month = INDONESIAN_MONTHS[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    format!(
        "{} {:02}:{:02}",
        format_date(at.date_naive()),
        at.hour(),
        at.minute()
    )
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthStr::width(ch.to_string().as_str());
        if used + ch_width > width.saturating_sub(1) {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out.push('…');
    out
}
