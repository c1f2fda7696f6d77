use crate::book::{self, Book, Bookmark};
use crate::constants::{
    CONTENT_PADDING_LEFT, EVENT_POLL_INTERVAL, FOOTER_HEIGHT, HEADER_HEIGHT, POPUP_MAX_WIDTH,
    TRANSLATION_UNAVAILABLE,
};
use crate::error::{LoadError, UiError};
use crate::notifier::FanOut;
use crate::selection::{Selection, TextPoint};
use crate::session::{ReadingSession, SearchHit};
use crate::store::BookRepository;
use crate::translate::TranslationUpdate;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph,
        Wrap,
    },
};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use tracing::{debug, error, warn};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Library,
    Reader,
}

#[derive(Debug)]
enum FloatingPane {
    None,
    AddBook {
        input: String,
    },
    Bookmarks {
        items: Vec<Bookmark>,
        selected_index: usize,
    },
    Search {
        query: String,
        results: Vec<SearchHit>,
        selected_index: usize,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupState {
    Pending,
    Ready(String),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPopup {
    pub seq: u64,
    pub source: String,
    pub absolute_line: usize,
    pub state: PopupState,
}

#[derive(Debug, Default)]
struct SelectionState {
    selection: Option<Selection>,
    keyboard_active: bool,
    dragging: bool,
}

impl SelectionState {
    fn clear(&mut self) {
        self.selection = None;
        self.keyboard_active = false;
        self.dragging = false;
    }
}

/// Sends panic messages to the log instead of stderr, which the reader owns
/// while it is running. Panics caught around observers stay off the screen.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        error!("{}", info);
    }));
}

/// Leaves raw mode and the alternate screen. Used after an uncaught panic,
/// when the `App` that entered them is gone.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)
}

pub struct App {
    library: Rc<dyn BookRepository>,
    session: ReadingSession,
    translations: Option<Receiver<TranslationUpdate>>,
    books: Vec<Book>,
    library_index: usize,
    screen: Screen,
    floating_pane: FloatingPane,
    selection: SelectionState,
    popup: Option<TranslationPopup>,
    content_area: Rect,
    should_quit: bool,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl App {
    pub fn new(
        library: Rc<dyn BookRepository>,
        session: ReadingSession,
        translations: Option<Receiver<TranslationUpdate>>,
    ) -> Self {
        let mut app = Self {
            library,
            session,
            translations,
            books: Vec::new(),
            library_index: 0,
            screen: Screen::Library,
            floating_pane: FloatingPane::None,
            selection: SelectionState::default(),
            popup: None,
            content_area: Rect::default(),
            should_quit: false,
            terminal: None,
        };
        app.refresh_books();
        app
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn session(&self) -> &ReadingSession {
        &self.session
    }

    pub fn popup(&self) -> Option<&TranslationPopup> {
        self.popup.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.floating_pane {
            FloatingPane::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_content_area(&mut self, area: Rect) {
        self.content_area = area;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.floating_pane = FloatingPane::Error { message };
    }

    /// Adds `path` to the library if needed and opens it in the reader.
    pub fn open_file(
        &mut self,
        path: &Path,
        title: Option<String>,
        author: Option<String>,
    ) -> Result<(), UiError> {
        if !path.is_file() {
            return Err(LoadError::NotAFile(path.to_path_buf()).into());
        }
        let path = path.canonicalize().map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let title = title.unwrap_or_else(|| book::default_title(&path));
        let id = self.library.add_book(&path, &title, author.as_deref())?;
        let book = self.library.get_book(id)?;
        self.refresh_books();
        if let Some(index) = self.books.iter().position(|b| b.id == id) {
            self.library_index = index;
        }
        self.open_book(book)?;
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), UiError> {
        self.setup_terminal()?;
        let result = self.event_loop();
        self.cleanup_terminal()?;
        result
    }

    fn event_loop(&mut self) -> Result<(), UiError> {
        while !self.should_quit {
            self.drain_translations();

            if let Some(mut terminal) = self.terminal.take() {
                let mut content_area = self.content_area;
                let drawn = terminal
                    .draw(|f| content_area = self.draw_ui(f))
                    .map(|_| ());
                self.terminal = Some(terminal);
                drawn?;
                self.content_area = content_area;
            }

            if !event::poll(EVENT_POLL_INTERVAL)? {
                continue;
            }

            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                _ => {}
            }
        }
        Ok(())
    }

    fn setup_terminal(&mut self) -> Result<(), UiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);
        Ok(())
    }

    fn cleanup_terminal(&mut self) -> Result<(), UiError> {
        if let Some(mut terminal) = self.terminal.take() {
            disable_raw_mode()?;
            execute!(
                terminal.backend_mut(),
                LeaveAlternateScreen,
                DisableMouseCapture
            )?;
            terminal.show_cursor()?;
        }
        Ok(())
    }

    // Library

    fn refresh_books(&mut self) {
        match self.library.list_books() {
            Ok(books) => {
                self.books = books;
                self.library_index = self.library_index.min(self.books.len().saturating_sub(1));
            }
            Err(err) => self.show_error(format!("Could not list books: {}", err)),
        }
    }

    fn open_book(&mut self, book: Book) -> Result<(), LoadError> {
        self.session.open_book(book)?;
        self.selection.clear();
        self.popup = None;
        self.screen = Screen::Reader;
        Ok(())
    }

    fn open_selected_book(&mut self) {
        let Some(book) = self.books.get(self.library_index).cloned() else {
            return;
        };
        if let Err(err) = self.open_book(book) {
            self.show_error(format!("Could not open book: {}", err));
        }
    }

    fn add_book_from_input(&mut self, input: &str) {
        let path = PathBuf::from(input.trim());
        if path.as_os_str().is_empty() {
            return;
        }
        if !path.is_file() {
            self.show_error(LoadError::NotAFile(path).to_string());
            return;
        }
        let title = book::default_title(&path);
        match self.library.add_book(&path, &title, None) {
            Ok(id) => {
                self.refresh_books();
                if let Some(index) = self.books.iter().position(|b| b.id == id) {
                    self.library_index = index;
                }
            }
            Err(err) => self.show_error(format!("Could not add book: {}", err)),
        }
    }

    // Input

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_floating_pane_input(key) {
            return;
        }

        match self.screen {
            Screen::Library => self.handle_library_key(key),
            Screen::Reader if self.selection.keyboard_active => self.handle_selection_key(key),
            Screen::Reader => self.handle_reader_key(key),
        }
    }

    fn handle_library_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.library_index = self.library_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.library_index < self.books.len().saturating_sub(1) {
                    self.library_index += 1;
                }
            }
            KeyCode::Enter => self.open_selected_book(),
            KeyCode::Char('a') => {
                self.floating_pane = FloatingPane::AddBook {
                    input: String::new(),
                };
            }
            KeyCode::Char('r') => self.refresh_books(),
            KeyCode::Esc => {
                if self.session.book().is_some() {
                    self.screen = Screen::Reader;
                }
            }
            _ => {}
        }
    }

    fn handle_reader_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Right | KeyCode::Char('n') | KeyCode::Char(' ') | KeyCode::PageDown => {
                self.session.next_page();
                self.clear_selection();
            }
            KeyCode::Left | KeyCode::Char('p') | KeyCode::Char('b') | KeyCode::PageUp => {
                self.session.previous_page();
                self.clear_selection();
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.session.first_page();
                self.clear_selection();
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.session.last_page();
                self.clear_selection();
            }
            KeyCode::Char('v') => self.start_keyboard_selection(),
            KeyCode::Char('m') => self.open_bookmarks_pane(),
            KeyCode::Char('/') => {
                self.floating_pane = FloatingPane::Search {
                    query: String::new(),
                    results: Vec::new(),
                    selected_index: 0,
                };
            }
            KeyCode::Char('o') => {
                self.clear_selection();
                self.screen = Screen::Library;
            }
            KeyCode::Esc => self.clear_selection(),
            _ => {}
        }
    }

    fn handle_selection_key(&mut self, key: KeyEvent) {
        let lines = self.session.paginator().current_page_lines();
        let Some(selection) = self.selection.selection.as_mut() else {
            self.selection.keyboard_active = false;
            return;
        };

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => selection.move_head(lines, -1, 0),
            KeyCode::Down | KeyCode::Char('j') => selection.move_head(lines, 1, 0),
            KeyCode::Left | KeyCode::Char('h') => selection.move_head(lines, 0, -1),
            KeyCode::Right | KeyCode::Char('l') => selection.move_head(lines, 0, 1),
            KeyCode::Enter => {
                self.selection.keyboard_active = false;
                self.commit_selection();
            }
            KeyCode::Esc => self.clear_selection(),
            _ => {}
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.screen != Screen::Reader || !matches!(self.floating_pane, FloatingPane::None) {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(point) = self.point_at(mouse.column, mouse.row, false) {
                    self.clear_selection();
                    self.selection.selection = Some(Selection::new(point));
                    self.selection.dragging = true;
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.selection.dragging => {
                if let Some(point) = self.point_at(mouse.column, mouse.row, true) {
                    if let Some(selection) = self.selection.selection.as_mut() {
                        selection.extend_to(point);
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) if self.selection.dragging => {
                self.selection.dragging = false;
                let collapsed = self
                    .selection
                    .selection
                    .map(|s| s.ordered().0 == s.ordered().1)
                    .unwrap_or(true);
                if collapsed {
                    self.clear_selection();
                } else {
                    self.commit_selection();
                }
            }
            _ => {}
        }
    }

    /// Maps a screen cell inside the page area to a page position.
    fn point_at(&self, column: u16, row: u16, clamp: bool) -> Option<TextPoint> {
        let area = self.content_area;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside && !clamp {
            return None;
        }

        let page_lines = self.session.paginator().current_page_lines().len();
        if page_lines == 0 {
            return None;
        }
        let line = (row.saturating_sub(area.y) as usize).min(page_lines - 1);
        let column = column.saturating_sub(area.x) as usize;
        if !clamp && row.saturating_sub(area.y) as usize >= page_lines {
            return None;
        }
        Some(TextPoint::new(line, column))
    }

    fn start_keyboard_selection(&mut self) {
        if self.session.paginator().current_page_lines().is_empty() {
            return;
        }
        let at = self
            .selection
            .selection
            .map(|s| s.head())
            .unwrap_or(TextPoint::new(0, 0));
        self.clear_selection();
        self.selection.selection = Some(Selection::new(at));
        self.selection.keyboard_active = true;
    }

    fn commit_selection(&mut self) {
        let Some(selection) = self.selection.selection else {
            return;
        };
        let extracted = selection.extract(self.session.paginator().current_page_lines());
        let fan_out = match extracted {
            Some(selected) => self.session.select(&selected.text, selected.line_offset),
            None => FanOut::default(),
        };

        if fan_out.is_noop() {
            self.clear_selection();
            return;
        }
        self.report_failures(&fan_out);
    }

    fn report_failures(&mut self, fan_out: &FanOut) {
        if fan_out.failures.is_empty() {
            return;
        }
        let details: Vec<String> = fan_out
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.observer, f.error))
            .collect();
        self.show_error(format!("Selection handling failed\n{}", details.join("\n")));
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        if self.popup.take().is_some() {
            self.session.cancel_translations();
        }
    }

    fn open_bookmarks_pane(&mut self) {
        match self.session.bookmarks() {
            Ok(items) => {
                self.floating_pane = FloatingPane::Bookmarks {
                    items,
                    selected_index: 0,
                };
            }
            Err(err) => self.show_error(format!("Could not load bookmarks: {}", err)),
        }
    }

    fn jump_to_line(&mut self, absolute_line: usize) {
        self.session.go_to_line(absolute_line);
        self.clear_selection();
    }

    fn handle_floating_pane_input(&mut self, key: KeyEvent) -> bool {
        let floating_pane = std::mem::replace(&mut self.floating_pane, FloatingPane::None);

        match floating_pane {
            FloatingPane::None => false,
            FloatingPane::Error { .. } => true,
            FloatingPane::AddBook { mut input } => {
                match key.code {
                    KeyCode::Esc => {}
                    KeyCode::Enter => self.add_book_from_input(&input),
                    KeyCode::Backspace => {
                        input.pop();
                        self.floating_pane = FloatingPane::AddBook { input };
                    }
                    KeyCode::Char(c) => {
                        input.push(c);
                        self.floating_pane = FloatingPane::AddBook { input };
                    }
                    _ => self.floating_pane = FloatingPane::AddBook { input },
                }
                true
            }
            FloatingPane::Bookmarks {
                items,
                mut selected_index,
            } => {
                match key.code {
                    KeyCode::Esc => {}
                    KeyCode::Enter => {
                        if let Some(bookmark) = items.get(selected_index) {
                            self.jump_to_line(bookmark.line);
                        }
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        selected_index = selected_index.saturating_sub(1);
                        self.floating_pane = FloatingPane::Bookmarks {
                            items,
                            selected_index,
                        };
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        if selected_index < items.len().saturating_sub(1) {
                            selected_index += 1;
                        }
                        self.floating_pane = FloatingPane::Bookmarks {
                            items,
                            selected_index,
                        };
                    }
                    _ => {
                        self.floating_pane = FloatingPane::Bookmarks {
                            items,
                            selected_index,
                        };
                    }
                }
                true
            }
            FloatingPane::Search {
                mut query,
                results,
                mut selected_index,
            } => {
                match key.code {
                    KeyCode::Esc => {}
                    KeyCode::Enter => match results.get(selected_index) {
                        Some(hit) => self.jump_to_line(hit.line),
                        None => {
                            self.floating_pane = FloatingPane::Search {
                                query,
                                results,
                                selected_index,
                            };
                        }
                    },
                    KeyCode::Char(c) => {
                        query.push(c);
                        let results = self.session.search(&query);
                        self.floating_pane = FloatingPane::Search {
                            query,
                            results,
                            selected_index: 0,
                        };
                    }
                    KeyCode::Backspace => {
                        query.pop();
                        let results = self.session.search(&query);
                        self.floating_pane = FloatingPane::Search {
                            query,
                            results,
                            selected_index: 0,
                        };
                    }
                    KeyCode::Up => {
                        selected_index = selected_index.saturating_sub(1);
                        self.floating_pane = FloatingPane::Search {
                            query,
                            results,
                            selected_index,
                        };
                    }
                    KeyCode::Down => {
                        if selected_index < results.len().saturating_sub(1) {
                            selected_index += 1;
                        }
                        self.floating_pane = FloatingPane::Search {
                            query,
                            results,
                            selected_index,
                        };
                    }
                    _ => {
                        self.floating_pane = FloatingPane::Search {
                            query,
                            results,
                            selected_index,
                        };
                    }
                }
                true
            }
        }
    }

    // Translation results

    pub fn drain_translations(&mut self) {
        let Some(rx) = &self.translations else {
            return;
        };
        let updates: Vec<TranslationUpdate> = rx.try_iter().collect();
        for update in updates {
            self.apply_translation_update(update);
        }
    }

    pub fn apply_translation_update(&mut self, update: TranslationUpdate) {
        if !self.session.sequence().is_current(update.seq()) {
            debug!("Dropping stale translation update {}", update.seq());
            return;
        }

        match update {
            TranslationUpdate::Requested {
                seq,
                text,
                absolute_line,
            } => {
                self.popup = Some(TranslationPopup {
                    seq,
                    source: text,
                    absolute_line,
                    state: PopupState::Pending,
                });
            }
            TranslationUpdate::Completed { seq, result } => {
                if let Some(popup) = self.popup.as_mut() {
                    if popup.seq == seq {
                        popup.state = match result {
                            Ok(translated) => PopupState::Ready(translated),
                            Err(err) => {
                                warn!("Translation failed: {}", err);
                                PopupState::Unavailable
                            }
                        };
                    }
                }
            }
        }
    }

    // Rendering

    fn draw_ui(&self, f: &mut Frame) -> Rect {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(f.area());

        let content_area = match self.screen {
            Screen::Library => {
                self.render_library(f, chunks[0], chunks[1], chunks[2]);
                Rect::default()
            }
            Screen::Reader => self.render_reader(f, chunks[0], chunks[1], chunks[2]),
        };

        self.render_floating_pane(f);
        content_area
    }

    fn header_block() -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1))
    }

    fn render_library(&self, f: &mut Frame, header: Rect, body: Rect, footer: Rect) {
        let title = Paragraph::new(vec![
            Line::from(vec![
                Span::styled("📚 ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    "Library",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!("   {} books", self.books.len()),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(Self::header_block());
        f.render_widget(title, header);

        let items: Vec<ListItem> = self
            .books
            .iter()
            .map(|book| {
                let mut spans = vec![Span::styled(
                    book.title.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )];
                if let Some(author) = &book.author {
                    spans.push(Span::styled(" by ", Style::default().fg(Color::DarkGray)));
                    spans.push(Span::styled(
                        author.clone(),
                        Style::default()
                            .fg(Color::LightBlue)
                            .add_modifier(Modifier::ITALIC),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Blue))
                    .title("│ Books "),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(if self.books.is_empty() {
            None
        } else {
            Some(self.library_index)
        });
        f.render_stateful_widget(list, body, &mut list_state);

        let footer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(2)])
            .split(footer);

        let status = Paragraph::new(Span::styled(
            self.session.status_message().to_string(),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center);
        f.render_widget(status, footer_chunks[0]);

        let help = Self::help_line(&[
            ("q", ":quit ", Color::Red),
            ("↑↓", ":select ", Color::Cyan),
            ("⏎", ":open ", Color::Green),
            ("a", ":add ", Color::Yellow),
            ("r", ":refresh", Color::Magenta),
        ]);
        f.render_widget(Self::footer_paragraph(help), footer_chunks[1]);
    }

    fn render_reader(&self, f: &mut Frame, header: Rect, body: Rect, footer: Rect) -> Rect {
        let (title, author) = match self.session.book() {
            Some(book) => (
                book.title.clone(),
                book.author.clone().unwrap_or_else(|| "Unknown".to_string()),
            ),
            None => ("No book".to_string(), "Unknown".to_string()),
        };

        let header_text = Paragraph::new(vec![
            Line::from(vec![
                Span::styled("📖 ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    title.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("   by ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    author,
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]),
        ])
        .block(Self::header_block())
        .alignment(Alignment::Left);
        f.render_widget(header_text, header);

        let paginator = self.session.paginator();
        let cursor = if self.selection.keyboard_active {
            self.selection.selection.map(|s| s.head())
        } else {
            None
        };
        let lines: Vec<Line> = paginator
            .current_page_lines()
            .iter()
            .enumerate()
            .map(|(index, line)| {
                Self::page_line(line, index, self.selection.selection.as_ref(), cursor)
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Blue))
            .title(format!("│ {} ", title))
            .title_style(
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            )
            .padding(Padding::new(CONTENT_PADDING_LEFT, 1, 0, 0));
        let content_area = block.inner(body);
        let content = Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(Color::White));
        f.render_widget(content, body);

        let footer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(2)])
            .split(footer);

        let progress = ((paginator.page_index() + 1) as f64 / paginator.total_pages() as f64)
            * 100.0;
        let gauge = Gauge::default()
            .block(Block::default())
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .percent(progress as u16)
            .label(paginator.status_label());
        f.render_widget(gauge, footer_chunks[0]);

        let help = if self.selection.keyboard_active {
            Self::help_line(&[
                ("hjkl", ":extend ", Color::Cyan),
                ("⏎", ":select ", Color::Green),
                ("Esc", ":cancel", Color::Red),
            ])
        } else {
            Self::help_line(&[
                ("q", ":quit ", Color::Red),
                ("←→", ":page ", Color::Green),
                ("v", ":select ", Color::Yellow),
                ("m", ":bookmarks ", Color::Cyan),
                ("/", ":search ", Color::Magenta),
                ("o", ":library", Color::Blue),
            ])
        };
        f.render_widget(Self::footer_paragraph(help), footer_chunks[1]);

        if let Some(popup) = &self.popup {
            let page_start = paginator.page_index() * paginator.page_size().get();
            if let Some(offset) = popup.absolute_line.checked_sub(page_start) {
                Self::render_translation_popup(f, popup, content_area, offset);
            }
        }

        content_area
    }

    fn help_line(entries: &[(&'static str, &'static str, Color)]) -> Line<'static> {
        let mut spans = Vec::with_capacity(entries.len() * 2);
        for (key, label, color) in entries {
            spans.push(Span::styled(
                format!(" {}", key),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(*label, Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    }

    fn footer_paragraph(help: Line<'static>) -> Paragraph<'static> {
        Paragraph::new(help)
            .block(
                Block::default()
                    .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .alignment(Alignment::Center)
    }

    fn page_line(
        line: &str,
        index: usize,
        selection: Option<&Selection>,
        cursor: Option<TextPoint>,
    ) -> Line<'static> {
        let normal = Style::default().fg(Color::White);
        let Some(selection) = selection else {
            return Line::from(Span::styled(line.to_string(), normal));
        };
        let selected = Style::default().bg(Color::Yellow).fg(Color::Black);
        let cursor_style = Style::default().bg(Color::Cyan).fg(Color::Black);

        if line.is_empty() && cursor == Some(TextPoint::new(index, 0)) {
            return Line::from(Span::styled(" ", cursor_style));
        }

        let mut spans = Vec::new();
        let mut current = String::new();
        let mut current_style = normal;
        for (column, grapheme) in line.graphemes(true).enumerate() {
            let point = TextPoint::new(index, column);
            let style = if cursor == Some(point) {
                cursor_style
            } else if selection.contains(point) {
                selected
            } else {
                normal
            };
            if style != current_style && !current.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut current), current_style));
            }
            current_style = style;
            current.push_str(grapheme);
        }
        if !current.is_empty() {
            spans.push(Span::styled(current, current_style));
        }
        Line::from(spans)
    }

    fn render_translation_popup(
        f: &mut Frame,
        popup: &TranslationPopup,
        content_area: Rect,
        line_offset: usize,
    ) {
        let area = f.area();
        let width = POPUP_MAX_WIDTH.min(area.width.saturating_sub(2));
        let height = 5;
        if width < 10 || area.height < height {
            return;
        }

        // Above the selected line when there is room, below otherwise.
        let line_y = content_area.y.saturating_add(line_offset as u16);
        let y = if line_y >= content_area.y + height {
            line_y - height
        } else {
            (line_y + 1).min(area.height.saturating_sub(height))
        };
        let x = content_area
            .x
            .min(area.width.saturating_sub(width));
        let popup_area = Rect {
            x,
            y,
            width,
            height,
        };

        let body = match &popup.state {
            PopupState::Pending => {
                Span::styled("Translating…", Style::default().fg(Color::DarkGray))
            }
            PopupState::Ready(text) => {
                Span::styled(text.clone(), Style::default().fg(Color::Black))
            }
            PopupState::Unavailable => {
                Span::styled(TRANSLATION_UNAVAILABLE, Style::default().fg(Color::Red))
            }
        };

        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                popup.source.replace('\n', " "),
                Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            )),
            Line::from(body),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Gray))
                .style(Style::default().bg(Color::LightYellow)),
        )
        .wrap(Wrap { trim: true });

        f.render_widget(Clear, popup_area);
        f.render_widget(paragraph, popup_area);
    }

    fn centered_popup(f: &mut Frame, width_pct: u16, height_pct: u16) -> Rect {
        let area = f.area();

        let popup_width = area.width.saturating_mul(width_pct).saturating_div(100);
        let popup_height = area.height.saturating_mul(height_pct).saturating_div(100);
        let x = area.width.saturating_sub(popup_width).saturating_div(2);
        let y = area.height.saturating_sub(popup_height).saturating_div(2);

        let popup_area = Rect {
            x,
            y,
            width: popup_width,
            height: popup_height,
        };

        let shadow_area = Rect {
            x: (x + 1).min(area.width.saturating_sub(popup_width)),
            y: (y + 1).min(area.height.saturating_sub(popup_height)),
            width: popup_width,
            height: popup_height,
        };
        f.render_widget(
            Block::default().style(Style::default().bg(Color::Black)),
            shadow_area,
        );
        f.render_widget(Clear, popup_area);
        popup_area
    }

    fn render_floating_pane(&self, f: &mut Frame) {
        match &self.floating_pane {
            FloatingPane::None => {}
            FloatingPane::AddBook { input } => Self::render_add_book_pane(f, input),
            FloatingPane::Bookmarks {
                items,
                selected_index,
            } => Self::render_bookmarks_pane(f, items, *selected_index),
            FloatingPane::Search {
                query,
                results,
                selected_index,
            } => Self::render_search_pane(f, query, results, *selected_index),
            FloatingPane::Error { message } => Self::render_error_pane(f, message),
        }
    }

    fn render_add_book_pane(f: &mut Frame, input: &str) {
        let popup_area = Self::centered_popup(f, 70, 20);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(popup_area);

        let field = Paragraph::new(format!("📄 Path: {}█", input))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title("Add Book")
                    .style(Style::default().fg(Color::Yellow)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(field, chunks[0]);

        f.render_widget(Self::pane_help(Color::Yellow, "add"), chunks[1]);
    }

    fn render_bookmarks_pane(f: &mut Frame, items: &[Bookmark], selected_index: usize) {
        let popup_area = Self::centered_popup(f, 70, 60);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(popup_area);

        let list_items: Vec<ListItem> = items
            .iter()
            .map(|bookmark| {
                let text = bookmark
                    .selected_text
                    .as_deref()
                    .map(|t| t.replace('\n', " "))
                    .unwrap_or_default();
                ListItem::new(format!(
                    "P{:3} L{:4}: {}",
                    bookmark.page + 1,
                    bookmark.line + 1,
                    crate::session::truncate_for_display(&text)
                ))
            })
            .collect();

        let list = List::new(list_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(format!("🔖 Bookmarks ({})", items.len())),
            )
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(if items.is_empty() {
            None
        } else {
            Some(selected_index)
        });
        f.render_stateful_widget(list, chunks[0], &mut list_state);
        f.render_widget(Self::pane_help(Color::Cyan, "jump"), chunks[1]);
    }

    fn render_search_pane(
        f: &mut Frame,
        query: &str,
        results: &[SearchHit],
        selected_index: usize,
    ) {
        let popup_area = Self::centered_popup(f, 80, 60);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(popup_area);

        let input = Paragraph::new(format!("🔍 Search: {}█", query))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title("Search Book")
                    .style(Style::default().fg(Color::Yellow)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(input, chunks[0]);

        let items: Vec<ListItem> = results
            .iter()
            .map(|hit| {
                ListItem::new(format!(
                    "P{:3} L{:4}: {}",
                    hit.page + 1,
                    hit.line + 1,
                    hit.context
                ))
            })
            .collect();

        let results_list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(format!(
                        "Results ({}/{})",
                        if results.is_empty() { 0 } else { selected_index + 1 },
                        results.len()
                    )),
            )
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .bg(Color::Yellow)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(if results.is_empty() {
            None
        } else {
            Some(selected_index)
        });
        f.render_stateful_widget(results_list, chunks[1], &mut list_state);
        f.render_widget(Self::pane_help(Color::Yellow, "jump"), chunks[2]);
    }

    fn render_error_pane(f: &mut Frame, message: &str) {
        let popup_area = Self::centered_popup(f, 60, 30);
        let mut lines: Vec<Line> = message
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::White))))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(Color::DarkGray),
        )));

        let pane = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Red))
                    .title("⚠ Error")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(pane, popup_area);
    }

    fn pane_help(color: Color, action: &'static str) -> Paragraph<'static> {
        Paragraph::new(Line::from(vec![
            Span::styled("↑↓", Style::default().fg(color)),
            Span::raw(" navigate  "),
            Span::styled("Enter", Style::default().fg(color)),
            Span::raw(format!(" {}  ", action)),
            Span::styled("Esc", Style::default().fg(color)),
            Span::raw(" close"),
        ]))
        .alignment(Alignment::Center)
    }
}
