use std::{cmp, io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info};
use tripdeck_core::{
    catalog::{CatalogError, TripCatalog},
    config::AppConfig,
    forms::{ActivityForm, ActivityFormErrors, TripForm, TripFormErrors},
    models::{Trip, TripId},
    store::TripStore,
    views::{filter_trips, group_activities, trip_status_label, TripQuery},
};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_FIELD_LEN: usize = 48;
const FETCH_ERROR_MESSAGE: &str = "Failed to fetch trips. Please try again later.";

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailTab {
    Overview,
    Itinerary,
    Participants,
}

impl DetailTab {
    const ALL: [DetailTab; 3] = [
        DetailTab::Overview,
        DetailTab::Itinerary,
        DetailTab::Participants,
    ];

    fn title(self) -> &'static str {
        match self {
            DetailTab::Overview => "Overview",
            DetailTab::Itinerary => "Itinerary",
            DetailTab::Participants => "Participants",
        }
    }

    fn index(self) -> usize {
        match self {
            DetailTab::Overview => 0,
            DetailTab::Itinerary => 1,
            DetailTab::Participants => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            DetailTab::Overview => DetailTab::Itinerary,
            DetailTab::Itinerary => DetailTab::Participants,
            DetailTab::Participants => DetailTab::Overview,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TripField {
    Destination,
    StartDate,
    EndDate,
    Image,
}

impl TripField {
    const ALL: [TripField; 4] = [
        TripField::Destination,
        TripField::StartDate,
        TripField::EndDate,
        TripField::Image,
    ];

    fn label(self) -> &'static str {
        match self {
            TripField::Destination => "Destination",
            TripField::StartDate => "Start Date (YYYY-MM-DD)",
            TripField::EndDate => "End Date (YYYY-MM-DD)",
            TripField::Image => "Cover Image URL (optional)",
        }
    }

    fn next(self) -> Self {
        match self {
            TripField::Destination => TripField::StartDate,
            TripField::StartDate => TripField::EndDate,
            TripField::EndDate => TripField::Image,
            TripField::Image => TripField::Destination,
        }
    }

    fn prev(self) -> Self {
        match self {
            TripField::Destination => TripField::Image,
            TripField::StartDate => TripField::Destination,
            TripField::EndDate => TripField::StartDate,
            TripField::Image => TripField::EndDate,
        }
    }
}

#[derive(Debug)]
struct TripFormModal {
    form: TripForm,
    focus: TripField,
    cursor: usize,
    errors: TripFormErrors,
}

impl TripFormModal {
    fn new() -> Self {
        Self {
            form: TripForm::default(),
            focus: TripField::Destination,
            cursor: 0,
            errors: TripFormErrors::default(),
        }
    }

    fn value(&self, field: TripField) -> &str {
        match field {
            TripField::Destination => &self.form.destination,
            TripField::StartDate => &self.form.start_date,
            TripField::EndDate => &self.form.end_date,
            TripField::Image => &self.form.image,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.focus {
            TripField::Destination => &mut self.form.destination,
            TripField::StartDate => &mut self.form.start_date,
            TripField::EndDate => &mut self.form.end_date,
            TripField::Image => &mut self.form.image,
        }
    }

    fn error(&self, field: TripField) -> Option<&str> {
        match field {
            TripField::Destination => self.errors.destination.as_deref(),
            TripField::StartDate => self.errors.start_date.as_deref(),
            TripField::EndDate => self.errors.end_date.as_deref(),
            TripField::Image => None,
        }
    }

    fn clear_focused_error(&mut self) {
        match self.focus {
            TripField::Destination => self.errors.destination = None,
            TripField::StartDate => self.errors.start_date = None,
            TripField::EndDate => self.errors.end_date = None,
            TripField::Image => {}
        }
    }

    fn focus_next(&mut self) {
        self.focus = self.focus.next();
        self.cursor = self.value(self.focus).len();
    }

    fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
        self.cursor = self.value(self.focus).len();
    }

    fn insert(&mut self, ch: char) {
        if !ch.is_ascii() || ch.is_ascii_control() {
            return;
        }
        let cursor = self.cursor;
        let value = self.value_mut();
        if value.len() >= MAX_FIELD_LEN || cursor > value.len() {
            return;
        }
        value.insert(cursor, ch);
        self.cursor += 1;
        self.clear_focused_error();
    }

    fn backspace(&mut self) {
        let cursor = self.cursor;
        if cursor == 0 {
            return;
        }
        let value = self.value_mut();
        if cursor <= value.len() {
            value.remove(cursor - 1);
            self.cursor -= 1;
        }
        self.clear_focused_error();
    }

    fn delete(&mut self) {
        let cursor = self.cursor;
        let value = self.value_mut();
        if cursor < value.len() {
            value.remove(cursor);
        }
        self.clear_focused_error();
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.value(self.focus).len() as isize;
        let mut next = self.cursor as isize + delta;
        if next < 0 {
            next = 0;
        } else if next > len {
            next = len;
        }
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.value(self.focus).len();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivityField {
    Name,
    Date,
    Time,
    Notes,
}

impl ActivityField {
    const ALL: [ActivityField; 4] = [
        ActivityField::Name,
        ActivityField::Date,
        ActivityField::Time,
        ActivityField::Notes,
    ];

    fn label(self) -> &'static str {
        match self {
            ActivityField::Name => "Activity Name",
            ActivityField::Date => "Date",
            ActivityField::Time => "Time (HH:MM)",
            ActivityField::Notes => "Notes (optional)",
        }
    }

    fn next(self) -> Self {
        match self {
            ActivityField::Name => ActivityField::Date,
            ActivityField::Date => ActivityField::Time,
            ActivityField::Time => ActivityField::Notes,
            ActivityField::Notes => ActivityField::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            ActivityField::Name => ActivityField::Notes,
            ActivityField::Date => ActivityField::Name,
            ActivityField::Time => ActivityField::Date,
            ActivityField::Notes => ActivityField::Time,
        }
    }
}

#[derive(Debug)]
struct ActivityFormModal {
    trip_id: TripId,
    destination: String,
    dates: Vec<NaiveDate>,
    date_index: Option<usize>,
    name: String,
    time: String,
    notes: String,
    focus: ActivityField,
    cursor: usize,
    errors: ActivityFormErrors,
}

impl ActivityFormModal {
    fn new(trip: &Trip) -> Self {
        Self {
            trip_id: trip.id,
            destination: trip.destination.clone(),
            dates: trip.date_range.dates(),
            date_index: None,
            name: String::new(),
            time: String::new(),
            notes: String::new(),
            focus: ActivityField::Name,
            cursor: 0,
            errors: ActivityFormErrors::default(),
        }
    }

    fn selected_date(&self) -> Option<NaiveDate> {
        self.date_index.and_then(|idx| self.dates.get(idx).copied())
    }

    fn date_label(&self) -> String {
        match self.selected_date() {
            Some(date) => date.format("%A, %B %-d, %Y").to_string(),
            None => "Select a date".to_string(),
        }
    }

    fn step_date(&mut self, delta: isize) {
        if self.dates.is_empty() {
            return;
        }
        let len = self.dates.len() as isize;
        let next = match self.date_index {
            None => {
                if delta < 0 {
                    len - 1
                } else {
                    0
                }
            }
            Some(idx) => {
                let mut next = idx as isize + delta;
                if next < 0 {
                    next = 0;
                } else if next >= len {
                    next = len - 1;
                }
                next
            }
        };
        self.date_index = Some(next as usize);
        self.errors.date = None;
    }

    /// Snapshot the modal as the raw form the validator consumes.
    fn form(&self) -> ActivityForm {
        ActivityForm {
            name: self.name.clone(),
            date: self
                .selected_date()
                .map(|date| date.to_string())
                .unwrap_or_default(),
            time: self.time.clone(),
            notes: self.notes.clone(),
        }
    }

    fn text_value(&self, field: ActivityField) -> &str {
        match field {
            ActivityField::Name => &self.name,
            ActivityField::Time => &self.time,
            ActivityField::Notes => &self.notes,
            ActivityField::Date => "",
        }
    }

    fn value_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            ActivityField::Name => Some(&mut self.name),
            ActivityField::Time => Some(&mut self.time),
            ActivityField::Notes => Some(&mut self.notes),
            ActivityField::Date => None,
        }
    }

    fn error(&self, field: ActivityField) -> Option<&str> {
        match field {
            ActivityField::Name => self.errors.name.as_deref(),
            ActivityField::Date => self.errors.date.as_deref(),
            ActivityField::Time => self.errors.time.as_deref(),
            ActivityField::Notes => None,
        }
    }

    fn clear_focused_error(&mut self) {
        match self.focus {
            ActivityField::Name => self.errors.name = None,
            ActivityField::Date => self.errors.date = None,
            ActivityField::Time => self.errors.time = None,
            ActivityField::Notes => {}
        }
    }

    fn focus_next(&mut self) {
        self.focus = self.focus.next();
        self.cursor = self.text_value(self.focus).len();
    }

    fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
        self.cursor = self.text_value(self.focus).len();
    }

    fn insert(&mut self, ch: char) {
        if !ch.is_ascii() || ch.is_ascii_control() {
            return;
        }
        let cursor = self.cursor;
        let Some(value) = self.value_mut() else {
            return;
        };
        if value.len() >= MAX_FIELD_LEN || cursor > value.len() {
            return;
        }
        value.insert(cursor, ch);
        self.cursor += 1;
        self.clear_focused_error();
    }

    fn backspace(&mut self) {
        let cursor = self.cursor;
        if cursor == 0 {
            return;
        }
        let Some(value) = self.value_mut() else {
            return;
        };
        if cursor <= value.len() {
            value.remove(cursor - 1);
            self.cursor -= 1;
        }
        self.clear_focused_error();
    }

    fn delete(&mut self) {
        let cursor = self.cursor;
        let Some(value) = self.value_mut() else {
            return;
        };
        if cursor < value.len() {
            value.remove(cursor);
        }
        self.clear_focused_error();
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.focus == ActivityField::Date {
            self.step_date(delta);
            return;
        }
        let len = self.text_value(self.focus).len() as isize;
        let mut next = self.cursor as isize + delta;
        if next < 0 {
            next = 0;
        } else if next > len {
            next = len;
        }
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.text_value(self.focus).len();
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    TripsLoaded(Result<Vec<Trip>, CatalogError>),
}

/// High-level application state for the trip planner TUI.
pub struct TripdeckApp {
    config: AppConfig,
    catalog: TripCatalog,
    store: TripStore,
    state: UiState,
    detail_tab: DetailTab,
    trip_form: Option<TripFormModal>,
    activity_form: Option<ActivityFormModal>,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl TripdeckApp {
    pub fn new(config: AppConfig, catalog: TripCatalog) -> Self {
        let store = TripStore::new(config.organizer.clone());
        Self {
            config,
            catalog,
            store,
            state: UiState::default(),
            detail_tab: DetailTab::Overview,
            trip_form: None,
            activity_form: None,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        self.start_fetch();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn start_fetch(&mut self) {
        let Some(sender) = self.event_tx.clone() else {
            self.state
                .set_status("Internal error: event channel unavailable".to_string());
            error!("event_channel_missing");
            return;
        };
        self.state.loading = true;
        self.state.load_error = None;
        self.state.set_status("Loading trips…".to_string());
        info!(delay_ms = self.config.fetch_delay_ms, "fetching trip catalog");
        let catalog = self.catalog.clone();
        spawn(async move {
            let result = catalog.fetch().await;
            let _ = sender.send(AppEvent::TripsLoaded(result)).await;
        });
    }

    fn finish_fetch(&mut self, result: Result<Vec<Trip>, CatalogError>) {
        self.state.loading = false;
        match result {
            Ok(trips) => {
                info!(total = trips.len(), "trips loaded");
                self.store.set_trips(trips);
                self.refresh_visible();
                self.state.load_error = None;
                self.state
                    .set_status(format!("Loaded {} trips", self.state.visible.len()));
            }
            Err(err) => {
                error!(?err, "trip fetch failed");
                self.state.load_error = Some(FETCH_ERROR_MESSAGE.to_string());
                self.state.set_status(FETCH_ERROR_MESSAGE.to_string());
            }
        }
    }

    fn refresh_visible(&mut self) {
        let today = Local::now().date_naive();
        self.state.apply_filter(&self.store, today);
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Event::Key(key) = event {
                    if self.trip_form.is_some() {
                        self.handle_trip_form_key(key);
                    } else if self.activity_form.is_some() {
                        self.handle_activity_form_key(key);
                    } else {
                        self.handle_key(key);
                    }
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::TripsLoaded(result)) => {
                self.finish_fetch(result);
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if self.state.mode == Mode::Search {
            self.state
                .set_status(format!("Search: {}", self.state.query.search));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.state.mode {
            Mode::Search => self.handle_search_key(key),
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.state.query.search.clear();
                self.refresh_visible();
                self.state.set_status("Search cleared".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                let message = if self.state.query.search.is_empty() {
                    "Search cleared".to_string()
                } else {
                    format!("Search applied: {}", self.state.query.search)
                };
                self.state.set_status(message);
            }
            KeyCode::Backspace => {
                self.state.query.search.pop();
                self.refresh_visible();
                self.state
                    .set_status(format!("Search: {}", self.state.query.search));
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.state.query.search.push(c);
                    self.refresh_visible();
                    self.state
                        .set_status(format!("Search: {}", self.state.query.search));
                }
            }
            _ => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Char('g') if key.modifiers.is_empty() => self.state.move_to(0),
            KeyCode::Char('G') => self.state.move_to_end(),
            KeyCode::Home => self.state.move_to(0),
            KeyCode::End => self.state.move_to_end(),
            KeyCode::PageDown => self.state.page_down(),
            KeyCode::PageUp => self.state.page_up(),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Search;
                self.state
                    .set_status("Type to search destinations".to_string());
            }
            KeyCode::Char('f') if key.modifiers.is_empty() => {
                self.state.query.status = self.state.query.status.cycle();
                self.refresh_visible();
                self.state
                    .set_status(format!("Filter: {}", self.state.query.status.label()));
            }
            KeyCode::Enter => self.open_selected_trip(),
            KeyCode::Tab => {
                if self.store.detail_open() {
                    self.detail_tab = self.detail_tab.next();
                    self.state
                        .set_status(format!("Tab: {}", self.detail_tab.title()));
                }
            }
            KeyCode::Char('1') => self.jump_to_tab(DetailTab::Overview),
            KeyCode::Char('2') => self.jump_to_tab(DetailTab::Itinerary),
            KeyCode::Char('3') => self.jump_to_tab(DetailTab::Participants),
            KeyCode::Char('n') if key.modifiers.is_empty() => self.open_trip_form(),
            KeyCode::Char('a') if key.modifiers.is_empty() => self.open_activity_form(),
            KeyCode::Char('d') if key.modifiers.is_empty() => self.delete_highlighted_trip(),
            KeyCode::Char('x') if key.modifiers.is_empty() => {
                if self.store.selected_id().is_some() {
                    self.store.toggle_detail();
                    let message = if self.store.detail_open() {
                        "Detail pane opened"
                    } else {
                        "Detail pane closed"
                    };
                    self.state.set_status(message.to_string());
                }
            }
            KeyCode::Esc => {
                if self.store.detail_open() {
                    self.store.close_detail();
                    self.state.set_status("Detail pane closed".to_string());
                }
            }
            _ => {}
        }
    }

    fn jump_to_tab(&mut self, tab: DetailTab) {
        if self.store.detail_open() {
            self.detail_tab = tab;
            self.state.set_status(format!("Tab: {}", tab.title()));
        }
    }

    fn open_selected_trip(&mut self) {
        let Some(id) = self.state.current_trip_id() else {
            self.state.set_status("No trip selected".to_string());
            return;
        };
        self.store.select_trip(id);
        self.detail_tab = DetailTab::Overview;
        if let Some(trip) = self.store.trip(id) {
            self.state.set_status(format!("Viewing {}", trip.destination));
        }
    }

    fn delete_highlighted_trip(&mut self) {
        let Some(id) = self.state.current_trip_id() else {
            self.state.set_status("No trip selected".to_string());
            return;
        };
        let destination = match self.store.trip(id) {
            Some(trip) => trip.destination.clone(),
            None => return,
        };
        self.store.delete_trip(id);
        self.refresh_visible();
        info!(trip_id = id, %destination, "trip deleted");
        self.state.set_status(format!("Trip deleted: {destination}"));
    }

    fn open_trip_form(&mut self) {
        self.trip_form = Some(TripFormModal::new());
        self.state.set_status("Create a new trip".to_string());
    }

    fn open_activity_form(&mut self) {
        let Some(trip) = self.store.selected_trip() else {
            self.state
                .set_status("Open a trip before adding activities".to_string());
            return;
        };
        let modal = ActivityFormModal::new(trip);
        let destination = trip.destination.clone();
        self.activity_form = Some(modal);
        self.state
            .set_status(format!("Add an activity to {destination}"));
    }

    fn handle_trip_form_key(&mut self, key: KeyEvent) {
        let mut cancel = false;
        let mut submit = false;
        if let Some(modal) = self.trip_form.as_mut() {
            match key.code {
                KeyCode::Esc => cancel = true,
                KeyCode::Enter => submit = true,
                KeyCode::Tab | KeyCode::Down => modal.focus_next(),
                KeyCode::BackTab | KeyCode::Up => modal.focus_prev(),
                KeyCode::Left => modal.move_cursor(-1),
                KeyCode::Right => modal.move_cursor(1),
                KeyCode::Home => modal.move_home(),
                KeyCode::End => modal.move_end(),
                KeyCode::Backspace => modal.backspace(),
                KeyCode::Delete => modal.delete(),
                KeyCode::Char(ch) => {
                    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                        modal.insert(ch);
                    }
                }
                _ => {}
            }
        }

        if cancel {
            self.trip_form = None;
            self.state.set_status("New trip cancelled".to_string());
            return;
        }

        if submit {
            let Some(validated) = self.trip_form.as_ref().map(|modal| modal.form.validate())
            else {
                return;
            };
            match validated {
                Ok(draft) => {
                    let destination = draft.destination.clone();
                    let id = self.store.add_trip(draft);
                    self.trip_form = None;
                    self.refresh_visible();
                    info!(trip_id = id, %destination, "trip created");
                    if self.state.highlight_trip(id) {
                        self.state.set_status(format!("Trip created: {destination}"));
                    } else {
                        self.state.set_status(format!(
                            "Trip created (hidden by the current filter): {destination}"
                        ));
                    }
                }
                Err(errors) => {
                    if let Some(modal) = self.trip_form.as_mut() {
                        modal.errors = errors;
                    }
                    self.state.set_status("Fix the highlighted fields".to_string());
                }
            }
        }
    }

    fn handle_activity_form_key(&mut self, key: KeyEvent) {
        let mut cancel = false;
        let mut submit = false;
        if let Some(modal) = self.activity_form.as_mut() {
            match key.code {
                KeyCode::Esc => cancel = true,
                KeyCode::Enter => submit = true,
                KeyCode::Tab | KeyCode::Down => modal.focus_next(),
                KeyCode::BackTab | KeyCode::Up => modal.focus_prev(),
                KeyCode::Left => modal.move_cursor(-1),
                KeyCode::Right => modal.move_cursor(1),
                KeyCode::Home => modal.move_home(),
                KeyCode::End => modal.move_end(),
                KeyCode::Backspace => modal.backspace(),
                KeyCode::Delete => modal.delete(),
                KeyCode::Char(ch) => {
                    if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                        modal.insert(ch);
                    }
                }
                _ => {}
            }
        }

        if cancel {
            self.activity_form = None;
            self.state.set_status("New activity cancelled".to_string());
            return;
        }

        if submit {
            let (trip_id, form) = match self.activity_form.as_ref() {
                Some(modal) => (modal.trip_id, modal.form()),
                None => return,
            };
            let Some(range) = self.store.trip(trip_id).map(|trip| trip.date_range) else {
                self.activity_form = None;
                self.state
                    .set_status("Selected trip is no longer available".to_string());
                return;
            };
            match form.validate(&range) {
                Ok(draft) => {
                    let name = draft.name.clone();
                    if self.store.add_activity(trip_id, draft).is_some() {
                        self.activity_form = None;
                        info!(trip_id, activity = %name, "activity added");
                        self.state.set_status(format!("Activity added: {name}"));
                    } else {
                        self.activity_form = None;
                        self.state
                            .set_status("Selected trip is no longer available".to_string());
                    }
                }
                Err(errors) => {
                    if let Some(modal) = self.activity_form.as_mut() {
                        modal.errors = errors;
                    }
                    self.state.set_status("Fix the highlighted fields".to_string());
                }
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(size);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);

        self.render_trip_list(frame, body[0]);
        self.render_detail(frame, body[1]);
        self.render_status(frame, chunks[1]);

        if let Some(modal) = &self.trip_form {
            self.render_trip_form(frame, modal);
        }
        if let Some(modal) = &self.activity_form {
            self.render_activity_form(frame, modal);
        }
    }

    fn render_trip_list(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!("My Trips · {}", self.state.query.status.label());
        let block = Block::default().borders(Borders::ALL).title(title);

        self.state.list_height = area.height.saturating_sub(2) as usize;
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();

        if self.state.loading {
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Loading trips…",
                    Style::default().fg(self.theme.muted),
                )),
            ])
            .block(block)
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        if let Some(message) = &self.state.load_error {
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(self.theme.danger),
                )),
            ])
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        if self.state.visible.is_empty() {
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No trips found.",
                    Style::default().fg(self.theme.muted),
                )),
                Line::from(Span::styled(
                    "Press n to create a new trip",
                    Style::default().fg(self.theme.muted),
                )),
            ])
            .block(block)
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let today = Local::now().date_naive();
        let height = self.state.list_height.max(1);
        let end = cmp::min(self.state.offset + height, self.state.visible.len());

        let mut items: Vec<ListItem> = Vec::new();
        for (idx, trip_id) in self.state.visible[self.state.offset..end].iter().enumerate() {
            let Some(trip) = self.store.trip(*trip_id) else {
                continue;
            };
            let absolute = self.state.offset + idx;
            let marker = if absolute == self.state.cursor {
                Span::styled("▶ ", Style::default().fg(self.theme.accent))
            } else {
                Span::raw("  ")
            };
            let name_style = if self.store.selected_id() == Some(trip.id) {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            let status_label = trip_status_label(trip, today);
            let status_style = if status_label == "Upcoming" {
                Style::default().fg(self.theme.success)
            } else {
                Style::default().fg(self.theme.muted)
            };
            items.push(ListItem::new(Line::from(vec![
                marker,
                Span::styled(trip.destination.clone(), name_style),
                Span::styled(
                    format!("  {}", trip.date_label()),
                    Style::default().fg(self.theme.muted),
                ),
                Span::raw("  "),
                Span::styled(format!("[{status_label}]"), status_style),
            ])));
        }

        let mut list_state = ListState::default();
        let selected = self
            .state
            .cursor
            .saturating_sub(self.state.offset)
            .min(items.len().saturating_sub(1));
        list_state.select(Some(selected));

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(self.theme.selection_bg)
                .fg(self.theme.selection_fg),
        );
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Trip Details");

        if !self.store.detail_open() || self.store.selected_trip().is_none() {
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Select a trip to view details",
                    Style::default().fg(self.theme.muted),
                )),
            ])
            .block(block)
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }
        let Some(trip) = self.store.selected_trip() else {
            return;
        };

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let titles: Vec<&str> = DetailTab::ALL.iter().map(|tab| tab.title()).collect();
        let tabs = Tabs::new(titles)
            .select(self.detail_tab.index())
            .style(Style::default().fg(self.theme.muted))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, sections[0]);

        match self.detail_tab {
            DetailTab::Overview => self.render_overview(frame, sections[1], trip),
            DetailTab::Itinerary => self.render_itinerary(frame, sections[1], trip),
            DetailTab::Participants => self.render_participants(frame, sections[1], trip),
        }
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect, trip: &Trip) {
        let mut lines = vec![
            Line::from(Span::styled(
                trip.destination.clone(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                trip.date_label(),
                Style::default().fg(self.theme.muted),
            )),
            Line::from(""),
            Line::from(format!(
                "Your {}-day trip to {}. Explore the local sights, experience the culture, and create memories that will last a lifetime.",
                trip.date_range.duration_days(),
                trip.destination
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Planned Activities",
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];

        if trip.activities.is_empty() {
            lines.push(Line::from(Span::styled(
                "Nothing scheduled yet.",
                Style::default().fg(self.theme.muted),
            )));
        } else {
            for activity in trip.activities.iter().take(3) {
                lines.push(Line::from(format!(
                    "  {}  {} · {}",
                    activity.time.format("%H:%M"),
                    activity.name,
                    activity.date.format("%b %-d"),
                )));
            }
            if trip.activities.len() > 3 {
                lines.push(Line::from(Span::styled(
                    format!(
                        "  … {} more in the Itinerary tab",
                        trip.activities.len() - 3
                    ),
                    Style::default().fg(self.theme.muted),
                )));
            }
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_itinerary(&self, frame: &mut Frame, area: Rect, trip: &Trip) {
        let grouped = group_activities(trip);
        let mut lines = Vec::new();

        if grouped.is_empty() {
            lines.push(Line::from(Span::styled(
                "No activities planned yet. Press a to add one.",
                Style::default().fg(self.theme.muted),
            )));
        } else {
            for (date, activities) in &grouped {
                lines.push(Line::from(Span::styled(
                    date.format("%A, %B %-d").to_string(),
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD),
                )));
                for activity in activities {
                    let mut spans = vec![
                        Span::styled(
                            format!("  {}  ", activity.time.format("%H:%M")),
                            Style::default().fg(self.theme.muted),
                        ),
                        Span::styled(
                            activity.name.clone(),
                            Style::default().fg(self.theme.primary_fg),
                        ),
                    ];
                    if !activity.notes.is_empty() {
                        spans.push(Span::styled(
                            format!("  ({})", activity.notes),
                            Style::default().fg(self.theme.muted),
                        ));
                    }
                    lines.push(Line::from(spans));
                }
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                "Press a to add an activity",
                Style::default().fg(self.theme.muted),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_participants(&self, frame: &mut Frame, area: Rect, trip: &Trip) {
        let mut lines = Vec::new();
        if trip.participants.is_empty() {
            lines.push(Line::from(Span::styled(
                "No participants yet.",
                Style::default().fg(self.theme.muted),
            )));
        } else {
            for participant in &trip.participants {
                let role_style = if participant.is_organizer() {
                    Style::default().fg(self.theme.accent)
                } else {
                    Style::default().fg(self.theme.muted)
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {}  ", participant.name),
                        Style::default().fg(self.theme.primary_fg),
                    ),
                    Span::styled(participant.role_label(), role_style),
                ]));
            }
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Search {
            format!("Search: {}", self.state.query.search)
        } else {
            self.state.status.clone()
        };
        let hints =
            "j/k move · Enter open · / search · f filter · n new trip · a add activity · d delete · q quit";
        let paragraph = Paragraph::new(vec![
            Line::from(primary),
            Line::from(Span::styled(hints, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_trip_form(&self, frame: &mut Frame, modal: &TripFormModal) {
        let frame_area = frame.size();
        let width = cmp::min(56, frame_area.width.saturating_sub(4)).max(30);

        let mut lines: Vec<Line> = Vec::new();
        let mut cursor_pos: Option<(u16, u16)> = None;
        for field in TripField::ALL {
            let focused = modal.focus == field;
            let label_style = if focused {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            };
            let prefix = if focused { "▶ " } else { "  " };
            lines.push(Line::from(Span::styled(
                format!("{prefix}{}", field.label()),
                label_style,
            )));
            if focused {
                cursor_pos = Some((4 + modal.cursor as u16, lines.len() as u16));
            }
            lines.push(Line::from(vec![
                Span::styled("  > ", Style::default().fg(self.theme.accent)),
                Span::raw(modal.value(field).to_string()),
            ]));
            if let Some(message) = modal.error(field) {
                lines.push(Line::from(Span::styled(
                    format!("    {message}"),
                    Style::default().fg(self.theme.danger),
                )));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" create  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next field  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]));

        let height = (lines.len() as u16 + 2).min(frame_area.height.saturating_sub(2));
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Create New Trip"),
        );
        frame.render_widget(paragraph, area);

        if let Some((x, y)) = cursor_pos {
            let cursor_x = (area.x + 1 + x).min(area.x + area.width.saturating_sub(2));
            let cursor_y = area.y + 1 + y;
            if cursor_y < area.y + area.height.saturating_sub(1) {
                frame.set_cursor(cursor_x, cursor_y);
            }
        }
    }

    fn render_activity_form(&self, frame: &mut Frame, modal: &ActivityFormModal) {
        let frame_area = frame.size();
        let width = cmp::min(56, frame_area.width.saturating_sub(4)).max(30);

        let mut lines: Vec<Line> = Vec::new();
        let mut cursor_pos: Option<(u16, u16)> = None;
        for field in ActivityField::ALL {
            let focused = modal.focus == field;
            let label_style = if focused {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            };
            let prefix = if focused { "▶ " } else { "  " };
            lines.push(Line::from(Span::styled(
                format!("{prefix}{}", field.label()),
                label_style,
            )));
            if field == ActivityField::Date {
                let value_style = if modal.selected_date().is_some() {
                    Style::default().fg(self.theme.primary_fg)
                } else {
                    Style::default().fg(self.theme.muted)
                };
                lines.push(Line::from(vec![
                    Span::styled("  < ", Style::default().fg(self.theme.accent)),
                    Span::styled(modal.date_label(), value_style),
                    Span::styled(" >", Style::default().fg(self.theme.accent)),
                ]));
            } else {
                if focused {
                    cursor_pos = Some((4 + modal.cursor as u16, lines.len() as u16));
                }
                lines.push(Line::from(vec![
                    Span::styled("  > ", Style::default().fg(self.theme.accent)),
                    Span::raw(modal.text_value(field).to_string()),
                ]));
            }
            if let Some(message) = modal.error(field) {
                lines.push(Line::from(Span::styled(
                    format!("    {message}"),
                    Style::default().fg(self.theme.danger),
                )));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" add  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next field  "),
            Span::styled("←/→", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" pick date  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]));

        let height = (lines.len() as u16 + 2).min(frame_area.height.saturating_sub(2));
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);
        let title = format!("Add Activity · {}", modal.destination);
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);

        if let Some((x, y)) = cursor_pos {
            let cursor_x = (area.x + 1 + x).min(area.x + area.width.saturating_sub(2));
            let cursor_y = area.y + 1 + y;
            if cursor_y < area.y + area.height.saturating_sub(1) {
                frame.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}

struct UiState {
    visible: Vec<TripId>,
    cursor: usize,
    offset: usize,
    list_height: usize,
    query: TripQuery,
    status: String,
    mode: Mode,
    should_quit: bool,
    loading: bool,
    load_error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            visible: Vec::new(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            query: TripQuery::default(),
            status: "Ready".to_string(),
            mode: Mode::Browse,
            should_quit: false,
            loading: false,
            load_error: None,
        }
    }
}

impl UiState {
    fn apply_filter(&mut self, store: &TripStore, today: NaiveDate) {
        let keep = self.visible.get(self.cursor).copied();
        self.visible = filter_trips(store.trips(), &self.query, today)
            .into_iter()
            .map(|trip| trip.id)
            .collect();
        match keep.and_then(|id| self.visible.iter().position(|visible| *visible == id)) {
            Some(pos) => self.cursor = pos,
            None => {
                self.cursor = 0;
                self.offset = 0;
            }
        }
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let len = self.visible.len() as isize;
        let mut idx = self.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len {
            idx = len - 1;
        }
        self.cursor = idx as usize;
        self.ensure_cursor_visible();
    }

    fn move_to(&mut self, index: usize) {
        if self.visible.is_empty() {
            return;
        }
        self.cursor = index.min(self.visible.len() - 1);
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.cursor = self.visible.len() - 1;
        self.ensure_cursor_visible();
    }

    fn page_down(&mut self) {
        if self.visible.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.visible.len());
        self.move_cursor(delta as isize);
    }

    fn page_up(&mut self) {
        if self.visible.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.visible.len());
        self.move_cursor(-(delta as isize));
    }

    fn current_trip_id(&self) -> Option<TripId> {
        self.visible.get(self.cursor).copied()
    }

    fn highlight_trip(&mut self, id: TripId) -> bool {
        if let Some(pos) = self.visible.iter().position(|visible| *visible == id) {
            self.cursor = pos;
            self.ensure_cursor_visible();
            return true;
        }
        false
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.visible.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.visible.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.visible.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
