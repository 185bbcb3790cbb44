//! TUI interface — ratatui panels: upload, ingredients, nutrition facts, daily progress.
//!
//! The App struct holds the session and the upload worker and drives the event loop.

pub mod activity;
pub mod help;
pub mod input;
pub mod keybindings;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog};
pub use help::HelpScreen;
pub use input::{InputMode, LineInput};
pub use keybindings::{map_key, Action};

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;
use tracing::warn;

use crate::error::UploadError;
use crate::metrics::{CommitReceipt, MetricKind, METRIC_COUNT};
use crate::session::Session;
use crate::upload::{Classifier, Completion, ImageFile, UploadWorker, EMPTY_PLACEHOLDER};

const HELP_PAGE_LINES: usize = 12;

/// Which panel has focus. Committing moves focus to the progress panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    Upload,
    Progress,
}

/// The main TUI application state.
pub struct App {
    pub session: Session,
    worker: UploadWorker,
    pub selected: usize,
    pub focus: FocusPanel,
    pub input_mode: InputMode,
    pub input: LineInput,
    pub activity: ActivityLog,
    pub help_screen: HelpScreen,
    pub last_commit: Option<CommitReceipt>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            session,
            worker: UploadWorker::new(classifier),
            selected: 0,
            focus: FocusPanel::Upload,
            input_mode: InputMode::Normal,
            input: LineInput::default(),
            activity: ActivityLog::default(),
            help_screen: HelpScreen::default(),
            last_commit: None,
            should_quit: false,
        }
    }

    /// Process an action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.help_screen.toggle(),
            Action::Escape => {
                self.help_screen.hide();
                self.focus = FocusPanel::Upload;
            }
            Action::BeginUpload => {
                self.input_mode = InputMode::ImagePath;
                self.input.clear();
            }
            Action::RemoveImage => {
                self.session.remove_image();
                self.activity.info("Removed image");
            }
            Action::Commit => {
                let receipt = self.session.commit();
                self.focus = FocusPanel::Progress;
                self.activity.info(format!(
                    "Added {} kcal to daily total ({} kcal today)",
                    receipt.added[MetricKind::Calories.index()],
                    receipt.totals[MetricKind::Calories.index()],
                ));
                self.last_commit = Some(receipt);
            }
            Action::ResetProgress => {
                self.session.reset_values();
                self.activity.info("Reset daily progress");
            }
            Action::ResetMax => {
                // Only offered while some limit differs from its default.
                if self.session.has_non_default_max() {
                    self.session.reset_max();
                    self.activity.info("Reset daily limits");
                }
            }
            Action::ApplyPreset(preset) => {
                self.session.apply_preset(preset);
                self.activity.info(format!("Goal set: {preset}"));
            }
            Action::SelectPrev => {
                self.selected = (self.selected + METRIC_COUNT - 1) % METRIC_COUNT;
                self.focus = FocusPanel::Progress;
            }
            Action::SelectNext => {
                self.selected = (self.selected + 1) % METRIC_COUNT;
                self.focus = FocusPanel::Progress;
            }
            Action::ScrollUp => {
                if self.help_screen.visible {
                    self.help_screen.scroll_up();
                } else {
                    self.handle_action(Action::SelectPrev);
                }
            }
            Action::ScrollDown => {
                if self.help_screen.visible {
                    self.help_screen.scroll_down(HELP_PAGE_LINES);
                } else {
                    self.handle_action(Action::SelectNext);
                }
            }
            Action::BeginEditMax => {
                let max = self.session.metrics()[self.selected].max;
                self.input_mode = InputMode::EditMax(self.selected);
                self.input
                    .set(if max == 0 { String::new() } else { max.to_string() });
                self.focus = FocusPanel::Progress;
            }
            Action::InputChar(c) => self.input.push(c),
            Action::InputBackspace => self.input.backspace(),
            Action::InputSubmit => self.submit_input(),
            Action::InputCancel => {
                self.input_mode = InputMode::Normal;
                self.input.clear();
            }
        }
    }

    fn submit_input(&mut self) {
        let text = self.input.take();
        match std::mem::take(&mut self.input_mode) {
            InputMode::ImagePath => {
                let path = text.trim();
                if !path.is_empty() {
                    self.upload_path(Path::new(path));
                }
            }
            InputMode::EditMax(index) => {
                let name = self.session.metrics()[index].name();
                if self.session.set_max(index, &text) {
                    let metric = &self.session.metrics()[index];
                    self.activity.info(format!(
                        "{name} limit set to {} {}",
                        metric.max,
                        metric.unit()
                    ));
                }
            }
            InputMode::Normal => {}
        }
    }

    /// Read an image from disk and start uploading it.
    pub fn upload_path(&mut self, path: &Path) {
        match ImageFile::from_path(path) {
            Ok(file) => self.upload_file(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read image");
                let error = UploadError::Unreadable {
                    name: path.display().to_string(),
                    reason: e.to_string(),
                };
                self.session.reject_upload(&error);
                self.activity.error(error.user_message());
            }
        }
    }

    /// Validate and hand the file to the background worker.
    pub fn upload_file(&mut self, file: ImageFile) {
        match self.session.begin_upload(&file) {
            Ok(ticket) => {
                self.activity.info(format!("Analyzing {}", file.name));
                // Detached: completion arrives through the worker channel.
                let _ = self.worker.dispatch(ticket, file);
            }
            Err(e) => self.activity.error(e.user_message()),
        }
    }

    /// Apply finished uploads. Returns how many completions were applied.
    pub fn process_completions(&mut self) -> usize {
        let mut applied = 0;
        for message in self.worker.drain() {
            match self.session.finish_upload(message.ticket, message.outcome) {
                Completion::Succeeded { ingested } => {
                    applied += 1;
                    if ingested {
                        self.activity.info("Nutrition facts updated");
                    } else {
                        self.activity.info("Image analyzed, no nutrition facts returned");
                    }
                }
                Completion::Failed(e) => {
                    applied += 1;
                    self.activity.error(e.user_message());
                }
                Completion::Stale => {}
            }
        }
        applied
    }

    /// Wait until the latest upload has landed or `timeout` passes.
    pub fn settle_uploads(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_completions();
            if !self.session.pipeline().is_loading() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    /// Hint for the status bar.
    pub fn context_hint(&self) -> &str {
        if self.help_screen.visible {
            "? or Esc to close help"
        } else if self.session.has_non_default_max() {
            "u upload | x remove | a add | r reset | m reset limits | 1-4 goals | ? help | q quit"
        } else {
            "u upload | x remove | a add | r reset | 1-4 goals | ? help | q quit"
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),                        // Upload
                Constraint::Min(8),                           // Ingredients + facts + activity
                Constraint::Length(METRIC_COUNT as u16 + 2), // Daily progress
                Constraint::Length(1),                        // Status bar
            ])
            .split(size);

        self.draw_upload(frame, chunks[0]);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Percentage(35),
                Constraint::Percentage(30),
            ])
            .split(chunks[1]);

        self.draw_ingredients(frame, middle[0]);
        self.draw_facts(frame, middle[1]);
        self.draw_activity(frame, middle[2]);
        self.draw_progress(frame, chunks[2]);
        self.draw_status(frame, chunks[3]);

        if self.help_screen.visible {
            self.draw_help(frame, size);
        }
    }

    fn draw_upload(&self, frame: &mut Frame, area: Rect) {
        let view = self.session.upload_view();
        let border_style = if self.focus == FocusPanel::Upload {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(" Meal Photo ")
            .borders(Borders::ALL)
            .border_style(border_style);

        let mut lines = Vec::new();
        if view.is_loading {
            lines.push(Line::from(Span::styled(
                "Analyzing image...",
                Style::default().fg(Color::Yellow),
            )));
        }
        if let Some(error) = view.error {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )));
        }
        match view.preview {
            Some(preview) => lines.push(Line::from(format!(
                "Preview: {} ({:.1} KB)",
                preview.uri,
                preview.size as f64 / 1024.0
            ))),
            None if !view.is_loading => lines.push(Line::from(Span::styled(
                "No image. Press u to upload a photo of your meal.",
                Style::default().fg(Color::DarkGray),
            ))),
            None => {}
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_ingredients(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Detected Ingredients ")
            .borders(Borders::ALL);
        let items: Vec<ListItem> = self
            .session
            .ingredient_display()
            .into_iter()
            .map(|line| {
                let style = if line == EMPTY_PLACEHOLDER {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(line, style)))
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_facts(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Nutrition Facts (a: add to daily total) ")
            .borders(Borders::ALL);
        let lines: Vec<Line> = self
            .session
            .metrics()
            .iter()
            .map(|metric| {
                Line::from(vec![
                    Span::raw(format!("{:<22}", metric.name())),
                    Span::styled(
                        format!("{} {}", metric.current, metric.unit()),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_activity(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().title(" Activity ").borders(Borders::ALL);
        let visible = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = self
            .activity
            .recent(visible)
            .iter()
            .map(|entry| {
                let color = match entry.kind {
                    ActivityKind::Info => Color::Gray,
                    ActivityKind::Error => Color::Red,
                };
                Line::from(Span::styled(&entry.message, Style::default().fg(color)))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_progress(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == FocusPanel::Progress;
        let title = if self.session.has_non_default_max() {
            " Daily Progress (m: reset limits) "
        } else {
            " Daily Progress "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        for (i, metric) in self.session.metrics().iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let selected = focused && i == self.selected;
            let marker = if selected { ">" } else { " " };
            let gauge_area = Rect::new(inner.x, y, inner.width, 1);
            let gauge = Gauge::default()
                .label(format!(
                    "{marker} {}: {} / {} {}",
                    metric.name(),
                    metric.value,
                    metric.max,
                    metric.unit()
                ))
                .ratio(metric.progress())
                .gauge_style(if selected {
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Blue)
                });
            frame.render_widget(gauge, gauge_area);
        }
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let line = if self.input_mode == InputMode::Normal {
            let loading = if self.session.pipeline().is_loading() {
                Span::styled(
                    " LOADING ",
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw("")
            };
            Line::from(vec![
                loading,
                Span::styled(
                    format!(" {} ", self.context_hint()),
                    Style::default().fg(Color::Gray),
                ),
            ])
        } else {
            Line::from(vec![
                Span::styled(
                    format!(" {}", self.input_mode.prompt()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(format!("{}_", self.input.text())),
            ])
        };

        let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
        frame.render_widget(paragraph, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let overlay = help_overlay(area);

        let block = Block::default()
            .style(Style::default().bg(Color::Black))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help (? or Esc to close) ");
        let inner = block.inner(overlay);
        frame.render_widget(Clear, overlay);
        frame.render_widget(block, overlay);

        let lines: Vec<Line> = self
            .help_screen
            .lines()
            .iter()
            .skip(self.help_screen.scroll_offset)
            .take(inner.height as usize)
            .map(|hl| {
                let color = if hl.is_header {
                    Color::Cyan
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(&hl.text, Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// Run the TUI event loop.
    pub fn run(
        &mut self,
        terminal: &mut ratatui::Terminal<impl ratatui::backend::Backend>,
    ) -> io::Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| self.draw(frame))
                .map_err(|e| io::Error::other(e.to_string()))?;

            if event::poll(Duration::from_millis(50))? {
                if let CrosstermEvent::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(action) = keybindings::map_key(key, self.input_mode) {
                            self.handle_action(action);
                        }
                    }
                }
            }

            self.process_completions();
        }

        Ok(())
    }
}

/// Centred rect covering 70% of `area`, at least 50x15 where it fits.
fn help_overlay(area: Rect) -> Rect {
    let percent = |len: u16| (u32::from(len) * 70 / 100) as u16;
    let width = percent(area.width).max(50).min(area.width);
    let height = percent(area.height).max(15).min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::GoalPreset;
    use crate::store::MemoryStore;
    use crate::upload::ClassificationResponse;

    struct Lunch;

    impl Classifier for Lunch {
        fn classify(&self, _file: &ImageFile) -> Result<ClassificationResponse, UploadError> {
            Ok(ClassificationResponse::success(
                "salmon\nrice",
                &[600.0, 25.0, 70.0, 500.0, 55.0, 40.0],
            ))
        }
    }

    fn app() -> App {
        App::new(Session::start(Box::new(MemoryStore::new())), Arc::new(Lunch))
    }

    #[test]
    fn app_creation() {
        let app = app();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.focus, FocusPanel::Upload);
        assert!(!app.should_quit);
    }

    #[test]
    fn handle_quit() {
        let mut app = app();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn commit_focuses_progress() {
        let mut app = app();
        app.handle_action(Action::Commit);
        assert_eq!(app.focus, FocusPanel::Progress);
        assert!(app.last_commit.is_some());
    }

    #[test]
    fn selection_wraps() {
        let mut app = app();
        app.handle_action(Action::SelectPrev);
        assert_eq!(app.selected, METRIC_COUNT - 1);
        app.handle_action(Action::SelectNext);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn scroll_moves_help_or_selection() {
        let mut app = app();
        app.handle_action(Action::ScrollDown);
        assert_eq!(app.selected, 1);
        app.handle_action(Action::ToggleHelp);
        app.handle_action(Action::ScrollDown);
        assert_eq!(app.selected, 1);
        assert_eq!(app.help_screen.scroll_offset, 1);
        app.handle_action(Action::ScrollUp);
        assert_eq!(app.help_screen.scroll_offset, 0);
    }

    #[test]
    fn help_overlay_fits_wide_terminals() {
        let overlay = help_overlay(Rect::new(0, 0, 1200, 400));
        assert_eq!(overlay, Rect::new(180, 60, 840, 280));

        let small = help_overlay(Rect::new(0, 0, 40, 10));
        assert_eq!(small, Rect::new(0, 0, 40, 10));
    }

    #[test]
    fn edit_max_flow() {
        let mut app = app();
        app.handle_action(Action::SelectNext);
        app.handle_action(Action::BeginEditMax);
        assert_eq!(app.input_mode, InputMode::EditMax(1));
        assert_eq!(app.input.text(), "78");
        app.handle_action(Action::InputBackspace);
        app.handle_action(Action::InputBackspace);
        app.handle_action(Action::InputChar('9'));
        app.handle_action(Action::InputChar('0'));
        app.handle_action(Action::InputSubmit);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.session.metrics()[1].max, 90);
    }

    #[test]
    fn edit_max_cleared_input_sets_zero() {
        let mut app = app();
        app.handle_action(Action::BeginEditMax);
        for _ in 0..4 {
            app.handle_action(Action::InputBackspace);
        }
        app.handle_action(Action::InputSubmit);
        assert_eq!(app.session.metrics()[0].max, 0);
    }

    #[test]
    fn cancel_input_keeps_state() {
        let mut app = app();
        app.handle_action(Action::BeginEditMax);
        app.handle_action(Action::InputChar('1'));
        app.handle_action(Action::InputCancel);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.session.metrics()[0].max, 2000);
    }

    #[test]
    fn reset_max_only_when_customized() {
        let mut app = app();
        app.handle_action(Action::ResetMax);
        assert!(app.activity.is_empty());
        app.handle_action(Action::ApplyPreset(GoalPreset::Fit));
        app.handle_action(Action::ResetMax);
        assert!(!app.session.has_non_default_max());
        assert_eq!(app.activity.last().unwrap().message, "Reset daily limits");
    }

    #[test]
    fn background_upload_lands() {
        let mut app = app();
        app.upload_file(ImageFile::new("lunch.png", "image/png", vec![0; 16]));
        assert!(app.session.pipeline().is_loading());
        assert!(app.settle_uploads(Duration::from_secs(5)));
        assert_eq!(app.session.metrics()[0].current, 600);
        assert_eq!(app.activity.last().unwrap().message, "Nutrition facts updated");
    }

    #[test]
    fn rejected_upload_logs_error() {
        let mut app = app();
        app.upload_file(ImageFile::new("menu.pdf", "application/pdf", vec![0; 16]));
        assert!(!app.session.pipeline().is_loading());
        assert_eq!(
            app.activity.last().unwrap().message,
            "Please upload an image file"
        );
    }

    #[test]
    fn unreadable_path_logs_error() {
        let mut app = app();
        app.upload_file(ImageFile::new("lunch.png", "image/png", vec![0; 16]));
        assert!(app.settle_uploads(Duration::from_secs(5)));
        assert!(app.session.upload_view().preview.is_some());

        app.upload_path(Path::new("/definitely/not/here.png"));
        assert_eq!(app.activity.last().unwrap().kind, ActivityKind::Error);
        let view = app.session.upload_view();
        assert!(!view.is_loading);
        assert!(view.preview.is_none());
        assert!(view.error.unwrap().starts_with("Could not read /definitely/not/here.png"));
    }

    #[test]
    fn context_hint_mentions_reset_limits_when_customized() {
        let mut app = app();
        assert!(!app.context_hint().contains("reset limits"));
        app.handle_action(Action::ApplyPreset(GoalPreset::LoseWeight));
        assert!(app.context_hint().contains("reset limits"));
    }
}
