use std::io::{self, Stdout};
use std::path::Path;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph};

use crate::config::{self, ControlDocument};
use crate::controller::{ControlId, Event, Key, OverrideController, Target};
use crate::error::{Error, Result};
use crate::form::{Field, Pill, Row};

mod popup;

pub use popup::{PopupOutcome, TuiPopup};

enum InputMode {
    Normal,
    Edit { option: String, buffer: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RowRef {
    Pill { option: String, editable: bool },
    AddTrigger,
}

struct App {
    controller: OverrideController,
    control: ControlId,
    popup: TuiPopup,
    selected: usize,
    input: InputMode,
    status: String,
}

impl App {
    fn new(doc: ControlDocument) -> Self {
        let mut controller = OverrideController::new();
        let control = controller.mount(doc.markup);
        controller.init(control, doc.config);
        Self {
            controller,
            control,
            popup: TuiPopup::default(),
            selected: 0,
            input: InputMode::Normal,
            status: String::new(),
        }
    }

    fn rows(&self) -> Vec<RowRef> {
        let Some(store) = self.controller.store(self.control) else {
            return Vec::new();
        };
        store
            .rows()
            .into_iter()
            .map(|row| match row {
                Row::Pill { option, pill } => RowRef::Pill {
                    option: option.to_string(),
                    editable: matches!(pill, Pill::Editable { .. }),
                },
                Row::AddTrigger { .. } => RowRef::AddTrigger,
            })
            .collect()
    }

    fn fields(&self) -> Vec<Field> {
        self.controller
            .store(self.control)
            .map(|s| s.fields())
            .unwrap_or_default()
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn send(&mut self, event: Event) -> bool {
        self.controller
            .handle_event(self.control, event, &mut self.popup)
    }

    fn handle_key(&mut self, code: KeyCode, mods: KeyModifiers) -> bool {
        if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
            return true;
        }

        if self.popup.is_open() {
            self.handle_popup_key(code);
            return false;
        }

        if let InputMode::Edit { option, buffer } = &mut self.input {
            match code {
                KeyCode::Esc => self.input = InputMode::Normal,
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                KeyCode::Enter => {
                    let event = Event::Edit {
                        option: option.clone(),
                        value: buffer.clone(),
                    };
                    self.input = InputMode::Normal;
                    self.send(event);
                }
                _ => {}
            }
            return false;
        }

        let rows = self.rows();
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                return false;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < rows.len() {
                    self.selected += 1;
                }
                return false;
            }
            _ => {}
        }

        match rows.get(self.selected) {
            Some(RowRef::AddTrigger) => {
                let key = match code {
                    KeyCode::Enter => Key::Enter,
                    KeyCode::Esc => Key::Escape,
                    KeyCode::Char(c) => Key::Char(c),
                    _ => Key::Other,
                };
                self.send(Event::KeyDown {
                    target: Target::AddTrigger,
                    key,
                });
            }
            Some(RowRef::Pill { option, editable }) => match code {
                KeyCode::Delete | KeyCode::Char('d') => {
                    self.send(Event::Click(Target::PillRemove(option.clone())));
                    self.status = format!("removed {option}");
                    self.clamp_selection();
                }
                KeyCode::Enter if *editable => {
                    let buffer = self
                        .controller
                        .store(self.control)
                        .and_then(|s| s.entry(option))
                        .and_then(|e| e.value.clone())
                        .unwrap_or_default();
                    self.input = InputMode::Edit {
                        option: option.clone(),
                        buffer,
                    };
                }
                KeyCode::Enter => {
                    if !self.send(Event::Click(Target::PillLabel(option.clone()))) {
                        self.status = format!("no menu entries for {option}");
                    }
                }
                _ => {}
            },
            None => {}
        }
        false
    }

    fn handle_popup_key(&mut self, code: KeyCode) {
        let outcome = match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.popup.move_by(-1);
                PopupOutcome::Stay
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.popup.move_by(1);
                PopupOutcome::Stay
            }
            KeyCode::Enter => self.popup.activate(),
            KeyCode::Right | KeyCode::Char('l') => self.popup.descend(),
            KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.popup.back(),
            _ => PopupOutcome::Stay,
        };

        match outcome {
            PopupOutcome::Stay => {}
            PopupOutcome::Closed => self.status = "menu closed".to_string(),
            PopupOutcome::Selected(handler) => {
                handler.fire(&mut self.controller, &mut self.popup);
                self.status = match handler.action.option() {
                    Some(option) => format!("set {option}"),
                    None => format!("ran {}", handler.action.callback),
                };
                self.clamp_selection();
            }
        }
    }

    fn draw(&self, f: &mut ratatui::Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(8),
                Constraint::Length(2),
            ])
            .split(f.area());

        self.draw_rows(f, chunks[0]);
        self.draw_fields(f, chunks[1]);
        self.draw_footer(f, chunks[2]);

        if self.popup.is_open() {
            self.draw_popup(f);
        } else if let InputMode::Edit { option, buffer } = &self.input {
            let area = centered_rect(60, 20, f.area());
            f.render_widget(Clear, area);
            let p = Paragraph::new(vec![
                Line::from(vec![
                    Span::styled("Edit: ", Style::default().fg(Color::Yellow)),
                    Span::raw(option.clone()),
                ]),
                Line::from("enter=save  esc=cancel"),
                Line::from(""),
                Line::from(buffer.clone()),
            ])
            .style(Style::default().fg(Color::White).bg(Color::DarkGray))
            .block(
                Block::default()
                    .title("Edit Value")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double),
            );
            f.render_widget(p, area);
        }
    }

    fn draw_rows(&self, f: &mut ratatui::Frame, area: Rect) {
        let Some(store) = self.controller.store(self.control) else {
            return;
        };
        let items: Vec<ListItem> = store
            .rows()
            .into_iter()
            .map(|row| match row {
                Row::Pill { pill, .. } => match pill {
                    Pill::Editable { field } => ListItem::new(format!(
                        "[{}] {}  (x)",
                        field.name,
                        field.serialized_value()
                    )),
                    Pill::Labeled { text, .. } => ListItem::new(format!("{text}  (x)")),
                },
                Row::AddTrigger { .. } => ListItem::new(Span::styled(
                    "+ Add override",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .title("Overrides")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .highlight_style(Style::default().fg(Color::Black).bg(Color::LightYellow))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_fields(&self, f: &mut ratatui::Frame, area: Rect) {
        let lines: Vec<Line> = self
            .fields()
            .iter()
            .map(|field| Line::from(format!("{}={}", field.name, field.serialized_value())))
            .collect();
        let p = Paragraph::new(lines).block(
            Block::default()
                .title("Fields")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        f.render_widget(p, area);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame, area: Rect) {
        let hint = if self.popup.is_open() {
            "[j/k] Move  [Enter] Select  [l] Open  [Esc/h] Back"
        } else {
            "[j/k] Move  [Enter] Menu/Edit  [d] Remove  [q] Quit"
        };
        let text = if self.status.is_empty() {
            hint.to_string()
        } else {
            format!("{hint}   | {}", self.status)
        };
        let p = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::TOP));
        f.render_widget(p, area);
    }

    fn draw_popup(&self, f: &mut ratatui::Frame) {
        let area = centered_rect(50, 60, f.area());
        f.render_widget(Clear, area);
        let items: Vec<ListItem> = self
            .popup
            .items()
            .iter()
            .map(|item| {
                if item.items.is_empty() {
                    ListItem::new(item.label.clone())
                } else {
                    ListItem::new(format!("{} >", item.label))
                }
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .title(self.popup.title())
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double),
            )
            .style(Style::default().fg(Color::White).bg(Color::DarkGray))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::LightYellow))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(self.popup.selected()));
        f.render_stateful_widget(list, area, &mut state);
    }
}

pub fn run_tui(path: &Path) -> Result<Vec<Field>> {
    let doc = config::load(path)?;
    let app = App::new(ControlDocument::from_doc(&doc)?);

    let mut stdout = io::stdout();
    enable_raw_mode().map_err(|e| Error::msg(e.to_string()))?;
    execute!(stdout, EnterAlternateScreen, Hide).map_err(|e| Error::msg(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| Error::msg(e.to_string()))?;
    terminal
        .clear()
        .map_err(|e| Error::msg(format!("tui clear failed: {e}")))?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show).ok();

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
) -> Result<Vec<Field>> {
    let tick = Duration::from_millis(200);
    loop {
        terminal
            .draw(|f| app.draw(f))
            .map_err(|e| Error::msg(format!("draw failed: {e}")))?;

        if !event::poll(tick).map_err(|e| Error::msg(e.to_string()))? {
            continue;
        }
        if let TermEvent::Key(k) = event::read().map_err(|e| Error::msg(e.to_string()))? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(k.code, k.modifiers) {
                break;
            }
        }
    }
    Ok(app.fields())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r)[1];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical)[1]
}
