//! Controllers screen: the five-column controller table and its context menu trigger.
//!
//! Rows are always the last snapshot handed in through
//! [`Action::SnapshotUpdated`], sorted by name. Mouse hit tests use the
//! geometry of the last rendered frame, so a right-click resolves to
//! whatever row was on screen under the pointer.

use std::cell::Cell;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell as TableCell, Paragraph, Row, Table, TableState};

use ctlmgr_core::{ControllerAction, ControllerDescriptor, ControllerState};

use crate::action::{Action, MenuRequest};
use crate::component::Component;
use crate::theme;

/// One table column: the descriptor field it shows and its header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub header: &'static str,
    width: Constraint,
}

pub const COLUMNS: [Column; 5] = [
    Column {
        field: "name",
        header: "Controller Name",
        width: Constraint::Min(18),
    },
    Column {
        field: "state",
        header: "State",
        width: Constraint::Length(12),
    },
    Column {
        field: "type",
        header: "Type",
        width: Constraint::Min(20),
    },
    Column {
        field: "hw_iface",
        header: "HW Interface",
        width: Constraint::Min(16),
    },
    Column {
        field: "resources",
        header: "Claimed Resources",
        width: Constraint::Min(16),
    },
];

const HEADER_HEIGHT: u16 = 1;
const PAGE: isize = 10;

pub struct ControllersScreen {
    focused: bool,
    namespace: String,
    rows: Vec<ControllerDescriptor>,
    table_state: TableState,
    last_table_area: Cell<Rect>,
    last_offset: Cell<usize>,
}

impl ControllersScreen {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            focused: true,
            namespace: namespace.into(),
            rows: Vec::new(),
            table_state: TableState::default(),
            last_table_area: Cell::new(Rect::default()),
            last_offset: Cell::new(0),
        }
    }

    pub fn rows(&self) -> &[ControllerDescriptor] {
        &self.rows
    }

    fn select(&mut self, idx: usize) {
        if self.rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(self.rows.len() - 1)));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let current = self.table_state.selected().unwrap_or(0);
        self.select(current.saturating_add_signed(delta));
    }

    /// Index of the row drawn at terminal cell (column, row), if any.
    ///
    /// Header, border and the blank space under the last row all miss.
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.last_table_area.get();
        if !area.contains(Position::new(column, row)) {
            return None;
        }
        let first_row_y = area.y.saturating_add(HEADER_HEIGHT);
        if row < first_row_y {
            return None;
        }
        let idx = self.last_offset.get() + usize::from(row - first_row_y);
        (idx < self.rows.len()).then_some(idx)
    }

    /// Name and state of the controller under (column, row).
    pub fn on_context_menu_request(&self, column: u16, row: u16) -> Option<(String, ControllerState)> {
        let desc = self.rows.get(self.row_at(column, row)?)?;
        Some((desc.name.clone(), desc.state.clone()))
    }

    /// Context menu for the selected row, anchored on that row.
    fn menu_for_selected(&self) -> Option<Action> {
        let idx = self.table_state.selected()?;
        let desc = self.rows.get(idx)?;
        open_menu(desc.name.clone(), &desc.state, self.row_anchor(idx))
    }

    /// Screen cell just inside the name column of row `idx`.
    fn row_anchor(&self, idx: usize) -> (u16, u16) {
        let area = self.last_table_area.get();
        let visible = idx
            .checked_sub(self.last_offset.get())
            .and_then(|i| u16::try_from(i).ok())
            .unwrap_or(0);
        (
            area.x.saturating_add(2),
            area.y.saturating_add(HEADER_HEIGHT).saturating_add(visible),
        )
    }

    fn render_row(desc: &ControllerDescriptor) -> Row<'static> {
        Row::new(vec![
            TableCell::from(desc.name.clone()).style(Style::default().fg(theme::NEON_CYAN)),
            TableCell::from(desc.state.to_string())
                .style(Style::default().fg(theme::state_color(&desc.state))),
            TableCell::from(desc.controller_type.clone()),
            TableCell::from(desc.hardware_interfaces_display()),
            TableCell::from(desc.resources_display()).style(Style::default().fg(theme::CORAL)),
        ])
        .style(theme::table_row())
    }
}

/// `None` when `state` offers no action, so no menu opens.
fn open_menu(controller: String, state: &ControllerState, anchor: (u16, u16)) -> Option<Action> {
    let action = ControllerAction::offered_for(state)?;
    Some(Action::OpenContextMenu(MenuRequest {
        controller,
        action,
        anchor,
    }))
}

impl Component for ControllersScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select(0);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select(usize::MAX);
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(PAGE);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(-PAGE);
                None
            }
            KeyCode::Char('m') | KeyCode::Enter => self.menu_for_selected(),
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let action = match mouse.kind {
            MouseEventKind::Down(MouseButton::Right) => {
                if let Some(idx) = self.row_at(mouse.column, mouse.row) {
                    self.select(idx);
                }
                self.on_context_menu_request(mouse.column, mouse.row)
                    .and_then(|(name, state)| open_menu(name, &state, (mouse.column, mouse.row)))
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(idx) = self.row_at(mouse.column, mouse.row) {
                    self.select(idx);
                }
                None
            }
            MouseEventKind::ScrollDown => {
                self.move_selection(1);
                None
            }
            MouseEventKind::ScrollUp => {
                self.move_selection(-1);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SnapshotUpdated(snapshot) = action {
            self.rows = snapshot.sorted_by_name();
            let current = self.table_state.selected().unwrap_or(0);
            self.select(current);
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(
                " Controllers · {} ({}) ",
                self.namespace,
                self.rows.len()
            ))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        let table_area = layout[0];

        let header = Row::new(
            COLUMNS
                .iter()
                .map(|c| TableCell::from(c.header).style(theme::table_header())),
        )
        .height(HEADER_HEIGHT);
        let rows: Vec<Row> = self.rows.iter().map(Self::render_row).collect();
        let table = Table::new(rows, COLUMNS.map(|c| c.width))
            .header(header)
            .row_highlight_style(theme::table_selected())
            .highlight_symbol("▸");

        let mut state = self.table_state;
        frame.render_stateful_widget(table, table_area, &mut state);
        self.last_table_area.set(table_area);
        self.last_offset.set(state.offset());

        if self.rows.is_empty() && table_area.height > HEADER_HEIGHT {
            let empty = Rect {
                y: table_area.y + HEADER_HEIGHT,
                height: 1,
                ..table_area
            };
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no controllers reported",
                    Style::default()
                        .fg(theme::DIM_WHITE)
                        .add_modifier(Modifier::ITALIC),
                )),
                empty,
            );
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("m ", theme::key_hint_key()),
            Span::styled("menu  ", theme::key_hint()),
            Span::styled("right-click ", theme::key_hint_key()),
            Span::styled("menu  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
