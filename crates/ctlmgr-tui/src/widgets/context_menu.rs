//! Single-entry popup menu anchored at the cell that requested it.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use ctlmgr_core::ControllerAction;

use crate::action::MenuRequest;
use crate::theme;

/// An open context menu. Its geometry is fixed when it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    request: MenuRequest,
    area: Rect,
}

impl ContextMenu {
    /// Place the menu at `request.anchor`, shifted back inside `bounds` if needed.
    pub fn new(request: MenuRequest, bounds: Rect) -> Self {
        let label_width = u16::try_from(request.action.label().chars().count()).unwrap_or(u16::MAX);
        let title_width = u16::try_from(request.controller.chars().count()).unwrap_or(u16::MAX);
        // 2 border columns + 1 space padding either side.
        let width = label_width
            .max(title_width)
            .saturating_add(4)
            .min(bounds.width);
        let height = 3.min(bounds.height);

        let (col, row) = request.anchor;
        let x = col.min(bounds.right().saturating_sub(width)).max(bounds.x);
        let y = row.min(bounds.bottom().saturating_sub(height)).max(bounds.y);

        Self {
            request,
            area: Rect::new(x, y, width, height),
        }
    }

    pub fn controller(&self) -> &str {
        &self.request.controller
    }

    pub fn action(&self) -> ControllerAction {
        self.request.action
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Whether a click at (column, row) lands on the menu.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area.contains(Position::new(column, row))
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = self.area();
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", self.request.controller))
            .title_style(theme::key_hint())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let entry = Line::from(Span::styled(
            format!(" {} ", self.request.action.label()),
            theme::menu_item(),
        ));
        frame.render_widget(Paragraph::new(entry), inner);
    }
}
