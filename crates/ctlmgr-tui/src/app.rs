//! Application core: event loop, action processing, overlays.
//!
//! Panel calls are awaited inline while processing an action. Input that
//! arrives during a switch + refresh waits in the event channel, so the
//! table never shows anything but the last fetched snapshot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use ctlmgr_api::Transport;
use ctlmgr_core::{ControllerAction, CoreError, Panel, PanelConfig, Snapshot};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::controllers::ControllersScreen;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::context_menu::ContextMenu;

/// How long a notification stays in the status bar.
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
}

pub struct App<T> {
    /// `None` when rosbridge could not be reached at startup.
    panel: Option<Panel<T>>,
    panel_config: PanelConfig,
    screen: ControllersScreen,
    menu: Option<ContextMenu>,
    running: bool,
    connection_status: ConnectionStatus,
    help_visible: bool,
    notification: Option<(Notification, Instant)>,
    terminal_size: (u16, u16),
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl<T: Transport> App<T> {
    pub fn new(panel: Option<Panel<T>>, panel_config: PanelConfig) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let connection_status = if panel.is_some() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };

        Self {
            panel,
            screen: ControllersScreen::new(panel_config.namespace_prefix.clone()),
            panel_config,
            menu: None,
            running: true,
            connection_status,
            help_visible: false,
            notification: None,
            terminal_size: (80, 24),
            action_tx,
            action_rx,
        }
    }

    /// Activate the panel and queue the first snapshot.
    async fn start(&mut self) -> Result<()> {
        if let Some(panel) = self.panel.as_mut() {
            panel.restore_settings();
            let fetched = panel.try_start(&self.panel_config).await.cloned();
            debug!(endpoints = ?panel.gateway().endpoints(), "panel started");
            self.apply_fetch(fetched)?;
        } else {
            self.action_tx.send(Action::Notify(Notification::error(
                "rosbridge unreachable, showing no controllers",
            )))?;
        }
        Ok(())
    }

    /// Deactivate the panel. Safe to call more than once.
    fn shutdown(&mut self) {
        if let Some(panel) = self.panel.as_mut() {
            panel.save_settings();
            panel.stop();
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.terminal_size = tui.size().unwrap_or((80, 24));
        self.start().await?;

        let mut events = EventReader::new(Duration::from_millis(250), Duration::from_millis(33));
        info!(namespace = %self.panel_config.namespace_prefix, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            if let Some(action) = self.handle_event(event)? {
                self.action_tx.send(action)?;
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action).await?;
                if redraws_immediately(&action) {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        self.shutdown();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<Option<Action>> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            Event::Resize(w, h) => Ok(Some(Action::Resize(w, h))),
            Event::Tick => Ok(Some(Action::Tick)),
            Event::Render => Ok(Some(Action::Render)),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.menu.is_some() {
            return Ok(match key.code {
                KeyCode::Enter | KeyCode::Char('y') => Some(Action::ConfirmMenu),
                KeyCode::Esc | KeyCode::Char('n' | 'q') => Some(Action::CancelMenu),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
                return Ok(Some(Action::Quit));
            }
            (_, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::Refresh)),
            (KeyModifiers::NONE, KeyCode::Esc) => return Ok(Some(Action::DismissNotification)),
            _ => {}
        }

        self.screen.handle_key_event(key)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if let Some(menu) = &self.menu {
            return Ok(match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) if menu.contains(mouse.column, mouse.row) => {
                    Some(Action::ConfirmMenu)
                }
                MouseEventKind::Down(_) => Some(Action::CancelMenu),
                _ => None,
            });
        }
        if self.help_visible {
            return Ok(None);
        }
        self.screen.handle_mouse_event(mouse)
    }

    async fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                self.terminal_size = (*w, *h);
                self.menu = None;
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }

            Action::Refresh => {
                if let Some(panel) = self.panel.as_mut() {
                    let fetched = panel.try_refresh().await.cloned();
                    self.apply_fetch(fetched)?;
                } else {
                    self.action_tx
                        .send(Action::Notify(Notification::error("not connected to rosbridge")))?;
                }
            }

            Action::OpenContextMenu(request) => {
                let (w, h) = self.terminal_size;
                self.menu = Some(ContextMenu::new(request.clone(), Rect::new(0, 0, w, h)));
                self.screen.set_focused(false);
            }

            Action::ConfirmMenu => {
                if let Some(menu) = self.menu.take() {
                    self.screen.set_focused(true);
                    self.dispatch(menu.controller(), menu.action()).await?;
                }
            }

            Action::CancelMenu => {
                self.menu = None;
                self.screen.set_focused(true);
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

            Action::DismissNotification => {
                self.notification = None;
            }

            Action::SnapshotUpdated(_) => {
                if let Some(follow_up) = self.screen.update(action)? {
                    self.action_tx.send(follow_up)?;
                }
                debug!(rows = self.screen.rows().len(), "table updated");
            }

            Action::Render => {}
        }

        Ok(())
    }

    /// Queue a fetched snapshot and track whether rosbridge still answers.
    ///
    /// A failed fetch still queues the (empty) snapshot the panel now holds.
    fn apply_fetch(&mut self, fetched: Result<Snapshot, CoreError>) -> Result<()> {
        let snapshot = match fetched {
            Ok(snapshot) => {
                self.connection_status = ConnectionStatus::Connected;
                debug!(count = snapshot.len(), "refreshed");
                snapshot
            }
            Err(e) => {
                if e.is_connection_failure() {
                    self.connection_status = ConnectionStatus::Disconnected;
                }
                self.action_tx.send(Action::Notify(Notification::error(format!(
                    "refresh failed: {e}"
                ))))?;
                Snapshot::empty()
            }
        };
        self.action_tx
            .send(Action::SnapshotUpdated(Arc::new(snapshot)))?;
        Ok(())
    }

    /// Issue one switch and queue the snapshot fetched right after it.
    async fn dispatch(&mut self, name: &str, action: ControllerAction) -> Result<()> {
        let Some(panel) = self.panel.as_mut() else {
            self.action_tx
                .send(Action::Notify(Notification::error("not connected to rosbridge")))?;
            return Ok(());
        };

        let outcome = panel.dispatch(name, action).await;
        let notification = if outcome.accepted {
            Notification::success(format!("{action} accepted: {name}"))
        } else {
            Notification::error(format!("switch rejected: {name}"))
        };
        self.action_tx
            .send(Action::SnapshotUpdated(Arc::new(outcome.snapshot)))?;
        self.action_tx.send(Action::Notify(notification))?;
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

        self.screen.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        if let Some(menu) = &self.menu {
            menu.render(frame);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection = match self.connection_status {
            ConnectionStatus::Connected => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionStatus::Disconnected => {
                Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED))
            }
        };

        let mut spans = vec![Span::raw(" "), connection];
        if let Some((notification, _)) = &self.notification {
            spans.push(Span::styled(" │ ", theme::key_hint()));
            spans.push(Span::styled(
                notification.message.clone(),
                Style::default().fg(theme::notification_color(notification.level)),
            ));
        }
        spans.push(Span::styled(" │ r refresh  ? help  q quit", theme::key_hint()));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let width = 52u16.min(area.width.saturating_sub(4));
        let height = 16u16.min(area.height.saturating_sub(2));
        let help_area = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, help_area);
        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };
        let lines = vec![
            Line::from(""),
            entry("j/k ↑/↓", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("Ctrl+d/u", "Page down / up"),
            entry("m / Enter", "Menu for selected controller"),
            entry("right-click", "Menu for controller under pointer"),
            entry("r", "Refresh controller list"),
            Line::from(""),
            entry("Enter / y", "Confirm menu entry"),
            entry("Esc / n", "Close menu"),
            Line::from(""),
            entry("?", "This help"),
            entry("q", "Quit"),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Actions after which the frame is drawn before the next input is read.
///
/// A new snapshot is drawn right away so input queued during a switch
/// acts on the table as the operator sees it.
fn redraws_immediately(action: &Action) -> bool {
    matches!(action, Action::Render | Action::SnapshotUpdated(_))
}
