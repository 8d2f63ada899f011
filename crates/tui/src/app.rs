use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use bulkbuy_core::{
    AppConfig, BalanceSource, BulkBuy, ClickKind, GestureOutcome, SlotClick, TickOutcome,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{sync::mpsc, time};
use tracing::{error, info};

use crate::{
    shop::{LogLevel, MessageLog, Outbox, PendingClick, ShopWorld},
    styled::styled_line,
};

/// One game tick, as on a 20 TPS server.
const GAME_TICK: Duration = Duration::from_millis(50);
const INPUT_POLL: Duration = Duration::from_millis(250);
const MAX_BATCH_SIZE: u32 = 256;

enum AppEvent {
    Input(Event),
}

/// Terminal front end that plays the game client around the bulk-buy core.
pub struct BulkBuyApp {
    bulk: BulkBuy,
    world: ShopWorld,
    outbox: Outbox,
    log: MessageLog,
    game_time: u64,
    cursor: usize,
    shift_held: bool,
    widget_visible: bool,
    should_quit: bool,
}

impl BulkBuyApp {
    pub fn new(bulk: BulkBuy, world: ShopWorld) -> Self {
        Self {
            bulk,
            world,
            outbox: Outbox::default(),
            log: MessageLog::default(),
            game_time: 0,
            cursor: 0,
            shift_held: false,
            widget_visible: false,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.open_shop();

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);
        let mut ticker = time::interval(GAME_TICK);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                maybe_event = event_rx.recv() => {
                    match maybe_event {
                        Some(AppEvent::Input(event)) => {
                            if let Err(err) = self.handle_input(event) {
                                error!(?err, "Input handling failed");
                                self.log.error(format!("Error: {err}"));
                            }
                        }
                        None => break,
                    }
                }
                _ = ticker.tick() => self.handle_game_tick(),
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)
    }

    fn handle_game_tick(&mut self) {
        self.game_time += 1;
        let outcome = self
            .bulk
            .on_tick(self.game_time, &self.world, &mut self.outbox, &mut self.log);
        self.settle_outbox();
        if outcome == TickOutcome::Completed {
            self.log.info("Bulk purchase finished.");
        }
    }

    fn settle_outbox(&mut self) {
        for click in self.outbox.drain() {
            match self.world.process_click(&click) {
                Ok(message) => self.log.info(message),
                Err(reason) => self.log.error(format!("Purchase rejected: {reason}")),
            }
        }
    }

    fn open_shop(&mut self) {
        let container = self.world.open();
        // The client sees one slot update per slot; only the title slot counts.
        self.widget_visible =
            (0..container.size()).any(|slot| self.bulk.on_shop_opened(slot, &container));
        self.cursor = 0;
    }

    fn close_shop(&mut self) {
        if let Some(session) = self.bulk.on_container_closed() {
            self.log.info(format!(
                "Bulk purchase cancelled with {} left.",
                session.remaining()
            ));
        }
        self.world.close();
        self.widget_visible = false;
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            _ => Ok(()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        let shop_open = self.world.container().is_some();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc if shop_open => self.close_shop(),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('o') if !shop_open => self.open_shop(),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Tab => self.shift_held = !self.shift_held,
            KeyCode::Enter if shop_open => self.click_selected(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_batch_size(1)?,
            KeyCode::Char('-') => self.adjust_batch_size(-1)?,
            KeyCode::Char('s') => self.cycle_speed()?,
            _ => {}
        }
        Ok(())
    }

    fn move_cursor(&mut self, delta: isize) {
        let total = self.world.ware_slots().count();
        if total == 0 {
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, total as isize - 1) as usize;
    }

    fn selected_slot(&self) -> Option<usize> {
        self.world.ware_slots().nth(self.cursor)
    }

    fn click_selected(&mut self) {
        let Some(container) = self.world.container().cloned() else {
            return;
        };
        let Some(slot) = self.selected_slot() else {
            return;
        };
        let Some(item) = container.item(slot) else {
            return;
        };

        let kind = if self.shift_held {
            ClickKind::QuickMove
        } else {
            ClickKind::Right
        };
        let response = self.bulk.on_slot_clicked(SlotClick {
            slot,
            item,
            container: &container,
            kind,
            modifier_held: self.shift_held,
        });

        match response.outcome {
            Some(GestureOutcome::Created { remaining }) => self
                .log
                .info(format!("Bulk buying {remaining} × {}", item.plain_name())),
            Some(GestureOutcome::Extended { remaining }) => {
                self.log.info(format!("Bulk buy queue now {remaining}"))
            }
            Some(GestureOutcome::Ignored) => self
                .log
                .error("Finish or cancel the current bulk purchase first."),
            None => {}
        }

        if !response.cancel_default {
            self.outbox.push(PendingClick {
                slot,
                container_id: container.id,
                click: ClickKind::Right,
            });
            self.settle_outbox();
        }
    }

    fn adjust_batch_size(&mut self, delta: i64) -> Result<()> {
        let current = self.bulk.config().snapshot();
        let batch_size =
            (i64::from(current.batch_size) + delta).clamp(1, i64::from(MAX_BATCH_SIZE));
        let updated = AppConfig {
            batch_size: u32::try_from(batch_size).context("batch size out of range")?,
            ..current
        };
        self.bulk.config().update(updated)?;
        info!(batch_size = updated.batch_size, "Batch size changed");
        Ok(())
    }

    fn cycle_speed(&mut self) -> Result<()> {
        let current = self.bulk.config().snapshot();
        let updated = AppConfig {
            speed: current.speed.next(),
            ..current
        };
        self.bulk.config().update(updated)?;
        info!(speed = updated.speed.label(), "Bulk buy speed changed");
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(10),
                Constraint::Length(1),
            ])
            .split(frame.size());

        self.render_header(frame, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(rows[1]);
        self.render_wares(frame, columns[0]);
        self.render_tooltip(frame, columns[1]);
        self.render_sidebar(frame, columns[2]);

        self.render_log(frame, rows[2]);
        self.render_help(frame, rows[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let config = self.bulk.config().snapshot();
        let title = self
            .world
            .container()
            .and_then(|container| container.title_item())
            .map(|item| styled_line(&item.name))
            .unwrap_or_else(|| Line::from("Shop closed"));
        let shift = if self.shift_held {
            Span::styled(" SHIFT ", Style::default().fg(Color::Black).bg(Color::Yellow))
        } else {
            Span::styled(" shift ", Style::default().fg(Color::DarkGray))
        };

        let mut spans = title.spans;
        spans.push(Span::raw(format!(
            "   Balance: {}²   Batch: {}   Speed: {} ({} ticks)   Tick: {}   ",
            self.world.balance(),
            config.batch_size,
            config.speed.label(),
            config.speed.ticks_delay(),
            self.game_time
        )));
        spans.push(shift);

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("Bulk Buy"));
        frame.render_widget(paragraph, area);
    }

    fn render_wares(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Wares");
        let Some(container) = self.world.container() else {
            let paragraph = Paragraph::new("Press o to open the shop.").block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let items: Vec<ListItem> = self
            .world
            .ware_slots()
            .filter_map(|slot| container.item(slot))
            .map(|item| ListItem::new(styled_line(&item.name)))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.cursor));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_tooltip(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Tooltip");
        let container = self.world.container();
        let item = container
            .zip(self.selected_slot())
            .and_then(|(container, slot)| container.item(slot));
        let lines: Vec<Line> = match (container, item) {
            (Some(container), Some(item)) => self
                .bulk
                .on_tooltip(
                    container,
                    item,
                    &item.lore,
                    self.shift_held,
                    self.world.balance(),
                )
                .iter()
                .map(|line| styled_line(line))
                .collect(),
            _ => vec![Line::from("Nothing selected")],
        };
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(3)])
            .split(area);

        let mut status_lines = Vec::new();
        if !self.widget_visible {
            status_lines.push(Line::from("Not a shop."));
        } else if let Some(status) = self.bulk.status() {
            let price = |value: Option<u64>| {
                value.map_or_else(|| "unknown".to_string(), |value| format!("{value}²"))
            };
            status_lines.push(Line::from(format!("Buying: {}", status.item_name)));
            status_lines.push(Line::from(format!("Slot: {}", status.slot)));
            status_lines.push(Line::from(format!("Remaining: {}", status.remaining)));
            status_lines.push(Line::from(format!("Unit price: {}", price(status.unit_price))));
            status_lines.push(Line::from(format!("Total: {}", price(status.total_cost))));
        } else {
            status_lines.push(Line::from("Idle. Shift-click a ware to bulk buy."));
        }
        let status = Paragraph::new(status_lines)
            .block(Block::default().borders(Borders::ALL).title("Bulk Purchase"))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, parts[0]);

        let bag: Vec<Line> = self
            .world
            .bag()
            .iter()
            .map(|(name, count)| {
                let mut line = styled_line(name);
                line.spans.push(Span::raw(format!(" × {count}")));
                line
            })
            .collect();
        let bag = Paragraph::new(bag).block(Block::default().borders(Borders::ALL).title("Bag"));
        frame.render_widget(bag, parts[1]);
    }

    fn render_log(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let mut lines: Vec<Line> = self
            .log
            .entries()
            .rev()
            .take(visible)
            .map(|entry| {
                let color = match entry.level {
                    LogLevel::Info => Color::Gray,
                    LogLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled(
                        entry.at.format("%H:%M:%S ").to_string(),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(entry.message.clone(), Style::default().fg(color)),
                ])
            })
            .collect();
        lines.reverse();
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Messages"));
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = "↑/↓ select  Enter buy  Tab shift  +/- batch  s speed  o open  Esc close  q quit";
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            area,
        );
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
        match event::poll(INPUT_POLL) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.is_closed() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}
