use crate::{
    app::AppSnapshot,
    client::format_address,
    stats::{
        format_compact,
        format_mas_nanos,
        format_time_ago,
    },
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEventKind,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::io::stdout;
use tokio::sync::mpsc;
use tracing::warn;

const QUICK_AMOUNTS: [f64; 3] = [1.0, 5.0, 10.0];

pub enum UserEvent {
    Quit,
    Redraw,
    Connect,
    Disconnect,
    ConfirmDeposit(f64),
    ConfirmWithdraw(f64),
    RefreshNow,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Home,
    Vault,
    HowItWorks,
    Verify,
    About,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Home,
        Tab::Vault,
        Tab::HowItWorks,
        Tab::Verify,
        Tab::About,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Vault => "Vault",
            Tab::HowItWorks => "How It Works",
            Tab::Verify => "Verify",
            Tab::About => "About",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug)]
pub struct UiState {
    tab: Tab,
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
    // caches from the last drawn snapshot, for modal interactions
    connected: bool,
    deposit_max: f64,
    withdraw_max: f64,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            tab: Tab::default(),
            mode: Mode::Normal,
            terminal: None,
            connected: false,
            deposit_max: 0.0,
            withdraw_max: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
enum Mode {
    #[default]
    Normal,
    DepositModal(AmountState),
    WithdrawModal(AmountState),
    QuitModal,
}

#[derive(Clone, Debug, Default)]
struct AmountState {
    buffer: String,
}

impl AmountState {
    fn amount(&self) -> f64 {
        self.buffer.parse().unwrap_or(0.0)
    }

    fn push(&mut self, c: char) {
        if c.is_ascii_digit() || (c == '.' && !self.buffer.contains('.')) {
            self.buffer.push(c);
        }
    }

    fn pop(&mut self) {
        self.buffer.pop();
    }

    fn set(&mut self, amount: f64) {
        self.buffer = format!("{amount:.4}");
    }
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<Event>;

/// Reads terminal events on a dedicated thread so the async loop never
/// blocks on stdin.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(%err, "terminal input read failed");
                    break;
                }
            }
        }
    });
    rx
}

pub async fn next_raw_event(events: &mut InputEventReceiver) -> Result<Event> {
    events
        .recv()
        .await
        .ok_or_else(|| eyre!("input thread stopped"))
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // one persistent Terminal preserves buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Maps a raw terminal event to a user intent, resolving modal state
/// locally. `None` means nothing visible changed.
pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    match event {
        Event::Resize(..) => return Some(UserEvent::Redraw),
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            return interpret_key(state, k.code);
        }
        _ => {}
    }
    None
}

fn interpret_key(state: &mut UiState, code: KeyCode) -> Option<UserEvent> {
    match &mut state.mode {
        Mode::DepositModal(amount_state) => match code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let amount = amount_state.amount();
                state.mode = Mode::Normal;
                Some(UserEvent::ConfirmDeposit(amount))
            }
            code => {
                edit_amount(amount_state, code, state.deposit_max);
                Some(UserEvent::Redraw)
            }
        },
        Mode::WithdrawModal(amount_state) => match code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let amount = amount_state.amount();
                state.mode = Mode::Normal;
                Some(UserEvent::ConfirmWithdraw(amount))
            }
            code => {
                edit_amount(amount_state, code, state.withdraw_max);
                Some(UserEvent::Redraw)
            }
        },
        Mode::QuitModal => match code {
            KeyCode::Enter | KeyCode::Char('y') => Some(UserEvent::Quit),
            KeyCode::Esc | KeyCode::Char('n') => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::Normal => match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                state.mode = Mode::QuitModal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Tab | KeyCode::Right => {
                state.tab = state.tab.next();
                Some(UserEvent::Redraw)
            }
            KeyCode::BackTab | KeyCode::Left => {
                state.tab = state.tab.prev();
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                state.tab = Tab::ALL[idx];
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('c') if !state.connected => Some(UserEvent::Connect),
            KeyCode::Char('x') if state.connected => Some(UserEvent::Disconnect),
            KeyCode::Char('d') if state.connected => {
                state.tab = Tab::Vault;
                state.mode = Mode::DepositModal(AmountState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('w') if state.connected => {
                state.tab = Tab::Vault;
                state.mode = Mode::WithdrawModal(AmountState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('r') => Some(UserEvent::RefreshNow),
            _ => None,
        },
    }
}

fn edit_amount(amount_state: &mut AmountState, code: KeyCode, max: f64) {
    match code {
        KeyCode::Backspace => amount_state.pop(),
        KeyCode::Char('m') => amount_state.set(max),
        KeyCode::Up => {
            let next = QUICK_AMOUNTS
                .iter()
                .copied()
                .find(|quick| *quick > amount_state.amount())
                .unwrap_or(QUICK_AMOUNTS[0]);
            amount_state.set(next);
        }
        KeyCode::Down => {
            let prev = QUICK_AMOUNTS
                .iter()
                .rev()
                .copied()
                .find(|quick| *quick < amount_state.amount())
                .unwrap_or(QUICK_AMOUNTS[QUICK_AMOUNTS.len() - 1]);
            amount_state.set(prev);
        }
        KeyCode::Char(c) => amount_state.push(c),
        _ => {}
    }
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    state.connected = snap.connected;
    state.deposit_max = snap
        .balance
        .as_deref()
        .and_then(|b| b.parse::<u64>().ok())
        .map(|nanos| nanos as f64 / 1e9)
        .unwrap_or(0.0);
    state.withdraw_max = snap.deposited_nanos as f64 / 1e9;
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tab bar
            Constraint::Min(12),   // active tab body
            Constraint::Length(5), // status / errors
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_tabs(f, chunks[0], state);
    match state.tab {
        Tab::Home => draw_home(f, chunks[1], snap),
        Tab::Vault => draw_vault(f, chunks[1], snap),
        Tab::HowItWorks => draw_how_it_works(f, chunks[1]),
        Tab::Verify => draw_verify(f, chunks[1], snap),
        Tab::About => draw_about(f, chunks[1]),
    }
    draw_status(f, chunks[2], snap);
    draw_help(f, chunks[3], snap);
    draw_modals(f, state);
}

fn draw_tabs(f: &mut Frame, area: Rect, state: &UiState) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("AutoPrize Vault"));
    f.render_widget(tabs, area);
}

fn draw_home(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(4)])
        .split(area);

    let hero = Paragraph::new(vec![
        Line::from(""),
        Line::styled(
            "The savings account where you can win big",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from("Deposit MAS, earn prize tickets, and keep every coin you"),
        Line::from("put in. Yield from the whole pool funds weekly prizes;"),
        Line::from("your deposit is always yours to withdraw."),
        Line::from(""),
        Line::from("Open the Vault tab to deposit and track your odds."),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(hero, rows[0]);

    draw_stats_bar(f, rows[1], snap);
}

fn draw_vault(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // stats bar
            Constraint::Length(4), // wallet + position
            Constraint::Length(3), // odds meter
            Constraint::Min(4),    // winners feed
        ])
        .split(area);

    draw_stats_bar(f, rows[0], snap);

    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    draw_wallet_panel(f, mid[0], snap);
    draw_position_panel(f, mid[1], snap);

    draw_odds_meter(f, rows[2], snap);
    draw_winners_feed(f, rows[3], snap);
}

fn draw_stats_bar(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let cells = [
        ("Total Saved", format!("{} MAS", format_compact(snap.stats.tvl_mas))),
        (
            "Prize Pool",
            format!("{} MAS", format_compact(snap.stats.prize_pool_mas)),
        ),
        ("Savers", format_compact(snap.stats.participants as f64)),
        ("Next Draw", snap.countdown.clone()),
    ];
    for (rect, (title, value)) in cols.iter().zip(cells) {
        let widget = Paragraph::new(value)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(widget, *rect);
    }
}

fn draw_wallet_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines = Vec::new();
    if snap.connecting {
        lines.push(Line::from("Connecting..."));
    } else if let Some(address) = snap.address.as_deref() {
        lines.push(Line::from(format!("Address: {}", format_address(address))));
        let balance = snap
            .balance
            .as_deref()
            .map(format_mas_nanos)
            .unwrap_or_else(|| String::from("unknown"));
        lines.push(Line::from(format!("Balance: {balance} MAS")));
    } else {
        lines.push(Line::styled(
            "Not connected",
            Style::default().fg(Color::DarkGray),
        ));
        lines.push(Line::from("Press c to connect Massa Station"));
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Wallet"));
    f.render_widget(widget, area);
}

fn draw_position_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let deposited = format_mas_nanos(&snap.deposited_nanos.to_string());
    let lines = vec![
        Line::from(format!("Deposited: {deposited} MAS")),
        Line::from(format!(
            "Tickets: {} of {}",
            snap.tickets, snap.total_tickets
        )),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Your Position"));
    f.render_widget(widget, area);
}

fn draw_odds_meter(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let label = if snap.odds.one_in == 0 {
        String::from("No tickets yet")
    } else {
        format!(
            "1 in {} ({:.2}%)",
            snap.odds.one_in, snap.odds.win_chance_pct
        )
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Winning Odds"))
        .gauge_style(Style::default().fg(Color::Yellow))
        .ratio((snap.odds.progress_pct / 100.0).clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn draw_winners_feed(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines = Vec::new();
    if let Some(winner) = &snap.incoming_winner {
        lines.push(Line::styled(
            format!(
                "NEW WINNER  {}  {:.1} MAS",
                format_address(&winner.address),
                winner.prize_mas
            ),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    for winner in &snap.winners {
        lines.push(Line::from(format!(
            "{}  won {:.1} MAS  {}  ({})",
            format_address(&winner.address),
            winner.prize_mas,
            format_time_ago(snap.now, winner.timestamp),
            format_address(&winner.tx_hash),
        )));
    }
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Recent Winners"));
    f.render_widget(widget, area);
}

fn draw_how_it_works(f: &mut Frame, area: Rect) {
    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::styled("1. Deposit", Style::default().add_modifier(Modifier::BOLD)),
        Line::from("   Deposit MAS into the shared vault. Every whole MAS is"),
        Line::from("   one ticket in the weekly draw."),
        Line::from(""),
        Line::styled("2. Earn", Style::default().add_modifier(Modifier::BOLD)),
        Line::from("   The pooled deposits are put to work in conservative"),
        Line::from("   yield strategies. The yield, not your principal, fills"),
        Line::from("   the prize pool."),
        Line::from(""),
        Line::styled("3. Win", Style::default().add_modifier(Modifier::BOLD)),
        Line::from("   Every Friday one ticket wins the pool. Winners keep"),
        Line::from("   their deposit and the prize."),
        Line::from(""),
        Line::styled(
            "No-loss guarantee: withdraw your full deposit at any time.",
            Style::default().fg(Color::Green),
        ),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title("How It Works"));
    f.render_widget(widget, area);
}

fn draw_verify(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::from("Draws use verifiable randomness published on-chain, so"),
        Line::from("anyone can check that winners were picked fairly."),
        Line::from(""),
        Line::from("Verify the vault contract yourself:"),
        Line::from(""),
        Line::from(format!("  Contract: {}", snap.contract_address)),
        Line::from("  Explorer: https://explorer.massa.net"),
        Line::from(""),
        Line::from("Recent winning draws appear in the Vault tab with their"),
        Line::from("operation ids."),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title("Verify"));
    f.render_widget(widget, area);
}

fn draw_about(f: &mut Frame, area: Rect) {
    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::from("AutoPrize Vault is a prize-linked savings account on the"),
        Line::from("Massa blockchain, inspired by premium bonds and no-loss"),
        Line::from("lotteries."),
        Line::from(""),
        Line::from("Deposits stay fully withdrawable. Only the yield the pool"),
        Line::from("generates is ever at stake, and someone wins it every"),
        Line::from("week."),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title("About"));
    f.render_widget(widget, area);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let widget = if snap.errors.is_empty() {
        let mut lines = Vec::new();
        if snap.status.trim().is_empty() {
            lines.push(Line::from("Ready"));
        } else {
            lines.push(Line::from(snap.status.clone()));
        }
        if snap.tx_pending {
            lines.push(Line::from("Transaction pending..."));
        } else if let Some(hash) = snap.tx_hash.as_deref() {
            lines.push(Line::from(format!("Last operation: {hash}")));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .style(Style::default().fg(Color::Green))
    } else {
        let lines: Vec<Line> = snap
            .errors
            .iter()
            .map(|e| Line::from(e.clone()))
            .collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Errors"))
            .style(Style::default().fg(Color::Red))
    };
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let wallet_keys = if snap.connected {
        "d deposit | w withdraw | x disconnect"
    } else {
        "c connect"
    };
    let help = Paragraph::new(format!(
        "1-5/Tab switch view | {wallet_keys} | r refresh | q quit"
    ))
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    match &state.mode {
        Mode::DepositModal(amount_state) => {
            draw_amount_modal(
                f,
                "Deposit MAS",
                amount_state,
                state.deposit_max,
                "Min 0.01 MAS; amount is attached to the deposit call",
            );
        }
        Mode::WithdrawModal(amount_state) => {
            draw_amount_modal(
                f,
                "Withdraw MAS",
                amount_state,
                state.withdraw_max,
                "Up to your deposited balance",
            );
        }
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            f.render_widget(Clear, area);
            let widget = Paragraph::new("Quit? (y/n)")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Confirm"));
            f.render_widget(widget, area);
        }
        Mode::Normal => {}
    }
}

fn draw_amount_modal(
    f: &mut Frame,
    title: &str,
    amount_state: &AmountState,
    max: f64,
    hint: &str,
) {
    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);
    let entry = if amount_state.buffer.is_empty() {
        String::from("0")
    } else {
        amount_state.buffer.clone()
    };
    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::styled(
            format!("  {entry} MAS"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(format!("  Available: {max:.4} MAS")),
        Line::from(format!("  {hint}")),
        Line::from(""),
        Line::from("  digits/. type | Up/Down 1/5/10 | m max"),
        Line::from("  Enter confirm | Esc cancel"),
    ])
    .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(widget, area);
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crossterm::event::{
        KeyEvent,
        KeyModifiers,
    };

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn connected_state() -> UiState {
        UiState {
            connected: true,
            deposit_max: 5.0,
            withdraw_max: 2.0,
            ..UiState::default()
        }
    }

    #[test]
    fn interpret_event__q_opens_the_quit_modal_before_quitting() {
        // given
        let mut state = UiState::default();

        // when
        let first = interpret_event(&mut state, key(KeyCode::Char('q')));
        let second = interpret_event(&mut state, key(KeyCode::Char('y')));

        // then
        assert!(matches!(first, Some(UserEvent::Redraw)));
        assert!(matches!(second, Some(UserEvent::Quit)));
    }

    #[test]
    fn interpret_event__n_dismisses_the_quit_modal() {
        let mut state = UiState::default();
        interpret_event(&mut state, key(KeyCode::Esc));

        let dismissed = interpret_event(&mut state, key(KeyCode::Char('n')));

        assert!(matches!(dismissed, Some(UserEvent::Redraw)));
        assert!(matches!(state.mode, Mode::Normal));
    }

    #[test]
    fn interpret_event__connect_only_offered_while_disconnected() {
        let mut disconnected = UiState::default();
        let mut connected = connected_state();

        assert!(matches!(
            interpret_event(&mut disconnected, key(KeyCode::Char('c'))),
            Some(UserEvent::Connect)
        ));
        assert!(
            interpret_event(&mut connected, key(KeyCode::Char('c'))).is_none()
        );
        assert!(matches!(
            interpret_event(&mut connected, key(KeyCode::Char('x'))),
            Some(UserEvent::Disconnect)
        ));
    }

    #[test]
    fn interpret_event__deposit_modal_collects_digits_and_confirms() {
        // given
        let mut state = connected_state();
        interpret_event(&mut state, key(KeyCode::Char('d')));
        assert!(matches!(state.mode, Mode::DepositModal(_)));

        // when: type 1.5 and confirm
        interpret_event(&mut state, key(KeyCode::Char('1')));
        interpret_event(&mut state, key(KeyCode::Char('.')));
        interpret_event(&mut state, key(KeyCode::Char('5')));
        let confirmed = interpret_event(&mut state, key(KeyCode::Enter));

        // then
        match confirmed {
            Some(UserEvent::ConfirmDeposit(amount)) => {
                assert!((amount - 1.5).abs() < f64::EPSILON);
            }
            _ => panic!("expected a deposit confirmation"),
        }
        assert!(matches!(state.mode, Mode::Normal));
    }

    #[test]
    fn interpret_event__amount_entry_rejects_a_second_decimal_point() {
        let mut state = connected_state();
        interpret_event(&mut state, key(KeyCode::Char('d')));

        for code in [
            KeyCode::Char('2'),
            KeyCode::Char('.'),
            KeyCode::Char('5'),
            KeyCode::Char('.'),
            KeyCode::Char('1'),
        ] {
            interpret_event(&mut state, key(code));
        }

        match &state.mode {
            Mode::DepositModal(amount_state) => {
                assert_eq!(amount_state.buffer, "2.51");
            }
            _ => panic!("expected the deposit modal to stay open"),
        }
    }

    #[test]
    fn interpret_event__m_fills_in_the_maximum_amount() {
        let mut state = connected_state();
        interpret_event(&mut state, key(KeyCode::Char('w')));

        interpret_event(&mut state, key(KeyCode::Char('m')));
        let confirmed = interpret_event(&mut state, key(KeyCode::Enter));

        match confirmed {
            Some(UserEvent::ConfirmWithdraw(amount)) => {
                assert!((amount - 2.0).abs() < f64::EPSILON);
            }
            _ => panic!("expected a withdraw confirmation"),
        }
    }

    #[test]
    fn interpret_event__quick_amounts_step_through_presets() {
        let mut state = connected_state();
        interpret_event(&mut state, key(KeyCode::Char('d')));

        interpret_event(&mut state, key(KeyCode::Up));
        match &state.mode {
            Mode::DepositModal(s) => assert_eq!(s.buffer, "1.0000"),
            _ => panic!("expected the deposit modal"),
        }

        interpret_event(&mut state, key(KeyCode::Up));
        match &state.mode {
            Mode::DepositModal(s) => assert_eq!(s.buffer, "5.0000"),
            _ => panic!("expected the deposit modal"),
        }
    }

    #[test]
    fn interpret_event__deposit_key_requires_a_connected_wallet() {
        let mut state = UiState::default();

        assert!(interpret_event(&mut state, key(KeyCode::Char('d'))).is_none());
        assert!(matches!(state.mode, Mode::Normal));
    }

    #[test]
    fn interpret_event__tab_keys_cycle_views() {
        let mut state = UiState::default();

        interpret_event(&mut state, key(KeyCode::Tab));
        assert_eq!(state.tab, Tab::Vault);

        interpret_event(&mut state, key(KeyCode::Char('5')));
        assert_eq!(state.tab, Tab::About);

        interpret_event(&mut state, key(KeyCode::Tab));
        assert_eq!(state.tab, Tab::Home);

        interpret_event(&mut state, key(KeyCode::BackTab));
        assert_eq!(state.tab, Tab::About);
    }

    #[test]
    fn tab__next_and_prev_are_inverses() {
        for tab in Tab::ALL {
            assert_eq!(tab.next().prev(), tab);
        }
    }
}
