use crate::{
    client::{
        MIN_DEPOSIT_MAS,
        NANOS_PER_MAS,
        mas_to_nano,
    },
    provider::WalletProvider,
    stats::{
        Odds,
        Position,
        VaultStats,
        compute_odds,
        format_countdown,
        next_draw,
    },
    ui,
    wallet::{
        TransactionState,
        WalletSession,
    },
    winners::{
        Winner,
        WinnersFeed,
    },
};
use chrono::{
    DateTime,
    Utc,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use std::time::Duration;
use tokio::{
    sync::mpsc,
    time,
};
use tracing::{
    error,
    info,
};

pub const DEFAULT_STATION_URL: &str = "http://localhost:8080";
pub const DEFAULT_CONTRACT_ADDRESS: &str =
    "AS12LpYyAjYRJfYhyu7fkrS224gMdLpcyt7pFm5rXwWaMKzfbsz2z";
pub const DEFAULT_REFRESH_MS: u64 = 10_000;
const WINNERS_TICK: Duration = Duration::from_secs(10);
const ERROR_DEPTH: usize = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub station_url: String,
    pub contract_address: String,
    pub state_dir: Option<String>,
    pub refresh_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            station_url: DEFAULT_STATION_URL.to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            state_dir: None,
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_MS),
        }
    }
}

/// Immutable view of the application handed to the renderer.
#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub connected: bool,
    pub connecting: bool,
    pub address: Option<String>,
    /// Wallet balance in nano-MAS, as the provider reports it.
    pub balance: Option<String>,
    pub deposited_nanos: u64,
    pub tickets: u64,
    pub stats: VaultStats,
    pub total_tickets: u64,
    pub odds: Odds,
    pub countdown: String,
    pub winners: Vec<Winner>,
    pub incoming_winner: Option<Winner>,
    pub now: DateTime<Utc>,
    pub tx_pending: bool,
    pub tx_hash: Option<String>,
    pub contract_address: String,
    pub status: String,
    pub errors: Vec<String>,
}

/// Owns all mutable application state. The run loop is the only caller;
/// workers never touch the session directly.
pub struct AppController<P> {
    session: WalletSession<P>,
    transaction: TransactionState,
    winners: WinnersFeed,
    position: Position,
    stats: VaultStats,
    refresh_interval: Duration,
    status: String,
    errors: Vec<String>,
}

impl<P: WalletProvider> AppController<P> {
    pub fn new(session: WalletSession<P>, refresh_interval: Duration) -> Self {
        Self {
            session,
            transaction: TransactionState::default(),
            winners: WinnersFeed::new(Utc::now()),
            position: Position::default(),
            stats: VaultStats::mock(),
            refresh_interval,
            status: String::from("Ready"),
            errors: Vec::new(),
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.errors.clear();
    }

    fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        if self.errors.len() > ERROR_DEPTH {
            let excess = self.errors.len() - ERROR_DEPTH;
            self.errors.drain(..excess);
        }
    }

    fn balance_nanos(&self) -> u64 {
        self.session
            .state()
            .account
            .as_ref()
            .map(|account| account.balance_nanos())
            .unwrap_or(0)
    }

    fn balance_mas(&self) -> f64 {
        self.balance_nanos() as f64 / NANOS_PER_MAS as f64
    }

    /// Local deposit guard mirroring the contract's own checks. `None`
    /// means the amount may be submitted.
    pub fn deposit_error(&self, amount: f64) -> Option<String> {
        if !self.session.state().connected {
            return Some(String::from("Connect a wallet before depositing"));
        }
        if self.transaction.pending {
            return Some(String::from("A transaction is already pending"));
        }
        if amount < MIN_DEPOSIT_MAS {
            return Some(format!("Minimum deposit amount is {MIN_DEPOSIT_MAS} MAS"));
        }
        if amount > self.balance_mas() {
            return Some(String::from("Amount exceeds wallet balance"));
        }
        None
    }

    pub fn withdraw_error(&self, amount: f64) -> Option<String> {
        if !self.session.state().connected {
            return Some(String::from("Connect a wallet before withdrawing"));
        }
        if self.transaction.pending {
            return Some(String::from("A transaction is already pending"));
        }
        if amount <= 0.0 {
            return Some(String::from("Enter an amount greater than zero"));
        }
        if amount > self.position.deposited_mas() {
            return Some(String::from("Amount exceeds your deposited balance"));
        }
        None
    }

    pub async fn connect(&mut self) {
        self.set_status("Connecting wallet...");
        match self.session.connect().await {
            Ok(()) => {
                let shortened = self
                    .session
                    .state()
                    .address
                    .as_deref()
                    .map(crate::client::format_address)
                    .unwrap_or_default();
                self.set_status(format!("Connected as {shortened}"));
            }
            Err(err) => {
                self.set_status("Ready");
                self.push_error(err.to_string());
            }
        }
    }

    pub async fn disconnect(&mut self) {
        match self.session.disconnect().await {
            Ok(()) => self.set_status("Wallet disconnected"),
            Err(err) => {
                self.push_error(format!("Disconnect failed: {err}"));
            }
        }
    }

    pub async fn deposit(&mut self, amount: f64) {
        if let Some(message) = self.deposit_error(amount) {
            self.push_error(message);
            return;
        }
        self.transaction.begin();
        self.set_status(format!("Depositing {amount:.4} MAS..."));
        match self.session.client().deposit(amount).await {
            Ok(tx_hash) => {
                self.position.record_deposit(mas_to_nano(amount));
                self.set_status(format!("Deposit submitted: {tx_hash}"));
                self.transaction.complete(tx_hash);
            }
            Err(err) => {
                error!(%err, amount, "deposit failed");
                self.transaction.fail();
                self.set_status("Ready");
                self.push_error(err.to_string());
            }
        }
    }

    pub async fn withdraw(&mut self, amount: f64) {
        if let Some(message) = self.withdraw_error(amount) {
            self.push_error(message);
            return;
        }
        let shares = mas_to_nano(amount);
        self.transaction.begin();
        self.set_status(format!("Withdrawing {amount:.4} MAS..."));
        match self.session.client().withdraw(shares).await {
            Ok(tx_hash) => {
                self.position.record_withdrawal(shares);
                self.set_status(format!("Withdrawal submitted: {tx_hash}"));
                self.transaction.complete(tx_hash);
            }
            Err(err) => {
                error!(%err, amount, "withdrawal failed");
                self.transaction.fail();
                self.set_status("Ready");
                self.push_error(err.to_string());
            }
        }
    }

    pub async fn refresh_account(&mut self) {
        let was_connected = self.session.state().connected;
        if let Err(err) = self.session.refresh_account().await {
            self.push_error(format!("Account refresh failed: {err}"));
            return;
        }
        if was_connected && !self.session.state().connected {
            self.set_status("Wallet session expired; disconnected");
        }
    }

    pub async fn rehydrate(&mut self) {
        if let Err(err) = self.session.rehydrate().await {
            self.push_error(format!("Session restore failed: {err}"));
            return;
        }
        if self.session.state().connected {
            let shortened = self
                .session
                .state()
                .address
                .as_deref()
                .map(crate::client::format_address)
                .unwrap_or_default();
            self.set_status(format!("Restored session for {shortened}"));
        }
    }

    pub fn tick_winners(&mut self, now: DateTime<Utc>) {
        self.winners.tick(now);
    }

    pub fn build_snapshot(&mut self, now: DateTime<Utc>) -> AppSnapshot {
        self.winners.settle(now);
        let state = self.session.state();
        let total_tickets = self.stats.total_tickets();
        AppSnapshot {
            connected: state.connected,
            connecting: state.connecting,
            address: state.address.clone(),
            balance: state.account.as_ref().map(|a| a.balance.clone()),
            deposited_nanos: self.position.deposited_nanos,
            tickets: self.position.tickets(),
            stats: self.stats,
            total_tickets,
            odds: compute_odds(self.position.tickets(), total_tickets),
            countdown: format_countdown(now, next_draw(now)),
            winners: self.winners.winners().to_vec(),
            incoming_winner: self.winners.incoming().cloned(),
            now,
            tx_pending: self.transaction.pending,
            tx_hash: self.transaction.hash.clone(),
            contract_address: self.session.client().contract_address().to_string(),
            status: self.status.clone(),
            errors: self.errors.clone(),
        }
    }
}

enum RefreshWorkerCommand {
    FetchNow,
    Shutdown,
}

enum WorkerEvent {
    RefreshDue,
    WinnersTick,
}

/// Emits a refresh event on a fixed interval, immediately on `FetchNow`,
/// and stops on `Shutdown` or when either channel end drops.
async fn refresh_worker(
    refresh_interval: Duration,
    mut cmd_rx: mpsc::UnboundedReceiver<RefreshWorkerCommand>,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
) {
    let mut ticker = time::interval(refresh_interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    // the first interval tick fires immediately; skip it
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if event_tx.send(WorkerEvent::RefreshDue).is_err() {
                    break;
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(RefreshWorkerCommand::FetchNow) => {
                        if event_tx.send(WorkerEvent::RefreshDue).is_err() {
                            break;
                        }
                    }
                    Some(RefreshWorkerCommand::Shutdown) | None => break,
                }
            }
        }
    }
}

/// Drives the winners feed simulation. Owned by the run loop; shuts down
/// with the application rather than running unowned.
async fn winners_worker(
    mut cmd_rx: mpsc::UnboundedReceiver<RefreshWorkerCommand>,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
) {
    let mut ticker = time::interval(WINNERS_TICK);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if event_tx.send(WorkerEvent::WinnersTick).is_err() {
                    break;
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(RefreshWorkerCommand::FetchNow) => {}
                    Some(RefreshWorkerCommand::Shutdown) | None => break,
                }
            }
        }
    }
}

pub async fn run_app<P: WalletProvider>(controller: AppController<P>) -> Result<()> {
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    info!("starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(controller, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop<P: WalletProvider>(
    mut controller: AppController<P>,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    controller.rehydrate().await;

    let (refresh_cmd_tx, refresh_cmd_rx) = mpsc::unbounded_channel();
    let (winners_cmd_tx, winners_cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    tokio::spawn(refresh_worker(
        controller.refresh_interval,
        refresh_cmd_rx,
        event_tx.clone(),
    ));
    tokio::spawn(winners_worker(winners_cmd_rx, event_tx));

    let shutdown_workers = |refresh: &mpsc::UnboundedSender<RefreshWorkerCommand>,
                            winners: &mpsc::UnboundedSender<RefreshWorkerCommand>| {
        let _ = refresh.send(RefreshWorkerCommand::Shutdown);
        let _ = winners.send(RefreshWorkerCommand::Shutdown);
    };

    let snapshot = controller.build_snapshot(Utc::now());
    ui::draw(ui_state, &snapshot).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            maybe_event = event_rx.recv() => {
                let Some(worker_event) = maybe_event else {
                    return Err(eyre!("worker channel closed"));
                };
                match worker_event {
                    WorkerEvent::RefreshDue => controller.refresh_account().await,
                    WorkerEvent::WinnersTick => controller.tick_winners(Utc::now()),
                }
                let snapshot = controller.build_snapshot(Utc::now());
                ui::draw(ui_state, &snapshot)
                    .wrap_err("draw after worker event failed")?;
            }
            _ = tokio::signal::ctrl_c() => {
                shutdown_workers(&refresh_cmd_tx, &winners_cmd_tx);
                break;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                let mut request_refresh = false;
                match ev {
                    ui::UserEvent::Quit => {
                        shutdown_workers(&refresh_cmd_tx, &winners_cmd_tx);
                        break;
                    }
                    ui::UserEvent::Redraw => {}
                    ui::UserEvent::Connect => {
                        controller.connect().await;
                        request_refresh = true;
                    }
                    ui::UserEvent::Disconnect => {
                        controller.disconnect().await;
                    }
                    ui::UserEvent::ConfirmDeposit(amount) => {
                        controller.deposit(amount).await;
                        request_refresh = true;
                    }
                    ui::UserEvent::ConfirmWithdraw(amount) => {
                        controller.withdraw(amount).await;
                        request_refresh = true;
                    }
                    ui::UserEvent::RefreshNow => {
                        request_refresh = true;
                    }
                }
                if request_refresh {
                    let _ = refresh_cmd_tx.send(RefreshWorkerCommand::FetchNow);
                }
                let snapshot = controller.build_snapshot(Utc::now());
                ui::draw(ui_state, &snapshot)
                    .wrap_err("draw after input event failed")?;
            }
        }
    }
    Ok(())
}
