use crate::{
    client::{
        Account,
        VaultClient,
    },
    provider::WalletProvider,
    session::{
        SessionStore,
        StoredSession,
    },
};
use color_eyre::eyre::Result;
use tracing::warn;

/// Connection state for the single wallet this client drives. Mutated only
/// through [`WalletTransition`]s so every state change has a name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletState {
    pub address: Option<String>,
    pub connected: bool,
    pub connecting: bool,
    pub account: Option<Account>,
}

#[derive(Clone, Debug)]
pub enum WalletTransition {
    ConnectStarted,
    Connected {
        address: String,
        account: Option<Account>,
    },
    ConnectFailed,
    AccountRefreshed(Option<Account>),
    /// Disconnect, failed refresh, and failed rehydration all collapse to
    /// the same empty state.
    Cleared,
}

impl WalletState {
    pub fn apply(self, transition: WalletTransition) -> WalletState {
        match transition {
            WalletTransition::ConnectStarted => WalletState {
                connecting: true,
                ..self
            },
            WalletTransition::Connected { address, account } => WalletState {
                address: Some(address),
                connected: true,
                connecting: false,
                account,
            },
            WalletTransition::ConnectFailed => WalletState {
                connecting: false,
                ..self
            },
            WalletTransition::AccountRefreshed(account) => {
                WalletState { account, ..self }
            }
            WalletTransition::Cleared => WalletState::default(),
        }
    }
}

/// State of the single in-flight transaction. Reset before each operation;
/// `pending` is released on every outcome.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionState {
    pub pending: bool,
    pub hash: Option<String>,
}

impl TransactionState {
    pub fn begin(&mut self) {
        self.pending = true;
        self.hash = None;
    }

    pub fn complete(&mut self, hash: impl Into<String>) {
        self.pending = false;
        self.hash = Some(hash.into());
    }

    pub fn fail(&mut self) {
        self.pending = false;
    }
}

/// Owns the wallet state, the vault client, and the persisted session.
/// There is exactly one writer; rehydrate on startup, then connect,
/// refresh, and disconnect drive every transition.
pub struct WalletSession<P> {
    client: VaultClient<P>,
    store: SessionStore,
    state: WalletState,
}

impl<P: WalletProvider> WalletSession<P> {
    pub fn new(client: VaultClient<P>, store: SessionStore) -> Self {
        Self {
            client,
            store,
            state: WalletState::default(),
        }
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn client(&self) -> &VaultClient<P> {
        &self.client
    }

    fn apply(&mut self, transition: WalletTransition) {
        self.state = self.state.clone().apply(transition);
    }

    /// Connects the wallet and persists {address, connected} on success.
    pub async fn connect(&mut self) -> Result<()> {
        self.apply(WalletTransition::ConnectStarted);
        let address = match self.client.connect_wallet().await {
            Ok(address) => address,
            Err(err) => {
                self.apply(WalletTransition::ConnectFailed);
                return Err(err);
            }
        };
        let account = self.client.account().await.ok().flatten();
        self.apply(WalletTransition::Connected {
            address: address.clone(),
            account,
        });
        self.store.save(&StoredSession {
            address: Some(address),
            connected: true,
        })?;
        Ok(())
    }

    /// Best-effort provider disconnect; local and persisted state are
    /// cleared unconditionally.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Err(err) = self.client.disconnect().await {
            warn!(%err, "provider disconnect failed; clearing local state anyway");
        }
        self.apply(WalletTransition::Cleared);
        self.store.clear()?;
        Ok(())
    }

    /// Re-fetches the account. A provider failure is indistinguishable from
    /// revoked access here, so it collapses to a full logout.
    pub async fn refresh_account(&mut self) -> Result<()> {
        if !self.state.connected {
            return Ok(());
        }
        match self.client.account().await {
            Ok(account) => {
                self.apply(WalletTransition::AccountRefreshed(account));
                Ok(())
            }
            Err(err) => {
                warn!(%err, "account refresh failed; treating wallet as disconnected");
                self.apply(WalletTransition::Cleared);
                self.store.clear()
            }
        }
    }

    /// Re-validates a persisted session against the live provider. Any
    /// failure at any step clears all state; the persisted connected flag
    /// is never trusted on its own.
    pub async fn rehydrate(&mut self) -> Result<()> {
        let stored = self.store.load()?;
        let (Some(address), true) = (stored.address, stored.connected) else {
            return Ok(());
        };
        if !self.client.is_connected().await {
            self.apply(WalletTransition::Cleared);
            return self.store.clear();
        }
        match self.client.account().await {
            Ok(account) => {
                self.apply(WalletTransition::Connected { address, account });
                Ok(())
            }
            Err(err) => {
                warn!(%err, "rehydration account fetch failed; disconnecting");
                self.disconnect().await
            }
        }
    }
}
