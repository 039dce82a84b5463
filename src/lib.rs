pub mod app;
pub mod client;
pub mod provider;
pub mod session;
pub mod stats;
pub mod ui;
pub mod wallet;
pub mod winners;

pub use client::{Account, VaultClient};
pub use provider::WalletProvider;
pub use wallet::{TransactionState, WalletSession, WalletState};
