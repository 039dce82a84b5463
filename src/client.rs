use crate::provider::{
    CallRequest,
    ReadRequest,
    WalletProvider,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use tracing::{
    error,
    warn,
};

pub const NANOS_PER_MAS: u64 = 1_000_000_000;
/// Smallest deposit the vault contract accepts, in MAS.
pub const MIN_DEPOSIT_MAS: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    /// Balance in nano-MAS, as reported by the provider.
    pub balance: String,
}

impl Account {
    pub fn balance_nanos(&self) -> u64 {
        self.balance.parse::<u64>().unwrap_or_else(|_| {
            warn!(balance = %self.balance, "provider returned a non-integer balance");
            0
        })
    }
}

/// Adapter around the wallet provider for the vault contract. All amount
/// validation here is a local guard; the contract performs its own checks
/// on-chain.
pub struct VaultClient<P> {
    provider: P,
    contract_address: String,
}

impl<P: WalletProvider> VaultClient<P> {
    pub fn new(provider: P, contract_address: impl Into<String>) -> Self {
        Self {
            provider,
            contract_address: contract_address.into(),
        }
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    #[cfg(test)]
    pub(crate) fn provider(&self) -> &P {
        &self.provider
    }

    /// Connects the wallet and returns the first account address.
    pub async fn connect_wallet(&self) -> Result<String> {
        let accounts = match self.provider.connect().await {
            Ok(accounts) => accounts,
            Err(err) => {
                error!(%err, "failed to connect wallet");
                return Err(eyre!(
                    "Failed to connect to the wallet daemon. Please try again."
                ));
            }
        };
        accounts.into_iter().next().ok_or_else(|| {
            eyre!("No accounts found. Please create an account in your wallet.")
        })
    }

    /// First account with its balance, or None when the wallet reports no
    /// accounts. Provider failures surface as errors so callers can decide
    /// whether to treat them as a logout.
    pub async fn account(&self) -> Result<Option<Account>> {
        let accounts = self.provider.get_accounts().await?;
        let Some(address) = accounts.into_iter().next() else {
            return Ok(None);
        };
        let balance = self.provider.get_balance(&address).await?;
        Ok(Some(Account { address, balance }))
    }

    /// Boolean probe; any failure collapses to "not connected".
    pub async fn is_connected(&self) -> bool {
        match self.provider.is_connected().await {
            Ok(connected) => connected,
            Err(err) => {
                warn!(%err, "connection probe failed");
                false
            }
        }
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.provider.disconnect().await
    }

    /// Deposits `amount` MAS into the vault. The amount is attached as coins
    /// on the `deposit` call.
    pub async fn deposit(&self, amount: f64) -> Result<String> {
        if amount < MIN_DEPOSIT_MAS {
            return Err(eyre!("Minimum deposit amount is {MIN_DEPOSIT_MAS} MAS"));
        }
        self.call("deposit", mas_to_nano(amount), None).await
    }

    /// Redeems `shares` (nano-MAS denominated) from the vault.
    pub async fn withdraw(&self, shares: u64) -> Result<String> {
        if shares == 0 {
            return Err(eyre!("Invalid shares amount"));
        }
        self.call("withdraw", 0, Some(shares)).await
    }

    /// Generic contract call; returns the transaction identifier.
    pub async fn call(
        &self,
        function: &str,
        coins: u64,
        param: Option<u64>,
    ) -> Result<String> {
        let request = CallRequest {
            contract_address: self.contract_address.clone(),
            function_name: function.to_string(),
            parameter: param.map(encode_u64),
            coins,
        };
        match self.provider.call_smart_contract(request).await {
            Ok(tx_hash) => Ok(tx_hash),
            Err(err) => {
                error!(%function, %err, "contract call failed");
                Err(eyre!("Transaction failed: {err}"))
            }
        }
    }

    /// Read-only contract call; the raw result string is returned undecoded.
    pub async fn read(&self, function: &str, param: Option<u64>) -> Result<String> {
        let request = ReadRequest {
            contract_address: self.contract_address.clone(),
            function_name: function.to_string(),
            parameter: param.map(encode_u64),
        };
        match self.provider.read_smart_contract(request).await {
            Ok(result) => Ok(result),
            Err(err) => {
                error!(%function, %err, "contract read failed");
                Err(eyre!("Read operation failed: {err}"))
            }
        }
    }
}

/// u64 contract parameters travel as 8 little-endian bytes.
pub fn encode_u64(value: u64) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub fn mas_to_nano(amount: f64) -> u64 {
    (amount * NANOS_PER_MAS as f64).round() as u64
}

pub fn format_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
