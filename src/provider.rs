use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use reqwest::StatusCode;
use serde::{
    Deserialize,
    Serialize,
};

/// Parameters for a state-changing contract call. `coins` is attached value
/// in nano-MAS.
#[derive(Clone, Debug)]
pub struct CallRequest {
    pub contract_address: String,
    pub function_name: String,
    pub parameter: Option<Vec<u8>>,
    pub coins: u64,
}

/// Parameters for a read-only contract call.
#[derive(Clone, Debug)]
pub struct ReadRequest {
    pub contract_address: String,
    pub function_name: String,
    pub parameter: Option<Vec<u8>>,
}

/// The wallet daemon surface this client depends on. Exactly the operations
/// the external provider exposes; nothing in this crate implements wallet
/// key management itself.
pub trait WalletProvider {
    fn is_connected(&self) -> impl Future<Output = Result<bool>>;
    fn connect(&self) -> impl Future<Output = Result<Vec<String>>>;
    fn disconnect(&self) -> impl Future<Output = Result<()>>;
    fn get_accounts(&self) -> impl Future<Output = Result<Vec<String>>>;
    fn get_balance(&self, address: &str) -> impl Future<Output = Result<String>>;
    fn call_smart_contract(
        &self,
        request: CallRequest,
    ) -> impl Future<Output = Result<String>>;
    fn read_smart_contract(
        &self,
        request: ReadRequest,
    ) -> impl Future<Output = Result<String>>;
}

/// HTTP client for a locally running wallet daemon (Massa Station style).
#[derive(Clone)]
pub struct StationProvider {
    base_url: String,
    http: reqwest::Client,
}

impl StationProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .build()
            .wrap_err("failed to build HTTP client for wallet daemon")?;
        Ok(Self { base_url, http })
    }

    fn unreachable_error(err: reqwest::Error) -> color_eyre::eyre::Report {
        if err.is_connect() {
            eyre!("Wallet daemon not reachable. Is Massa Station running?")
        } else {
            color_eyre::eyre::Report::from(err).wrap_err("wallet daemon request failed")
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(Self::unreachable_error)?;
        Self::decode_response(res).await
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Self::unreachable_error)?;
        Self::decode_response(res).await
    }

    async fn decode_response<T: for<'de> Deserialize<'de>>(
        res: reqwest::Response,
    ) -> Result<T> {
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .wrap_err("failed to read wallet daemon response body")?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(eyre!("wallet daemon responded with {status}: {body}"));
        }
        serde_json::from_slice(&bytes).wrap_err("invalid wallet daemon payload")
    }
}

impl WalletProvider for StationProvider {
    async fn is_connected(&self) -> Result<bool> {
        let dto: ConnectedDto = self.get_json("/wallet/connected").await?;
        Ok(dto.connected)
    }

    async fn connect(&self) -> Result<Vec<String>> {
        let dto: AccountsDto = self.post_json("/wallet/connect", &()).await?;
        Ok(dto.accounts)
    }

    async fn disconnect(&self) -> Result<()> {
        let url = format!("{}/wallet/disconnect", self.base_url);
        let res = self
            .http
            .post(url)
            .send()
            .await
            .map_err(Self::unreachable_error)?;
        let status = res.status();
        if !status.is_success() && status != StatusCode::NO_CONTENT {
            return Err(eyre!("wallet daemon responded with {status} on disconnect"));
        }
        Ok(())
    }

    async fn get_accounts(&self) -> Result<Vec<String>> {
        let dto: AccountsDto = self.get_json("/wallet/accounts").await?;
        Ok(dto.accounts)
    }

    async fn get_balance(&self, address: &str) -> Result<String> {
        let dto: BalanceDto = self
            .get_json(&format!("/wallet/balance/{address}"))
            .await?;
        Ok(dto.final_balance)
    }

    async fn call_smart_contract(&self, request: CallRequest) -> Result<String> {
        let body = CallDto {
            contract_address: request.contract_address,
            function_name: request.function_name,
            parameter: request.parameter.as_deref().map(hex::encode),
            coins: request.coins.to_string(),
        };
        let dto: OperationDto = self.post_json("/contract/call", &body).await?;
        Ok(dto.operation_id)
    }

    async fn read_smart_contract(&self, request: ReadRequest) -> Result<String> {
        let body = ReadDto {
            contract_address: request.contract_address,
            function_name: request.function_name,
            parameter: request.parameter.as_deref().map(hex::encode),
        };
        let dto: ReadResultDto = self.post_json("/contract/read", &body).await?;
        Ok(dto.result)
    }
}

#[derive(Deserialize)]
struct ConnectedDto {
    connected: bool,
}

#[derive(Deserialize)]
struct AccountsDto {
    accounts: Vec<String>,
}

#[derive(Deserialize)]
struct BalanceDto {
    final_balance: String,
}

#[derive(Serialize)]
struct CallDto {
    contract_address: String,
    function_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter: Option<String>,
    coins: String,
}

#[derive(Serialize)]
struct ReadDto {
    contract_address: String,
    function_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter: Option<String>,
}

#[derive(Deserialize)]
struct OperationDto {
    operation_id: String,
}

#[derive(Deserialize)]
struct ReadResultDto {
    result: String,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::{
        collections::HashMap,
        sync::Mutex,
    };

    /// Scriptable in-memory provider for session and client tests.
    pub struct MockProvider {
        pub available: bool,
        pub accounts: Vec<String>,
        pub balances: HashMap<String, String>,
        pub report_connected: bool,
        pub fail_disconnect: bool,
        pub fail_get_accounts: bool,
        pub calls: Mutex<Vec<CallRequest>>,
        pub reads: Mutex<Vec<ReadRequest>>,
        pub next_operation_id: String,
    }

    impl Default for MockProvider {
        fn default() -> Self {
            MockProvider {
                available: true,
                accounts: Vec::new(),
                balances: HashMap::new(),
                report_connected: true,
                fail_disconnect: false,
                fail_get_accounts: false,
                calls: Mutex::new(Vec::new()),
                reads: Mutex::new(Vec::new()),
                next_operation_id: String::from("O1mockoperation"),
            }
        }
    }

    impl MockProvider {
        pub fn unavailable() -> Self {
            MockProvider {
                available: false,
                ..MockProvider::default()
            }
        }

        pub fn with_account(address: &str, balance_nanos: &str) -> Self {
            let mut provider = MockProvider::default();
            provider.accounts.push(address.to_string());
            provider
                .balances
                .insert(address.to_string(), balance_nanos.to_string());
            provider
        }

        fn ensure_available(&self) -> Result<()> {
            if self.available {
                Ok(())
            } else {
                Err(eyre!("Wallet daemon not reachable. Is Massa Station running?"))
            }
        }
    }

    impl WalletProvider for MockProvider {
        async fn is_connected(&self) -> Result<bool> {
            self.ensure_available()?;
            Ok(self.report_connected)
        }

        async fn connect(&self) -> Result<Vec<String>> {
            self.ensure_available()?;
            Ok(self.accounts.clone())
        }

        async fn disconnect(&self) -> Result<()> {
            if self.fail_disconnect {
                return Err(eyre!("provider rejected disconnect"));
            }
            Ok(())
        }

        async fn get_accounts(&self) -> Result<Vec<String>> {
            self.ensure_available()?;
            if self.fail_get_accounts {
                return Err(eyre!("provider rejected account listing"));
            }
            Ok(self.accounts.clone())
        }

        async fn get_balance(&self, address: &str) -> Result<String> {
            self.ensure_available()?;
            self.balances
                .get(address)
                .cloned()
                .ok_or_else(|| eyre!("unknown address {address}"))
        }

        async fn call_smart_contract(&self, request: CallRequest) -> Result<String> {
            self.ensure_available()?;
            self.calls
                .lock()
                .map_err(|_| eyre!("mock call log poisoned"))?
                .push(request);
            Ok(self.next_operation_id.clone())
        }

        async fn read_smart_contract(&self, request: ReadRequest) -> Result<String> {
            self.ensure_available()?;
            self.reads
                .lock()
                .map_err(|_| eyre!("mock read log poisoned"))?
                .push(request);
            Ok(String::new())
        }
    }
}
