// External imports
use ethers::{
    abi::Token,
    providers::{Http, Provider},
    types::{Address, Transaction, H256},
};

// Standard library imports
use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

// Third party imports
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info};

// Internal imports
use crate::{
    config::GatewayConfig,
    provider::{RpcWalletProvider, WalletProvider},
    session::Session,
};
use lition_blockchain::{
    abi::{erc20, registry},
    ChainClient,
    ChainDynamicDetails,
    ChainId,
    ChainStaticDetails,
    ContractHandle,
    EthersChainClient,
    LastNotary,
    NetworkType,
    RegisterChainParams,
    UserDetails,
};
use lition_common::{BalanceKind, GatewayError, GatewayResult, LitionConfig, TokenAmount};

/// Hai contract mà gateway đang ràng buộc
#[derive(Debug, Clone)]
struct ContractBindings {
    token: ContractHandle,
    registry: ContractHandle,
}

impl ContractBindings {
    fn from_config(config: GatewayConfig) -> Self {
        Self {
            token: ContractHandle::new(config.token_abi, config.token_address),
            registry: ContractHandle::new(config.registry_abi, config.registry_address),
        }
    }
}

/// Gateway tới ví và hai contract LitionERC20 / LitionRegistry.
///
/// Mọi thao tác cần tài khoản đều tự đăng nhập nếu chưa có tài khoản.
/// Các thao tác đọc-rồi-ghi (`add_to_*`, `withdraw_*`) không nguyên tử:
/// thay đổi on-chain xen giữa lúc đọc và lúc gửi không được phát hiện.
pub struct ContractGateway {
    wallet: Arc<dyn WalletProvider>,
    client: Arc<dyn ChainClient>,
    session: Arc<Session>,
    contracts: RwLock<ContractBindings>,
    account_watcher: Option<JoinHandle<()>>,
}

impl ContractGateway {
    /// Tạo gateway. Thiếu ví hoặc client thì trả về `MissingWallet`
    /// trước khi tạo bất kỳ contract handle nào.
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        client: Option<Arc<dyn ChainClient>>,
        config: GatewayConfig,
    ) -> GatewayResult<Self> {
        let (wallet, client) = match (wallet, client) {
            (Some(wallet), Some(client)) => (wallet, client),
            _ => return Err(GatewayError::MissingWallet),
        };

        Ok(Self {
            wallet,
            client,
            session: Arc::new(Session::new()),
            contracts: RwLock::new(ContractBindings::from_config(config)),
            account_watcher: None,
        })
    }

    /// Tạo gateway dùng JSON-RPC tới `rpc_url` trong cấu hình.
    ///
    /// Nếu `account_poll_interval_ms` được đặt, một task theo dõi `eth_accounts`
    /// được khởi chạy để phát sự kiện đổi tài khoản; khi đó phải gọi bên trong
    /// tokio runtime. Task dừng khi gateway bị drop.
    pub fn connect(config: &LitionConfig) -> GatewayResult<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| GatewayError::Config(format!("RPC URL không hợp lệ {}: {}", config.rpc_url, e)))?;
        let provider = Arc::new(provider);

        let rpc_wallet = Arc::new(RpcWalletProvider::new(provider.clone(), config.is_metamask));
        let wallet: Arc<dyn WalletProvider> = rpc_wallet.clone();
        let client: Arc<dyn ChainClient> = Arc::new(EthersChainClient::new(provider));

        let mut gateway = Self::new(Some(wallet), Some(client), GatewayConfig::from_config(config)?)?;

        if let Some(interval_ms) = config.account_poll_interval_ms {
            if Handle::try_current().is_err() {
                return Err(GatewayError::Config(
                    "Theo dõi tài khoản cần tokio runtime; đặt account_poll_interval_ms = None để tắt".to_string(),
                ));
            }
            info!("Theo dõi tài khoản ví mỗi {} ms", interval_ms);
            gateway.account_watcher = Some(rpc_wallet.spawn_account_watcher(Duration::from_millis(interval_ms)));
        }

        Ok(gateway)
    }

    /// Ví có phải MetaMask không
    pub fn has_wallet(&self) -> bool {
        self.wallet.is_metamask()
    }

    /// Tài khoản đang hoạt động, nếu đã đăng nhập
    pub fn active_account(&self) -> Option<Address> {
        self.session.account()
    }

    /// Task theo dõi đổi tài khoản có đang chạy không
    pub fn is_watching_accounts(&self) -> bool {
        self.account_watcher
            .as_ref()
            .map_or(false, |watcher| !watcher.is_finished())
    }

    /// Yêu cầu quyền truy cập tài khoản và lưu tài khoản đầu tiên.
    /// Listener `accountsChanged` chỉ được đăng ký một lần.
    pub async fn login(&self) -> GatewayResult<Address> {
        let accounts = self.wallet.enable().await?;
        let account = *accounts.first().ok_or(GatewayError::NoAccount)?;

        self.session.set_account(Some(account));
        info!("Đăng nhập với tài khoản {:?}", account);

        if self.session.mark_listener_registered() {
            let session = Arc::downgrade(&self.session);
            self.wallet.on_accounts_changed(Arc::new(move |accounts: Vec<Address>| {
                if let Some(session) = session.upgrade() {
                    let account = accounts.first().copied();
                    info!("Tài khoản ví đổi thành {:?}", account);
                    session.set_account(account);
                }
            }));
        }

        Ok(account)
    }

    /// Ràng buộc lại hai contract; không ảnh hưởng tài khoản đang hoạt động
    pub fn reinitialize(&self, config: GatewayConfig) {
        let bindings = ContractBindings::from_config(config);
        debug!(
            token = ?bindings.token.address(),
            registry = ?bindings.registry.address(),
            "Ràng buộc lại contract"
        );

        match self.contracts.write() {
            Ok(mut contracts) => *contracts = bindings,
            Err(poisoned) => *poisoned.into_inner() = bindings,
        }
    }

    pub fn token_address(&self) -> Address {
        self.bindings().token.address()
    }

    pub fn registry_address(&self) -> Address {
        self.bindings().registry.address()
    }

    pub async fn get_network_type(&self) -> GatewayResult<NetworkType> {
        self.ensure_authenticated().await?;
        Ok(self.client.get_network_type().await?)
    }

    pub async fn get_transaction(&self, tx_hash: H256) -> GatewayResult<Option<Transaction>> {
        self.ensure_authenticated().await?;
        Ok(self.client.get_transaction(tx_hash).await?)
    }

    /// Mint token cho tài khoản đang hoạt động
    pub async fn mint(&self, tokens: TokenAmount) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let token = self.bindings().token;
        self.send(&token, erc20::MINT, vec![Token::Address(account), Token::Uint(tokens.raw())], account)
            .await
    }

    /// Cho phép registry sử dụng `tokens` của tài khoản đang hoạt động
    pub async fn approve(&self, tokens: TokenAmount) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let ContractBindings { token, registry } = self.bindings();
        self.send(
            &token,
            erc20::APPROVE,
            vec![Token::Address(registry.address()), Token::Uint(tokens.raw())],
            account,
        )
        .await
    }

    /// Số dư token của tài khoản đang hoạt động
    pub async fn balance_of(&self) -> GatewayResult<TokenAmount> {
        let account = self.ensure_authenticated().await?;
        let token = self.bindings().token;
        let tokens = self.call(&token, erc20::BALANCE_OF, vec![Token::Address(account)]).await?;
        single_amount(erc20::BALANCE_OF, tokens)
    }

    /// Số token tài khoản đang hoạt động đã approve cho registry
    pub async fn allowance(&self) -> GatewayResult<TokenAmount> {
        let account = self.ensure_authenticated().await?;
        let ContractBindings { token, registry } = self.bindings();
        let tokens = self
            .call(
                &token,
                erc20::ALLOWANCE,
                vec![Token::Address(account), Token::Address(registry.address())],
            )
            .await?;
        single_amount(erc20::ALLOWANCE, tokens)
    }

    pub async fn register_chain(&self, params: RegisterChainParams) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let contract = self.bindings().registry;
        self.send(&contract, registry::REGISTER_CHAIN, params.into_tokens(), account).await
    }

    pub async fn get_chain_static_details(&self, chain_id: ChainId) -> GatewayResult<ChainStaticDetails> {
        self.ensure_authenticated().await?;
        let contract = self.bindings().registry;
        let tokens = self
            .call(&contract, registry::GET_CHAIN_STATIC_DETAILS, vec![Token::Uint(chain_id)])
            .await?;
        ChainStaticDetails::from_tokens(tokens)
    }

    pub async fn get_chain_dynamic_details(&self, chain_id: ChainId) -> GatewayResult<ChainDynamicDetails> {
        self.ensure_authenticated().await?;
        let contract = self.bindings().registry;
        let tokens = self
            .call(&contract, registry::GET_CHAIN_DYNAMIC_DETAILS, vec![Token::Uint(chain_id)])
            .await?;
        ChainDynamicDetails::from_tokens(tokens)
    }

    /// Notary gần nhất của chain. Không cần đăng nhập.
    pub async fn get_last_notary(&self, chain_id: ChainId) -> GatewayResult<LastNotary> {
        let contract = self.bindings().registry;
        let tokens = self
            .call(&contract, registry::GET_LAST_NOTARY, vec![Token::Uint(chain_id)])
            .await?;
        LastNotary::from_tokens(tokens)
    }

    /// Thông tin của tài khoản đang hoạt động trong chain
    pub async fn get_user_details(&self, chain_id: ChainId) -> GatewayResult<UserDetails> {
        let account = self.ensure_authenticated().await?;
        self.user_details_of(account, chain_id).await
    }

    async fn user_details_of(&self, account: Address, chain_id: ChainId) -> GatewayResult<UserDetails> {
        let contract = self.bindings().registry;
        let tokens = self
            .call(
                &contract,
                registry::GET_USER_DETAILS,
                vec![Token::Uint(chain_id), Token::Address(account)],
            )
            .await?;
        UserDetails::from_tokens(tokens)
    }

    /// Yêu cầu đặt tổng vesting trong chain thành `tokens`
    pub async fn request_vest_in_chain(&self, chain_id: ChainId, tokens: TokenAmount) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        self.request_balance(BalanceKind::Vesting, account, chain_id, tokens).await
    }

    pub async fn confirm_vest_in_chain(&self, chain_id: ChainId) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let contract = self.bindings().registry;
        self.send(&contract, registry::CONFIRM_VEST_IN_CHAIN, vec![Token::Uint(chain_id)], account)
            .await
    }

    /// Yêu cầu đặt tổng deposit trong chain thành `tokens`
    pub async fn request_deposit_in_chain(&self, chain_id: ChainId, tokens: TokenAmount) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        self.request_balance(BalanceKind::Deposit, account, chain_id, tokens).await
    }

    pub async fn confirm_deposit_withdrawal_from_chain(&self, chain_id: ChainId) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let contract = self.bindings().registry;
        self.send(
            &contract,
            registry::CONFIRM_DEPOSIT_WITHDRAWAL_FROM_CHAIN,
            vec![Token::Uint(chain_id)],
            account,
        )
        .await
    }

    pub async fn start_mining(&self, chain_id: ChainId) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let contract = self.bindings().registry;
        self.send(&contract, registry::START_MINING, vec![Token::Uint(chain_id)], account).await
    }

    pub async fn stop_mining(&self, chain_id: ChainId) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let contract = self.bindings().registry;
        self.send(&contract, registry::STOP_MINING, vec![Token::Uint(chain_id)], account).await
    }

    pub async fn add_to_vest_in_chain(&self, chain_id: ChainId, tokens: TokenAmount) -> GatewayResult<H256> {
        self.increase_balance(BalanceKind::Vesting, chain_id, tokens).await
    }

    pub async fn add_to_deposit_in_chain(&self, chain_id: ChainId, tokens: TokenAmount) -> GatewayResult<H256> {
        self.increase_balance(BalanceKind::Deposit, chain_id, tokens).await
    }

    pub async fn withdraw_vest_in_chain(&self, chain_id: ChainId, tokens: TokenAmount) -> GatewayResult<H256> {
        self.decrease_balance(BalanceKind::Vesting, chain_id, tokens).await
    }

    pub async fn withdraw_deposit_in_chain(&self, chain_id: ChainId, tokens: TokenAmount) -> GatewayResult<H256> {
        self.decrease_balance(BalanceKind::Deposit, chain_id, tokens).await
    }

    // Đọc số dư hiện tại, cộng thêm rồi gửi lại tổng mới.
    // Đọc và gửi dùng cùng một tài khoản dù session đổi ở giữa.
    async fn increase_balance(&self, kind: BalanceKind, chain_id: ChainId, tokens: TokenAmount) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let current = balance_of_kind(kind, &self.user_details_of(account, chain_id).await?);

        let total = current
            .checked_add(tokens)
            .ok_or_else(|| GatewayError::InvalidAmount(format!("{} + {} overflows", current, tokens)))?;

        debug!("Tăng {} trong chain {}: {} -> {}", kind, chain_id, current, total);
        self.request_balance(kind, account, chain_id, total).await
    }

    // Đọc số dư hiện tại, trừ đi rồi gửi lại tổng mới
    async fn decrease_balance(&self, kind: BalanceKind, chain_id: ChainId, tokens: TokenAmount) -> GatewayResult<H256> {
        let account = self.ensure_authenticated().await?;
        let current = balance_of_kind(kind, &self.user_details_of(account, chain_id).await?);

        let remaining = current
            .checked_sub(tokens)
            .ok_or(GatewayError::InsufficientBalance { kind, max: current })?;

        debug!("Giảm {} trong chain {}: {} -> {}", kind, chain_id, current, remaining);
        self.request_balance(kind, account, chain_id, remaining).await
    }

    async fn request_balance(
        &self,
        kind: BalanceKind,
        account: Address,
        chain_id: ChainId,
        total: TokenAmount,
    ) -> GatewayResult<H256> {
        let method = match kind {
            BalanceKind::Vesting => registry::REQUEST_VEST_IN_CHAIN,
            BalanceKind::Deposit => registry::REQUEST_DEPOSIT_IN_CHAIN,
        };
        let contract = self.bindings().registry;
        self.send(&contract, method, vec![Token::Uint(chain_id), Token::Uint(total.raw())], account)
            .await
    }

    /// Trả về tài khoản đang hoạt động, đăng nhập nếu chưa có
    async fn ensure_authenticated(&self) -> GatewayResult<Address> {
        match self.session.account() {
            Some(account) => Ok(account),
            None => self.login().await,
        }
    }

    fn bindings(&self) -> ContractBindings {
        match self.contracts.read() {
            Ok(contracts) => contracts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn call(&self, contract: &ContractHandle, method: &str, args: Vec<Token>) -> GatewayResult<Vec<Token>> {
        debug!(contract = ?contract.address(), method, "call");
        Ok(self.client.call(contract, method, args).await?)
    }

    async fn send(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: Vec<Token>,
        from: Address,
    ) -> GatewayResult<H256> {
        debug!(contract = ?contract.address(), method, from = ?from, "send");
        let tx_hash = self.client.send(contract, method, args, from).await?;
        info!("Đã gửi giao dịch {} với hash {:?}", method, tx_hash);
        Ok(tx_hash)
    }
}

impl Drop for ContractGateway {
    fn drop(&mut self) {
        if let Some(watcher) = self.account_watcher.take() {
            watcher.abort();
        }
    }
}

fn balance_of_kind(kind: BalanceKind, details: &UserDetails) -> TokenAmount {
    match kind {
        BalanceKind::Vesting => details.vesting,
        BalanceKind::Deposit => details.deposit,
    }
}

fn single_amount(method: &str, tokens: Vec<Token>) -> GatewayResult<TokenAmount> {
    match tokens.as_slice() {
        [Token::Uint(value)] => Ok(TokenAmount::from_raw(*value)),
        other => Err(GatewayError::Decode {
            method: method.to_string(),
            reason: format!("expected a single uint, got {:?}", other),
        }),
    }
}
