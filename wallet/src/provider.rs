// External imports
use ethers::{
    providers::{Middleware, ProviderError, RpcError},
    types::Address,
};

// Standard library imports
use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

// Third party imports
use anyhow::Result;
use async_trait::async_trait;
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

/// Mã lỗi JSON-RPC khi node không hỗ trợ phương thức
const METHOD_NOT_FOUND: i64 = -32601;

/// Handler nhận danh sách tài khoản mới khi ví đổi tài khoản
pub type AccountsChangedHandler = Arc<dyn Fn(Vec<Address>) + Send + Sync>;

/// Ví do môi trường bên ngoài cung cấp (MetaMask hoặc node có tài khoản mở khóa)
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Ví có phải MetaMask không
    fn is_metamask(&self) -> bool;

    /// Yêu cầu quyền truy cập tài khoản, trả về danh sách tài khoản
    async fn enable(&self) -> Result<Vec<Address>>;

    /// Đăng ký handler cho sự kiện `accountsChanged`
    fn on_accounts_changed(&self, handler: AccountsChangedHandler);
}

/// WalletProvider dùng JSON-RPC (`eth_requestAccounts` / `eth_accounts`)
pub struct RpcWalletProvider<M> {
    provider: Arc<M>,
    is_metamask: bool,
    handlers: RwLock<Vec<AccountsChangedHandler>>,
}

impl<M: Middleware + 'static> RpcWalletProvider<M> {
    pub fn new(provider: Arc<M>, is_metamask: bool) -> Self {
        Self {
            provider,
            is_metamask,
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Số handler đã đăng ký
    pub fn handler_count(&self) -> usize {
        match self.handlers.read() {
            Ok(handlers) => handlers.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Lấy danh sách tài khoản hiện tại mà không yêu cầu quyền
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.provider.get_accounts().await?)
    }

    /// Phát sự kiện `accountsChanged` tới mọi handler
    pub fn notify_accounts_changed(&self, accounts: Vec<Address>) {
        // Không gọi handler khi đang giữ lock
        let handlers: Vec<AccountsChangedHandler> = match self.handlers.read() {
            Ok(handlers) => handlers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        debug!("Phát accountsChanged tới {} handler", handlers.len());
        for handler in handlers {
            handler(accounts.clone());
        }
    }

    /// Theo dõi `eth_accounts` định kỳ và phát sự kiện khi danh sách thay đổi.
    /// Dùng cho transport không có sự kiện đẩy như HTTP.
    pub fn spawn_account_watcher(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut last: Option<Vec<Address>> = None;

            loop {
                match self.accounts().await {
                    Ok(accounts) => {
                        match &last {
                            Some(previous) if *previous != accounts => {
                                info!("Tài khoản ví đã thay đổi: {:?}", accounts);
                                self.notify_accounts_changed(accounts.clone());
                            }
                            _ => {}
                        }
                        last = Some(accounts);
                    }
                    Err(e) => {
                        warn!("Lỗi khi theo dõi tài khoản ví: {}", e);
                    }
                }

                sleep(interval).await;
            }
        })
    }
}

#[async_trait]
impl<M> WalletProvider for RpcWalletProvider<M>
where
    M: Middleware + 'static,
{
    fn is_metamask(&self) -> bool {
        self.is_metamask
    }

    async fn enable(&self) -> Result<Vec<Address>> {
        let requested: Result<Vec<Address>, _> = self
            .provider
            .provider()
            .request("eth_requestAccounts", ())
            .await;

        match requested {
            Ok(accounts) => Ok(accounts),
            Err(e) if is_method_not_found(&e) => {
                // Node thường không hỗ trợ eth_requestAccounts
                warn!("Node không hỗ trợ eth_requestAccounts, dùng eth_accounts: {}", e);
                self.accounts().await
            }
            // Người dùng từ chối (4001) hoặc lỗi transport: trả về nguyên vẹn
            Err(e) => Err(e.into()),
        }
    }

    fn on_accounts_changed(&self, handler: AccountsChangedHandler) {
        match self.handlers.write() {
            Ok(mut handlers) => handlers.push(handler),
            Err(poisoned) => poisoned.into_inner().push(handler),
        }
    }
}

fn is_method_not_found(error: &ProviderError) -> bool {
    matches!(error.as_error_response(), Some(response) if response.code == METHOD_NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::{JsonRpcError, MockResponse, Provider};
    use std::str::FromStr;
    use std::sync::{atomic::{AtomicUsize, Ordering}, Mutex};

    fn address(value: &str) -> Address {
        Address::from_str(value).unwrap()
    }

    #[tokio::test]
    async fn test_enable_returns_accounts() {
        let (provider, mock) = Provider::mocked();
        let account = address("0x00000000000000000000000000000000000000aa");
        mock.push::<Vec<Address>, _>(vec![account]).unwrap();

        let wallet = RpcWalletProvider::new(Arc::new(provider), true);
        assert!(wallet.is_metamask());
        assert_eq!(wallet.enable().await.unwrap(), vec![account]);
    }

    #[test]
    fn test_notify_reaches_every_handler() {
        let (provider, _mock) = Provider::mocked();
        let wallet = RpcWalletProvider::new(Arc::new(provider), false);

        let calls = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));

        let counter = calls.clone();
        wallet.on_accounts_changed(Arc::new(move |_: Vec<Address>| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let sink = received.clone();
        wallet.on_accounts_changed(Arc::new(move |accounts: Vec<Address>| {
            sink.lock().unwrap().extend(accounts);
        }));
        assert_eq!(wallet.handler_count(), 2);

        let account = address("0x00000000000000000000000000000000000000bb");
        wallet.notify_accounts_changed(vec![account]);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*received.lock().unwrap(), vec![account]);
    }

    fn rpc_error(code: i64, message: &str) -> MockResponse {
        MockResponse::Error(JsonRpcError {
            code,
            message: message.to_string(),
            data: None,
        })
    }

    #[tokio::test]
    async fn test_enable_rejected_by_user() {
        let (provider, mock) = Provider::mocked();
        mock.push_response(rpc_error(4001, "User rejected the request."));

        let wallet = RpcWalletProvider::new(Arc::new(provider), true);
        let error = wallet.enable().await.unwrap_err();

        let provider_error = error.downcast_ref::<ProviderError>().unwrap();
        assert_eq!(provider_error.as_error_response().unwrap().code, 4001);

        // Không có lời gọi eth_accounts sau khi bị từ chối
        mock.assert_request("eth_requestAccounts", ()).unwrap();
        assert!(mock.assert_request("eth_accounts", ()).is_err());
    }

    #[tokio::test]
    async fn test_enable_falls_back_when_method_missing() {
        let (provider, mock) = Provider::mocked();
        let account = address("0x00000000000000000000000000000000000000cc");
        // MockProvider trả response theo thứ tự LIFO
        mock.push::<Vec<Address>, _>(vec![account]).unwrap();
        mock.push_response(rpc_error(METHOD_NOT_FOUND, "the method eth_requestAccounts does not exist"));

        let wallet = RpcWalletProvider::new(Arc::new(provider), false);
        assert_eq!(wallet.enable().await.unwrap(), vec![account]);

        mock.assert_request("eth_requestAccounts", ()).unwrap();
        mock.assert_request("eth_accounts", ()).unwrap();
    }

    #[tokio::test]
    async fn test_account_watcher_notifies_on_change() {
        let (provider, mock) = Provider::mocked();
        let first = address("0x00000000000000000000000000000000000000aa");
        let second = address("0x00000000000000000000000000000000000000bb");
        // Lần poll đầu thấy `first`, lần sau thấy `second`
        mock.push::<Vec<Address>, _>(vec![second]).unwrap();
        mock.push::<Vec<Address>, _>(vec![first]).unwrap();

        let wallet = Arc::new(RpcWalletProvider::new(Arc::new(provider), false));
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        wallet.on_accounts_changed(Arc::new(move |accounts: Vec<Address>| {
            sink.lock().unwrap().push(accounts);
        }));

        let watcher = wallet.clone().spawn_account_watcher(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(200)).await;
        watcher.abort();

        // Hết response thì poll lỗi, không phát thêm sự kiện
        assert_eq!(*received.lock().unwrap(), vec![vec![second]]);
    }
}
