// External imports
use ethers::{
    abi::Token,
    providers::{Http, Middleware, Provider},
    types::{transaction::eip2718::TypedTransaction, Address, Transaction, TransactionRequest, H256},
};

// Standard library imports
use std::sync::Arc;

// Third party imports
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

// Internal imports
use crate::core::{contract::ContractHandle, network::NetworkType};

/// Trait định nghĩa các phương thức tương tác với node và contract.
///
/// `call` dùng cho truy vấn chỉ đọc, `send` cho giao dịch thay đổi trạng thái
/// (ví/node ký thay cho `from`). Lỗi từ transport được trả về nguyên vẹn:
/// `downcast_ref` về kiểu lỗi của middleware vẫn dùng được.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Lấy loại mạng hiện tại
    async fn get_network_type(&self) -> Result<NetworkType>;

    /// Lấy giao dịch theo hash
    async fn get_transaction(&self, tx_hash: H256) -> Result<Option<Transaction>>;

    /// Gọi hàm chỉ đọc của contract
    async fn call(&self, contract: &ContractHandle, method: &str, args: Vec<Token>) -> Result<Vec<Token>>;

    /// Gửi giao dịch gọi hàm của contract, trả về hash giao dịch
    async fn send(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: Vec<Token>,
        from: Address,
    ) -> Result<H256>;
}

/// ChainClient dùng JSON-RPC qua ethers
#[derive(Debug)]
pub struct EthersChainClient<M> {
    provider: Arc<M>,
}

impl<M: Middleware + 'static> EthersChainClient<M> {
    pub fn new(provider: Arc<M>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Arc<M> {
        self.provider.clone()
    }
}

impl EthersChainClient<Provider<Http>> {
    /// Tạo client từ RPC URL
    pub fn from_url(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("Không thể kết nối đến RPC URL: {}", rpc_url))?;
        Ok(Self::new(Arc::new(provider)))
    }
}

#[async_trait]
impl<M> ChainClient for EthersChainClient<M>
where
    M: Middleware + 'static,
{
    async fn get_network_type(&self) -> Result<NetworkType> {
        let version = self.provider.get_net_version().await?;
        let network_id: u64 = version.trim().parse()
            .with_context(|| format!("Network id không hợp lệ: {}", version))?;

        Ok(NetworkType::from_network_id(network_id))
    }

    async fn get_transaction(&self, tx_hash: H256) -> Result<Option<Transaction>> {
        Ok(self.provider.get_transaction(tx_hash).await?)
    }

    async fn call(&self, contract: &ContractHandle, method: &str, args: Vec<Token>) -> Result<Vec<Token>> {
        let data = contract.encode_call(method, &args)?;
        debug!(contract = ?contract.address(), method, "eth_call");

        let tx: TypedTransaction = TransactionRequest::new()
            .to(contract.address())
            .data(data)
            .into();

        let output = self.provider.call(&tx, None).await.map_err(|e| {
            warn!(contract = ?contract.address(), method, error = %e, "eth_call thất bại");
            e
        })?;

        Ok(contract.decode_output(method, &output)?)
    }

    async fn send(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: Vec<Token>,
        from: Address,
    ) -> Result<H256> {
        let data = contract.encode_call(method, &args)?;
        debug!(contract = ?contract.address(), method, from = ?from, "eth_sendTransaction");

        let tx = TransactionRequest::new()
            .from(from)
            .to(contract.address())
            .data(data);

        let pending = self.provider.send_transaction(tx, None).await.map_err(|e| {
            warn!(contract = ?contract.address(), method, error = %e, "eth_sendTransaction thất bại");
            e
        })?;

        Ok(pending.tx_hash())
    }
}
