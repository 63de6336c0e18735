// Module exports
mod session;
pub mod config;
pub mod gateway;
pub mod provider;

// Re-export các component chính
pub use config::GatewayConfig;
pub use gateway::ContractGateway;
pub use provider::{AccountsChangedHandler, RpcWalletProvider, WalletProvider};
pub use session::Session;

// Re-export từ các crate nội bộ
pub use lition_blockchain::{
    abi,
    ChainClient,
    ChainDynamicDetails,
    ChainId,
    ChainStaticDetails,
    EthersChainClient,
    LastNotary,
    NetworkType,
    RegisterChainParams,
    UserDetails,
};
pub use lition_common::{BalanceKind, GatewayError, GatewayResult, TokenAmount};
