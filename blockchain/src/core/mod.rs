pub mod client;
pub mod contract;
pub mod network;

pub use client::{ChainClient, EthersChainClient};
pub use contract::ContractHandle;
pub use network::NetworkType;
