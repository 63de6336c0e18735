// External imports
use ethers::abi::{parse_abi, Abi};

// Standard library imports
use std::{fs, sync::Arc};

// Third party imports
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

// Internal imports
use lition_common::{GatewayError, GatewayResult};

/// Tên các hàm của contract LitionERC20
pub mod erc20 {
    pub const MINT: &str = "mint";
    pub const APPROVE: &str = "approve";
    pub const BALANCE_OF: &str = "balanceOf";
    pub const ALLOWANCE: &str = "allowance";
}

/// Tên các hàm của contract LitionRegistry
pub mod registry {
    pub const REGISTER_CHAIN: &str = "registerChain";
    pub const GET_CHAIN_STATIC_DETAILS: &str = "getChainStaticDetails";
    pub const GET_CHAIN_DYNAMIC_DETAILS: &str = "getChainDynamicDetails";
    pub const GET_USER_DETAILS: &str = "getUserDetails";
    pub const GET_LAST_NOTARY: &str = "getLastNotary";
    pub const REQUEST_VEST_IN_CHAIN: &str = "requestVestInChain";
    pub const CONFIRM_VEST_IN_CHAIN: &str = "confirmVestInChain";
    pub const REQUEST_DEPOSIT_IN_CHAIN: &str = "requestDepositInChain";
    pub const CONFIRM_DEPOSIT_WITHDRAWAL_FROM_CHAIN: &str = "confirmDepositWithdrawalFromChain";
    pub const START_MINING: &str = "startMining";
    pub const STOP_MINING: &str = "stopMining";
}

const LITION_ERC20_ABI: &[&str] = &[
    "function name() view returns (string)",
    "function symbol() view returns (string)",
    "function decimals() view returns (uint8)",
    "function totalSupply() view returns (uint256)",
    "function balanceOf(address owner) view returns (uint256)",
    "function allowance(address owner, address spender) view returns (uint256)",
    "function transfer(address to, uint256 value) returns (bool)",
    "function approve(address spender, uint256 value) returns (bool)",
    "function mint(address to, uint256 value) returns (bool)",
];

const LITION_REGISTRY_ABI: &[&str] = &[
    "function registerChain(string description, string initEndpoint, address chainValidator, uint256 requiredVesting, uint256 maxNumOfValidators, uint256 maxNumOfTransactors, bool involvedVestingNotaryCond, bool participationNotaryCond) returns (uint256)",
    "function getChainStaticDetails(uint256 chainId) view returns (string, string, address, uint256, uint256, uint256, bool, bool)",
    "function getChainDynamicDetails(uint256 chainId) view returns (bool, uint256, uint256, uint256, uint256, uint256)",
    "function getUserDetails(uint256 chainId, address user) view returns (uint256, bool, uint256, bool, bool, bool)",
    "function getLastNotary(uint256 chainId) view returns (uint256, uint256)",
    "function requestVestInChain(uint256 chainId, uint256 vesting)",
    "function confirmVestInChain(uint256 chainId)",
    "function requestDepositInChain(uint256 chainId, uint256 deposit)",
    "function confirmDepositWithdrawalFromChain(uint256 chainId)",
    "function startMining(uint256 chainId)",
    "function stopMining(uint256 chainId)",
];

static ERC20_ABI: OnceCell<Arc<Abi>> = OnceCell::new();
static REGISTRY_ABI: OnceCell<Arc<Abi>> = OnceCell::new();

fn parse_embedded(signatures: &[&str]) -> GatewayResult<Arc<Abi>> {
    parse_abi(signatures)
        .map(Arc::new)
        .map_err(|e| GatewayError::Abi(e.to_string()))
}

/// ABI nhúng sẵn của LitionERC20
pub fn lition_erc20_abi() -> GatewayResult<Arc<Abi>> {
    ERC20_ABI.get_or_try_init(|| parse_embedded(LITION_ERC20_ABI)).cloned()
}

/// ABI nhúng sẵn của LitionRegistry
pub fn lition_registry_abi() -> GatewayResult<Arc<Abi>> {
    REGISTRY_ABI.get_or_try_init(|| parse_embedded(LITION_REGISTRY_ABI)).cloned()
}

// Hàm tiện ích để đọc ABI từ file
pub fn read_abi_from_file(file_path: &str) -> Result<Abi> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Không thể đọc file ABI: {}", file_path))?;
    let abi = serde_json::from_str(&content)
        .with_context(|| format!("ABI không hợp lệ trong file {}", file_path))?;
    Ok(abi)
}

/// Đọc ABI từ file nếu có đường dẫn, ngược lại dùng ABI nhúng sẵn
pub fn load_abi(
    file_path: Option<&str>,
    embedded: fn() -> GatewayResult<Arc<Abi>>,
) -> GatewayResult<Arc<Abi>> {
    match file_path {
        Some(path) => read_abi_from_file(path)
            .map(Arc::new)
            .map_err(|e| GatewayError::Config(format!("{:#}", e))),
        None => embedded(),
    }
}
