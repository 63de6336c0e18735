// External imports
use ethers::types::Address;

// Standard library imports
use std::{env, fs, path::Path, str::FromStr};

// Third party imports
use anyhow::{Context, Result};
use dotenv::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Cấu hình toàn cục của tiến trình, đọc từ biến môi trường một lần
static GLOBAL_CONFIG: Lazy<LitionConfig> = Lazy::new(|| match LitionConfig::from_env() {
    Ok(config) => config,
    Err(e) => {
        warn!("Không thể đọc cấu hình từ môi trường, dùng giá trị mặc định: {}", e);
        LitionConfig::default()
    }
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LitionConfig {
    // Kết nối
    pub rpc_url: String,

    // Địa chỉ contract
    pub lition_erc20_token_contract_address: Address,
    pub lition_registry_contract_address: Address,

    // ABI dạng JSON, nếu bỏ trống thì dùng ABI nhúng sẵn
    #[serde(default)]
    pub lition_erc20_abi_path: Option<String>,
    #[serde(default)]
    pub lition_registry_abi_path: Option<String>,

    // Ví
    #[serde(default)]
    pub is_metamask: bool,
    /// Chu kỳ poll `eth_accounts` (ms); `None` thì không theo dõi đổi tài khoản
    #[serde(default = "default_account_poll_interval_ms")]
    pub account_poll_interval_ms: Option<u64>,

    // Logging
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_account_poll_interval_ms() -> Option<u64> {
    Some(1000)
}

impl LitionConfig {
    pub fn new() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            lition_erc20_token_contract_address: Address::zero(),
            lition_registry_contract_address: Address::zero(),
            lition_erc20_abi_path: None,
            lition_registry_abi_path: None,
            is_metamask: false,
            account_poll_interval_ms: default_account_poll_interval_ms(),
            log_level: default_log_level(),
        }
    }

    /// Lấy cấu hình toàn cục
    pub fn global() -> &'static LitionConfig {
        &GLOBAL_CONFIG
    }

    /// Đọc cấu hình từ biến môi trường (và file .env nếu có).
    /// Biến không được đặt sẽ giữ giá trị mặc định.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let mut config = Self::new();

        if let Ok(url) = env::var("LITION_RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(address) = env::var("LITION_ERC20_TOKEN_CONTRACT_ADDRESS") {
            config.lition_erc20_token_contract_address = Address::from_str(&address)
                .with_context(|| format!("Địa chỉ token contract không hợp lệ: {}", address))?;
        }
        if let Ok(address) = env::var("LITION_REGISTRY_CONTRACT_ADDRESS") {
            config.lition_registry_contract_address = Address::from_str(&address)
                .with_context(|| format!("Địa chỉ registry contract không hợp lệ: {}", address))?;
        }
        if let Ok(path) = env::var("LITION_ERC20_ABI_PATH") {
            config.lition_erc20_abi_path = Some(path);
        }
        if let Ok(path) = env::var("LITION_REGISTRY_ABI_PATH") {
            config.lition_registry_abi_path = Some(path);
        }
        if let Ok(flag) = env::var("LITION_IS_METAMASK") {
            config.is_metamask = flag.parse()
                .with_context(|| format!("LITION_IS_METAMASK không hợp lệ: {}", flag))?;
        }
        if let Ok(interval) = env::var("LITION_ACCOUNT_POLL_INTERVAL_MS") {
            let interval: u64 = interval.parse()
                .with_context(|| format!("LITION_ACCOUNT_POLL_INTERVAL_MS không hợp lệ: {}", interval))?;
            // 0 tắt việc theo dõi
            config.account_poll_interval_ms = (interval > 0).then_some(interval);
        }
        if let Ok(level) = env::var("LITION_LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Đọc cấu hình từ file JSON; nếu file chưa tồn tại thì ghi cấu hình mặc định
    pub fn from_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            let default_config = Self::new();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Không thể đọc file cấu hình: {}", path))?;
        let config: LitionConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Không thể parse JSON từ file {}", path))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Không thể tạo thư mục: {:?}", parent))?;
            }
        }

        fs::write(path, json).with_context(|| format!("Không thể ghi file: {}", path))?;
        Ok(())
    }
}

impl Default for LitionConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_file_creates_default() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config").join("lition.json");
        let path_str = path.to_str().unwrap();

        let config = LitionConfig::from_file(path_str).unwrap();
        assert_eq!(config, LitionConfig::new());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("lition.json");
        let path_str = path.to_str().unwrap();

        let mut config = LitionConfig::new();
        config.lition_registry_contract_address =
            Address::from_str("0x1234567890123456789012345678901234567890").unwrap();
        config.lition_erc20_abi_path = Some("abi/erc20.json".to_string());
        config.is_metamask = true;
        config.save_to_file(path_str).unwrap();

        let loaded = LitionConfig::from_file(path_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{
            "rpc_url": "http://localhost:8545",
            "lition_erc20_token_contract_address": "0x0000000000000000000000000000000000000001",
            "lition_registry_contract_address": "0x0000000000000000000000000000000000000002"
        }"#;
        let config: LitionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.lition_registry_abi_path.is_none());
        assert!(!config.is_metamask);
        assert_eq!(config.account_poll_interval_ms, Some(1000));
    }

    // Test duy nhất thay đổi biến môi trường LITION_*
    #[test]
    fn test_from_env() {
        let vars = [
            ("LITION_RPC_URL", "http://10.0.0.5:8545"),
            ("LITION_ERC20_TOKEN_CONTRACT_ADDRESS", "0x0000000000000000000000000000000000000001"),
            ("LITION_REGISTRY_CONTRACT_ADDRESS", "0x0000000000000000000000000000000000000002"),
            ("LITION_REGISTRY_ABI_PATH", "abi/registry.json"),
            ("LITION_IS_METAMASK", "true"),
            ("LITION_ACCOUNT_POLL_INTERVAL_MS", "0"),
            ("LITION_LOG_LEVEL", "debug"),
        ];
        for (key, value) in vars {
            env::set_var(key, value);
        }

        let config = LitionConfig::from_env().unwrap();
        assert_eq!(config.rpc_url, "http://10.0.0.5:8545");
        assert_eq!(config.lition_erc20_token_contract_address, Address::from_low_u64_be(1));
        assert_eq!(config.lition_registry_contract_address, Address::from_low_u64_be(2));
        assert!(config.lition_erc20_abi_path.is_none());
        assert_eq!(config.lition_registry_abi_path.as_deref(), Some("abi/registry.json"));
        assert!(config.is_metamask);
        assert_eq!(config.account_poll_interval_ms, None);
        assert_eq!(config.log_level, "debug");

        env::set_var("LITION_IS_METAMASK", "maybe");
        let error = LitionConfig::from_env().unwrap_err();
        assert!(error.to_string().contains("LITION_IS_METAMASK"));
        env::set_var("LITION_IS_METAMASK", "false");

        env::set_var("LITION_REGISTRY_CONTRACT_ADDRESS", "0x1234");
        assert!(LitionConfig::from_env().is_err());

        for (key, _) in vars {
            env::remove_var(key);
        }
    }
}
