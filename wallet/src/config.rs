// External imports
use ethers::{abi::Abi, types::Address};

// Standard library imports
use std::sync::Arc;

// Internal imports
use lition_blockchain::abi::{self, lition_erc20_abi, lition_registry_abi};
use lition_common::{GatewayResult, LitionConfig};

/// Bốn tham số ràng buộc contract của gateway.
/// Mặc định lấy từ cấu hình toàn cục, có thể ghi đè từng tham số.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// ABI của LitionERC20
    pub token_abi: Arc<Abi>,
    /// ABI của LitionRegistry
    pub registry_abi: Arc<Abi>,
    /// Địa chỉ LitionERC20
    pub token_address: Address,
    /// Địa chỉ LitionRegistry
    pub registry_address: Address,
}

impl GatewayConfig {
    pub fn new(
        token_abi: Arc<Abi>,
        registry_abi: Arc<Abi>,
        token_address: Address,
        registry_address: Address,
    ) -> Self {
        Self {
            token_abi,
            registry_abi,
            token_address,
            registry_address,
        }
    }

    /// Tạo từ LitionConfig: ABI đọc từ file nếu có, ngược lại dùng ABI nhúng
    pub fn from_config(config: &LitionConfig) -> GatewayResult<Self> {
        let token_abi = abi::load_abi(config.lition_erc20_abi_path.as_deref(), lition_erc20_abi)?;
        let registry_abi = abi::load_abi(config.lition_registry_abi_path.as_deref(), lition_registry_abi)?;

        Ok(Self::new(
            token_abi,
            registry_abi,
            config.lition_erc20_token_contract_address,
            config.lition_registry_contract_address,
        ))
    }

    /// Tạo từ cấu hình toàn cục của tiến trình
    pub fn from_global() -> GatewayResult<Self> {
        Self::from_config(LitionConfig::global())
    }

    /// ABI nhúng với hai địa chỉ cho trước
    pub fn embedded(token_address: Address, registry_address: Address) -> GatewayResult<Self> {
        Ok(Self::new(lition_erc20_abi()?, lition_registry_abi()?, token_address, registry_address))
    }

    pub fn with_token_address(mut self, address: Address) -> Self {
        self.token_address = address;
        self
    }

    pub fn with_registry_address(mut self, address: Address) -> Self {
        self.registry_address = address;
        self
    }

    pub fn with_token_abi(mut self, abi: Arc<Abi>) -> Self {
        self.token_abi = abi;
        self
    }

    pub fn with_registry_abi(mut self, abi: Arc<Abi>) -> Self {
        self.registry_abi = abi;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lition_common::GatewayError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_config_uses_embedded_abis() {
        let mut config = LitionConfig::new();
        config.lition_erc20_token_contract_address = Address::repeat_byte(0x01);
        config.lition_registry_contract_address = Address::repeat_byte(0x02);

        let gateway_config = GatewayConfig::from_config(&config).unwrap();
        assert_eq!(gateway_config.token_address, Address::repeat_byte(0x01));
        assert_eq!(gateway_config.registry_address, Address::repeat_byte(0x02));
        assert!(gateway_config.registry_abi.function("getUserDetails").is_ok());
    }

    #[test]
    fn test_from_config_reads_abi_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("registry.json");
        let json = r#"[{"type":"function","name":"startMining","inputs":[{"name":"chainId","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"}]"#;
        fs::write(&path, json).unwrap();

        let mut config = LitionConfig::new();
        config.lition_registry_abi_path = Some(path.to_str().unwrap().to_string());

        let gateway_config = GatewayConfig::from_config(&config).unwrap();
        assert!(gateway_config.registry_abi.function("startMining").is_ok());
        assert!(gateway_config.registry_abi.function("stopMining").is_err());

        config.lition_registry_abi_path = Some(temp_dir.path().join("missing.json").to_str().unwrap().to_string());
        assert!(matches!(GatewayConfig::from_config(&config), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::embedded(Address::zero(), Address::zero())
            .unwrap()
            .with_registry_address(Address::repeat_byte(0x03));
        assert_eq!(config.registry_address, Address::repeat_byte(0x03));
        assert_eq!(config.token_address, Address::zero());
    }
}
