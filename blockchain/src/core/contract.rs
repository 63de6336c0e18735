// External imports
use ethers::{
    abi::{Abi, Function, Token},
    types::{Address, Bytes},
};

// Standard library imports
use std::sync::Arc;

// Internal imports
use lition_common::{GatewayError, GatewayResult};

/// Contract đã triển khai: cặp (ABI, địa chỉ) bất biến
#[derive(Debug, Clone)]
pub struct ContractHandle {
    /// ABI của contract
    abi: Arc<Abi>,
    /// Địa chỉ triển khai
    address: Address,
}

impl ContractHandle {
    pub fn new(abi: Arc<Abi>, address: Address) -> Self {
        Self { abi, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Tìm hàm theo tên trong ABI
    pub fn function(&self, method: &str) -> GatewayResult<&Function> {
        self.abi
            .function(method)
            .map_err(|e| GatewayError::Abi(format!("{} ({:?}): {}", method, self.address, e)))
    }

    /// Mã hóa calldata cho lời gọi hàm
    pub fn encode_call(&self, method: &str, args: &[Token]) -> GatewayResult<Bytes> {
        let data = self
            .function(method)?
            .encode_input(args)
            .map_err(|e| GatewayError::Abi(format!("Không thể mã hóa tham số cho {}: {}", method, e)))?;
        Ok(Bytes::from(data))
    }

    /// Giải mã dữ liệu trả về của hàm
    pub fn decode_output(&self, method: &str, data: &[u8]) -> GatewayResult<Vec<Token>> {
        self.function(method)?
            .decode_output(data)
            .map_err(|e| GatewayError::Decode {
                method: method.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{erc20, lition_erc20_abi};
    use ethers::types::U256;
    use std::str::FromStr;

    fn token_handle() -> ContractHandle {
        let address = Address::from_str("0x1234567890123456789012345678901234567890").unwrap();
        ContractHandle::new(lition_erc20_abi().unwrap(), address)
    }

    #[test]
    fn test_encode_call() {
        let handle = token_handle();
        let to = Address::from_str("0x00000000000000000000000000000000000000aa").unwrap();
        let data = handle
            .encode_call(erc20::MINT, &[Token::Address(to), Token::Uint(U256::from(5u64))])
            .unwrap();

        let selector = handle.function(erc20::MINT).unwrap().short_signature();
        assert_eq!(&data[..4], &selector[..]);
        assert_eq!(data.len(), 4 + 32 * 2);
    }

    #[test]
    fn test_encode_wrong_arguments() {
        let handle = token_handle();
        let result = handle.encode_call(erc20::MINT, &[Token::Bool(true)]);
        assert!(matches!(result, Err(GatewayError::Abi(_))));
    }

    #[test]
    fn test_unknown_method() {
        let handle = token_handle();
        assert!(matches!(handle.function("burn"), Err(GatewayError::Abi(_))));
    }

    #[test]
    fn test_decode_output() {
        let handle = token_handle();
        let encoded = ethers::abi::encode(&[Token::Uint(U256::from(42u64))]);
        let tokens = handle.decode_output(erc20::BALANCE_OF, &encoded).unwrap();
        assert_eq!(tokens, vec![Token::Uint(U256::from(42u64))]);

        let result = handle.decode_output(erc20::BALANCE_OF, &[1, 2, 3]);
        assert!(matches!(result, Err(GatewayError::Decode { .. })));
    }
}
