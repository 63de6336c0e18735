// Standard library imports
use std::fmt::{self, Display, Formatter};

// Third party imports
use thiserror::Error;

// Internal imports
use crate::amount::TokenAmount;

/// Loại số dư bị khóa trên registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    /// Vesting
    Vesting,
    /// Deposit
    Deposit,
}

impl Display for BalanceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BalanceKind::Vesting => write!(f, "vesting"),
            BalanceKind::Deposit => write!(f, "deposit"),
        }
    }
}

/// Lỗi của gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Không có ví hoặc client tương thích
    #[error("No ethereum compatible client installed")]
    MissingWallet,
    /// Ví cho phép truy cập nhưng không có tài khoản nào
    #[error("User has no wallet accounts")]
    NoAccount,
    /// Số token muốn rút vượt quá số dư trên chain
    #[error("You can withdraw maximum of {max} tokens from {kind}")]
    InsufficientBalance { kind: BalanceKind, max: TokenAmount },
    /// Số lượng token không hợp lệ
    #[error("Invalid token amount: {0}")]
    InvalidAmount(String),
    /// Lỗi ABI
    #[error("ABI error: {0}")]
    Abi(String),
    /// Kết quả trả về từ contract không đúng định dạng
    #[error("Decode error in {method}: {reason}")]
    Decode { method: String, reason: String },
    /// Lỗi cấu hình
    #[error("Config error: {0}")]
    Config(String),
    /// Lỗi từ provider hoặc contract, giữ nguyên
    #[error(transparent)]
    Provider(anyhow::Error),
}

impl From<anyhow::Error> for GatewayError {
    fn from(error: anyhow::Error) -> Self {
        // Lỗi của gateway đi qua tầng provider thì lấy lại nguyên dạng
        match error.downcast::<GatewayError>() {
            Ok(gateway_error) => gateway_error,
            Err(error) => GatewayError::Provider(error),
        }
    }
}

/// Kiểu kết quả của gateway
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Module tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_message() {
        let error = GatewayError::InsufficientBalance {
            kind: BalanceKind::Vesting,
            max: TokenAmount::from_tokens(40),
        };
        assert_eq!(error.to_string(), "You can withdraw maximum of 40 tokens from vesting");
    }

    #[test]
    fn test_provider_error_is_transparent() {
        let error: GatewayError = anyhow::anyhow!("execution reverted").into();
        assert_eq!(error.to_string(), "execution reverted");
        assert!(matches!(error, GatewayError::Provider(_)));
    }

    #[test]
    fn test_gateway_error_survives_anyhow() {
        let wrapped = anyhow::Error::new(GatewayError::Abi("burn".to_string()));
        let error: GatewayError = wrapped.into();
        assert!(matches!(error, GatewayError::Abi(_)));
    }
}
