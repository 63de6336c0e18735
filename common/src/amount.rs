// External imports
use ethers::{
    types::U256,
    utils::{format_units, parse_units},
};

// Standard library imports
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

// Third party imports
use serde::{Deserialize, Serialize};

// Internal imports
use crate::error::{GatewayError, GatewayResult};

/// Số chữ số thập phân của token LIT
pub const TOKEN_DECIMALS: u32 = 18;

/// Số lượng token.
///
/// Giá trị gốc là số nguyên on-chain (đã nhân 10^18); dạng thập phân chỉ dùng
/// để hiển thị và nhập liệu, nên chuyển đổi qua lại không mất mát.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(U256);

impl TokenAmount {
    /// Số lượng bằng 0
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Tạo từ giá trị on-chain
    pub fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Tạo từ số token nguyên
    pub fn from_tokens(tokens: u64) -> Self {
        Self(U256::from(tokens) * U256::exp10(TOKEN_DECIMALS as usize))
    }

    /// Phân tích dạng thập phân, ví dụ "12.5"
    pub fn from_decimal_str(value: &str) -> GatewayResult<Self> {
        let value = value.trim();
        if value.is_empty() || value.starts_with('-') {
            return Err(GatewayError::InvalidAmount(value.to_string()));
        }
        // Không làm tròn phần lẻ nhỏ hơn đơn vị on-chain
        if let Some((_, fraction)) = value.split_once('.') {
            if fraction.len() > TOKEN_DECIMALS as usize {
                return Err(GatewayError::InvalidAmount(format!(
                    "{}: more than {} decimal places",
                    value, TOKEN_DECIMALS
                )));
            }
        }

        let parsed = parse_units(value, TOKEN_DECIMALS)
            .map_err(|e| GatewayError::InvalidAmount(format!("{}: {}", value, e)))?;

        Ok(Self(parsed.into()))
    }

    /// Phân tích dạng hex on-chain, có hoặc không có tiền tố 0x
    pub fn from_hex(value: &str) -> GatewayResult<Self> {
        let digits = value.trim().trim_start_matches("0x").trim_start_matches("0X");
        if digits.is_empty() {
            return Err(GatewayError::InvalidAmount(value.to_string()));
        }

        U256::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| GatewayError::InvalidAmount(format!("{}: {}", value, e)))
    }

    /// Giá trị on-chain
    pub fn raw(&self) -> U256 {
        self.0
    }

    /// Dạng hex on-chain, ví dụ "0xde0b6b3a7640000"
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self.0)
    }

    /// Dạng thập phân rút gọn, ví dụ "12.5"
    pub fn to_decimal_string(&self) -> String {
        match format_units(self.0, TOKEN_DECIMALS) {
            Ok(formatted) => trim_fraction(&formatted),
            Err(_) => self.0.to_string(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(other.0).map(Self)
    }
}

// Bỏ các số 0 thừa ở phần thập phân
fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                integer.to_string()
            } else {
                format!("{}.{}", integer, fraction)
            }
        }
        None => formatted.to_string(),
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal_string())
    }
}

impl FromStr for TokenAmount {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

impl From<U256> for TokenAmount {
    fn from(raw: U256) -> Self {
        Self(raw)
    }
}

impl From<TokenAmount> for U256 {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}
