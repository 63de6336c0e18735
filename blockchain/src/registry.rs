// External imports
use ethers::{
    abi::Token,
    types::{Address, U256},
};

// Standard library imports
use std::vec::IntoIter;

// Third party imports
use serde::{Deserialize, Serialize};

// Internal imports
use crate::abi::registry;
use lition_common::{GatewayError, GatewayResult, TokenAmount};

/// ID của chain đã đăng ký trên registry
pub type ChainId = U256;

/// Tham số đăng ký chain mới
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterChainParams {
    /// Mô tả chain
    pub description: String,
    /// Endpoint khởi tạo
    pub init_endpoint: String,
    /// Địa chỉ contract validator của chain
    pub validator: Address,
    /// Số token vesting tối thiểu
    pub required_vesting: TokenAmount,
    /// Số validator tối đa
    pub max_num_of_validators: U256,
    /// Số transactor tối đa
    pub max_num_of_transactors: U256,
    /// Điều kiện notary theo vesting
    pub involved_vesting_notary_cond: bool,
    /// Điều kiện notary theo mức tham gia
    pub participation_notary_cond: bool,
}

impl RegisterChainParams {
    /// Chuyển thành tham số gọi `registerChain`
    pub fn into_tokens(self) -> Vec<Token> {
        vec![
            Token::String(self.description),
            Token::String(self.init_endpoint),
            Token::Address(self.validator),
            Token::Uint(self.required_vesting.raw()),
            Token::Uint(self.max_num_of_validators),
            Token::Uint(self.max_num_of_transactors),
            Token::Bool(self.involved_vesting_notary_cond),
            Token::Bool(self.participation_notary_cond),
        ]
    }
}

/// Thông tin tĩnh của chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStaticDetails {
    pub description: String,
    pub init_endpoint: String,
    pub validator: Address,
    pub required_vesting: TokenAmount,
    pub max_num_of_validators: U256,
    pub max_num_of_transactors: U256,
    pub involved_vesting_notary_cond: bool,
    pub participation_notary_cond: bool,
}

/// Thông tin động của chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDynamicDetails {
    pub active: bool,
    pub total_vesting: TokenAmount,
    pub num_of_validators: U256,
    pub num_of_transactors: U256,
    pub last_notary_block: U256,
    pub last_notary_timestamp: U256,
}

/// Thông tin của user trong một chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    /// Số token deposit
    pub deposit: TokenAmount,
    /// Đã được whitelist làm transactor
    pub whitelisted: bool,
    /// Số token vesting
    pub vesting: TokenAmount,
    /// Đang mining
    pub mining: bool,
    pub prev_notary_mined: bool,
    pub second_prev_notary_mined: bool,
}

/// Notary gần nhất của chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastNotary {
    pub block: U256,
    pub timestamp: U256,
}

// Đọc lần lượt các giá trị trả về của một hàm
struct TokenReader {
    method: &'static str,
    tokens: IntoIter<Token>,
}

impl TokenReader {
    fn new(method: &'static str, tokens: Vec<Token>, expected: usize) -> GatewayResult<Self> {
        if tokens.len() != expected {
            return Err(GatewayError::Decode {
                method: method.to_string(),
                reason: format!("expected {} values, got {}", expected, tokens.len()),
            });
        }
        Ok(Self { method, tokens: tokens.into_iter() })
    }

    fn next(&mut self) -> GatewayResult<Token> {
        self.tokens.next().ok_or_else(|| self.error("missing value"))
    }

    fn uint(&mut self) -> GatewayResult<U256> {
        match self.next()? {
            Token::Uint(value) => Ok(value),
            other => Err(self.error(&format!("expected uint, got {:?}", other))),
        }
    }

    fn amount(&mut self) -> GatewayResult<TokenAmount> {
        self.uint().map(TokenAmount::from_raw)
    }

    fn bool(&mut self) -> GatewayResult<bool> {
        match self.next()? {
            Token::Bool(value) => Ok(value),
            other => Err(self.error(&format!("expected bool, got {:?}", other))),
        }
    }

    fn address(&mut self) -> GatewayResult<Address> {
        match self.next()? {
            Token::Address(value) => Ok(value),
            other => Err(self.error(&format!("expected address, got {:?}", other))),
        }
    }

    fn string(&mut self) -> GatewayResult<String> {
        match self.next()? {
            Token::String(value) => Ok(value),
            other => Err(self.error(&format!("expected string, got {:?}", other))),
        }
    }

    fn error(&self, reason: &str) -> GatewayError {
        GatewayError::Decode {
            method: self.method.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl ChainStaticDetails {
    pub fn from_tokens(tokens: Vec<Token>) -> GatewayResult<Self> {
        let mut reader = TokenReader::new(registry::GET_CHAIN_STATIC_DETAILS, tokens, 8)?;
        Ok(Self {
            description: reader.string()?,
            init_endpoint: reader.string()?,
            validator: reader.address()?,
            required_vesting: reader.amount()?,
            max_num_of_validators: reader.uint()?,
            max_num_of_transactors: reader.uint()?,
            involved_vesting_notary_cond: reader.bool()?,
            participation_notary_cond: reader.bool()?,
        })
    }
}

impl ChainDynamicDetails {
    pub fn from_tokens(tokens: Vec<Token>) -> GatewayResult<Self> {
        let mut reader = TokenReader::new(registry::GET_CHAIN_DYNAMIC_DETAILS, tokens, 6)?;
        Ok(Self {
            active: reader.bool()?,
            total_vesting: reader.amount()?,
            num_of_validators: reader.uint()?,
            num_of_transactors: reader.uint()?,
            last_notary_block: reader.uint()?,
            last_notary_timestamp: reader.uint()?,
        })
    }
}

impl UserDetails {
    pub fn from_tokens(tokens: Vec<Token>) -> GatewayResult<Self> {
        let mut reader = TokenReader::new(registry::GET_USER_DETAILS, tokens, 6)?;
        Ok(Self {
            deposit: reader.amount()?,
            whitelisted: reader.bool()?,
            vesting: reader.amount()?,
            mining: reader.bool()?,
            prev_notary_mined: reader.bool()?,
            second_prev_notary_mined: reader.bool()?,
        })
    }

    /// Chuyển ngược thành giá trị trả về của `getUserDetails`
    pub fn into_tokens(self) -> Vec<Token> {
        vec![
            Token::Uint(self.deposit.raw()),
            Token::Bool(self.whitelisted),
            Token::Uint(self.vesting.raw()),
            Token::Bool(self.mining),
            Token::Bool(self.prev_notary_mined),
            Token::Bool(self.second_prev_notary_mined),
        ]
    }
}

impl LastNotary {
    pub fn from_tokens(tokens: Vec<Token>) -> GatewayResult<Self> {
        let mut reader = TokenReader::new(registry::GET_LAST_NOTARY, tokens, 2)?;
        Ok(Self {
            block: reader.uint()?,
            timestamp: reader.uint()?,
        })
    }
}
