// Re-exports for common crate
pub mod prelude {
    // External types
    pub use ethers::core::types::{Address, H256, U256};

    // Common modules
    pub use crate::amount::{TokenAmount, TOKEN_DECIMALS};
    pub use crate::config::LitionConfig;
    pub use crate::error::*;
}

// Modules paths - tất cả các module trong src
pub mod amount;
pub mod config;
pub mod error;
pub mod logger;

// Re-exports
pub use amount::{TokenAmount, TOKEN_DECIMALS};
pub use config::LitionConfig;
pub use error::{BalanceKind, GatewayError, GatewayResult};
pub use logger::init_logging;
