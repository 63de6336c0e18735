// Internal imports
pub mod abi;
pub mod core;
pub mod registry;

// Re-export các module chính
pub use crate::core::*;
pub use registry::{
    ChainId,
    ChainDynamicDetails,
    ChainStaticDetails,
    LastNotary,
    RegisterChainParams,
    UserDetails,
};
