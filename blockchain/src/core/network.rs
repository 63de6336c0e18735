// Standard library imports
use std::fmt::{self, Display, Formatter};

// Third party imports
use serde::{Deserialize, Serialize};

/// Loại mạng, đặt tên theo quy ước của web3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Main,
    Morden,
    Ropsten,
    Rinkeby,
    Goerli,
    Kovan,
    /// Mọi network id khác
    Private,
}

impl NetworkType {
    /// Xác định loại mạng từ network id (`net_version`)
    pub fn from_network_id(id: u64) -> Self {
        match id {
            1 => NetworkType::Main,
            2 => NetworkType::Morden,
            3 => NetworkType::Ropsten,
            4 => NetworkType::Rinkeby,
            5 => NetworkType::Goerli,
            42 => NetworkType::Kovan,
            _ => NetworkType::Private,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Main => "main",
            NetworkType::Morden => "morden",
            NetworkType::Ropsten => "ropsten",
            NetworkType::Rinkeby => "rinkeby",
            NetworkType::Goerli => "goerli",
            NetworkType::Kovan => "kovan",
            NetworkType::Private => "private",
        }
    }
}

impl Display for NetworkType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
