// External imports
use ethers::types::Address;

// Standard library imports
use std::sync::{
    atomic::{AtomicBool, Ordering},
    RwLock,
};

/// Phiên làm việc của gateway: tài khoản đang hoạt động và trạng thái listener.
///
/// Handler `accountsChanged` là nơi ghi duy nhất ngoài `login`, cập nhật
/// theo kiểu eventually consistent.
#[derive(Debug, Default)]
pub struct Session {
    account: RwLock<Option<Address>>,
    listener_registered: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tài khoản đang hoạt động
    pub fn account(&self) -> Option<Address> {
        match self.account.read() {
            Ok(account) => *account,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_account(&self, account: Option<Address>) {
        match self.account.write() {
            Ok(mut current) => *current = account,
            Err(poisoned) => *poisoned.into_inner() = account,
        }
    }

    /// Đánh dấu listener đã đăng ký. Trả về `true` chỉ ở lần gọi đầu tiên.
    pub fn mark_listener_registered(&self) -> bool {
        !self.listener_registered.swap(true, Ordering::SeqCst)
    }

    pub fn is_listener_registered(&self) -> bool {
        self.listener_registered.load(Ordering::SeqCst)
    }
}
