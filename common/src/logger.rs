// Third party imports
use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Cài đặt tracing subscriber cho tiến trình.
///
/// `RUST_LOG` được ưu tiên; nếu không có thì dùng `default_level`.
/// Gọi nhiều lần không lỗi: chỉ lần đầu có hiệu lực.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("Mức log không hợp lệ {}: {}", default_level, e))?;

    // Đã có subscriber thì bỏ qua
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        assert!(init_logging("debug").is_ok());
        assert!(init_logging("info").is_ok());
    }
}
