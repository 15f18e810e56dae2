//! 日志初始化

use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

/// 安装全局 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，否则使用传入的过滤表达式。重复调用不会生效。
pub fn init_tracing(default_filter: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        // 已有其他订阅者时忽略
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init_tracing("warn");
        init_tracing("debug");
        tracing::debug!("logging initialised");
    }
}
