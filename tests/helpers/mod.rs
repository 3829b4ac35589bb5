use tracing_subscriber::EnvFilter;

/// 测试日志输出到测试writer，`RUST_LOG`可覆盖默认级别。
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rstream=debug".parse().unwrap()))
        .with_test_writer()
        .with_thread_names(true)
        .with_target(false)
        .compact()
        .try_init();
}
