use std::path::PathBuf;
use uptime_config::{AppConfig, ConfigError};

// 环境变量是进程级共享状态，所有断言放在同一个测试里顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("UPTIME_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("UPTIME_DATA_DIR", "/tmp/uptime-data");
        std::env::set_var("UPTIME_TIMEZONES_CSV", "/srv/tz.csv");
        std::env::set_var("UPTIME_REPORT_WORKERS", "0");
        std::env::set_var("UPTIME_INGEST", "off");
        std::env::set_var("UPTIME_RELOAD_ON_TRIGGER", "false");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(
        config.store_status_csv,
        PathBuf::from("/tmp/uptime-data/store_status.csv")
    );
    assert_eq!(
        config.business_hours_csv,
        PathBuf::from("/tmp/uptime-data/store_business_hours.csv")
    );
    assert_eq!(config.timezones_csv, PathBuf::from("/srv/tz.csv"));
    assert_eq!(config.default_timezone, "America/Chicago");
    assert_eq!(config.report_workers, 1);
    assert!(!config.ingest_enabled);
    assert!(!config.reload_on_trigger);
    assert_eq!(config.ingest_batch_size, 500);

    unsafe {
        std::env::set_var("UPTIME_INGEST_BATCH_SIZE", "many");
    }
    let err = AppConfig::from_env().expect_err("invalid batch size");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "UPTIME_INGEST_BATCH_SIZE"));
}
