//! Startup tests
//!
//! The global config can be set once per test binary, so the scenarios run
//! in a single test against the same database file.

use tempfile::TempDir;

use urlshort::config::{StaticConfig, init_config};
use urlshort::runtime::lifetime::shutdown::release_store;
use urlshort::runtime::prepare_server_startup;
use urlshort::storage::MappingStore;

#[test]
fn test_startup_sequence() {
    let dir = TempDir::new().unwrap();

    let mut config = StaticConfig::default();
    config.database.path = dir.path().join("url.db").display().to_string();
    config.database.open_timeout_ms = 200;
    init_config(config);

    let seed = dir.path().join("example.yml");
    std::fs::write(&seed, "- path: /gh\n  url: https://github.com\n").unwrap();

    // 正常启动：打开数据库并导入种子
    let ctx = prepare_server_startup(&seed).expect("startup should succeed");
    assert_eq!(ctx.routes.create_path, "/create");
    assert_eq!(
        ctx.store.lookup("/gh").unwrap().as_deref(),
        Some("https://github.com")
    );

    // 数据库仍被占用：超时后启动失败
    let err = prepare_server_startup(&seed).err().expect("locked database must be fatal");
    assert!(format!("{:#}", err).contains("Database Locked"));
    release_store(ctx.store);

    // 种子文件缺失：启动失败
    let err = prepare_server_startup(&dir.path().join("missing.yml"))
        .err()
        .expect("missing seed must be fatal");
    assert!(format!("{:#}", err).contains("missing.yml"));

    // 种子格式错误：启动失败，已有数据保持不变
    std::fs::write(&seed, "not: [a, list").unwrap();
    let err = prepare_server_startup(&seed)
        .err()
        .expect("malformed seed must be fatal");
    assert!(format!("{:#}", err).contains("Seed Parse Error"));
}
