use std::net::IpAddr;

use super::{ApiError, Config};

#[test]
fn test_config_default_listens_on_all_interfaces() {
    let config = Config::default();
    assert_eq!(config.host, "0.0.0.0".parse::<IpAddr>().unwrap());
    assert_eq!(config.port, 5050);
    assert_eq!(config.addr(), "0.0.0.0:5050");
}

#[test]
fn test_config_addr_uses_overrides() {
    let config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 8080,
    };
    assert_eq!(config.addr(), "127.0.0.1:8080");
}

#[test]
fn test_bind_error_names_address() {
    let err = ApiError::Bind {
        addr: "127.0.0.1:1".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
    };
    assert!(err.to_string().contains("127.0.0.1:1"));
}

#[tokio::test]
async fn test_run_fails_when_port_is_taken() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let state = super::AppState::new(
        crate::db::FailoverProxy::emulated(),
        crate::db::Models::new(crate::db::DocumentConnection::disconnected()),
    );
    let result = super::run(
        Config {
            host: "127.0.0.1".parse().unwrap(),
            port,
        },
        state,
    )
    .await;

    assert!(matches!(result, Err(ApiError::Bind { .. })));
}
