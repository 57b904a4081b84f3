//! Client against a live gateway on an ephemeral port.

use chrono::{TimeZone, Utc};
use sc_01_auth_protocol::SharedKey;
use sc_02_status_gateway::{GatewayConfig, StatusGatewayService, UserConfig};
use sc_client::{ClientError, StatusClient};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TEXT_KEY: &str = "THIS_IS_A_32_BYTE_MINIMUM_SECRET_KEY";

struct LiveGateway {
    addr: SocketAddr,
    shutdown: sc_02_status_gateway::ShutdownHandle,
    task: JoinHandle<Result<(), sc_02_status_gateway::GatewayError>>,
}

impl LiveGateway {
    async fn start(config: GatewayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut service = StatusGatewayService::new(config).unwrap();
        let shutdown = service.shutdown_handle().unwrap();
        let task = tokio::spawn(service.serve(listener));
        Self {
            addr,
            shutdown,
            task,
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    async fn stop(self) {
        self.shutdown.shutdown();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("gateway did not stop")
            .unwrap()
            .unwrap();
    }
}

fn config(expires_year: i32) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.freshness_window = Some(Duration::from_secs(300));
    config.users.push(UserConfig {
        user_id: "user123".into(),
        shared_key: None,
        shared_key_text: Some(TEXT_KEY.into()),
        expires_at: Utc.with_ymd_and_hms(expires_year, 1, 1, 0, 0, 0).unwrap(),
    });
    config
}

fn key() -> SharedKey {
    SharedKey::from_text(TEXT_KEY).unwrap()
}

#[tokio::test]
async fn test_active_subscription_end_to_end() {
    let gateway = LiveGateway::start(config(2099)).await;

    let client = StatusClient::new(gateway.url(), "user123", key()).unwrap();
    let response = client.check_status().await.unwrap();
    assert!(response.active);
    assert_eq!(response.user_id, "user123");
    assert_eq!(response.expires_at, "2099-01-01T00:00:00.000000+00:00");
    assert!((response.server_time - Utc::now().timestamp()).abs() < 60);

    gateway.stop().await;
}

#[tokio::test]
async fn test_expired_subscription_end_to_end() {
    let gateway = LiveGateway::start(config(2001)).await;

    let client = StatusClient::new(gateway.url(), "user123", key()).unwrap();
    let response = client.check_status().await.unwrap();
    assert!(!response.active);

    gateway.stop().await;
}

#[tokio::test]
async fn test_server_rejections_surface_as_status_errors() {
    let gateway = LiveGateway::start(config(2099)).await;

    let wrong_key = StatusClient::new(
        gateway.url(),
        "user123",
        SharedKey::new(vec![7u8; 32]).unwrap(),
    )
    .unwrap();
    match wrong_key.check_status().await {
        Err(ClientError::Status { status, error }) => {
            assert_eq!(status, 401);
            assert_eq!(error, "invalid hmac");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let ghost = StatusClient::new(gateway.url(), "ghost", key()).unwrap();
    match ghost.check_status().await {
        Err(ClientError::Status { status, error }) => {
            assert_eq!(status, 401);
            assert_eq!(error, "unknown user");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let client = StatusClient::new(gateway.url(), "user123", key()).unwrap();
    let stale = Utc::now().timestamp() - 3_600;
    match client.check_status_at(stale).await {
        Err(ClientError::Status { status, error }) => {
            assert_eq!(status, 401);
            assert_eq!(error, "stale request");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    gateway.stop().await;
}

#[tokio::test]
async fn test_unreachable_gateway() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = StatusClient::new(format!("http://{}", addr), "user123", key()).unwrap();
    assert!(matches!(
        client.check_status().await,
        Err(ClientError::Connection(_)) | Err(ClientError::Http(_))
    ));
}
