//! The `wire` client against a real listener.

use std::sync::Arc;

use server::{app, config::Config, state::State, store::MemoryStore};
use tokio::net::TcpListener;
use wire::{
    ContactForm,
    remote::{ClientError, PortfolioClient},
};

async fn spawn_server(config: Config) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let prefix = config.route_prefix.clone();
    let router = app(State::with_store(config, Arc::new(MemoryStore::new())));

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{address}{prefix}")
}

fn jane() -> ContactForm {
    ContactForm {
        name: "Jane".to_string(),
        email: "jane@x.com".to_string(),
        subject: "Hi".to_string(),
        message: "Test".to_string(),
    }
}

#[tokio::test]
async fn dashboard_sees_what_visitors_did() {
    let base = spawn_server(Config {
        route_prefix: "/make-server-1a91da27".to_string(),
        admin_token: Some("anon".to_string()),
        ..Config::default()
    })
    .await;
    let client = PortfolioClient::new(base).with_api_key("anon");

    client.submit_contact_form(&jane()).await.unwrap();
    client.track_project_view("1", "Game Hub").await;
    client.track_project_view("1", "Game Hub").await;

    let submissions = client.contact_submissions().await.unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].email, "jane@x.com");

    let analytics = client.project_analytics().await.unwrap();
    assert_eq!(analytics.len(), 1);
    assert_eq!(analytics[0].title, "Game Hub");
    assert_eq!(analytics[0].views, 2);

    assert_eq!(client.health().await.unwrap().status, "healthy");
}

#[tokio::test]
async fn rejected_form_keeps_server_message() {
    let client = PortfolioClient::new(spawn_server(Config::default()).await);

    let mut form = jane();
    form.message.clear();

    match client.submit_contact_form(&form).await {
        Err(ClientError::Rejected(message)) => assert_eq!(message, "All fields are required"),
        other => panic!("unexpected result: {other:?}"),
    }

    // still owned by the caller for a retry
    assert_eq!(form.name, "Jane");
}

#[tokio::test]
async fn unreachable_server() {
    // bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = PortfolioClient::new(format!("http://{address}"));

    // tracking swallows the failure
    client.track_project_view("1", "Game Hub").await;

    let error = client.submit_contact_form(&jane()).await.unwrap_err();
    assert!(matches!(error, ClientError::Network(_)));
    assert_eq!(
        error.to_string(),
        "Network error. Please check your connection and try again."
    );
}

#[tokio::test]
async fn missing_admin_token_is_rejected() {
    let base = spawn_server(Config {
        admin_token: Some("anon".to_string()),
        ..Config::default()
    })
    .await;

    let error = PortfolioClient::new(base)
        .contact_submissions()
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Rejected(message) if message == "Unauthorized"));
}
