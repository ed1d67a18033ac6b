#![allow(dead_code)]

use std::error::Error;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::Utc;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;

use oauth2_pg_store::models::{Client, Token};
use oauth2_pg_store::ports::{ClientStore, TokenStore};

/// A reachable Postgres: `PG_URI` when set, otherwise a disposable container when
/// `RUN_TESTCONTAINERS=1`. Keep the value alive for the duration of the test.
pub struct TestDatabase {
    pub url: String,
    _node: Option<ContainerAsync<Postgres>>,
}

pub async fn test_database() -> Result<Option<TestDatabase>, Box<dyn Error>> {
    if let Some(url) = std::env::var("PG_URI").ok().filter(|v| !v.trim().is_empty()) {
        return Ok(Some(TestDatabase { url, _node: None }));
    }

    if std::env::var("RUN_TESTCONTAINERS").as_deref() != Ok("1") {
        eprintln!("skipping Postgres test (set PG_URI or RUN_TESTCONTAINERS=1 to run)");
        return Ok(None);
    }

    let node = Postgres::default().start().await?;
    let host = node.get_host().await?;
    let port = node.get_host_port_ipv4(5432).await?;

    Ok(Some(TestDatabase {
        url: format!("postgres://postgres:postgres@{host}:{port}/postgres"),
        _node: Some(node),
    }))
}

fn nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

/// Unique per call so parallel tests never share a table.
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{}", nanos())
}

/// The create / get / remove / get-again law, for each of the three keys.
pub async fn run_token_contract(store: &dyn TokenStore) -> Result<(), Box<dyn Error>> {
    // Code
    let code = unique_name("code");
    store
        .create(&Token::default().with_code(code.clone(), Utc::now(), Duration::from_secs(60)))
        .await?;
    assert_eq!(store.get_by_code(&code).await?.code, code);
    store.remove_by_code(&code).await?;
    assert!(store.get_by_code(&code).await.unwrap_err().is_no_rows());
    store.remove_by_code(&code).await?;

    // Access
    let access = unique_name("access");
    store
        .create(&Token::default().with_access(
            access.clone(),
            Utc::now(),
            Duration::from_secs(60),
        ))
        .await?;
    assert_eq!(store.get_by_access(&access).await?.access, access);
    store.remove_by_access(&access).await?;
    assert!(store.get_by_access(&access).await.unwrap_err().is_no_rows());
    store.remove_by_access(&access).await?;

    // Refresh
    let refresh = unique_name("refresh");
    store
        .create(&Token::default().with_refresh(
            refresh.clone(),
            Utc::now(),
            Duration::from_secs(60),
        ))
        .await?;
    assert_eq!(store.get_by_refresh(&refresh).await?.refresh, refresh);
    store.remove_by_refresh(&refresh).await?;
    assert!(store.get_by_refresh(&refresh).await.unwrap_err().is_no_rows());
    store.remove_by_refresh(&refresh).await?;

    // Empty keys never match, even though most rows hold NULL in two key columns.
    assert!(store.get_by_code("").await.unwrap_err().is_no_rows());
    assert!(store.get_by_access("").await.unwrap_err().is_no_rows());
    assert!(store.get_by_refresh("").await.unwrap_err().is_no_rows());

    // One row can carry several keys at once.
    let token = Token::new(
        "client".to_string(),
        "user".to_string(),
        "http://localhost/cb".to_string(),
        "read".to_string(),
    )
    .with_access(unique_name("pair_access"), Utc::now(), Duration::from_secs(60))
    .with_refresh(unique_name("pair_refresh"), Utc::now(), Duration::from_secs(600));
    store.create(&token).await?;
    let by_refresh = store.get_by_refresh(&token.refresh).await?;
    assert_eq!(by_refresh.access, token.access);
    assert_eq!(by_refresh.user_id, "user");
    store.remove_by_access(&token.access).await?;
    assert!(store.get_by_refresh(&token.refresh).await.unwrap_err().is_no_rows());

    // Keys are unique; absent keys (NULL) are not.
    let dup = unique_name("dup");
    let first = Token::default().with_code(dup.clone(), Utc::now(), Duration::from_secs(60));
    store.create(&first).await?;
    let err = store.create(&first).await.unwrap_err();
    assert!(err.is_unique_violation(), "unexpected error: {err}");
    store.remove_by_code(&dup).await?;

    Ok(())
}

pub async fn run_client_contract(store: &dyn ClientStore) -> Result<(), Box<dyn Error>> {
    // Intentional: an empty id is "no client", not an error.
    assert_eq!(store.get_by_id("").await?, None);

    let id = unique_name("client");
    let client = Client::new(id.clone(), "secret".to_string(), "http://localhost".to_string())
        .with_user_id("user_1".to_string());
    store.create(&client).await?;

    let fetched = store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| std::io::Error::other("client should exist"))?;
    assert_eq!(fetched, client);

    let dup = store.create(&client).await.unwrap_err();
    assert!(dup.is_unique_violation(), "unexpected error: {dup}");

    let rotated = client
        .clone()
        .with_public(true)
        .with_user_id("user_2".to_string());
    let rotated = Client {
        secret: "rotated".to_string(),
        ..rotated
    };
    store.update(&rotated).await?;
    let fetched = store
        .get_by_id(&id)
        .await?
        .ok_or_else(|| std::io::Error::other("client should still exist"))?;
    assert_eq!(fetched, rotated);

    store.delete(&id).await?;
    store.delete(&id).await?;
    assert!(store.get_by_id(&id).await.unwrap_err().is_no_rows());

    Ok(())
}
