//! Remote client round-trips against a real server on an ephemeral port.

use assert_matches::assert_matches;
use product_grid::client::{ProductApi, RemoteProductClient};
use product_grid::grid::{GridController, RowKey, Severity};
use product_grid::model::{NewProduct, Product};
use product_grid::state::AppState;
use product_grid::{ClientError, ServerConfig, api, health};
use reqwest::StatusCode;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn spawn_server(dir: &TempDir) -> String {
    let config = ServerConfig {
        data_file: dir.path().join("products.json"),
        http_bind_address: "127.0.0.1:0".parse().unwrap(),
    };
    let state = Arc::new(AppState::new(Arc::new(config)).unwrap());
    let app = api::router(state.clone()).merge(health::router(state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn candidate(name: &str, reference: &str, price: f64) -> NewProduct {
    NewProduct {
        id: None,
        name: name.to_string(),
        reference: reference.to_string(),
        price,
        rating: 2,
    }
}

#[tokio::test]
async fn full_crud_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let client = RemoteProductClient::new(spawn_server(&dir).await);

    assert!(client.fetch_all().await.unwrap().is_empty());

    let created = client.create(&candidate("A", "R1", 10.5)).await.unwrap();
    assert_eq!(created.id, 1);

    let updated = client
        .update(&Product {
            price: 12.0,
            ..created.clone()
        })
        .await
        .unwrap();
    assert_eq!(updated.price, 12.0);

    let listed = client.fetch_all().await.unwrap();
    assert_eq!(listed, vec![updated]);

    client.delete(created.id).await.unwrap();
    assert!(client.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_2xx_surfaces_as_typed_status_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = RemoteProductClient::new(spawn_server(&dir).await);

    let ghost = Product {
        id: 42,
        name: "ghost".into(),
        reference: "R42".into(),
        price: 1.0,
        rating: 0,
    };
    let error = client.update(&ghost).await.unwrap_err();
    assert_matches!(
        error,
        ClientError::Status { status, ref message }
            if status == StatusCode::NOT_FOUND
            && message.as_deref() == Some("Product not found")
    );
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Reserved port nobody is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RemoteProductClient::new(format!("http://{addr}"));
    let error = client.fetch_all().await.unwrap_err();
    assert_matches!(error, ClientError::Transport(_));
}

#[tokio::test]
async fn grid_against_real_server_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_server(&dir).await;

    // Seed one record through a separate client.
    let seeder = RemoteProductClient::new(base.clone());
    seeder.create(&candidate("A", "R1", 10.0)).await.unwrap();

    let mut grid = GridController::new(RemoteProductClient::new(base));
    grid.load().await.unwrap();
    let toasts = grid.take_toasts();
    assert_eq!(toasts[0].severity, Severity::Info);
    assert_eq!(grid.rows().len(), 1);

    let draft = grid.add_row();
    let committed = grid
        .commit(
            draft,
            product_grid::grid::RowFields {
                name: "B".into(),
                reference: "R2".into(),
                price: 5.0,
                rating: 4,
            },
        )
        .await
        .unwrap();
    assert_eq!(committed, RowKey::Persisted(2));

    let on_server = seeder.fetch_all().await.unwrap();
    assert_eq!(on_server.len(), 2);

    grid.delete_row(committed).await.unwrap();
    assert_eq!(seeder.fetch_all().await.unwrap().len(), 1);
}
