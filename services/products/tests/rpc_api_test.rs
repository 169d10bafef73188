//! Product patterns served over a real socket

mod common;

use std::sync::Arc;

use catalog_common::PaginationDefaults;
use catalog_transport::{RpcClient, RpcServer};
use common::InMemoryProductRepository;
use products::api::{
    CREATE_PRODUCT, FIND_ALL_PRODUCTS, FIND_ONE_PRODUCT, ProductRpcService, REMOVE_PRODUCT,
    UPDATE_PRODUCT,
};
use products::application::ProductService;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

async fn start() -> (RpcClient, CancellationToken) {
    let repo = Arc::new(InMemoryProductRepository::default());
    let service = Arc::new(ProductService::new(repo, PaginationDefaults::default()));
    let server = RpcServer::new(Arc::new(ProductRpcService::new(service)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    tokio::spawn(server.serve_with_listener(listener, shutdown.clone()));

    (RpcClient::connect(addr).await.unwrap(), shutdown)
}

#[tokio::test]
async fn test_create_then_fetch() {
    let (mut client, shutdown) = start().await;

    let created = client
        .send_raw(CREATE_PRODUCT, json!({ "name": "Teapot", "price": 24.9 }))
        .await
        .unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["available"], true);

    let fetched = client.send_raw(FIND_ONE_PRODUCT, json!(1)).await.unwrap();
    assert_eq!(fetched, created);

    shutdown.cancel();
}

#[tokio::test]
async fn test_pagination_over_the_wire() {
    let (mut client, shutdown) = start().await;
    for i in 1..=25 {
        client
            .send_raw(CREATE_PRODUCT, json!({ "name": format!("Item {}", i), "price": i }))
            .await
            .unwrap();
    }

    let page = client
        .send_raw(FIND_ALL_PRODUCTS, json!({ "page": 3, "limit": 10 }))
        .await
        .unwrap();
    assert_eq!(page["data"].as_array().unwrap().len(), 5);
    assert_eq!(page["meta"], json!({ "total": 25, "page": 3, "lastPage": 3 }));

    let beyond = client
        .send_raw(FIND_ALL_PRODUCTS, json!({ "page": 4, "limit": 10 }))
        .await
        .unwrap();
    assert_eq!(beyond["data"], json!([]));
    assert_eq!(beyond["meta"]["lastPage"], 3);

    shutdown.cancel();
}

#[tokio::test]
async fn test_largest_page_number_returns_empty_page() {
    let (mut client, shutdown) = start().await;
    client
        .send_raw(CREATE_PRODUCT, json!({ "name": "Spoon", "price": 2 }))
        .await
        .unwrap();

    let page = client
        .send_raw(FIND_ALL_PRODUCTS, json!({ "page": i64::MAX, "limit": 10 }))
        .await
        .unwrap();
    assert_eq!(page["data"], json!([]));
    assert_eq!(page["meta"], json!({ "total": 1, "page": i64::MAX, "lastPage": 1 }));

    shutdown.cancel();
}

#[tokio::test]
async fn test_soft_delete_hides_product() {
    let (mut client, shutdown) = start().await;
    client
        .send_raw(CREATE_PRODUCT, json!({ "name": "Mug", "price": 8 }))
        .await
        .unwrap();

    let removed = client.send_raw(REMOVE_PRODUCT, json!(1)).await.unwrap();
    assert_eq!(removed["available"], false);
    assert_eq!(removed["name"], "Mug");

    let err = client
        .send_raw(FIND_ONE_PRODUCT, json!(1))
        .await
        .unwrap_err();
    let remote = err.remote().unwrap();
    assert_eq!(remote.message, "Product with id 1 not found");
    assert_eq!(remote.status, 404);

    let err = client
        .send_raw(UPDATE_PRODUCT, json!({ "id": 1, "name": "Cup" }))
        .await
        .unwrap_err();
    assert_eq!(err.remote().unwrap().status, 404);

    let list = client.send_raw(FIND_ALL_PRODUCTS, Value::Null).await.unwrap();
    assert_eq!(list["meta"]["total"], 0);

    shutdown.cancel();
}

#[tokio::test]
async fn test_rejected_payload() {
    let (mut client, shutdown) = start().await;

    let err = client
        .send_raw(CREATE_PRODUCT, json!({ "name": "Bowl", "price": 3, "stock": 4 }))
        .await
        .unwrap_err();
    assert_eq!(err.remote().unwrap().status, 400);

    shutdown.cancel();
}
