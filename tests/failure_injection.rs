//! Persistence and failure injection tests.

use contact_api::config::ApiConfig;
use contact_api::contacts::ContactDraft;

mod common;

use common::contact;

fn file_config(dir: &std::path::Path) -> ApiConfig {
    let mut config = ApiConfig::default();
    config.storage.data_path = Some(dir.join("contacts.json").to_string_lossy().into_owned());
    config
}

#[tokio::test]
async fn test_contacts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let server = common::start_server(file_config(dir.path())).await;
    let client = server.client();
    let first = client
        .create(&contact("Budi", "0822", "budi@gmail.com"))
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .id;
    let second = client
        .create(&contact("Citra", "0833", "citra@gmail.com"))
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .id;
    assert!(client.delete(second).await.unwrap().is_success());
    server.stop().await;

    let server = common::start_server(file_config(dir.path())).await;
    let client = server.client();
    let all = client.search(None).await.unwrap().into_data().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, first);
    assert_eq!(all[0].nama, "Budi");

    let third = client
        .create(&contact("Dewi", "0844", "dewi@gmail.com"))
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .id;
    assert!(third > second, "id {} reused after restart", third);

    server.stop().await;
}

#[tokio::test]
async fn test_seed_not_reapplied_to_existing_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = file_config(dir.path());
    config
        .storage
        .seed
        .push(ContactDraft::new("Andi", "0811", "andi@gmail.com"));

    let server = common::start_server(config.clone()).await;
    let client = server.client();
    let andi = client.search(Some("Andi")).await.unwrap().into_data().unwrap();
    assert_eq!(andi.len(), 1);
    assert!(client.delete(andi[0].id).await.unwrap().is_success());
    client
        .create(&contact("Eka", "0855", "eka@gmail.com"))
        .await
        .unwrap();
    server.stop().await;

    let server = common::start_server(config).await;
    let client = server.client();
    assert_eq!(client.search(Some("Andi")).await.unwrap().into_data(), Some(vec![]));
    server.stop().await;
}

#[tokio::test]
async fn test_storage_failure_is_reported_and_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");

    let server = common::start_server(file_config(&data_dir)).await;
    let client = server.client();
    let id = client
        .create(&contact("Andi", "0811", "andi@gmail.com"))
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .id;

    std::fs::remove_dir_all(&data_dir).unwrap();

    let response = client
        .create(&contact("Budi", "0822", "budi@gmail.com"))
        .await
        .unwrap();
    assert!(!response.is_success());
    assert!(response
        .message()
        .unwrap_or_default()
        .starts_with("Gagal menyimpan data kontak"));

    let response = client
        .update(id, &contact("Ganti", "0899", "ganti@gmail.com"))
        .await
        .unwrap();
    assert!(!response.is_success());

    let all = client.search(None).await.unwrap().into_data().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].nama, "Andi");

    server.stop().await;
}
