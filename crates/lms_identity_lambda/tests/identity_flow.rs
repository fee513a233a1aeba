use lms_identity_lambda::adapters::key_value_store::{InMemoryKeyValueStore, KeyValueStore};
use lms_identity_lambda::handlers::provisioning::handle_post_confirmation;
use lms_identity_lambda::handlers::tenant_lookup::handle_tenant_lookup;
use lms_identity_lambda::runtime::config::TableConfig;
use lms_identity_lambda::runtime::contract::USER_ID_KEY;
use serde_json::{json, Value};

const USERS_TABLE: &str = "lotus-lms-users";
const MAPPING_TABLE: &str = "lms-user-tenant-mapping";

fn tables() -> TableConfig {
    TableConfig::new(Some(USERS_TABLE), Some(MAPPING_TABLE))
}

fn confirmation(sub: &str, email: &str, username: Option<&str>) -> Value {
    let mut attributes = json!({ "sub": sub, "email": email });
    if let Some(username) = username {
        attributes["custom:username"] = json!(username);
    }
    json!({
        "triggerSource": "PostConfirmation_ConfirmSignUp",
        "request": { "userAttributes": attributes },
        "response": {}
    })
}

fn lookup(store: &InMemoryKeyValueStore, user_id: &str) -> (u16, Value) {
    let response = handle_tenant_lookup(
        json!({ "queryStringParameters": { "user_id": user_id } }),
        Some(MAPPING_TABLE),
        store,
    );
    let body = serde_json::from_str(&response.body).expect("body should be JSON");
    (response.status_code, body)
}

#[test]
fn provisioned_user_resolves_to_default_tenant() {
    let store = InMemoryKeyValueStore::new(USER_ID_KEY);
    handle_post_confirmation(
        confirmation("u1", "a@b.com", None),
        &tables(),
        "2024-01-01T00:00:00",
        &store,
    )
    .expect("provisioning should succeed");

    let (status, body) = lookup(&store, "u1");
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "user_id": "u1",
            "tenant_id": "trainer1",
            "role": "student",
            "email": "a@b.com",
            "created_at": "2024-01-01T00:00:00"
        })
    );

    let profile = store
        .get_item(USERS_TABLE, USER_ID_KEY, "u1")
        .expect("read should succeed")
        .expect("profile should exist");
    assert_eq!(profile["created_at"], body["created_at"]);
    assert_eq!(profile["username"], json!("a@b.com"));
}

#[test]
fn replayed_confirmation_keeps_last_write() {
    let store = InMemoryKeyValueStore::new(USER_ID_KEY);
    handle_post_confirmation(
        confirmation("u1", "first@b.com", Some("first")),
        &tables(),
        "2024-01-01T00:00:00",
        &store,
    )
    .expect("first provisioning should succeed");
    handle_post_confirmation(
        confirmation("u1", "second@b.com", Some("second")),
        &tables(),
        "2024-02-01T00:00:00",
        &store,
    )
    .expect("replay should succeed");

    assert_eq!(store.item_count(USERS_TABLE), 1);
    assert_eq!(store.item_count(MAPPING_TABLE), 1);

    let profile = store
        .get_item(USERS_TABLE, USER_ID_KEY, "u1")
        .expect("read should succeed")
        .expect("profile should exist");
    assert_eq!(profile["username"], json!("second"));

    let (status, body) = lookup(&store, "u1");
    assert_eq!(status, 200);
    assert_eq!(body["email"], json!("second@b.com"));
    assert_eq!(body["created_at"], json!("2024-02-01T00:00:00"));
}

#[test]
fn unprovisioned_user_is_not_found() {
    let store = InMemoryKeyValueStore::new(USER_ID_KEY);
    handle_post_confirmation(
        confirmation("u1", "a@b.com", None),
        &tables(),
        "2024-01-01T00:00:00",
        &store,
    )
    .expect("provisioning should succeed");

    let (status, body) = lookup(&store, "u2");
    assert_eq!(status, 404);
    assert_eq!(body["message"], json!("No tenant mapping found for user_id: u2"));
}
