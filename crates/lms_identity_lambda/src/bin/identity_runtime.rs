use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use lms_identity_lambda::adapters::dynamodb::DynamoDbKeyValueStore;
use lms_identity_lambda::adapters::key_value_store::KeyValueStore;
use lms_identity_lambda::handlers::provisioning::{
    created_at_timestamp, handle_post_confirmation,
};
use lms_identity_lambda::handlers::tenant_lookup::handle_tenant_lookup;
use lms_identity_lambda::logging::init_tracing;
use lms_identity_lambda::runtime::config::TableConfig;
use serde_json::Value;

const POST_CONFIRMATION_TRIGGER_PREFIX: &str = "PostConfirmation_";

async fn handle_request(
    event: LambdaEvent<Value>,
    tables: &TableConfig,
    store: &DynamoDbKeyValueStore,
) -> Result<Value, Error> {
    route_event(event.payload, tables, &created_at_timestamp(Utc::now()), store)
}

fn route_event(
    event: Value,
    tables: &TableConfig,
    created_at: &str,
    store: &dyn KeyValueStore,
) -> Result<Value, Error> {
    if is_post_confirmation_event(&event) {
        handle_post_confirmation(event, tables, created_at, store).map_err(Error::from)
    } else {
        let response = handle_tenant_lookup(event, tables.mapping_table(), store);
        serde_json::to_value(response)
            .map_err(|error| Error::from(format!("failed to serialize api response: {error}")))
    }
}

fn is_post_confirmation_event(event: &Value) -> bool {
    event
        .get("triggerSource")
        .and_then(Value::as_str)
        .map(|source| source.starts_with(POST_CONFIRMATION_TRIGGER_PREFIX))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let tables = TableConfig::from_env();
    let store = DynamoDbKeyValueStore::from_env().await;
    let (tables, store) = (&tables, &store);

    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, tables, store).await
    }))
    .await
}

#[cfg(test)]
mod tests {
    use lms_identity_lambda::adapters::key_value_store::InMemoryKeyValueStore;
    use serde_json::json;

    use super::*;

    fn tables() -> TableConfig {
        TableConfig::new(Some("users"), Some("mapping"))
    }

    #[test]
    fn detects_post_confirmation_trigger() {
        assert!(is_post_confirmation_event(&json!({
            "triggerSource": "PostConfirmation_ConfirmSignUp"
        })));
        assert!(is_post_confirmation_event(&json!({
            "triggerSource": "PostConfirmation_ConfirmForgotPassword"
        })));
    }

    #[test]
    fn other_trigger_sources_are_api_requests() {
        assert!(!is_post_confirmation_event(&json!({
            "triggerSource": "PreSignUp_SignUp"
        })));
        assert!(!is_post_confirmation_event(&json!({
            "httpMethod": "GET",
            "queryStringParameters": { "user_id": "u1" }
        })));
        assert!(!is_post_confirmation_event(&json!({ "triggerSource": 7 })));
    }

    #[test]
    fn routes_confirmation_then_lookup_through_one_store() {
        let store = InMemoryKeyValueStore::new("user_id");
        let confirmation = json!({
            "triggerSource": "PostConfirmation_ConfirmSignUp",
            "request": { "userAttributes": { "sub": "u1", "email": "a@b.com" } }
        });

        let returned = route_event(confirmation.clone(), &tables(), "2024-01-01T00:00:00", &store)
            .expect("confirmation should succeed");
        assert_eq!(returned, confirmation);

        let response = route_event(
            json!({ "queryStringParameters": { "user_id": "u1" } }),
            &tables(),
            "unused",
            &store,
        )
        .expect("lookup always responds");
        assert_eq!(response["statusCode"], json!(200));
    }

    #[test]
    fn confirmation_failure_is_returned_as_runtime_error() {
        let store = InMemoryKeyValueStore::new("user_id");
        let confirmation = json!({
            "triggerSource": "PostConfirmation_ConfirmSignUp",
            "request": { "userAttributes": { "sub": "u1" } }
        });

        let error = route_event(confirmation, &TableConfig::default(), "now", &store)
            .expect_err("missing tables should fail");
        assert!(error.to_string().contains("Database configuration error"));
        assert_eq!(store.item_count("users"), 0);
    }
}
