use chrono::Utc;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use lms_identity_lambda::adapters::dynamodb::DynamoDbKeyValueStore;
use lms_identity_lambda::handlers::provisioning::{
    created_at_timestamp, handle_post_confirmation,
};
use lms_identity_lambda::logging::init_tracing;
use lms_identity_lambda::runtime::config::TableConfig;
use serde_json::Value;

async fn handle_request(
    event: LambdaEvent<Value>,
    tables: &TableConfig,
    store: &DynamoDbKeyValueStore,
) -> Result<Value, Error> {
    let created_at = created_at_timestamp(Utc::now());
    handle_post_confirmation(event.payload, tables, &created_at, store).map_err(Error::from)
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
