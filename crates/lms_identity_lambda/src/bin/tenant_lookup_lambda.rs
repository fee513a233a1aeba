use lambda_runtime::{service_fn, Error, LambdaEvent};
use lms_identity_lambda::adapters::dynamodb::DynamoDbKeyValueStore;
use lms_identity_lambda::handlers::tenant_lookup::handle_tenant_lookup;
use lms_identity_lambda::logging::init_tracing;
use lms_identity_lambda::runtime::config::TableConfig;
use lms_identity_lambda::runtime::contract::ApiGatewayResponse;
use serde_json::Value;

async fn handle_request(
    event: LambdaEvent<Value>,
    tables: &TableConfig,
    store: &DynamoDbKeyValueStore,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_tenant_lookup(
        event.payload,
        tables.mapping_table(),
        store,
    ))
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
