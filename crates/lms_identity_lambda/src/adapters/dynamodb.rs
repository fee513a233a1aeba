use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use lms_identity_core::contract::StoreItem;
use serde_json::{Map, Number, Value};

use crate::adapters::key_value_store::{KeyValueStore, StoreError, StoreOperation};

/// [`KeyValueStore`] backed by DynamoDB tables.
///
/// Must be used from inside a multi-threaded Tokio runtime; the synchronous
/// port is bridged onto the async SDK with `block_in_place`.
#[derive(Debug, Clone)]
pub struct DynamoDbKeyValueStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoDbKeyValueStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_dynamodb::Client::new(&config))
    }
}

impl KeyValueStore for DynamoDbKeyValueStore {
    fn put_item(&self, table: &str, item: StoreItem) -> Result<(), StoreError> {
        let attributes = item_to_attributes(item);
        let client = self.client.clone();
        let table_name = table.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(attributes))
                    .send()
                    .await
                    .map(|_| ())
            })
        })
        .map_err(|error| {
            StoreError::new(
                StoreOperation::Put,
                table,
                DisplayErrorContext(&error).to_string(),
            )
        })
    }

    fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key: &str,
    ) -> Result<Option<StoreItem>, StoreError> {
        let client = self.client.clone();
        let table_name = table.to_string();
        let key_name = key_name.to_string();
        let key = AttributeValue::S(key.to_string());

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .get_item()
                    .table_name(table_name)
                    .key(key_name, key)
                    .send()
                    .await
            })
        })
        .map_err(|error| {
            StoreError::new(
                StoreOperation::Get,
                table,
                DisplayErrorContext(&error).to_string(),
            )
        })?;

        output
            .item()
            .map(attributes_to_item)
            .transpose()
            .map_err(|detail| StoreError::new(StoreOperation::Get, table, detail))
    }
}

pub fn item_to_attributes(item: StoreItem) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, value)| (name, value_to_attribute(value)))
        .collect()
}

pub fn attributes_to_item(
    attributes: &HashMap<String, AttributeValue>,
) -> Result<StoreItem, String> {
    attributes
        .iter()
        .map(|(name, attribute)| {
            attribute_to_value(attribute)
                .map(|value| (name.clone(), value))
                .map_err(|detail| format!("attribute '{name}': {detail}"))
        })
        .collect()
}

fn value_to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text),
        Value::Array(values) => {
            AttributeValue::L(values.into_iter().map(value_to_attribute).collect())
        }
        Value::Object(fields) => AttributeValue::M(item_to_attributes(fields)),
    }
}

fn attribute_to_value(attribute: &AttributeValue) -> Result<Value, String> {
    match attribute {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(flag) => Ok(Value::Bool(*flag)),
        AttributeValue::S(text) => Ok(Value::String(text.clone())),
        AttributeValue::N(number) => parse_number(number),
        AttributeValue::Ss(values) => Ok(Value::Array(
            values.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(values) => values
            .iter()
            .map(|number| parse_number(number))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::L(values) => values
            .iter()
            .map(attribute_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::M(fields) => fields
            .iter()
            .map(|(name, value)| attribute_to_value(value).map(|value| (name.clone(), value)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        _ => Err("unsupported attribute type".to_string()),
    }
}

fn parse_number(number: &str) -> Result<Value, String> {
    number
        .parse::<Number>()
        .map(Value::Number)
        .map_err(|error| format!("invalid number '{number}': {error}"))
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;
    use serde_json::json;

    use super::*;

    #[test]
    fn membership_item_maps_to_string_and_null_attributes() {
        let item = match json!({
            "user_id": "u1",
            "tenant_id": "trainer1",
            "email": null,
        }) {
            Value::Object(item) => item,
            _ => unreachable!(),
        };

        let attributes = item_to_attributes(item);
        assert_eq!(attributes["user_id"], AttributeValue::S("u1".to_string()));
        assert_eq!(attributes["email"], AttributeValue::Null(true));
    }

    #[test]
    fn stored_attributes_decode_to_json() {
        let attributes = HashMap::from([
            ("user_id".to_string(), AttributeValue::S("u1".to_string())),
            ("login_count".to_string(), AttributeValue::N("3".to_string())),
            (
                "groups".to_string(),
                AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]),
            ),
            (
                "profile".to_string(),
                AttributeValue::M(HashMap::from([(
                    "verified".to_string(),
                    AttributeValue::Bool(true),
                )])),
            ),
        ]);

        let item = attributes_to_item(&attributes).expect("attributes should decode");
        assert_eq!(item["user_id"], json!("u1"));
        assert_eq!(item["login_count"], json!(3));
        assert_eq!(item["groups"], json!(["a", "b"]));
        assert_eq!(item["profile"], json!({"verified": true}));
    }

    #[test]
    fn binary_attributes_are_rejected() {
        let attributes = HashMap::from([(
            "avatar".to_string(),
            AttributeValue::B(Blob::new(vec![0u8, 1, 2])),
        )]);

        let error = attributes_to_item(&attributes).expect_err("binary is unsupported");
        assert!(error.contains("attribute 'avatar'"));
    }
}
