pub mod dynamodb;
pub mod key_value_store;
