use lms_identity_core::config::CONFIGURATION_ERROR_MESSAGE;
use lms_identity_core::contract::{
    ApiGatewayResponse, TenantLookupRequest, TenantMappingResponse, USER_ID_KEY,
};
use lms_identity_core::error::{ErrorKind, IdentityError};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::key_value_store::KeyValueStore;

const COMPONENT: &str = "tenant_lookup_handler";

const MISSING_USER_ID_MESSAGE: &str = "Please provide user_id as a query parameter or header";
const STORE_FAILURE_MESSAGE: &str = "Failed to retrieve user mapping from database";
const UNEXPECTED_FAILURE_MESSAGE: &str = "An unexpected error occurred";

/// `GET /user/tenant?user_id=...`
///
/// Always returns a response; every failure is mapped onto a status code.
pub fn handle_tenant_lookup(
    event: Value,
    mapping_table: Option<&str>,
    store: &dyn KeyValueStore,
) -> ApiGatewayResponse {
    let result = lookup_tenant_mapping(event, mapping_table, store).and_then(|mapping| {
        ApiGatewayResponse::json(200, &mapping).map_err(|error| {
            error!(component = COMPONENT, event = "serialization_failed", error = %error);
            error
        })
    });

    match result {
        Ok(response) => response,
        Err(error) => error_response(&error),
    }
}

fn lookup_tenant_mapping(
    event: Value,
    mapping_table: Option<&str>,
    store: &dyn KeyValueStore,
) -> Result<TenantMappingResponse, IdentityError> {
    let request = TenantLookupRequest::deserialize(&event).map_err(|decode_error| {
        error!(
            component = COMPONENT,
            event = "unexpected_error",
            error = %decode_error,
        );
        IdentityError::Unexpected(format!("malformed request event: {decode_error}"))
    })?;

    let Some(user_id) = request.resolve_user_id() else {
        info!(component = COMPONENT, event = "user_id_missing");
        return Err(IdentityError::Validation(
            MISSING_USER_ID_MESSAGE.to_string(),
        ));
    };

    let table = match mapping_table {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            error!(
                component = COMPONENT,
                event = "configuration_missing",
                "USER_TENANT_MAPPING_TABLE must be configured"
            );
            return Err(IdentityError::Configuration(
                CONFIGURATION_ERROR_MESSAGE.to_string(),
            ));
        }
    };

    let item = store
        .get_item(table, USER_ID_KEY, user_id)
        .map_err(|store_error| {
            error!(
                component = COMPONENT,
                event = "store_read_failed",
                user_id,
                table,
                error = %store_error,
            );
            IdentityError::StoreAccess(store_error.to_string())
        })?;

    match item {
        Some(item) => {
            info!(component = COMPONENT, event = "mapping_found", user_id);
            Ok(TenantMappingResponse::from_item(&item))
        }
        None => {
            info!(component = COMPONENT, event = "mapping_not_found", user_id);
            Err(IdentityError::NotFound(format!(
                "No tenant mapping found for user_id: {user_id}"
            )))
        }
    }
}

fn error_response(error: &IdentityError) -> ApiGatewayResponse {
    let kind = error.kind();
    let message = match kind {
        ErrorKind::StoreAccess => STORE_FAILURE_MESSAGE,
        ErrorKind::Unexpected => UNEXPECTED_FAILURE_MESSAGE,
        ErrorKind::Configuration | ErrorKind::Validation | ErrorKind::NotFound => error.message(),
    };
    ApiGatewayResponse::error(kind.status_code(), kind.error_label(), message)
}
