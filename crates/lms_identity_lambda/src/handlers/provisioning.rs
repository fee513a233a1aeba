use chrono::{DateTime, Timelike, Utc};
use lms_identity_core::config::TableConfig;
use lms_identity_core::contract::{
    to_store_item, TenantMembershipRecord, UserAttributes, UserProfileRecord,
};
use lms_identity_core::error::IdentityError;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::adapters::key_value_store::{KeyValueStore, StoreError};

const COMPONENT: &str = "provisioning_handler";

/// Post-confirmation hook: writes the user profile and the default tenant
/// membership, then returns `event` unchanged.
///
/// The two writes are independent; a failure on the second leaves the
/// profile in place.
pub fn handle_post_confirmation(
    event: Value,
    tables: &TableConfig,
    created_at: &str,
    store: &dyn KeyValueStore,
) -> Result<Value, IdentityError> {
    debug!(component = COMPONENT, event = "event_received", payload = %event);

    let tables = tables.provisioning_tables().map_err(|error| {
        error!(
            component = COMPONENT,
            event = "configuration_missing",
            "USERS_TABLE and USER_TENANT_MAPPING_TABLE must be configured"
        );
        error
    })?;

    let attributes = UserAttributes::from_event(&event).map_err(unexpected)?;
    let Some(user_id) = attributes.sub.as_deref() else {
        return Err(IdentityError::Validation(
            "userAttributes.sub is required".to_string(),
        ));
    };

    let profile = UserProfileRecord::new(user_id, &attributes, created_at);
    let profile_item = to_store_item(&profile).map_err(unexpected)?;
    store
        .put_item(tables.users_table, profile_item)
        .map_err(store_failure)?;
    info!(
        component = COMPONENT,
        event = "user_profile_created",
        user_id,
        table = tables.users_table
    );

    let membership =
        TenantMembershipRecord::with_defaults(user_id, attributes.email.as_deref(), created_at);
    let membership_item = to_store_item(&membership).map_err(unexpected)?;
    store
        .put_item(tables.user_tenant_mapping_table, membership_item)
        .map_err(store_failure)?;
    info!(
        component = COMPONENT,
        event = "tenant_membership_created",
        user_id,
        tenant_id = %membership.tenant_id,
        role = %membership.role,
        table = tables.user_tenant_mapping_table
    );

    Ok(event)
}

/// Naive ISO-8601 UTC timestamp, microsecond precision, no offset suffix.
/// The fraction is omitted when it is zero.
pub fn created_at_timestamp(now: DateTime<Utc>) -> String {
    let micros = now.nanosecond() % 1_000_000_000 / 1_000;
    if micros == 0 {
        now.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        format!("{}.{micros:06}", now.format("%Y-%m-%dT%H:%M:%S"))
    }
}

fn store_failure(store_error: StoreError) -> IdentityError {
    error!(
        component = COMPONENT,
        event = "store_write_failed",
        table = %store_error.table,
        error = %store_error,
    );
    IdentityError::StoreAccess(format!("Failed to create user records: {store_error}"))
}

fn unexpected(cause: IdentityError) -> IdentityError {
    error!(component = COMPONENT, event = "unexpected_error", error = %cause);
    IdentityError::Unexpected(format!("An unexpected error occurred: {cause}"))
}
