use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::IdentityError;

pub const DEFAULT_TENANT_ID: &str = "trainer1";
pub const DEFAULT_ROLE: &str = "student";
pub const ACTIVE_STATUS: &str = "active";

/// Primary key attribute shared by both tables.
pub const USER_ID_KEY: &str = "user_id";
pub const USER_ID_QUERY_PARAMETER: &str = "user_id";
pub const USER_ID_HEADERS: [&str; 2] = ["user_id", "User-Id"];

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type,X-Tenant-Id,Authorization";
pub const CORS_ALLOW_METHODS: &str = "GET,OPTIONS";

/// A flat record as persisted in the key-value store.
pub type StoreItem = Map<String, Value>;

/// Attributes carried in `request.userAttributes` of a post-confirmation event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAttributes {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "custom:username", default)]
    pub custom_username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserAttributes {
    /// Decodes the attributes out of a raw post-confirmation event without
    /// consuming it, so the caller can hand the event back untouched.
    pub fn from_event(event: &Value) -> Result<Self, IdentityError> {
        let attributes = event
            .get("request")
            .and_then(|request| request.get("userAttributes"))
            .ok_or_else(|| {
                IdentityError::Unexpected("event is missing request.userAttributes".to_string())
            })?;

        Self::deserialize(attributes)
            .map_err(|error| IdentityError::Unexpected(format!("invalid userAttributes: {error}")))
    }

    pub fn username(&self) -> Option<&str> {
        self.custom_username.as_deref().or(self.email.as_deref())
    }

    pub fn full_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfileRecord {
    pub user_id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: String,
    pub created_at: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenantMembershipRecord {
    pub user_id: String,
    pub tenant_id: String,
    pub role: String,
    pub email: Option<String>,
    pub created_at: String,
}

impl UserProfileRecord {
    pub fn new(user_id: &str, attributes: &UserAttributes, created_at: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: attributes.email.clone(),
            username: attributes.username().map(str::to_string),
            full_name: attributes.full_name().to_string(),
            created_at: created_at.to_string(),
            status: ACTIVE_STATUS.to_string(),
        }
    }
}

impl TenantMembershipRecord {
    /// Every new user joins the default tenant as a student.
    pub fn with_defaults(user_id: &str, email: Option<&str>, created_at: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            role: DEFAULT_ROLE.to_string(),
            email: email.map(str::to_string),
            created_at: created_at.to_string(),
        }
    }
}

pub fn to_store_item(record: impl Serialize) -> Result<StoreItem, IdentityError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(item)) => Ok(item),
        Ok(_) => Err(IdentityError::Unexpected(
            "record did not serialize to an object".to_string(),
        )),
        Err(error) => Err(IdentityError::Unexpected(format!(
            "failed to serialize record: {error}"
        ))),
    }
}

/// The subset of an API Gateway proxy event the lookup endpoint reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenantLookupRequest {
    #[serde(rename = "queryStringParameters", default)]
    pub query_string_parameters: Option<BTreeMap<String, Option<String>>>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, Option<String>>>,
}

impl TenantLookupRequest {
    /// Query parameter first, then the `user_id` header, then `User-Id`.
    /// Header names are matched exactly. Empty values are skipped.
    pub fn resolve_user_id(&self) -> Option<&str> {
        lookup_non_empty(&self.query_string_parameters, USER_ID_QUERY_PARAMETER).or_else(|| {
            USER_ID_HEADERS
                .iter()
                .find_map(|name| lookup_non_empty(&self.headers, name))
        })
    }
}

fn lookup_non_empty<'a>(
    values: &'a Option<BTreeMap<String, Option<String>>>,
    key: &str,
) -> Option<&'a str> {
    values
        .as_ref()?
        .get(key)?
        .as_deref()
        .filter(|value| !value.is_empty())
}

/// The five fields returned for a found mapping. Fields absent from the
/// stored item are reported as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantMappingResponse {
    pub user_id: Value,
    pub tenant_id: Value,
    pub role: Value,
    pub email: Value,
    pub created_at: Value,
}

impl TenantMappingResponse {
    pub fn from_item(item: &StoreItem) -> Self {
        let field = |name: &str| item.get(name).cloned().unwrap_or(Value::Null);
        Self {
            user_id: field("user_id"),
            tenant_id: field("tenant_id"),
            role: field("role"),
            email: field("email"),
            created_at: field("created_at"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn json(status_code: u16, payload: &impl Serialize) -> Result<Self, IdentityError> {
        let body = serde_json::to_string(payload).map_err(|error| {
            IdentityError::Unexpected(format!("failed to serialize response body: {error}"))
        })?;
        Ok(Self {
            status_code,
            headers: cors_headers(),
            body,
        })
    }

    pub fn error(status_code: u16, error: &str, message: &str) -> Self {
        Self {
            status_code,
            headers: cors_headers(),
            body: json!({ "error": error, "message": message }).to_string(),
        }
    }
}

pub fn cors_headers() -> Value {
    json!({
        "Access-Control-Allow-Origin": CORS_ALLOW_ORIGIN,
        "Access-Control-Allow-Headers": CORS_ALLOW_HEADERS,
        "Access-Control-Allow-Methods": CORS_ALLOW_METHODS,
    })
}
