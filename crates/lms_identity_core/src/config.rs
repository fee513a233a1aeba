use crate::error::IdentityError;

pub const USERS_TABLE_ENV: &str = "USERS_TABLE";
pub const USER_TENANT_MAPPING_TABLE_ENV: &str = "USER_TENANT_MAPPING_TABLE";

pub const CONFIGURATION_ERROR_MESSAGE: &str = "Database configuration error";

/// Table names resolved from process configuration.
///
/// Names that are present but blank are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableConfig {
    pub users_table: Option<String>,
    pub user_tenant_mapping_table: Option<String>,
}

/// Both table names required by the provisioning handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningTables<'a> {
    pub users_table: &'a str,
    pub user_tenant_mapping_table: &'a str,
}

impl TableConfig {
    pub fn new(
        users_table: Option<impl Into<String>>,
        user_tenant_mapping_table: Option<impl Into<String>>,
    ) -> Self {
        Self {
            users_table: non_blank(users_table.map(Into::into)),
            user_tenant_mapping_table: non_blank(user_tenant_mapping_table.map(Into::into)),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(
            lookup(USERS_TABLE_ENV),
            lookup(USER_TENANT_MAPPING_TABLE_ENV),
        )
    }

    pub fn mapping_table(&self) -> Option<&str> {
        self.user_tenant_mapping_table.as_deref()
    }

    pub fn provisioning_tables(&self) -> Result<ProvisioningTables<'_>, IdentityError> {
        match (
            self.users_table.as_deref(),
            self.user_tenant_mapping_table.as_deref(),
        ) {
            (Some(users_table), Some(user_tenant_mapping_table)) => Ok(ProvisioningTables {
                users_table,
                user_tenant_mapping_table,
            }),
            _ => Err(IdentityError::Configuration(
                CONFIGURATION_ERROR_MESSAGE.to_string(),
            )),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|name| !name.trim().is_empty())
}
