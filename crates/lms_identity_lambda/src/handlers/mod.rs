pub mod provisioning;
pub mod tenant_lookup;
