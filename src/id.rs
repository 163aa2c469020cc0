//! Prefixed surrogate IDs for stored records.
//!
//! Format: `sk_{entity}_{uuid_simple}` (32 hex chars, no hyphens). These are
//! internal row keys; licenses are addressed externally by their `license_id`.

use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    License,
    Activation,
}

impl EntityType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::License => "sk_lic",
            Self::Activation => "sk_act",
        }
    }

    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}
