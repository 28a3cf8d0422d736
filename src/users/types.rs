use serde::{Deserialize, Serialize};

use crate::schema::{FieldDef, FieldKind, Schema};

/// Persisted field names, exactly as they appear on the wire and in storage.
pub mod fields {
    pub const ID: &str = "_id";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const AVATAR: &str = "avatar";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
}

/// A full user record as held internally.
///
/// `password` is always `Some(hash)` internally; the external view resolver
/// clears it, and a cleared password never serializes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl User {
    /// The outbound representation: same record, password erased.
    pub fn into_external(self) -> User {
        User {
            password: None,
            ..self
        }
    }
}

/// Fully resolved create data, ready for the storage adapter to persist
/// (which assigns `_id`). Password is hashed, avatar is always populated,
/// both timestamps carry the resolution instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedUser {
    pub username: String,
    pub password: String,
    pub avatar: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

/// A resolved partial update. Absent fields are left untouched by the patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

const ID_FIELD: FieldDef = FieldDef {
    name: fields::ID,
    kind: FieldKind::Id,
};
const USERNAME_FIELD: FieldDef = FieldDef {
    name: fields::USERNAME,
    kind: FieldKind::Str,
};
const PASSWORD_FIELD: FieldDef = FieldDef {
    name: fields::PASSWORD,
    kind: FieldKind::Str,
};
const AVATAR_FIELD: FieldDef = FieldDef {
    name: fields::AVATAR,
    kind: FieldKind::Str,
};
const CREATED_AT_FIELD: FieldDef = FieldDef {
    name: fields::CREATED_AT,
    kind: FieldKind::Int,
};
const UPDATED_AT_FIELD: FieldDef = FieldDef {
    name: fields::UPDATED_AT,
    kind: FieldKind::Int,
};

/// Main data model schema: everything required except `avatar`.
pub const USER_SCHEMA: Schema = Schema {
    fields: &[
        ID_FIELD,
        USERNAME_FIELD,
        PASSWORD_FIELD,
        AVATAR_FIELD,
        CREATED_AT_FIELD,
        UPDATED_AT_FIELD,
    ],
    required: &[
        fields::ID,
        fields::USERNAME,
        fields::PASSWORD,
        fields::CREATED_AT,
        fields::UPDATED_AT,
    ],
};

/// Schema for creating new entries.
pub const USER_DATA_SCHEMA: Schema = Schema {
    fields: &[USERNAME_FIELD, PASSWORD_FIELD, AVATAR_FIELD],
    required: &[fields::USERNAME, fields::PASSWORD],
};

/// Schema for updating existing entries: any subset, nothing required.
pub const USER_PATCH_SCHEMA: Schema = Schema {
    fields: &[
        USERNAME_FIELD,
        PASSWORD_FIELD,
        AVATAR_FIELD,
        CREATED_AT_FIELD,
        UPDATED_AT_FIELD,
    ],
    required: &[],
};

/// Properties that may appear in query filters.
pub const USER_QUERY_PROPERTIES: Schema = Schema {
    fields: &[ID_FIELD, USERNAME_FIELD],
    required: &[],
};
