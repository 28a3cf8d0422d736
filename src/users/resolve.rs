//! Field resolution for the user lifecycle operations.
//!
//! Each operation validates its input against the matching schema first,
//! then runs an ordered table of per-field resolvers over the candidate
//! record. Entries later in a table may read values written by earlier
//! ones (`updatedAt` reuses the instant `createdAt` wrote), and resolvers
//! may read sibling fields (`avatar` derives from `username`).

use md5::{Digest, Md5};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::ResolveError;
use crate::password::PasswordHasher;
use crate::users::types::{
    fields, ResolvedUser, User, UserPatch, USER_DATA_SCHEMA, USER_PATCH_SCHEMA, USER_SCHEMA,
};

/// Everything a field resolver may consult besides the candidate record.
pub struct ResolveContext<'a> {
    pub ctx: &'a RequestContext,
    pub hasher: &'a dyn PasswordHasher,
}

/// A pure per-field transform: receives the proposed value (if any), the
/// full candidate record, and the context; returns the resolved value, or
/// `None` to leave the field absent.
type FieldResolver =
    fn(Option<&Value>, &Map<String, Value>, &ResolveContext) -> Result<Option<Value>, ResolveError>;

struct ResolverEntry {
    field: &'static str,
    resolve: FieldResolver,
}

/// Resolvers for create data, in dependency order.
static CREATE_RESOLVERS: &[ResolverEntry] = &[
    ResolverEntry {
        field: fields::PASSWORD,
        resolve: hash_password,
    },
    ResolverEntry {
        field: fields::AVATAR,
        resolve: derive_avatar,
    },
    ResolverEntry {
        field: fields::CREATED_AT,
        resolve: stamp_now,
    },
    ResolverEntry {
        field: fields::UPDATED_AT,
        resolve: copy_created_at,
    },
];

/// Resolvers for patch data: only a present password is transformed.
static PATCH_RESOLVERS: &[ResolverEntry] = &[ResolverEntry {
    field: fields::PASSWORD,
    resolve: hash_password,
}];

fn apply(
    table: &[ResolverEntry],
    data: &mut Map<String, Value>,
    rcx: &ResolveContext,
) -> Result<(), ResolveError> {
    for entry in table {
        let current = data.get(entry.field).cloned();
        match (entry.resolve)(current.as_ref(), data, rcx)? {
            Some(value) => {
                data.insert(entry.field.to_string(), value);
            }
            None => {
                data.remove(entry.field);
            }
        }
    }
    Ok(())
}

/// Replace a plaintext password with its one-way hash. Absent stays absent.
fn hash_password(
    value: Option<&Value>,
    _data: &Map<String, Value>,
    rcx: &ResolveContext,
) -> Result<Option<Value>, ResolveError> {
    let Some(Value::String(plain)) = value else {
        return Ok(None);
    };
    let hashed = rcx.hasher.hash(plain).map_err(ResolveError::Hash)?;
    Ok(Some(Value::String(hashed)))
}

/// Keep a caller-supplied avatar verbatim; otherwise derive the gravatar
/// URL from the MD5 of the lower-cased username.
fn derive_avatar(
    value: Option<&Value>,
    data: &Map<String, Value>,
    _rcx: &ResolveContext,
) -> Result<Option<Value>, ResolveError> {
    if let Some(supplied) = value {
        if !supplied.is_null() {
            return Ok(Some(supplied.clone()));
        }
    }

    // Validation has already guaranteed username is a present string here.
    let Some(Value::String(username)) = data.get(fields::USERNAME) else {
        return Ok(None);
    };
    let hash = hex::encode(Md5::digest(username.to_lowercase().as_bytes()));
    Ok(Some(Value::String(format!(
        "https://s.gravatar.com/avatar/{hash}?s=60"
    ))))
}

fn stamp_now(
    _value: Option<&Value>,
    _data: &Map<String, Value>,
    _rcx: &ResolveContext,
) -> Result<Option<Value>, ResolveError> {
    Ok(Some(Value::from(now_millis())))
}

/// `updatedAt` mirrors the instant the createdAt entry just wrote, so both
/// timestamps carry the same value on create.
fn copy_created_at(
    _value: Option<&Value>,
    data: &Map<String, Value>,
    _rcx: &ResolveContext,
) -> Result<Option<Value>, ResolveError> {
    match data.get(fields::CREATED_AT) {
        Some(stamp) => Ok(Some(stamp.clone())),
        None => Ok(Some(Value::from(now_millis()))),
    }
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Validate a complete candidate record against the full schema and type
/// it. No field derivation happens on this path.
pub fn resolve_user(value: Value) -> Result<User, ResolveError> {
    USER_SCHEMA.validate_value(&value)?;
    serde_json::from_value(value).map_err(ResolveError::Shape)
}

/// Produce the outbound representation: password erased, everything else
/// untouched. No caller ever observes a password value through this path.
pub fn resolve_external(user: User) -> User {
    user.into_external()
}

/// Validate and resolve create data into a storage-ready record.
pub fn resolve_create(
    value: Value,
    ctx: &RequestContext,
    hasher: &dyn PasswordHasher,
) -> Result<ResolvedUser, ResolveError> {
    let mut data = USER_DATA_SCHEMA.validate_value(&value)?.clone();
    apply(CREATE_RESOLVERS, &mut data, &ResolveContext { ctx, hasher })?;
    let resolved: ResolvedUser =
        serde_json::from_value(Value::Object(data)).map_err(ResolveError::Shape)?;
    debug!(username = %resolved.username, "resolved create data");
    Ok(resolved)
}

/// Validate and resolve a partial update. A present password is hashed;
/// every other present field passes through; absent fields stay absent.
pub fn resolve_patch(
    value: Value,
    ctx: &RequestContext,
    hasher: &dyn PasswordHasher,
) -> Result<UserPatch, ResolveError> {
    let mut data = USER_PATCH_SCHEMA.validate_value(&value)?.clone();
    apply(PATCH_RESOLVERS, &mut data, &ResolveContext { ctx, hasher })?;
    let patch: UserPatch =
        serde_json::from_value(Value::Object(data)).map_err(ResolveError::Shape)?;
    debug!(
        touches_password = patch.password.is_some(),
        "resolved patch data"
    );
    Ok(patch)
}
