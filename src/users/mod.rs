//! The user entity: record types, per-lifecycle schemas, and the
//! validate-and-resolve operations.

pub mod query;
pub mod resolve;
pub mod types;

pub use query::{resolve_query, QueryFilter, SortOrder, UserQuery};
pub use resolve::{resolve_create, resolve_external, resolve_patch, resolve_user};
pub use types::{
    fields, ResolvedUser, User, UserPatch, USER_DATA_SCHEMA, USER_PATCH_SCHEMA, USER_QUERY_PROPERTIES,
    USER_SCHEMA,
};
