//! Schema, validation, and field resolution for the user entity of a
//! web-service framework's user-management module.
//!
//! The crate owns one linear pipeline: incoming data is validated against
//! the schema for the lifecycle operation at hand (create, patch, query,
//! full record), then run through per-field resolvers (password hashing,
//! derived gravatar avatar, timestamps, ownership-scoped queries). The
//! surrounding framework supplies the request context and persists the
//! result; HTTP routing, storage, and sessions live elsewhere.
//!
//! ```
//! use serde_json::json;
//! use user_schema::{resolve_create, Argon2Hasher, Method, RequestContext};
//!
//! let ctx = RequestContext::anonymous(Method::Create);
//! let data = resolve_create(
//!     json!({ "username": "alice", "password": "secret" }),
//!     &ctx,
//!     &Argon2Hasher::new(),
//! )?;
//! assert_ne!(data.password, "secret");
//! assert!(data.avatar.starts_with("https://s.gravatar.com/avatar/"));
//! # Ok::<(), user_schema::ResolveError>(())
//! ```

pub mod context;
pub mod error;
pub mod password;
pub mod schema;
pub mod users;

pub use context::{Method, RequestContext};
pub use error::{ResolveError, ValidationError};
pub use password::{Argon2Hasher, PasswordHasher};
pub use users::{
    resolve_create, resolve_external, resolve_patch, resolve_query, resolve_user, QueryFilter,
    ResolvedUser, SortOrder, User, UserPatch, UserQuery,
};
