//! Query-syntax validation for the user service and the ownership scoping
//! of `_id`.
//!
//! Queries may filter on `_id` and `username`, either by bare equality or
//! through an operator object (`$ne`, `$in`, `$nin`, `$lt`, `$lte`, `$gt`,
//! `$gte`), and may carry the `$limit` / `$skip` / `$sort` / `$select`
//! pagination operators. Anything else is rejected, naming the offender.

use serde_json::{Map, Value};
use tracing::debug;

use crate::context::RequestContext;
use crate::error::ValidationError;
use crate::schema::FieldKind;
use crate::users::types::{fields, USER_QUERY_PROPERTIES};

const COMPARISON_OPERATORS: &[&str] = &["$ne", "$in", "$nin", "$lt", "$lte", "$gt", "$gte"];

/// Sort direction, from the wire values `1` and `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A validated filter on a single queryable property.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    /// Bare equality with a value of the property's type.
    Equals(Value),
    /// An operator object, kept as validated operator/operand pairs.
    Compare(Vec<(String, Value)>),
}

/// A validated user query, ready for the storage adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub sort: Vec<(String, SortOrder)>,
    pub select: Option<Vec<String>>,
    pub id: Option<QueryFilter>,
    pub username: Option<QueryFilter>,
}

/// Validate raw query input and apply the ownership scoping: a query from
/// an authenticated actor on a non-listing method only ever sees the
/// actor's own record, whatever `_id` it asked for. Listing queries and
/// queries with no actor pass through unrestricted.
pub fn resolve_query(value: Value, ctx: &RequestContext) -> Result<UserQuery, ValidationError> {
    let data = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let mut query = validate_query(data)?;

    if let Some(actor) = &ctx.user {
        if !ctx.method.is_listing() {
            debug!(actor = %actor.id, method = ?ctx.method, "scoping query to own record");
            query.id = Some(QueryFilter::Equals(Value::String(actor.id.clone())));
        }
    }

    Ok(query)
}

fn validate_query(data: &Map<String, Value>) -> Result<UserQuery, ValidationError> {
    let mut query = UserQuery::default();

    for (key, value) in data {
        match key.as_str() {
            "$limit" => query.limit = Some(non_negative_int(key, value)?),
            "$skip" => query.skip = Some(non_negative_int(key, value)?),
            "$sort" => query.sort = validate_sort(value)?,
            "$select" => query.select = Some(validate_select(value)?),
            name => match USER_QUERY_PROPERTIES.field(name) {
                Some(property) => {
                    let filter = validate_filter(name, property.kind, value)?;
                    if name == fields::ID {
                        query.id = Some(filter);
                    } else {
                        query.username = Some(filter);
                    }
                }
                None => return Err(ValidationError::UnknownField(key.clone())),
            },
        }
    }

    Ok(query)
}

fn non_negative_int(field: &str, value: &Value) -> Result<u64, ValidationError> {
    value.as_u64().ok_or_else(|| ValidationError::InvalidType {
        field: field.to_string(),
        expected: "non-negative integer",
    })
}

fn validate_sort(value: &Value) -> Result<Vec<(String, SortOrder)>, ValidationError> {
    let entries = value.as_object().ok_or_else(|| ValidationError::InvalidType {
        field: "$sort".to_string(),
        expected: "object",
    })?;

    let mut sort = Vec::with_capacity(entries.len());
    for (name, direction) in entries {
        if !USER_QUERY_PROPERTIES.allows(name) {
            return Err(ValidationError::UnknownField(format!("$sort.{name}")));
        }
        let order = match direction.as_i64() {
            Some(1) => SortOrder::Ascending,
            Some(-1) => SortOrder::Descending,
            _ => {
                return Err(ValidationError::InvalidOperand {
                    field: name.clone(),
                    operator: "$sort".to_string(),
                })
            }
        };
        sort.push((name.clone(), order));
    }
    Ok(sort)
}

fn validate_select(value: &Value) -> Result<Vec<String>, ValidationError> {
    let names = value.as_array().ok_or_else(|| ValidationError::InvalidType {
        field: "$select".to_string(),
        expected: "array of field names",
    })?;

    let mut select = Vec::with_capacity(names.len());
    for name in names {
        match name.as_str() {
            Some(name) if USER_QUERY_PROPERTIES.allows(name) => select.push(name.to_string()),
            Some(name) => {
                return Err(ValidationError::UnknownField(format!("$select.{name}")))
            }
            None => {
                return Err(ValidationError::InvalidType {
                    field: "$select".to_string(),
                    expected: "array of field names",
                })
            }
        }
    }
    Ok(select)
}

fn validate_filter(
    field: &str,
    kind: FieldKind,
    value: &Value,
) -> Result<QueryFilter, ValidationError> {
    let Some(operators) = value.as_object() else {
        // Bare equality.
        if !kind.matches(value) {
            return Err(ValidationError::InvalidType {
                field: field.to_string(),
                expected: kind.expected(),
            });
        }
        return Ok(QueryFilter::Equals(value.clone()));
    };

    let mut pairs = Vec::with_capacity(operators.len());
    for (operator, operand) in operators {
        if !COMPARISON_OPERATORS.contains(&operator.as_str()) {
            return Err(ValidationError::UnknownOperator {
                field: field.to_string(),
                operator: operator.clone(),
            });
        }
        let operand_ok = match operator.as_str() {
            "$in" | "$nin" => operand
                .as_array()
                .is_some_and(|items| items.iter().all(|item| kind.matches(item))),
            _ => kind.matches(operand),
        };
        if !operand_ok {
            return Err(ValidationError::InvalidOperand {
                field: field.to_string(),
                operator: operator.clone(),
            });
        }
        pairs.push((operator.clone(), operand.clone()));
    }
    Ok(QueryFilter::Compare(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Method;
    use crate::users::types::User;
    use serde_json::json;

    fn actor(id: &str) -> User {
        User {
            id: id.into(),
            username: "self".into(),
            password: Some("hash".into()),
            avatar: None,
            created_at: 1,
            updated_at: 1,
        }
    }

    fn ctx(user: Option<User>, method: Method) -> RequestContext {
        RequestContext::new(user, method)
    }

    #[test]
    fn get_with_actor_rewrites_id_to_own_record() {
        let query = resolve_query(
            json!({ "_id": "other-id" }),
            &ctx(Some(actor("self-id")), Method::Get),
        )
        .unwrap();
        assert_eq!(
            query.id,
            Some(QueryFilter::Equals(Value::String("self-id".into())))
        );
    }

    #[test]
    fn actor_scoping_applies_even_without_an_id_filter() {
        let query = resolve_query(json!({}), &ctx(Some(actor("self-id")), Method::Patch)).unwrap();
        assert_eq!(
            query.id,
            Some(QueryFilter::Equals(Value::String("self-id".into())))
        );
    }

    #[test]
    fn find_with_actor_passes_id_through() {
        let query = resolve_query(
            json!({ "_id": "other-id" }),
            &ctx(Some(actor("self-id")), Method::Find),
        )
        .unwrap();
        assert_eq!(
            query.id,
            Some(QueryFilter::Equals(Value::String("other-id".into())))
        );
    }

    #[test]
    fn no_actor_passes_id_through() {
        let query = resolve_query(json!({ "_id": "other-id" }), &ctx(None, Method::Get)).unwrap();
        assert_eq!(
            query.id,
            Some(QueryFilter::Equals(Value::String("other-id".into())))
        );
    }

    #[test]
    fn accepts_pagination_sort_and_operators() {
        let query = resolve_query(
            json!({
                "username": { "$in": ["alice", "bob"] },
                "$limit": 10,
                "$skip": 20,
                "$sort": { "username": -1 },
                "$select": ["_id", "username"]
            }),
            &ctx(None, Method::Find),
        )
        .unwrap();
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.skip, Some(20));
        assert_eq!(
            query.sort,
            vec![("username".to_string(), SortOrder::Descending)]
        );
        assert_eq!(
            query.select.as_deref(),
            Some(&["_id".to_string(), "username".to_string()][..])
        );
        assert_eq!(
            query.username,
            Some(QueryFilter::Compare(vec![(
                "$in".to_string(),
                json!(["alice", "bob"])
            )]))
        );
    }

    #[test]
    fn rejects_unqueryable_property() {
        let err = resolve_query(json!({ "password": "x" }), &ctx(None, Method::Find)).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField(f) if f == "password"));
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = resolve_query(
            json!({ "username": { "$regex": ".*" } }),
            &ctx(None, Method::Find),
        )
        .unwrap_err();
        match err {
            ValidationError::UnknownOperator { field, operator } => {
                assert_eq!(field, "username");
                assert_eq!(operator, "$regex");
            }
            other => panic!("expected UnknownOperator, got {:?}", other),
        }
    }

    #[test]
    fn rejects_in_with_non_array_operand() {
        let err = resolve_query(
            json!({ "username": { "$in": "alice" } }),
            &ctx(None, Method::Find),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidOperand { operator, .. } if operator == "$in"
        ));
    }

    #[test]
    fn rejects_negative_limit() {
        let err = resolve_query(json!({ "$limit": -1 }), &ctx(None, Method::Find)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidType { field, .. } if field == "$limit"
        ));
    }

    #[test]
    fn rejects_bad_sort_direction() {
        let err = resolve_query(
            json!({ "$sort": { "username": 2 } }),
            &ctx(None, Method::Find),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidOperand { operator, .. } if operator == "$sort"
        ));
    }

    #[test]
    fn rejects_sort_on_unqueryable_field() {
        let err = resolve_query(
            json!({ "$sort": { "password": 1 } }),
            &ctx(None, Method::Find),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnknownField(f) if f == "$sort.password"
        ));
    }

    #[test]
    fn rejects_select_of_unknown_field() {
        let err = resolve_query(
            json!({ "$select": ["username", "role"] }),
            &ctx(None, Method::Find),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnknownField(f) if f == "$select.role"
        ));
    }

    #[test]
    fn select_is_limited_to_queryable_properties() {
        // Persisted fields outside {_id, username} are not selectable.
        let err = resolve_query(
            json!({ "$select": ["_id", "avatar"] }),
            &ctx(None, Method::Find),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnknownField(f) if f == "$select.avatar"
        ));
    }

    #[test]
    fn bare_equality_filter_is_type_checked() {
        let err = resolve_query(json!({ "username": 42 }), &ctx(None, Method::Find)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidType { field, .. } if field == "username"
        ));
    }

    #[test]
    fn validation_runs_before_scoping() {
        // Invalid input is rejected outright, actor or not.
        let err = resolve_query(
            json!({ "role": "admin" }),
            &ctx(Some(actor("self-id")), Method::Get),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField(f) if f == "role"));
    }
}
