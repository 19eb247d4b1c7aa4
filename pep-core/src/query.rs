//! Authorization query sent to the policy decision point

use crate::error::{PepError, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// Entity type used for callers
pub const USER_TYPE: &str = "User";
/// Entity type used for HTTP methods
pub const ACTION_TYPE: &str = "Action";
/// Entity type used for the routed resource collection
pub const RESOURCE_TYPE: &str = "ResourceType";

/// Cedar-style entity reference, rendered as `Type::"id"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityUid {
    /// Entity type (e.g. `User`)
    pub entity_type: String,
    /// Entity id, unescaped
    pub id: String,
}

impl EntityUid {
    /// Create a new entity reference
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        EntityUid {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// `User::"<id>"`
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(USER_TYPE, id)
    }

    /// `Action::"<method>"`, method lower-cased
    pub fn action(method: &str) -> Self {
        Self::new(ACTION_TYPE, method.to_lowercase())
    }

    /// `ResourceType::"<name>"`
    pub fn resource_type(name: impl Into<String>) -> Self {
        Self::new(RESOURCE_TYPE, name)
    }
}

impl fmt::Display for EntityUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::\"", self.entity_type)?;
        for c in self.id.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                c => write!(f, "{}", c)?,
            }
        }
        f.write_str("\"")
    }
}

impl Serialize for EntityUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The body of `POST /v1/is_authorized`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizationQuery {
    /// Caller identity
    pub principal: EntityUid,
    /// Lower-cased HTTP method
    pub action: EntityUid,
    /// First path segment of the request
    pub resource: EntityUid,
    /// Raw request body, `null` when absent
    pub context: serde_json::Value,
}

/// Returns the first segment of a request path, or `""` when there is none.
///
/// Any query string or fragment is ignored: `/article/42?x=1` yields `article`.
pub fn first_path_segment(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').nth(1).unwrap_or_default()
}

/// Builder turning raw request attributes into an [`AuthorizationQuery`]
#[derive(Debug, Default)]
pub struct QueryBuilder {
    principal: Option<String>,
    method: Option<String>,
    path: Option<String>,
    context: Option<serde_json::Value>,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the caller identity, verbatim
    pub fn principal(mut self, principal: &str) -> Self {
        self.principal = Some(principal.to_string());
        self
    }

    /// Set the HTTP method
    pub fn method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    /// Set the request path
    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Set the parsed request body
    pub fn context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Build the query
    pub fn build(self) -> Result<AuthorizationQuery> {
        let method = self
            .method
            .filter(|m| !m.is_empty())
            .ok_or_else(|| PepError::InvalidQuery("Missing method".into()))?;
        let path = self
            .path
            .ok_or_else(|| PepError::InvalidQuery("Missing path".into()))?;

        Ok(AuthorizationQuery {
            principal: EntityUid::user(self.principal.unwrap_or_default()),
            action: EntityUid::action(&method),
            resource: EntityUid::resource_type(first_path_segment(&path)),
            context: self.context.unwrap_or(serde_json::Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_entity_uid_display() {
        assert_eq!(EntityUid::user("alice").to_string(), r#"User::"alice""#);
        assert_eq!(EntityUid::action("DELETE").to_string(), r#"Action::"delete""#);
        assert_eq!(
            EntityUid::resource_type("article").to_string(),
            r#"ResourceType::"article""#
        );
    }

    #[test]
    fn test_entity_uid_escapes_quotes() {
        let uid = EntityUid::user(r#"eve" || true"#);
        assert_eq!(uid.to_string(), r#"User::"eve\" || true""#);

        let uid = EntityUid::user(r"back\slash");
        assert_eq!(uid.to_string(), r#"User::"back\\slash""#);
    }

    #[test]
    fn test_first_path_segment() {
        assert_eq!(first_path_segment("/article"), "article");
        assert_eq!(first_path_segment("/article/42"), "article");
        assert_eq!(first_path_segment("/article/42?draft=true"), "article");
        assert_eq!(first_path_segment("/article?page=2"), "article");
        assert_eq!(first_path_segment("/"), "");
        assert_eq!(first_path_segment(""), "");
    }

    #[test]
    fn test_build_query() {
        let query = QueryBuilder::new()
            .principal("alice")
            .method("GET")
            .path("/article")
            .build()
            .unwrap();

        assert_eq!(query.principal, EntityUid::user("alice"));
        assert_eq!(query.action.id, "get");
        assert_eq!(query.resource.id, "article");
        assert_eq!(query.context, serde_json::Value::Null);
    }

    #[test]
    fn test_build_query_missing_principal_is_empty() {
        let query = QueryBuilder::new()
            .method("PUT")
            .path("/article/7")
            .build()
            .unwrap();

        assert_eq!(query.principal.to_string(), r#"User::"""#);
    }

    #[test]
    fn test_build_query_requires_method_and_path() {
        let err = QueryBuilder::new().path("/article").build().unwrap_err();
        assert!(matches!(err, PepError::InvalidQuery(_)));

        let err = QueryBuilder::new().method("GET").build().unwrap_err();
        assert!(matches!(err, PepError::InvalidQuery(_)));
    }

    #[test]
    fn test_query_serialization() {
        let query = QueryBuilder::new()
            .principal("bob")
            .method("POST")
            .path("/article/42")
            .context(json!({"title": "Hello"}))
            .build()
            .unwrap();

        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({
                "principal": "User::\"bob\"",
                "action": "Action::\"post\"",
                "resource": "ResourceType::\"article\"",
                "context": {"title": "Hello"}
            })
        );
    }

    #[test]
    fn test_context_serialized_verbatim() {
        let raw = r#"{"z":1,"a":123456789012345678901234567890}"#;
        let query = QueryBuilder::new()
            .method("POST")
            .path("/article/1")
            .context(serde_json::from_str(raw).unwrap())
            .build()
            .unwrap();

        let body = serde_json::to_string(&query).unwrap();
        assert!(body.ends_with(&format!(r#""context":{}}}"#, raw)), "{}", body);
    }

    proptest! {
        #[test]
        fn prop_plain_ids_render_verbatim(id in "[a-zA-Z0-9_@. -]{0,32}") {
            prop_assert_eq!(EntityUid::user(id.clone()).to_string(), format!("User::\"{}\"", id));
        }

        #[test]
        fn prop_action_is_lowercase(method in "[A-Za-z]{1,10}") {
            let query = QueryBuilder::new().method(&method).path("/article").build().unwrap();
            prop_assert_eq!(query.action.id, method.to_lowercase());
        }

        #[test]
        fn prop_resource_ignores_tail(segment in "[a-z]{1,12}", tail in "(/[a-z0-9]{0,8}){0,3}") {
            let path = format!("/{}{}", segment, tail);
            prop_assert_eq!(first_path_segment(&path), segment.as_str());
        }
    }
}
