//! Builds parameterized statements against the JSONB resources table.
//!
//! Every entity type shares one table keyed by `(locator, id)`. Field names from
//! list queries are user input, so they are bound as parameters and applied with
//! `payload -> $n`; only the schema name is interpolated.

use crate::entity::EntityLocator;
use crate::service::ScopeConstraint;
use crate::sql::PgBindValue;
use crate::store::ListParams;

pub const RESOURCES_TABLE: &str = "resources";

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Schema-qualified resources table, e.g. `"resource_sdk"."resources"`.
pub fn resources_table(schema: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(RESOURCES_TABLE))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, v: impl Into<PgBindValue>) -> u32 {
        self.params.push(v.into());
        self.params.len() as u32
    }
}

pub fn select_by_id(schema: &str, locator: &EntityLocator, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let l = q.push_param(locator.as_str());
    let i = q.push_param(id);
    q.sql = format!(
        "SELECT payload FROM {} WHERE locator = ${} AND id::text = ${}",
        resources_table(schema),
        l,
        i
    );
    q
}

/// Reserve the next id for a new row. The caller writes the payload with [`upsert`].
pub fn insert_placeholder(schema: &str, locator: &EntityLocator) -> QueryBuf {
    let mut q = QueryBuf::new();
    let l = q.push_param(locator.as_str());
    q.sql = format!(
        "INSERT INTO {} (locator, payload) VALUES (${}, '{{}}'::jsonb) RETURNING id",
        resources_table(schema),
        l
    );
    q
}

pub fn upsert(schema: &str, locator: &EntityLocator, id: i64, payload: serde_json::Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let l = q.push_param(locator.as_str());
    let i = q.push_param(id);
    let p = q.push_param(payload);
    q.sql = format!(
        "INSERT INTO {} (locator, id, payload) VALUES (${}, ${}, ${}) \
         ON CONFLICT (locator, id) DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()",
        resources_table(schema),
        l,
        i,
        p
    );
    q
}

pub fn delete_by_id(schema: &str, locator: &EntityLocator, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let l = q.push_param(locator.as_str());
    let i = q.push_param(id);
    q.sql = format!(
        "DELETE FROM {} WHERE locator = ${} AND id::text = ${} RETURNING id",
        resources_table(schema),
        l,
        i
    );
    q
}

/// Loose reference match on one payload field: scalar, `{"id": ..}` object, or any element of an array.
fn reference_predicate(field: u32, expected: u32) -> String {
    format!(
        "(payload -> ${f} ->> 'id' = ${e} \
         OR (jsonb_typeof(payload -> ${f}) IN ('string', 'number', 'boolean') AND payload ->> ${f} = ${e}) \
         OR EXISTS (SELECT 1 FROM jsonb_array_elements(CASE WHEN jsonb_typeof(payload -> ${f}) = 'array' \
         THEN payload -> ${f} ELSE '[]'::jsonb END) AS el WHERE el ->> 'id' = ${e} OR el #>> '{{}}' = ${e}))",
        f = field,
        e = expected
    )
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn where_clause(q: &mut QueryBuf, locator: &EntityLocator, params: &ListParams, scope: Option<&ScopeConstraint>) -> String {
    let l = q.push_param(locator.as_str());
    let mut parts = vec![format!("locator = ${}", l)];
    if let Some(scope) = scope {
        let f = q.push_param(scope.relation.as_str());
        let e = q.push_param(scope.parent_id.as_str());
        parts.push(reference_predicate(f, e));
    }
    for (field, expected) in &params.filters {
        let f = q.push_param(field.as_str());
        let e = q.push_param(expected.as_str());
        parts.push(reference_predicate(f, e));
    }
    if let Some(search) = &params.search {
        let s = q.push_param(format!("%{}%", escape_like(&search.to_lowercase())));
        parts.push(format!(
            "EXISTS (SELECT 1 FROM jsonb_each(payload) AS kv WHERE jsonb_typeof(kv.value) IN ('string', 'number') \
             AND lower(kv.value #>> '{{}}') LIKE ${})",
            s
        ));
    }
    format!(" WHERE {}", parts.join(" AND "))
}

pub fn count_page(schema: &str, locator: &EntityLocator, params: &ListParams, scope: Option<&ScopeConstraint>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, locator, params, scope);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", resources_table(schema), where_sql);
    q
}

/// One page of payloads. Sort keys compare JSONB values; ties and unsorted lists fall back to id.
pub fn select_page(schema: &str, locator: &EntityLocator, params: &ListParams, scope: Option<&ScopeConstraint>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, locator, params, scope);
    let mut order = Vec::with_capacity(params.sort.len() + 1);
    for key in &params.sort {
        let f = q.push_param(key.field.as_str());
        let dir = if key.descending { "DESC NULLS LAST" } else { "ASC NULLS FIRST" };
        order.push(format!("payload -> ${} {}", f, dir));
    }
    order.push("id".to_string());
    let limit = q.push_param(i64::from(params.page_size));
    let offset = q.push_param(params.offset() as i64);
    q.sql = format!(
        "SELECT payload FROM {}{} ORDER BY {} LIMIT ${} OFFSET ${}",
        resources_table(schema),
        where_sql,
        order.join(", "),
        limit,
        offset
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ListQuery;
    use serde_json::json;

    fn loc() -> EntityLocator {
        EntityLocator::new("entities", "OrderItem")
    }

    #[test]
    fn select_by_id_binds_locator_then_id() {
        let q = select_by_id("shop", &loc(), "5");
        assert_eq!(
            q.sql,
            r#"SELECT payload FROM "shop"."resources" WHERE locator = $1 AND id::text = $2"#
        );
        assert_eq!(q.params, [PgBindValue::from("entities::OrderItem"), PgBindValue::from("5")]);
    }

    #[test]
    fn schema_is_quoted() {
        assert_eq!(resources_table(r#"we"ird"#), r#""we""ird"."resources""#);
    }

    #[test]
    fn upsert_binds_payload_as_json() {
        let q = upsert("s", &loc(), 3, json!({"id": 3}));
        assert!(q.sql.contains("ON CONFLICT (locator, id)"));
        assert_eq!(q.params[1], PgBindValue::I64(3));
        assert_eq!(q.params[2], PgBindValue::Json(json!({"id": 3})));
    }

    #[test]
    fn insert_placeholder_returns_id() {
        let q = insert_placeholder("s", &loc());
        assert!(q.sql.ends_with("VALUES ($1, '{}'::jsonb) RETURNING id"));
    }

    #[test]
    fn page_numbers_params_in_order() {
        let query = ListQuery {
            search: Some("50%".into()),
            filter: Some("status:paid".into()),
            sort: Some("-quantity".into()),
            page: Some("2".into()),
            page_size: Some("10".into()),
        };
        let params = ListParams::parse(&query, 20);
        let scope = ScopeConstraint {
            relation: "order".into(),
            parent_id: "5".into(),
        };
        let q = select_page("s", &loc(), &params, Some(&scope));
        assert_eq!(
            q.params,
            [
                PgBindValue::from("entities::OrderItem"),
                PgBindValue::from("order"),
                PgBindValue::from("5"),
                PgBindValue::from("status"),
                PgBindValue::from("paid"),
                PgBindValue::from("%50\\%%"),
                PgBindValue::from("quantity"),
                PgBindValue::I64(10),
                PgBindValue::I64(10),
            ]
        );
        assert!(q.sql.contains("ORDER BY payload -> $7 DESC NULLS LAST, id LIMIT $8 OFFSET $9"));
        assert!(q.sql.contains("payload -> $2 ->> 'id' = $3"));
    }

    #[test]
    fn count_shares_the_filter() {
        let params = ListParams::parse(&ListQuery::default(), 20);
        let q = count_page("s", &loc(), &params, None);
        assert_eq!(q.sql, r#"SELECT COUNT(*) FROM "s"."resources" WHERE locator = $1"#);
        assert_eq!(q.params.len(), 1);
    }
}
