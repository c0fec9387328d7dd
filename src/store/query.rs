//! List parameter interpretation shared by the stores.
//!
//! - `search`: case-insensitive substring over top-level scalar fields
//! - `filter`: `field:value[,field:value...]`, relations compare by id
//! - `sort`: `field[,-field...]`, `-` for descending
//! - `page`: 1-based; `pageSize`: capped at [`MAX_PAGE_SIZE`]

use crate::entity::{reference_id, Entity};
use crate::service::{ListQuery, ScopeConstraint};
use serde_json::Value;
use std::cmp::Ordering;

pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListParams {
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    pub sort: Vec<SortKey>,
    pub page: u32,
    pub page_size: u32,
}

impl ListParams {
    /// Lenient parse: malformed pieces fall back to defaults instead of failing the list.
    pub fn parse(query: &ListQuery, default_page_size: u32) -> Self {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let filters = query
            .filter
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|pair| pair.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        let sort = query
            .sort
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "-")
            .map(|s| match s.strip_prefix('-') {
                Some(field) => SortKey {
                    field: field.to_string(),
                    descending: true,
                },
                None => SortKey {
                    field: s.to_string(),
                    descending: false,
                },
            })
            .collect();
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let page_size = query
            .page_size
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(default_page_size.max(1))
            .min(MAX_PAGE_SIZE);
        ListParams {
            search,
            filters,
            sort,
            page,
            page_size,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Whether an entity passes search, filters and scope.
    pub fn matches(&self, entity: &Entity, scope: Option<&ScopeConstraint>) -> bool {
        if let Some(scope) = scope {
            if !references(entity.get(&scope.relation), &scope.parent_id) {
                return false;
            }
        }
        if !self
            .filters
            .iter()
            .all(|(field, expected)| references(entity.get(field), expected))
        {
            return false;
        }
        match &self.search {
            Some(needle) => {
                let needle = needle.to_lowercase();
                entity.values().any(|v| match v {
                    Value::String(s) => s.to_lowercase().contains(&needle),
                    Value::Number(n) => n.to_string().contains(&needle),
                    _ => false,
                })
            }
            None => true,
        }
    }

    pub fn compare(&self, a: &Entity, b: &Entity) -> Ordering {
        for key in &self.sort {
            let ord = compare_values(a.get(&key.field), b.get(&key.field));
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Loose equality against a scalar, a relation object, or any element of a relation list.
fn references(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .any(|v| reference_id(v).as_deref() == Some(expected)),
        Some(v) => reference_id(v).as_deref() == Some(expected),
        None => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = |v: Option<&Value>| match v {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    };
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x @ Value::Object(_)), Some(y @ Value::Object(_))) => {
            reference_id(x).cmp(&reference_id(y))
        }
        _ => rank(a).cmp(&rank(b)),
    }
}
