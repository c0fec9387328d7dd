//! Route classification from segment count and fixed positions after the base prefix.
//!
//! Resource segments (after the prefix) take one of four shapes:
//!
//! | count | segments                 | shape                   |
//! |-------|--------------------------|-------------------------|
//! | 1     | `res`                    | collection              |
//! | 2     | `res/id`                 | single instance         |
//! | 3     | `parent/pid/res`         | nested collection       |
//! | 4     | `parent/pid/res/id`      | nested single instance  |

use crate::entity::EntityLocator;
use crate::error::AppError;
use crate::resolver::noun::{normalize, relation_name};
use crate::resolver::segment::PathSegments;
use serde::Serialize;

/// Base prefix and naming conventions shared by every route.
#[derive(Clone, Debug)]
pub struct RouteScheme {
    /// Leading segments every resource path starts with (e.g. `["api"]`).
    pub prefix: Vec<String>,
    /// Namespace used to build entity locators.
    pub entity_namespace: String,
    /// Optional folder qualifying form names (`<folder>::<Entity>Type`).
    pub form_folder: Option<String>,
}

impl Default for RouteScheme {
    fn default() -> Self {
        RouteScheme {
            prefix: vec!["api".into()],
            entity_namespace: "entities".into(),
            form_folder: None,
        }
    }
}

impl RouteScheme {
    pub fn with_prefix(prefix: &str) -> Self {
        RouteScheme {
            prefix: PathSegments::parse(prefix).as_slice().to_vec(),
            ..Default::default()
        }
    }

    /// Prefix as a mount path, e.g. `/api`.
    pub fn mount_path(&self) -> String {
        format!("/{}", self.prefix.join("/"))
    }

    pub fn locator(&self, entity_name: &str) -> EntityLocator {
        EntityLocator::new(&self.entity_namespace, entity_name)
    }

    /// Form name bound for an entity: `OrderItemType`, or `shop::OrderItemType` with a folder.
    pub fn form_name(&self, entity_name: &str) -> String {
        match self.form_folder.as_deref().filter(|f| !f.is_empty()) {
            Some(folder) => format!("{}::{}Type", folder, entity_name),
            None => format!("{}Type", entity_name),
        }
    }

    pub fn classify(&self, segments: &PathSegments) -> Result<RouteDescriptor, AppError> {
        classify(self, segments)
    }
}

/// Parent constraint of a nested route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParentScope {
    pub entity_name: String,
    pub entity_locator: EntityLocator,
    /// Lower-camel relation key (`order` for `orders`).
    pub relation: String,
    pub id: String,
    /// Position of the parent id within the full path segments.
    pub id_segment_index: usize,
}

/// What a request path addresses. Built once per request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub entity_name: String,
    pub entity_locator: EntityLocator,
    pub parent: Option<ParentScope>,
    pub target_id: Option<String>,
    pub is_sub_resource_list: bool,
}

impl RouteDescriptor {
    pub fn is_collection(&self) -> bool {
        self.target_id.is_none()
    }

    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }
}

/// Classify a path against the scheme. Paths shorter than two segments, with a foreign
/// prefix, or with more than four resource segments are malformed.
pub fn classify(scheme: &RouteScheme, segments: &PathSegments) -> Result<RouteDescriptor, AppError> {
    let malformed = || AppError::MalformedRoute(format!("/{}", segments.as_slice().join("/")));
    if segments.len() < 2 {
        return Err(malformed());
    }
    let base = scheme.prefix.len();
    let all = segments.as_slice();
    if all.len() <= base || all[..base] != scheme.prefix[..] {
        return Err(malformed());
    }
    let rest = &all[base..];

    let (resource, parent, target_id) = match rest {
        [res] => (res, None, None),
        [res, id] => (res, None, Some(id)),
        [parent, pid, res] => (res, Some((parent, pid)), None),
        [parent, pid, res, id] => (res, Some((parent, pid)), Some(id)),
        _ => return Err(malformed()),
    };

    let entity_name = normalize(resource);
    if entity_name.is_empty() {
        return Err(malformed());
    }
    let parent = match parent {
        Some((parent_segment, pid)) => {
            let parent_name = normalize(parent_segment);
            if parent_name.is_empty() {
                return Err(malformed());
            }
            Some(ParentScope {
                entity_locator: scheme.locator(&parent_name),
                entity_name: parent_name,
                relation: relation_name(parent_segment),
                id: pid.clone(),
                id_segment_index: base + 1,
            })
        }
        None => None,
    };

    let descriptor = RouteDescriptor {
        entity_locator: scheme.locator(&entity_name),
        entity_name,
        is_sub_resource_list: parent.is_some() && target_id.is_none(),
        parent,
        target_id: target_id.cloned(),
    };
    tracing::debug!(
        entity = %descriptor.entity_name,
        target_id = ?descriptor.target_id,
        parent = ?descriptor.parent.as_ref().map(|p| (&p.entity_name, &p.id)),
        "classified route"
    );
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn classify_path(path: &str) -> Result<RouteDescriptor, AppError> {
        RouteScheme::default().classify(&PathSegments::parse(path))
    }

    #[test]
    fn flat_single_instance() {
        let d = classify_path("/api/order-items/42").unwrap();
        assert_eq!(d.entity_name, "OrderItem");
        assert_eq!(d.entity_locator.as_str(), "entities::OrderItem");
        assert_eq!(d.target_id.as_deref(), Some("42"));
        assert!(d.parent.is_none());
        assert!(!d.is_sub_resource_list);
    }

    #[test]
    fn flat_collection() {
        let d = classify_path("/api/categories").unwrap();
        assert_eq!(d.entity_name, "Category");
        assert!(d.is_collection());
        assert!(d.parent.is_none());
    }

    #[test]
    fn even_resource_count_is_single_and_odd_is_collection() {
        for (path, single) in [
            ("/api/orders", false),
            ("/api/orders/1", true),
            ("/api/orders/1/order-items", false),
            ("/api/orders/1/order-items/9", true),
        ] {
            let d = classify_path(path).unwrap();
            assert_eq!(d.target_id.is_some(), single, "{}", path);
            if single {
                assert_eq!(d.target_id.as_deref(), path.rsplit('/').next());
            }
        }
    }

    #[test]
    fn nested_single_instance() {
        let d = classify_path("/api/orders/5/order-items/42").unwrap();
        assert_eq!(d.entity_name, "OrderItem");
        assert_eq!(d.target_id.as_deref(), Some("42"));
        let parent = d.parent.unwrap();
        assert_eq!(parent.entity_name, "Order");
        assert_eq!(parent.relation, "order");
        assert_eq!(parent.id, "5");
        assert_eq!(parent.id_segment_index, 2);
        assert!(!d.is_sub_resource_list);
    }

    #[test]
    fn nested_collection_is_sub_resource_list() {
        let d = classify_path("/api/addresses/3/categories").unwrap();
        assert_eq!(d.entity_name, "Category");
        assert!(d.is_sub_resource_list);
        assert_eq!(d.parent.unwrap().entity_name, "Address");
    }

    #[test]
    fn same_path_gives_same_descriptor() {
        let a = classify_path("/api/orders/5/order-items/42").unwrap();
        let b = classify_path("api/orders/5/order-items/42/").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_routes() {
        assert_matches!(classify_path("/api"), Err(AppError::MalformedRoute(_)));
        assert_matches!(classify_path("/"), Err(AppError::MalformedRoute(_)));
        assert_matches!(classify_path("/v1/orders"), Err(AppError::MalformedRoute(_)));
        assert_matches!(classify_path("/api/a/1/b/2/c"), Err(AppError::MalformedRoute(_)));
        assert_matches!(classify_path("/api/42"), Err(AppError::MalformedRoute(_)));
    }

    #[test]
    fn longer_prefix() {
        let scheme = RouteScheme::with_prefix("/api/v1");
        let d = scheme.classify(&PathSegments::parse("/api/v1/orders/7")).unwrap();
        assert_eq!(d.entity_name, "Order");
        assert_eq!(d.target_id.as_deref(), Some("7"));
        assert_eq!(scheme.mount_path(), "/api/v1");
    }

    #[test]
    fn form_names() {
        let mut scheme = RouteScheme::default();
        assert_eq!(scheme.form_name("OrderItem"), "OrderItemType");
        scheme.form_folder = Some("shop".into());
        assert_eq!(scheme.form_name("OrderItem"), "shop::OrderItemType");
    }
}
