//! URL segment -> entity type name.
//!
//! Suffix rules are deliberately literal: `-ies` becomes `y`, `-ses` loses its `es`,
//! anything else loses one trailing `s`. Already-singular nouns ending in `s`
//! ("status") and irregular plurals ("children") come out wrong.

use crate::case::{kebab_to_pascal, lower_first, upper_first};

/// Convert a kebab-case plural segment to a PascalCase singular type name.
/// e.g. "order-items" -> "OrderItem", "categories" -> "Category", "addresses" -> "Address"
pub fn normalize(segment: &str) -> String {
    let pascal = kebab_to_pascal(segment);
    let singular = if let Some(stem) = pascal.strip_suffix("ies") {
        format!("{}y", stem)
    } else if pascal.ends_with("ses") {
        pascal[..pascal.len() - 2].to_string()
    } else {
        pascal.strip_suffix('s').unwrap_or(&pascal).to_string()
    };
    upper_first(&singular)
}

/// Lower-camel singular name of a segment, used as a relation key in bodies and entities.
/// e.g. "orders" -> "order", "order-items" -> "orderItem"
pub fn relation_name(segment: &str) -> String {
    lower_first(&normalize(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singularizes_regular_plurals() {
        assert_eq!(normalize("orders"), "Order");
        assert_eq!(normalize("order-items"), "OrderItem");
    }

    #[test]
    fn ies_becomes_y() {
        assert_eq!(normalize("categories"), "Category");
        assert_eq!(normalize("product-categories"), "ProductCategory");
    }

    #[test]
    fn ses_drops_es() {
        assert_eq!(normalize("addresses"), "Address");
        assert_eq!(normalize("statuses"), "Status");
    }

    #[test]
    fn already_singular_segment_keeps_shape() {
        assert_eq!(normalize("order"), "Order");
        assert_eq!(normalize("order-item"), "OrderItem");
    }

    #[test]
    fn inherited_misfits_are_kept() {
        assert_eq!(normalize("status"), "Statu");
        assert_eq!(normalize("bus"), "Bu");
        assert_eq!(normalize("children"), "Children");
    }

    #[test]
    fn digits_and_symbols_are_stripped() {
        assert_eq!(normalize("v2-orders"), "VOrder");
        assert_eq!(normalize("line_items"), "Lineitem");
    }

    #[test]
    fn relation_name_is_lower_camel() {
        assert_eq!(relation_name("orders"), "order");
        assert_eq!(relation_name("order-items"), "orderItem");
        assert_eq!(relation_name("categories"), "category");
    }
}
