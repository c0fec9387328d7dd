//! Case conversion for resource names: URL segments are kebab-case, entity types PascalCase, body keys lowerCamelCase.

/// Upper-case the first character of each `-` separated word, keeping the separators.
/// e.g. "order-items" -> "Order-Items"
pub fn title_case_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '-' {
            out.push(c);
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Drop everything that is not an ASCII letter.
pub fn strip_non_alphabetic(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

/// Upper-case the first character only. e.g. "order" -> "Order"
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character only. e.g. "OrderItem" -> "orderItem"
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert kebab-case to PascalCase without any singularization.
/// e.g. "order-items" -> "OrderItems"
pub fn kebab_to_pascal(s: &str) -> String {
    strip_non_alphabetic(&title_case_words(s))
}

/// Whether a name is usable as an entity type name: ASCII letters only, leading upper-case.
pub fn is_pascal_case(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}
