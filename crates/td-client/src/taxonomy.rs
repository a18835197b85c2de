//! Static subcategory hierarchy
//!
//! Subcategories are not modeled by the backend. They live here as a fixed
//! table keyed by category *name*, matched case-insensitively. A renamed
//! category on the server silently loses its subcategories.

/// Category name → subcategory names
pub const SUBCATEGORIES: &[(&str, &[&str])] = &[
    (
        "Works",
        &[
            "Construction",
            "Road infrastructure",
            "Water supply and sewerage",
            "Electrical installations",
            "Renovation and maintenance",
        ],
    ),
    (
        "Goods",
        &[
            "Medical equipment",
            "IT equipment",
            "Office supplies",
            "Vehicles",
            "Fuel",
            "Food products",
        ],
    ),
    (
        "Services",
        &[
            "Consulting",
            "Cleaning",
            "Security",
            "Maintenance",
            "Transport",
            "Software development",
        ],
    ),
    (
        "Consultancy",
        &["Design", "Supervision", "Audit", "Legal advice"],
    ),
];

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Subcategories of a category; empty for unknown categories.
pub fn subcategories_for(category: &str) -> &'static [&'static str] {
    SUBCATEGORIES
        .iter()
        .find(|(name, _)| same_name(name, category))
        .map(|(_, subs)| *subs)
        .unwrap_or(&[])
}

/// Parent category name of a subcategory.
///
/// A subcategory name listed under several categories resolves to the first.
pub fn parent_of(sub_category: &str) -> Option<&'static str> {
    SUBCATEGORIES
        .iter()
        .find(|(_, subs)| subs.iter().any(|s| same_name(s, sub_category)))
        .map(|(name, _)| *name)
}

/// Whether `sub_category` is listed under `category`.
pub fn belongs_to(category: &str, sub_category: &str) -> bool {
    subcategories_for(category)
        .iter()
        .any(|s| same_name(s, sub_category))
}

/// Canonical spelling of a subcategory under a category.
pub fn canonical(category: &str, sub_category: &str) -> Option<&'static str> {
    subcategories_for(category)
        .iter()
        .find(|s| same_name(s, sub_category))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(subcategories_for(" works ").contains(&"Construction"));
        assert!(subcategories_for("Unknown").is_empty());
    }

    #[test]
    fn test_parent_and_membership() {
        assert_eq!(parent_of("it equipment"), Some("Goods"));
        assert!(belongs_to("Services", "Cleaning"));
        assert!(!belongs_to("Works", "Cleaning"));
        assert_eq!(canonical("goods", "FUEL"), Some("Fuel"));
    }

    #[test]
    fn test_shared_name_resolves_to_first_parent() {
        // "Maintenance" exists only under Services; "Renovation and maintenance" under Works
        assert_eq!(parent_of("Maintenance"), Some("Services"));
    }
}
