//! The fixed spending category taxonomy.
//!
//! Categories are not user-editable. Expenses store the category *name* they
//! were created with; anything that needs the display metadata goes through
//! [`Category::lookup`], which falls back to [`Category::fallback`] ("Other")
//! for names that are not in the taxonomy.

use serde::Serialize;

/// A spending category with its presentation attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub background: &'static str,
}

/// Name of the fallback category.
pub const OTHER: &str = "Other";

/// The taxonomy, in display order. The last entry is the fallback.
pub const CATEGORIES: [Category; 8] = [
    Category {
        name: "Food & Dining",
        icon: "🍜",
        color: "#FF6B6B",
        background: "rgba(255,107,107,0.12)",
    },
    Category {
        name: "Transport",
        icon: "🚖",
        color: "#4EC9FF",
        background: "rgba(78,201,255,0.12)",
    },
    Category {
        name: "Shopping",
        icon: "🛍️",
        color: "#FFD166",
        background: "rgba(255,209,102,0.12)",
    },
    Category {
        name: "Entertainment",
        icon: "🎮",
        color: "#A78BFA",
        background: "rgba(167,139,250,0.12)",
    },
    Category {
        name: "Health",
        icon: "💊",
        color: "#06D6A0",
        background: "rgba(6,214,160,0.12)",
    },
    Category {
        name: "Bills & Utilities",
        icon: "⚡",
        color: "#F4A261",
        background: "rgba(244,162,97,0.12)",
    },
    Category {
        name: "Education",
        icon: "📚",
        color: "#48CAE4",
        background: "rgba(72,202,228,0.12)",
    },
    Category {
        name: OTHER,
        icon: "📦",
        color: "#C9C9C9",
        background: "rgba(201,201,201,0.12)",
    },
];

impl Category {
    /// Every category, in display order.
    pub fn all() -> &'static [Category] {
        &CATEGORIES
    }

    /// The category preselected for new expenses (first of the taxonomy).
    pub fn default_for_new() -> &'static Category {
        &CATEGORIES[0]
    }

    /// The "Other" category, used for any unknown name.
    pub fn fallback() -> &'static Category {
        &CATEGORIES[CATEGORIES.len() - 1]
    }

    /// Resolves a stored category name to its taxonomy entry.
    ///
    /// Matching is exact. Unknown names resolve to [`Category::fallback`], so
    /// this never fails.
    pub fn lookup(name: &str) -> &'static Category {
        Self::find(name).unwrap_or_else(Self::fallback)
    }

    /// Exact lookup without the fallback.
    pub fn find(name: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|category| category.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, a) in CATEGORIES.iter().enumerate() {
            for b in &CATEGORIES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn exactly_one_fallback() {
        assert_eq!(CATEGORIES.iter().filter(|c| c.name == OTHER).count(), 1);
        assert_eq!(Category::fallback().name, OTHER);
    }

    #[test]
    fn lookup_falls_back_to_other() {
        assert_eq!(Category::lookup("Transport").name, "Transport");
        assert_eq!(Category::lookup("Groceries").name, OTHER);
        assert_eq!(Category::lookup("transport").name, OTHER);
        assert_eq!(Category::lookup("").name, OTHER);
        assert!(Category::find("Groceries").is_none());
    }

    #[test]
    fn default_is_first_entry() {
        assert_eq!(Category::default_for_new().name, "Food & Dining");
    }
}
