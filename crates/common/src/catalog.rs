//! Built-in favor catalog
//!
//! Served when `coupons.json` is missing or the store cannot be reached, and
//! used to seed an empty store.

use crate::models::CouponDefinition;

/// (id, title, description, icon, max claims, category)
const DEFAULT_COUPONS: &[(u64, &str, &str, &str, u32, &str)] = &[
    (
        1,
        "Bubble Tea Craving Satisfier",
        "I'll get you that bubble tea you're craving",
        "coffee",
        5,
        "food",
    ),
    (
        2,
        "Late Night Food Run",
        "When you're hungry and everything's closed, I got you",
        "utensils",
        3,
        "food",
    ),
    (
        3,
        "Shoulder Massage Session",
        "15 minutes of stress relief for those tense shoulders",
        "heart",
        10,
        "service",
    ),
    (
        4,
        "Errand Runner",
        "I'll run that errand you've been procrastinating on",
        "package",
        7,
        "service",
    ),
    (
        5,
        "Listening Ear",
        "30 minutes of uninterrupted listening about anything",
        "message-circle",
        20,
        "service",
    ),
    (
        6,
        "Movie Night Companion",
        "I'll watch that movie you want to see with you",
        "film",
        4,
        "entertainment",
    ),
    (
        7,
        "Study Buddy",
        "2 hours of focused study session together",
        "book-open",
        8,
        "study",
    ),
    (
        8,
        "Breakfast in Bed",
        "Surprise morning meal delivered to your bed",
        "sunrise",
        3,
        "food",
    ),
    (
        9,
        "Tech Support",
        "I'll help fix your tech issues for 1 hour",
        "laptop",
        5,
        "service",
    ),
];

/// The default catalog, all entries active
pub fn default_catalog() -> Vec<CouponDefinition> {
    DEFAULT_COUPONS
        .iter()
        .map(
            |&(id, title, description, icon, max_claims, category)| CouponDefinition {
                id,
                title: title.to_string(),
                description: description.to_string(),
                icon_tag: icon.to_string(),
                max_claims,
                category: Some(category.to_string()),
                is_active: true,
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 9);
        CouponDefinition::validate_catalog(&catalog).unwrap();
        assert!(catalog.iter().all(|c| c.is_active));
    }
}
