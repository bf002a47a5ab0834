//! Uniqueness with self-exclusion.

use std::fmt;

/// Columns carrying a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    UserName,
    CategoryName,
    NotificationMessage,
}

impl UniqueField {
    /// Stable label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            UniqueField::UserName => "user_name",
            UniqueField::CategoryName => "category_name",
            UniqueField::NotificationMessage => "notification_message",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UniqueField::UserName => "user name",
            UniqueField::CategoryName => "notification category name",
            UniqueField::NotificationMessage => "notification message",
        };
        f.write_str(text)
    }
}

/// Whether a value may be written to the entity `own_id`.
///
/// `holder` is the id of the row currently holding the value, if any;
/// `own_id` is `None` when creating. A value held only by the entity being
/// updated is still available to it.
pub fn is_unique(holder: Option<i64>, own_id: Option<i64>) -> bool {
    match (holder, own_id) {
        (None, _) => true,
        (Some(holder), Some(own)) => holder == own,
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unused_value_is_unique() {
        assert!(is_unique(None, None));
        assert!(is_unique(None, Some(4)));
    }

    #[test]
    fn test_taken_value_rejected_on_create() {
        assert!(!is_unique(Some(1), None));
    }

    #[test]
    fn test_self_exclusion_on_update() {
        assert!(is_unique(Some(4), Some(4)));
        assert!(!is_unique(Some(1), Some(4)));
    }

    #[test]
    fn test_display() {
        assert_eq!(UniqueField::NotificationMessage.to_string(), "notification message");
        assert_eq!(UniqueField::CategoryName.as_label(), "category_name");
    }
}
