//! Defines the `CategoryName` type and the closed `CategorySet` of candidate
//! labels used for classification.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The label set the original statement data ships with. Classification
/// against any other set works the same way; this is just the default.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Food",
    "Transportation",
    "Utilities",
    "Health/Medical",
    "Clothing/Apparel",
    "Entertainment",
    "Miscellaneous",
];

/// The name of a transaction category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    /// This function will return [Error::EmptyInput] if `name` is empty or
    /// whitespace-only.
    pub fn new(name: &str) -> Result<Self, Error> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            Err(Error::EmptyInput)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty. This function
    /// has `_unchecked` in the name but is not `unsafe`, because violating
    /// the non-empty invariant causes incorrect behaviour but does not
    /// affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, closed set of candidate category labels.
///
/// The order is significant: the classifier's tie-break policy picks the
/// label that appears earliest in the set. The set is never mutated by the
/// classifier; every classification result is a member of the set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySet {
    labels: Vec<CategoryName>,
}

impl CategorySet {
    /// Create a category set from `labels`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyCategorySet] if `labels` is empty,
    /// - or [Error::DuplicateCategory] if the same label appears twice.
    pub fn new(labels: Vec<CategoryName>) -> Result<Self, Error> {
        if labels.is_empty() {
            return Err(Error::EmptyCategorySet);
        }

        for (index, label) in labels.iter().enumerate() {
            if labels[..index].contains(label) {
                return Err(Error::DuplicateCategory(label.to_string()));
            }
        }

        Ok(Self { labels })
    }

    /// Create the default seven-label set ([DEFAULT_CATEGORIES]).
    pub fn default_labels() -> Self {
        Self {
            labels: DEFAULT_CATEGORIES
                .iter()
                .map(|name| CategoryName::new_unchecked(name))
                .collect(),
        }
    }

    /// The labels in candidate order.
    pub fn labels(&self) -> &[CategoryName] {
        &self.labels
    }

    /// The number of labels in the set.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the set has no labels. Always false for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether `label` is a member of the set.
    pub fn contains(&self, label: &CategoryName) -> bool {
        self.labels.contains(label)
    }

    /// Iterate over the labels in candidate order.
    pub fn iter(&self) -> std::slice::Iter<'_, CategoryName> {
        self.labels.iter()
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let category_name = CategoryName::new("");

        assert_eq!(category_name, Err(Error::EmptyInput));
    }

    #[test]
    fn new_fails_on_whitespace_only_string() {
        let category_name = CategoryName::new("   \t");

        assert_eq!(category_name, Err(Error::EmptyInput));
    }

    #[test]
    fn new_trims_surrounding_whitespace() {
        let category_name = CategoryName::new(" Food ").unwrap();

        assert_eq!(category_name.as_ref(), "Food");
    }
}

#[cfg(test)]
mod category_set_tests {
    use crate::{
        Error,
        category::{CategoryName, CategorySet, DEFAULT_CATEGORIES},
    };

    #[test]
    fn new_fails_on_empty_labels() {
        let set = CategorySet::new(vec![]);

        assert_eq!(set, Err(Error::EmptyCategorySet));
    }

    #[test]
    fn new_fails_on_duplicate_label() {
        let labels = vec![
            CategoryName::new_unchecked("Food"),
            CategoryName::new_unchecked("Transportation"),
            CategoryName::new_unchecked("Food"),
        ];

        let set = CategorySet::new(labels);

        assert_eq!(set, Err(Error::DuplicateCategory("Food".to_string())));
    }

    #[test]
    fn new_preserves_candidate_order() {
        let labels = vec![
            CategoryName::new_unchecked("Utilities"),
            CategoryName::new_unchecked("Food"),
        ];

        let set = CategorySet::new(labels.clone()).unwrap();

        assert_eq!(set.labels(), labels.as_slice());
    }

    #[test]
    fn default_labels_contains_all_seven_categories() {
        let set = CategorySet::default_labels();

        assert_eq!(set.len(), DEFAULT_CATEGORIES.len());

        for name in DEFAULT_CATEGORIES {
            assert!(set.contains(&CategoryName::new_unchecked(name)));
        }
    }
}
