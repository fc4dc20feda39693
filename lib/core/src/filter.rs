// Categorical filters over listing columns, used to express candidate tiers.
// Comparisons follow dataframe semantics: a missing cell never equals a
// value and always differs from it.
use crate::Listing;
use serde_json::Value;

pub trait Filter {
    fn matches(&self, listing: &Listing) -> bool;
}

#[derive(Debug, Clone)]
pub struct ListingFilter {
    condition: FilterCondition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Matches every row
    All,
    Equals { field: String, value: Value },
    NotEquals { field: String, value: Value },
    And(Vec<FilterCondition>),
    Or(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

impl FilterCondition {
    pub fn equals(field: &str, value: Value) -> Self {
        FilterCondition::Equals {
            field: field.to_string(),
            value,
        }
    }

    pub fn not_equals(field: &str, value: Value) -> Self {
        FilterCondition::NotEquals {
            field: field.to_string(),
            value,
        }
    }
}

impl ListingFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    pub fn all() -> Self {
        Self::new(FilterCondition::All)
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    fn matches_condition(condition: &FilterCondition, listing: &Listing) -> bool {
        match condition {
            FilterCondition::All => true,
            FilterCondition::Equals { field, value } => {
                !value.is_null()
                    && listing
                        .get(field)
                        .map(|v| v == value)
                        .unwrap_or(false)
            }
            FilterCondition::NotEquals { field, value } => {
                value.is_null()
                    || listing
                        .get(field)
                        .map(|v| v != value)
                        .unwrap_or(true)
            }
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, listing))
            }
            FilterCondition::Or(conditions) => {
                conditions.iter().any(|c| Self::matches_condition(c, listing))
            }
            FilterCondition::Not(condition) => !Self::matches_condition(condition, listing),
        }
    }
}

impl Filter for ListingFilter {
    fn matches(&self, listing: &Listing) -> bool {
        Self::matches_condition(&self.condition, listing)
    }
}

impl From<FilterCondition> for ListingFilter {
    fn from(condition: FilterCondition) -> Self {
        Self::new(condition)
    }
}
