//! Normalization of raw query-string items into filter criteria.
//!
//! Parsing never fails: unrecognized keys are ignored and malformed values
//! fall back to defaults, logged at debug level. Item order is preserved so
//! repeated keys behave the way the client sent them.

use crate::config::DiscoveryConfig;
use crate::models::{map_external_type, Category, Sort};
use uuid::Uuid;

/// Normalized discovery filters. Every field is valid by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub types: Vec<Category>,
    pub locations: Vec<String>,
    pub date: Option<String>,
    pub sort: Sort,
    pub page: i64,
    pub limit: i64,
    pub attending: bool,
    pub user_id: Option<Uuid>,
}

impl FilterCriteria {
    /// Build criteria from decoded query items, in order.
    pub fn from_items(items: &[(String, String)], config: &DiscoveryConfig) -> Self {
        let mut criteria = Self {
            search: None,
            category: None,
            types: Vec::new(),
            locations: Vec::new(),
            date: None,
            sort: Sort::default(),
            page: 1,
            limit: config.default_page_size,
            attending: false,
            user_id: None,
        };

        for (key, value) in items {
            let value = value.trim();
            match key.as_str() {
                "search" | "q" => {
                    if !value.is_empty() {
                        criteria.search = Some(value.to_string());
                    }
                }
                "category" => match Category::parse(value) {
                    Some(category) => criteria.category = Some(category),
                    None => {
                        tracing::debug!(value, "unknown category, ignoring");
                    }
                },
                "type" | "types" => {
                    for token in value.split(',') {
                        let token = token.trim();
                        if token.is_empty() {
                            continue;
                        }
                        match map_external_type(token) {
                            Some(category) if !criteria.types.contains(&category) => {
                                criteria.types.push(category);
                            }
                            Some(_) => {}
                            None => {
                                tracing::debug!(value = token, "unknown event type, ignoring");
                            }
                        }
                    }
                }
                // Addresses contain commas, so location values never split.
                "location" | "locations" => {
                    if !value.is_empty() {
                        let owned = value.to_string();
                        if !criteria.locations.contains(&owned) {
                            criteria.locations.push(owned);
                        }
                    }
                }
                "date" => {
                    if !value.is_empty() {
                        criteria.date = Some(value.to_string());
                    }
                }
                "sort" => match Sort::parse(value) {
                    Some(sort) => criteria.sort = sort,
                    None => {
                        tracing::debug!(value, "unknown sort key, using default");
                    }
                },
                "page" => {
                    criteria.page = match value.parse::<i64>() {
                        Ok(page) if page >= 1 => page,
                        _ => {
                            tracing::debug!(value, "invalid page, using 1");
                            1
                        }
                    };
                }
                "limit" => {
                    criteria.limit = match value.parse::<i64>() {
                        Ok(limit) if limit >= 1 => limit.min(config.max_page_size),
                        _ => {
                            tracing::debug!(value, "invalid limit, using default");
                            config.default_page_size
                        }
                    };
                }
                "attending" => {
                    criteria.attending = matches!(value, "true" | "1");
                }
                "userId" | "user_id" => match Uuid::parse_str(value) {
                    Ok(id) => criteria.user_id = Some(id),
                    Err(_) => {
                        tracing::debug!(value, "invalid user id, ignoring");
                    }
                },
                _ => {}
            }
        }

        criteria
    }

    /// Saturates instead of overflowing: an absurd page number yields an
    /// offset past every row, which reads back as an empty page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DiscoveryConfig {
        DiscoveryConfig::default()
    }

    fn items(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_input_yields_defaults() {
        let criteria = FilterCriteria::from_items(&[], &config());
        assert_eq!(criteria.search, None);
        assert_eq!(criteria.category, None);
        assert!(criteria.types.is_empty());
        assert!(criteria.locations.is_empty());
        assert_eq!(criteria.sort, Sort::Newest);
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.limit, 20);
        assert!(!criteria.attending);
    }

    #[test]
    fn recognized_keys_are_parsed() {
        let criteria = FilterCriteria::from_items(
            &items(&[
                ("search", "  jazz  "),
                ("category", "music"),
                ("location", "Berlin"),
                ("date", "this_week"),
                ("sort", "upcoming"),
                ("page", "3"),
                ("limit", "5"),
            ]),
            &config(),
        );
        assert_eq!(criteria.search.as_deref(), Some("jazz"));
        assert_eq!(criteria.category, Some(Category::Music));
        assert_eq!(criteria.locations, vec!["Berlin".to_string()]);
        assert_eq!(criteria.date.as_deref(), Some("this_week"));
        assert_eq!(criteria.sort, Sort::Upcoming);
        assert_eq!(criteria.page, 3);
        assert_eq!(criteria.limit, 5);
        assert_eq!(criteria.offset(), 10);
    }

    #[test]
    fn external_type_names_map_to_categories() {
        let criteria = FilterCriteria::from_items(
            &items(&[("types", "concerts,sports"), ("type", "Culture")]),
            &config(),
        );
        assert_eq!(
            criteria.types,
            vec![Category::Music, Category::Sports, Category::Culture]
        );
    }

    #[test]
    fn unknown_types_and_duplicates_are_dropped() {
        let criteria = FilterCriteria::from_items(
            &items(&[("types", "concerts,webinars,concerts")]),
            &config(),
        );
        assert_eq!(criteria.types, vec![Category::Music]);
    }

    #[test]
    fn invalid_sort_falls_back_to_newest() {
        let criteria = FilterCriteria::from_items(&items(&[("sort", "sideways")]), &config());
        assert_eq!(criteria.sort, Sort::Newest);
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let cfg = config();
        let criteria = FilterCriteria::from_items(
            &items(&[("page", "0"), ("limit", "9999")]),
            &cfg,
        );
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.limit, cfg.max_page_size);

        let criteria =
            FilterCriteria::from_items(&items(&[("page", "abc"), ("limit", "-4")]), &cfg);
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.limit, cfg.default_page_size);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow_the_offset() {
        let criteria = FilterCriteria::from_items(
            &items(&[("page", "9223372036854775807"), ("limit", "20")]),
            &config(),
        );
        assert_eq!(criteria.page, i64::MAX);
        assert_eq!(criteria.offset(), i64::MAX);
    }

    #[test]
    fn attending_requires_literal_truthy_value() {
        for (value, expected) in [("true", true), ("1", true), ("yes", false), ("TRUE", false)] {
            let criteria =
                FilterCriteria::from_items(&items(&[("attending", value)]), &config());
            assert_eq!(criteria.attending, expected, "value {value:?}");
        }
    }

    #[test]
    fn repeated_locations_collapse() {
        let criteria = FilterCriteria::from_items(
            &items(&[
                ("location", "Berlin"),
                ("locations", "Hamburg, DE"),
                ("location", "Berlin"),
                ("location", "   "),
            ]),
            &config(),
        );
        assert_eq!(
            criteria.locations,
            vec!["Berlin".to_string(), "Hamburg, DE".to_string()]
        );
    }

    #[test]
    fn invalid_user_id_is_ignored() {
        let criteria = FilterCriteria::from_items(
            &items(&[("attending", "true"), ("userId", "not-a-uuid")]),
            &config(),
        );
        assert!(criteria.attending);
        assert_eq!(criteria.user_id, None);
    }
}
