pub mod cities;
pub mod events;

/// Decode a raw query string into ordered key/value items. Repeated keys are
/// preserved in the order the client sent them.
pub(crate) fn parse_query_items(raw: Option<&str>) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.unwrap_or("").as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_order_of_repeated_keys() {
        let items = parse_query_items(Some("location=Berlin&sort=popular&location=Hamburg"));
        assert_eq!(
            items,
            vec![
                ("location".to_string(), "Berlin".to_string()),
                ("sort".to_string(), "popular".to_string()),
                ("location".to_string(), "Hamburg".to_string()),
            ]
        );
    }

    #[test]
    fn decodes_percent_encoding_and_plus() {
        let items = parse_query_items(Some("search=jazz+night&location=Berlin%2C%20DE"));
        assert_eq!(items[0].1, "jazz night");
        assert_eq!(items[1].1, "Berlin, DE");
    }

    #[test]
    fn missing_query_string_yields_no_items() {
        assert!(parse_query_items(None).is_empty());
    }
}
