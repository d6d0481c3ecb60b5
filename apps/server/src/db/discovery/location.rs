//! Location filters matched across every place an event can name one.

use super::predicate::{Field, Predicate};

/// Build the disjunction matching any requested location against the event's
/// free-text location, the structured city and address, and the per-occurrence
/// location override. Exact and substring alternatives are both emitted, so a
/// query for "Berlin" matches "Berlin, Germany" too.
pub fn location_predicate(locations: &[String]) -> Option<Predicate> {
    let mut alternatives = Vec::new();
    for location in locations {
        let location = location.trim();
        if location.is_empty() {
            continue;
        }
        for field in [Field::EventLocation, Field::StructuredCity, Field::OccurrenceLocation] {
            alternatives.push(Predicate::Equals {
                field,
                value: location.to_string(),
            });
            alternatives.push(Predicate::Contains {
                field,
                value: location.to_string(),
            });
        }
        alternatives.push(Predicate::Contains {
            field: Field::StructuredAddress,
            value: location.to_string(),
        });
    }

    if alternatives.is_empty() {
        None
    } else {
        Some(Predicate::Or(alternatives))
    }
}
