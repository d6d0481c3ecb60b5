//! Typed predicate tree and its SQL compiler.
//!
//! Discovery filters are composed as a small sum type and compiled to a WHERE
//! clause by a single visitor. Fields carry their relation path, so the
//! compiler can collect the joins a predicate needs into a [`JoinSet`]; a join
//! is registered at most once no matter how many predicates reference it.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeSet;

/// Bind values for `sqlx` queries. Timestamps travel as RFC 3339 text and are
/// cast with `::timestamptz` at the comparison site; UUIDs likewise via
/// `::uuid`.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    TextArray(Vec<String>),
}

/// Push a text bind and return its 1-based placeholder index.
pub(crate) fn push_text(bind_params: &mut Vec<BindValue>, value: String) -> usize {
    bind_params.push(BindValue::Text(value));
    bind_params.len()
}

pub(crate) fn push_text_array(bind_params: &mut Vec<BindValue>, values: Vec<String>) -> usize {
    bind_params.push(BindValue::TextArray(values));
    bind_params.len()
}

/// Escape SQL LIKE meta-characters so user input is treated literally.
pub(crate) fn escape_like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Relations reachable from the `events` base table.
///
/// Variant order is join order: occurrences must precede the structured
/// location (it joins through the occurrence row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Join {
    /// `events` 1..n `event_occurrences`
    Occurrences,
    /// `event_occurrences` n..1 `locations` (optional reference)
    StructuredLocation,
    /// `events` 1..n `event_attendees`; INNER because it scopes the result.
    Attendance,
}

impl Join {
    fn sql(self) -> &'static str {
        match self {
            Self::Occurrences => "LEFT JOIN event_occurrences o ON o.event_id = e.id",
            Self::StructuredLocation => "LEFT JOIN locations sl ON sl.id = o.location_id",
            Self::Attendance => "INNER JOIN event_attendees att ON att.event_id = e.id",
        }
    }
}

/// Idempotent join registry keyed by relation path.
#[derive(Debug, Clone, Default)]
pub struct JoinSet {
    joins: BTreeSet<Join>,
}

impl JoinSet {
    /// Register a join. Registering twice is a no-op; the structured-location
    /// join implies the occurrence join it reaches through.
    pub fn require(&mut self, join: Join) {
        if join == Join::StructuredLocation {
            self.joins.insert(Join::Occurrences);
        }
        self.joins.insert(join);
    }

    pub fn contains(&self, join: Join) -> bool {
        self.joins.contains(&join)
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Append the JOIN clauses in dependency order.
    pub fn push_sql(&self, sql: &mut String) {
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.sql());
        }
    }
}

/// A filterable column, aware of the relation it lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    EventTitle,
    EventDescription,
    EventLocation,
    EventCategory,
    EventVisibility,
    EventDate,
    OccurrenceStart,
    OccurrenceEnd,
    OccurrenceLocation,
    StructuredCity,
    StructuredAddress,
    AttendeeUserId,
}

impl Field {
    pub fn column(self) -> &'static str {
        match self {
            Self::EventTitle => "e.title",
            Self::EventDescription => "e.description",
            Self::EventLocation => "e.location",
            Self::EventCategory => "e.category",
            Self::EventVisibility => "e.visibility",
            Self::EventDate => "e.event_date",
            Self::OccurrenceStart => "o.start_at",
            Self::OccurrenceEnd => "o.end_at",
            Self::OccurrenceLocation => "o.location",
            Self::StructuredCity => "sl.city",
            Self::StructuredAddress => "sl.address",
            Self::AttendeeUserId => "att.user_id",
        }
    }

    /// The join this field's relation requires, if any.
    pub fn join(self) -> Option<Join> {
        match self {
            Self::EventTitle
            | Self::EventDescription
            | Self::EventLocation
            | Self::EventCategory
            | Self::EventVisibility
            | Self::EventDate => None,
            Self::OccurrenceStart | Self::OccurrenceEnd | Self::OccurrenceLocation => {
                Some(Join::Occurrences)
            }
            Self::StructuredCity | Self::StructuredAddress => Some(Join::StructuredLocation),
            Self::AttendeeUserId => Some(Join::Attendance),
        }
    }

    /// Cast appended to the bind placeholder for non-text columns.
    fn bind_cast(self) -> &'static str {
        match self {
            Self::AttendeeUserId => "::uuid",
            _ => "",
        }
    }
}

/// Boolean condition over event/occurrence/location fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact, case-sensitive equality.
    Equals { field: Field, value: String },
    /// Case-insensitive substring containment.
    Contains { field: Field, value: String },
    /// Membership in a value list.
    In { field: Field, values: Vec<String> },
    /// Inclusive timestamp range.
    Between {
        field: Field,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    OnOrBefore { field: Field, at: DateTime<Utc> },
    OnOrAfter { field: Field, at: DateTime<Utc> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Collect the joins this predicate tree needs.
    pub fn register_joins(&self, joins: &mut JoinSet) {
        match self {
            Self::Equals { field, .. }
            | Self::Contains { field, .. }
            | Self::In { field, .. }
            | Self::Between { field, .. }
            | Self::OnOrBefore { field, .. }
            | Self::OnOrAfter { field, .. } => {
                if let Some(join) = field.join() {
                    joins.require(join);
                }
            }
            Self::And(parts) | Self::Or(parts) => {
                for part in parts {
                    part.register_joins(joins);
                }
            }
        }
    }

    /// Compile to a WHERE-clause fragment, pushing bind values in order.
    pub fn to_sql(&self, bind_params: &mut Vec<BindValue>) -> String {
        match self {
            Self::Equals { field, value } => {
                let idx = push_text(bind_params, value.clone());
                format!("{} = ${}{}", field.column(), idx, field.bind_cast())
            }
            Self::Contains { field, value } => {
                let idx = push_text(
                    bind_params,
                    format!("%{}%", escape_like_pattern(value)),
                );
                format!("{} ILIKE ${} ESCAPE E'\\\\'", field.column(), idx)
            }
            Self::In { field, values } => {
                let idx = push_text_array(bind_params, values.clone());
                format!("{} = ANY(${})", field.column(), idx)
            }
            Self::Between { field, start, end } => {
                let s_idx = push_text(bind_params, rfc3339(start));
                let e_idx = push_text(bind_params, rfc3339(end));
                format!(
                    "({col} >= ${s}::timestamptz AND {col} <= ${e}::timestamptz)",
                    col = field.column(),
                    s = s_idx,
                    e = e_idx
                )
            }
            Self::OnOrBefore { field, at } => {
                let idx = push_text(bind_params, rfc3339(at));
                format!("{} <= ${}::timestamptz", field.column(), idx)
            }
            Self::OnOrAfter { field, at } => {
                let idx = push_text(bind_params, rfc3339(at));
                format!("{} >= ${}::timestamptz", field.column(), idx)
            }
            Self::And(parts) => combine(parts, " AND ", "TRUE", bind_params),
            Self::Or(parts) => combine(parts, " OR ", "FALSE", bind_params),
        }
    }
}

fn combine(
    parts: &[Predicate],
    separator: &str,
    empty: &str,
    bind_params: &mut Vec<BindValue>,
) -> String {
    match parts {
        [] => empty.to_string(),
        [single] => single.to_sql(bind_params),
        _ => {
            let rendered: Vec<String> = parts.iter().map(|p| p.to_sql(bind_params)).collect();
            format!("({})", rendered.join(separator))
        }
    }
}

fn rfc3339(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn join_registration_is_idempotent() {
        let mut joins = JoinSet::default();
        joins.require(Join::Occurrences);
        joins.require(Join::Occurrences);
        joins.require(Join::Occurrences);

        let mut sql = String::new();
        joins.push_sql(&mut sql);
        assert_eq!(sql.matches("LEFT JOIN event_occurrences").count(), 1);
    }

    #[test]
    fn structured_location_join_implies_occurrence_join() {
        let mut joins = JoinSet::default();
        joins.require(Join::StructuredLocation);
        assert!(joins.contains(Join::Occurrences));

        let mut sql = String::new();
        joins.push_sql(&mut sql);
        let occ = sql.find("LEFT JOIN event_occurrences").unwrap();
        let loc = sql.find("LEFT JOIN locations").unwrap();
        assert!(occ < loc, "occurrence join must precede location join");
    }

    #[test]
    fn fields_register_their_joins_through_the_tree() {
        let predicate = Predicate::Or(vec![
            Predicate::Contains {
                field: Field::EventLocation,
                value: "Berlin".to_string(),
            },
            Predicate::Contains {
                field: Field::StructuredCity,
                value: "Berlin".to_string(),
            },
            Predicate::Contains {
                field: Field::OccurrenceLocation,
                value: "Berlin".to_string(),
            },
        ]);

        let mut joins = JoinSet::default();
        predicate.register_joins(&mut joins);
        assert!(joins.contains(Join::Occurrences));
        assert!(joins.contains(Join::StructuredLocation));
        assert!(!joins.contains(Join::Attendance));
    }

    #[test]
    fn equals_and_contains_compile_with_ordered_binds() {
        let predicate = Predicate::And(vec![
            Predicate::Equals {
                field: Field::EventVisibility,
                value: "public".to_string(),
            },
            Predicate::Contains {
                field: Field::EventTitle,
                value: "50% off".to_string(),
            },
        ]);

        let mut binds = Vec::new();
        let sql = predicate.to_sql(&mut binds);
        assert_eq!(sql, "(e.visibility = $1 AND e.title ILIKE $2 ESCAPE E'\\\\')");
        assert_eq!(
            binds,
            vec![
                BindValue::Text("public".to_string()),
                // LIKE meta-characters in user input are escaped.
                BindValue::Text("%50\\% off%".to_string()),
            ]
        );
    }

    #[test]
    fn between_compiles_to_inclusive_timestamptz_range() {
        let start = Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 15, 23, 59, 59).unwrap();
        let predicate = Predicate::Between {
            field: Field::EventDate,
            start,
            end,
        };

        let mut binds = Vec::new();
        let sql = predicate.to_sql(&mut binds);
        assert_eq!(
            sql,
            "(e.event_date >= $1::timestamptz AND e.event_date <= $2::timestamptz)"
        );
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn membership_compiles_to_any_with_text_array() {
        let predicate = Predicate::In {
            field: Field::EventCategory,
            values: vec!["music".to_string(), "culture".to_string()],
        };

        let mut binds = Vec::new();
        let sql = predicate.to_sql(&mut binds);
        assert_eq!(sql, "e.category = ANY($1)");
        assert_eq!(
            binds,
            vec![BindValue::TextArray(vec![
                "music".to_string(),
                "culture".to_string()
            ])]
        );
    }

    #[test]
    fn attendance_equality_casts_the_bind_to_uuid() {
        let predicate = Predicate::Equals {
            field: Field::AttendeeUserId,
            value: "8c5f4e6e-0000-0000-0000-000000000000".to_string(),
        };

        let mut binds = Vec::new();
        let sql = predicate.to_sql(&mut binds);
        assert_eq!(sql, "att.user_id = $1::uuid");
    }

    #[test]
    fn empty_groups_collapse_to_constants() {
        let mut binds = Vec::new();
        assert_eq!(Predicate::And(vec![]).to_sql(&mut binds), "TRUE");
        assert_eq!(Predicate::Or(vec![]).to_sql(&mut binds), "FALSE");
        assert!(binds.is_empty());
    }

    #[test]
    fn single_element_groups_skip_parentheses() {
        let predicate = Predicate::Or(vec![Predicate::Equals {
            field: Field::EventCategory,
            value: "music".to_string(),
        }]);

        let mut binds = Vec::new();
        assert_eq!(predicate.to_sql(&mut binds), "e.category = $1");
    }
}
