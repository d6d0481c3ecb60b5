//! Assembly of a [`FilterCriteria`] into executable SQL.
//!
//! One builder yields both the data page and the count statement, so the two
//! always agree on the predicate and joins. Occurrence joins fan rows out, so
//! the page selects `DISTINCT` and the count uses `COUNT(DISTINCT e.id)`.

use chrono::{DateTime, TimeZone, Utc};

use super::criteria::FilterCriteria;
use super::date_bucket;
use super::location::location_predicate;
use super::predicate::{BindValue, Field, JoinSet, Predicate};
use crate::models::{Sort, Visibility};

const EVENT_PROJECTION: &str = "e.id, e.title, e.description, e.visibility, e.category, \
     e.cover_image_url, e.max_participants, e.event_date, e.location, e.is_online, \
     e.meeting_link, e.creator_id, e.created_at, e.updated_at";

/// A compiled discovery query: predicate tree plus join set plus paging.
#[derive(Debug, Clone)]
pub struct DiscoveryQuery {
    predicate: Predicate,
    joins: JoinSet,
    sort: Sort,
    limit: i64,
    offset: i64,
}

impl DiscoveryQuery {
    /// Compile criteria against the given clock. Date buckets resolve once
    /// here, so the data and count statements share the same instant.
    pub fn new<Tz: TimeZone>(criteria: &FilterCriteria, now: &DateTime<Tz>) -> Self {
        let predicate = build_predicate(criteria, now);
        let mut joins = JoinSet::default();
        predicate.register_joins(&mut joins);
        Self {
            predicate,
            joins,
            sort: criteria.sort,
            limit: criteria.limit,
            offset: criteria.offset(),
        }
    }

    /// SQL for one page of event rows.
    pub fn build_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let mut sql = format!("SELECT DISTINCT {EVENT_PROJECTION} FROM events e");
        self.joins.push_sql(&mut sql);
        sql.push_str(" WHERE ");
        sql.push_str(&self.predicate.to_sql(&mut bind_params));
        sql.push_str(" ORDER BY ");
        sql.push_str(self.order_by());
        sql.push_str(&format!(" LIMIT {} OFFSET {}", self.limit, self.offset));
        (sql, bind_params)
    }

    /// SQL counting the distinct events the same predicate matches.
    pub fn build_count_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let mut sql = String::from("SELECT COUNT(DISTINCT e.id) FROM events e");
        self.joins.push_sql(&mut sql);
        sql.push_str(" WHERE ");
        sql.push_str(&self.predicate.to_sql(&mut bind_params));
        (sql, bind_params)
    }

    // Every sort key also appears in the projection, which DISTINCT requires.
    fn order_by(&self) -> &'static str {
        match self.sort {
            Sort::Newest => "e.created_at DESC",
            Sort::Popular => "e.max_participants DESC NULLS LAST",
            Sort::Upcoming => "e.event_date ASC NULLS LAST",
        }
    }
}

fn build_predicate<Tz: TimeZone>(criteria: &FilterCriteria, now: &DateTime<Tz>) -> Predicate {
    let mut clauses = Vec::new();

    // Attendance scope replaces the public-visibility scope: "my events"
    // includes private ones the user attends.
    match (criteria.attending, criteria.user_id) {
        (true, Some(user_id)) => clauses.push(Predicate::Equals {
            field: Field::AttendeeUserId,
            value: user_id.to_string(),
        }),
        _ => clauses.push(Predicate::Equals {
            field: Field::EventVisibility,
            value: Visibility::Public.as_str().to_string(),
        }),
    }

    if let Some(search) = &criteria.search {
        clauses.push(Predicate::Or(
            [Field::EventTitle, Field::EventDescription, Field::EventLocation]
                .into_iter()
                .map(|field| Predicate::Contains {
                    field,
                    value: search.clone(),
                })
                .collect(),
        ));
    }

    // A single category narrows a multi-type selection rather than widening it.
    if let Some(category) = criteria.category {
        clauses.push(Predicate::Equals {
            field: Field::EventCategory,
            value: category.as_str().to_string(),
        });
    } else if !criteria.types.is_empty() {
        clauses.push(Predicate::In {
            field: Field::EventCategory,
            values: criteria
                .types
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        });
    }

    if let Some(predicate) = location_predicate(&criteria.locations) {
        clauses.push(predicate);
    }

    if let Some(token) = &criteria.date {
        clauses.push(date_predicate(token, now));
    }

    Predicate::And(clauses)
}

/// An event falls in a bucket if its own date does, if an occurrence starts
/// inside it, or if an occurrence already running at the bucket's start is
/// still running then.
fn date_predicate<Tz: TimeZone>(token: &str, now: &DateTime<Tz>) -> Predicate {
    let (start, end) = date_bucket::resolve(token, now);
    let start = start.with_timezone(&Utc);
    let end = end.with_timezone(&Utc);

    Predicate::Or(vec![
        Predicate::Between {
            field: Field::EventDate,
            start,
            end,
        },
        Predicate::Between {
            field: Field::OccurrenceStart,
            start,
            end,
        },
        Predicate::And(vec![
            Predicate::OnOrBefore {
                field: Field::OccurrenceStart,
                at: start,
            },
            Predicate::OnOrAfter {
                field: Field::OccurrenceEnd,
                at: start,
            },
        ]),
    ])
}
