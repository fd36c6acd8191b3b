//! Read-only query API over compiled registry records
//!
//! Every operation borrows the receiver and returns a new `RegistryQuery`,
//! so filters and sorts chain freely without mutating shared state.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use super::record::RegistryRecord;
use crate::{RegistryError, Result};

/// Single-valued record fields, matched by equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarField {
    Website,
    Category,
    Block,
    Variant,
    Name,
    Href,
}

impl ScalarField {
    fn value(self, record: &RegistryRecord) -> &str {
        match self {
            ScalarField::Website => &record.folder.website,
            ScalarField::Category => &record.folder.category,
            ScalarField::Block => &record.folder.block,
            ScalarField::Variant => &record.variant,
            ScalarField::Name => &record.name,
            ScalarField::Href => &record.href,
        }
    }
}

/// List-valued record fields, matched by subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListField {
    Tags,
    Elements,
}

impl ListField {
    fn values(self, record: &RegistryRecord) -> &[String] {
        match self {
            ListField::Tags => &record.folder.tags,
            ListField::Elements => &record.elements,
        }
    }
}

/// Multi-field predicate with an explicit match mode per field.
///
/// Fields that are not set are not constrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldQuery {
    pub equals: BTreeMap<ScalarField, String>,
    pub includes_all: BTreeMap<ListField, Vec<String>>,
    pub bookmark: Option<bool>,
}

impl FieldQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, field: ScalarField, value: impl Into<String>) -> Self {
        self.equals.insert(field, value.into());
        self
    }

    pub fn includes_all<I, S>(mut self, field: ListField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes_all
            .insert(field, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn bookmarked(mut self, bookmark: bool) -> Self {
        self.bookmark = Some(bookmark);
        self
    }

    pub fn matches(&self, record: &RegistryRecord) -> bool {
        self.equals
            .iter()
            .all(|(field, value)| field.value(record) == value)
            && self
                .includes_all
                .iter()
                .all(|(field, required)| contains_all(field.values(record), required))
            && self
                .bookmark
                .map_or(true, |wanted| record.is_bookmarked() == wanted)
    }
}

/// Sort direction for `sort_by_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(RegistryError::Query(format!(
                "sort order must be asc or desc, got {other}"
            ))),
        }
    }
}

/// A date-range endpoint: a bare date (UTC) or a full timestamp.
///
/// Timestamps keep their offset so a day is always the bound's own day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Date(NaiveDate),
    Instant(DateTime<FixedOffset>),
}

impl DateBound {
    /// Earliest instant covered when used as a lower bound
    pub fn start(self) -> DateTime<Utc> {
        match self {
            DateBound::Date(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            DateBound::Instant(at) => at.with_timezone(&Utc),
        }
    }

    /// Last millisecond of the bound's day, used as an upper bound
    pub fn end_of_day(self) -> DateTime<Utc> {
        let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        match self {
            DateBound::Date(date) => Utc.from_utc_datetime(&date.and_time(last)),
            DateBound::Instant(at) => {
                let offset = *at.offset();
                let local_end = at.date_naive().and_time(last);
                offset
                    .from_local_datetime(&local_end)
                    .single()
                    .map(|end| end.with_timezone(&Utc))
                    .unwrap_or_else(|| Utc.from_utc_datetime(&local_end))
            }
        }
    }
}

impl FromStr for DateBound {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(DateBound::Date(date));
        }
        DateTime::parse_from_rfc3339(s)
            .map(DateBound::Instant)
            .map_err(|e| RegistryError::Query(format!("invalid date {s}: {e}")))
    }
}

impl From<DateTime<Utc>> for DateBound {
    fn from(at: DateTime<Utc>) -> Self {
        DateBound::Instant(at.fixed_offset())
    }
}

/// Immutable, chainable view over registry records
#[derive(Debug, Clone, Default)]
pub struct RegistryQuery {
    records: Vec<Arc<RegistryRecord>>,
}

impl RegistryQuery {
    pub fn new(records: Vec<RegistryRecord>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    /// Keep records matching `predicate`
    pub fn filter(&self, predicate: impl Fn(&RegistryRecord) -> bool) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
        }
    }

    /// Stable sort by `compare`
    pub fn sort_by(&self, compare: impl Fn(&RegistryRecord, &RegistryRecord) -> Ordering) -> Self {
        let mut records = self.records.clone();
        records.sort_by(|a, b| compare(a, b));
        Self { records }
    }

    /// First `n` records
    pub fn take(&self, n: usize) -> Self {
        Self {
            records: self.records.iter().take(n).cloned().collect(),
        }
    }

    pub fn by_website(&self, website: &str) -> Self {
        self.filter(|r| r.folder.website == website)
    }

    pub fn by_category(&self, category: &str) -> Self {
        self.filter(|r| r.folder.category == category)
    }

    pub fn by_block(&self, block: &str) -> Self {
        self.filter(|r| r.folder.block == block)
    }

    pub fn by_variant(&self, variant: &str) -> Self {
        self.filter(|r| r.variant == variant)
    }

    pub fn by_name(&self, name: &str) -> Self {
        self.filter(|r| r.name == name)
    }

    pub fn by_tag(&self, tag: &str) -> Self {
        self.filter(|r| r.folder.tags.iter().any(|t| t == tag))
    }

    pub fn bookmarked(&self) -> Self {
        self.filter(RegistryRecord::is_bookmarked)
    }

    /// Records whose elements include every one of `required`
    pub fn elements<S: AsRef<str>>(&self, required: &[S]) -> Self {
        self.filter(|r| contains_all(&r.elements, required))
    }

    /// Records created within `from..=to`; `to` defaults to today and always
    /// covers its whole day.
    pub fn date_range(&self, from: DateBound, to: Option<DateBound>) -> Self {
        let start = from.start();
        let end = to.unwrap_or_else(|| Utc::now().into()).end_of_day();
        self.filter(|r| r.created_at >= start && r.created_at <= end)
    }

    pub fn sort_by_date(&self, order: SortOrder) -> Self {
        self.sort_by(|a, b| match order {
            SortOrder::Asc => a.created_at.cmp(&b.created_at),
            SortOrder::Desc => b.created_at.cmp(&a.created_at),
        })
    }

    /// Apply a multi-field predicate
    pub fn matching(&self, query: &FieldQuery) -> Self {
        self.filter(|r| query.matches(r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&RegistryRecord> {
        self.records.first().map(Arc::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryRecord> {
        self.records.iter().map(Arc::as_ref)
    }

    /// Owned copies of the current records
    pub fn to_vec(&self) -> Vec<RegistryRecord> {
        self.iter().cloned().collect()
    }
}

impl FromIterator<RegistryRecord> for RegistryQuery {
    fn from_iter<I: IntoIterator<Item = RegistryRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn contains_all<S: AsRef<str>>(have: &[String], required: &[S]) -> bool {
    required
        .iter()
        .all(|wanted| have.iter().any(|h| h == wanted.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::metadata::FolderHeader;
    use pretty_assertions::assert_eq;

    fn record(name: &str, created: &str) -> RegistryRecord {
        let at = DateTime::parse_from_rfc3339(created)
            .unwrap()
            .with_timezone(&Utc);
        RegistryRecord {
            folder: FolderHeader {
                website: "shop".to_string(),
                category: "ecommerce".to_string(),
                block: "cart".to_string(),
                tags: vec!["checkout".to_string()],
                col_span: 1,
            },
            variant: "cart".to_string(),
            name: name.to_string(),
            description: String::new(),
            elements: vec![],
            bookmark: None,
            created_at: at,
            updated_at: at,
            href: format!("/shop/ecommerce/cart/{name}"),
        }
    }

    fn names(query: &RegistryQuery) -> Vec<&str> {
        query.iter().map(|r| r.name.as_str()).collect()
    }

    fn with_elements(name: &str, elements: &[&str]) -> RegistryRecord {
        RegistryRecord {
            elements: elements.iter().map(|e| e.to_string()).collect(),
            ..record(name, "2024-06-15T10:00:00Z")
        }
    }

    #[test]
    fn test_elements_subset_match() {
        let query = RegistryQuery::new(vec![with_elements("a", &["avatar", "badge", "button"])]);

        assert_eq!(query.elements(&["badge"]).len(), 1);
        assert_eq!(query.elements(&["badge", "avatar"]).len(), 1);
        assert_eq!(query.elements(&["badge", "icon"]).len(), 0);
        assert_eq!(query.elements::<&str>(&[]).len(), 1);
    }

    #[test]
    fn test_date_range_includes_whole_end_day() {
        let query = RegistryQuery::new(vec![record("a", "2024-06-15T10:00:00Z")]);
        let from: DateBound = "2024-06-01".parse().unwrap();

        let included = query.date_range(from, Some("2024-06-15".parse().unwrap()));
        let excluded = query.date_range(from, Some("2024-06-14".parse().unwrap()));

        assert_eq!(included.len(), 1);
        assert_eq!(excluded.len(), 0);
    }

    #[test]
    fn test_date_range_clamps_timestamp_upper_bound() {
        let query = RegistryQuery::new(vec![record("a", "2024-06-15T22:00:00Z")]);
        let from: DateBound = "2024-06-15".parse().unwrap();
        let to: DateBound = "2024-06-15T08:00:00Z".parse().unwrap();

        assert_eq!(query.date_range(from, Some(to)).len(), 1);
    }

    #[test]
    fn test_offset_upper_bound_clamps_in_its_own_day() {
        // 2024-06-15 local ends at 2024-06-16T04:59:59.999Z
        let query = RegistryQuery::new(vec![
            record("same-local-day", "2024-06-16T03:00:00Z"),
            record("next-local-day", "2024-06-16T06:00:00Z"),
        ]);
        let from: DateBound = "2024-06-01".parse().unwrap();
        let to: DateBound = "2024-06-15T20:00:00-05:00".parse().unwrap();

        assert_eq!(
            to.end_of_day(),
            "2024-06-16T04:59:59.999Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(
            names(&query.date_range(from, Some(to))),
            vec!["same-local-day"]
        );
    }

    #[test]
    fn test_offset_lower_bound_is_exact_instant() {
        let from: DateBound = "2024-06-15T20:00:00-05:00".parse().unwrap();
        assert_eq!(
            from.start(),
            "2024-06-16T01:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_date_range_defaults_to_now() {
        let query = RegistryQuery::new(vec![
            record("old", "2020-01-01T00:00:00Z"),
            record("new", "2024-06-15T10:00:00Z"),
        ]);
        let recent = query.date_range("2024-01-01".parse().unwrap(), None);
        assert_eq!(names(&recent), vec!["new"]);
    }

    #[test]
    fn test_invalid_date_bound() {
        assert!("15/06/2024".parse::<DateBound>().is_err());
    }

    #[test]
    fn test_sort_by_date() {
        let query = RegistryQuery::new(vec![
            record("three", "2024-03-01T00:00:00Z"),
            record("one", "2024-01-01T00:00:00Z"),
            record("two", "2024-02-01T00:00:00Z"),
        ]);

        assert_eq!(
            names(&query.sort_by_date(SortOrder::Asc)),
            vec!["one", "two", "three"]
        );
        assert_eq!(
            names(&query.sort_by_date(SortOrder::default())),
            vec!["three", "two", "one"]
        );
        // receiver untouched
        assert_eq!(names(&query), vec!["three", "one", "two"]);
    }

    #[test]
    fn test_exact_filters_chain() {
        let mut other = record("b", "2024-06-15T10:00:00Z");
        other.folder.website = "blog".to_string();
        other.variant = "minimal".to_string();
        let query = RegistryQuery::new(vec![record("a", "2024-06-15T10:00:00Z"), other]);

        assert_eq!(names(&query.by_website("blog")), vec!["b"]);
        assert_eq!(names(&query.by_website("shop").by_variant("cart")), vec!["a"]);
        assert_eq!(query.by_tag("checkout").len(), 2);
        assert_eq!(query.by_tag("missing").len(), 0);
        assert_eq!(query.by_block("cart").by_name("a").len(), 1);
        assert_eq!(query.by_category("ecommerce").len(), 2);
    }

    #[test]
    fn test_field_query_explicit_modes() {
        let mut bookmarked = with_elements("b", &["badge", "button"]);
        bookmarked.bookmark = Some(true);
        let query = RegistryQuery::new(vec![with_elements("a", &["avatar"]), bookmarked]);

        let by_elements = FieldQuery::new()
            .equals(ScalarField::Website, "shop")
            .includes_all(ListField::Elements, ["button"]);
        assert_eq!(names(&query.matching(&by_elements)), vec!["b"]);

        let by_tags = FieldQuery::new().includes_all(ListField::Tags, ["checkout"]);
        assert_eq!(query.matching(&by_tags).len(), 2);

        assert_eq!(query.matching(&FieldQuery::new()).len(), 2);
        assert_eq!(
            names(&query.matching(&FieldQuery::new().bookmarked(false))),
            vec!["a"]
        );
        assert_eq!(names(&query.bookmarked()), vec!["b"]);
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_take_and_collect() {
        let query: RegistryQuery = vec![
            record("a", "2024-06-15T10:00:00Z"),
            record("b", "2024-06-16T10:00:00Z"),
        ]
        .into_iter()
        .collect();
        assert_eq!(names(&query.take(1)), vec!["a"]);
        assert_eq!(query.to_vec().len(), 2);
        assert_eq!(query.first().map(|r| r.name.as_str()), Some("a"));
    }
}
