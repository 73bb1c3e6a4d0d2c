// Typed search criteria for comments.
//
// A filter is a conjunction of criteria. Set-valued criteria
// match if any of their members matches. An empty set matches
// no comment at all.

use std::{cmp::Ordering, convert::Infallible, str::FromStr};

use crate::entities::*;

/// Half-open time range: `after` is inclusive, `before` is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeCutoff {
    pub after: Option<Timestamp>,
    pub before: Option<Timestamp>,
}

impl TimeCutoff {
    pub const fn after(after: Timestamp) -> Self {
        Self {
            after: Some(after),
            before: None,
        }
    }

    pub const fn before(before: Timestamp) -> Self {
        Self {
            after: None,
            before: Some(before),
        }
    }

    pub const fn between(after: Timestamp, before: Timestamp) -> Self {
        Self {
            after: Some(after),
            before: Some(before),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.after.map(|after| ts >= after).unwrap_or(true)
            && self.before.map(|before| ts < before).unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Ids(Vec<Id>),
    Created(TimeCutoff),
    Edited(TimeCutoff),
    SubjectIds(Vec<Id>),
    RemoteOrigins(Vec<OriginPrefix>),
    UserIds(Vec<Id>),
    /// Substring of the body, ASCII case-insensitive.
    BodyContains(String),
}

impl Criterion {
    pub fn matches_nothing(&self) -> bool {
        match self {
            Self::Ids(ids) | Self::SubjectIds(ids) | Self::UserIds(ids) => ids.is_empty(),
            Self::RemoteOrigins(prefixes) => prefixes.is_empty(),
            Self::Created(_) | Self::Edited(_) | Self::BodyContains(_) => false,
        }
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        match self {
            Self::Ids(ids) => ids.contains(&comment.id),
            Self::Created(cutoff) => cutoff.contains(comment.creation_time),
            Self::Edited(cutoff) => cutoff.contains(comment.edit_time),
            Self::SubjectIds(ids) => ids.contains(&comment.subject_id),
            Self::RemoteOrigins(prefixes) => prefixes
                .iter()
                .any(|prefix| prefix.contains(&comment.remote_origin)),
            Self::UserIds(ids) => ids.contains(&comment.user_id),
            Self::BodyContains(text) => comment
                .body
                .to_ascii_lowercase()
                .contains(&text.to_ascii_lowercase()),
        }
    }
}

/// Conjunction of [`Criterion`]s. The default filter matches all comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFilter {
    criteria: Vec<Criterion>,
}

impl CommentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn and(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    #[must_use]
    pub fn ids(self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.and(Criterion::Ids(ids.into_iter().collect()))
    }

    #[must_use]
    pub fn created(self, cutoff: TimeCutoff) -> Self {
        self.and(Criterion::Created(cutoff))
    }

    #[must_use]
    pub fn edited(self, cutoff: TimeCutoff) -> Self {
        self.and(Criterion::Edited(cutoff))
    }

    #[must_use]
    pub fn subject_ids(self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.and(Criterion::SubjectIds(ids.into_iter().collect()))
    }

    #[must_use]
    pub fn remote_origins(self, prefixes: impl IntoIterator<Item = OriginPrefix>) -> Self {
        self.and(Criterion::RemoteOrigins(prefixes.into_iter().collect()))
    }

    #[must_use]
    pub fn user_ids(self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.and(Criterion::UserIds(ids.into_iter().collect()))
    }

    #[must_use]
    pub fn body_contains(self, text: impl Into<String>) -> Self {
        self.and(Criterion::BodyContains(text.into()))
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// True if the filter can be decided without looking at any comment.
    pub fn matches_nothing(&self) -> bool {
        self.criteria.iter().any(Criterion::matches_nothing)
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        self.criteria.iter().all(|c| c.matches(comment))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    CreationTime,
    Id,
}

impl FromStr for SortKey {
    type Err = Infallible;

    // Unknown keys fall back to the default
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_ascii_lowercase().as_str() {
            "creation_time" | "creation-time" | "created" => Self::CreationTime,
            "id" => Self::Id,
            _ => {
                log::debug!("Unknown sort key '{s}', using default");
                Self::default()
            }
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl FromStr for SortOrder {
    type Err = Infallible;

    // Unknown orders fall back to the default
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let order = match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Self::Ascending,
            "desc" | "descending" => Self::Descending,
            _ => {
                log::debug!("Unknown sort order '{s}', using default");
                Self::default()
            }
        };
        Ok(order)
    }
}

/// Result ordering. Ties on the sort key are broken by the id
/// in the same direction, so that pages are stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentSort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl CommentSort {
    pub const fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    pub fn compare(&self, lhs: &Comment, rhs: &Comment) -> Ordering {
        let ordering = match self.key {
            SortKey::CreationTime => lhs
                .creation_time
                .cmp(&rhs.creation_time)
                .then_with(|| lhs.id.cmp(&rhs.id)),
            SortKey::Id => lhs.id.cmp(&rhs.id),
        };
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annodb_entities::builders::*;

    #[test]
    fn time_cutoff_is_half_open() {
        let cutoff = TimeCutoff::between(Timestamp::from_secs(100), Timestamp::from_secs(200));
        assert!(!cutoff.contains(Timestamp::from_secs(99)));
        assert!(cutoff.contains(Timestamp::from_secs(100)));
        assert!(cutoff.contains(Timestamp::from_secs(199)));
        assert!(!cutoff.contains(Timestamp::from_secs(200)));
        assert!(TimeCutoff::default().contains(Timestamp::ZERO));
        assert!(TimeCutoff::default().is_unbounded());
    }

    #[test]
    fn empty_sets_match_nothing() {
        assert!(CommentFilter::new().ids([]).matches_nothing());
        assert!(CommentFilter::new().subject_ids([]).matches_nothing());
        assert!(CommentFilter::new().user_ids([]).matches_nothing());
        assert!(CommentFilter::new().remote_origins([]).matches_nothing());
        assert!(!CommentFilter::new().body_contains("").matches_nothing());
        assert!(!CommentFilter::new().matches_nothing());

        let comment = Comment::build().finish();
        assert!(!CommentFilter::new().ids([]).matches(&comment));
    }

    #[test]
    fn criteria_are_combined_with_and() {
        let user_id = Id::new();
        let comment = Comment::build()
            .user_id(user_id)
            .remote_origin("10.1.2.3")
            .body("Hello World")
            .finish();
        let by_user = CommentFilter::new().user_ids([user_id, Id::new()]);
        assert!(by_user.matches(&comment));
        assert!(by_user
            .clone()
            .remote_origins(["10.1.0.0/16".parse().unwrap()])
            .matches(&comment));
        assert!(!by_user
            .clone()
            .remote_origins(["10.2.0.0/16".parse().unwrap()])
            .matches(&comment));
        assert!(by_user.clone().body_contains("o wor").matches(&comment));
        assert!(!by_user.body_contains("xyz").matches(&comment));
    }

    #[test]
    fn parse_sort_with_fallback() {
        assert_eq!(SortKey::Id, "id".parse().unwrap());
        assert_eq!(SortKey::CreationTime, "unknown".parse().unwrap());
        assert_eq!(SortOrder::Ascending, "ASC".parse().unwrap());
        assert_eq!(SortOrder::Descending, "sideways".parse().unwrap());
        let sort = CommentSort::default();
        assert_eq!(SortKey::CreationTime, sort.key);
        assert_eq!(SortOrder::Descending, sort.order);
    }

    #[test]
    fn sort_breaks_ties_by_id() {
        let mut comments = vec![
            Comment::build().creation_time(100).finish(),
            Comment::build().creation_time(100).finish(),
            Comment::build().creation_time(200).finish(),
        ];
        let sort = CommentSort::default();
        comments.sort_by(|lhs, rhs| sort.compare(lhs, rhs));
        assert_eq!(Timestamp::from_secs(200), comments[0].creation_time);
        assert!(comments[1].id > comments[2].id);

        let sort = CommentSort::new(SortKey::CreationTime, SortOrder::Ascending);
        comments.sort_by(|lhs, rhs| sort.compare(lhs, rhs));
        assert_eq!(Timestamp::from_secs(200), comments[2].creation_time);
        assert!(comments[0].id < comments[1].id);
    }
}
