//! Network-free filter, sort and paginate over an in-process collection.
//!
//! These functions back the in-memory content source and are composed in the
//! order filter, sort, paginate.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::entities::{BlogPost, Project};
use crate::domain::filter::Matches;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort field plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> SortKey<F> {
    pub fn ascending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort field `{0}`")]
pub struct UnknownSortField(pub String);

/// Parses the `-fieldName` form: a leading `-` selects descending order, a
/// leading `+` or no marker selects ascending order.
impl<F> FromStr for SortKey<F>
where
    F: FromStr<Err = UnknownSortField>,
{
    type Err = UnknownSortField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (direction, name) = match raw.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (
                SortDirection::Ascending,
                raw.strip_prefix('+').unwrap_or(raw),
            ),
        };
        Ok(Self {
            field: name.parse()?,
            direction,
        })
    }
}

impl<F: fmt::Display> fmt::Display for SortKey<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == SortDirection::Descending {
            f.write_str("-")?;
        }
        self.field.fmt(f)
    }
}

/// Comparable value extracted from an entity for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue<'a> {
    Flag(bool),
    Number(u32),
    Text(&'a str),
}

pub trait Sortable {
    type Field: Copy;

    fn sort_value(&self, field: Self::Field) -> Option<SortValue<'_>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostSortField {
    PublishedDate,
    Title,
    ReadTime,
    Category,
    Slug,
}

impl FromStr for PostSortField {
    type Err = UnknownSortField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "publishedDate" | "published_date" => Ok(Self::PublishedDate),
            "title" => Ok(Self::Title),
            "readTime" | "read_time" => Ok(Self::ReadTime),
            "category" => Ok(Self::Category),
            "slug" => Ok(Self::Slug),
            other => Err(UnknownSortField(other.to_string())),
        }
    }
}

impl fmt::Display for PostSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PublishedDate => "publishedDate",
            Self::Title => "title",
            Self::ReadTime => "readTime",
            Self::Category => "category",
            Self::Slug => "slug",
        })
    }
}

impl Sortable for BlogPost {
    type Field = PostSortField;

    fn sort_value(&self, field: PostSortField) -> Option<SortValue<'_>> {
        match field {
            PostSortField::PublishedDate => self.published_date.as_deref().map(SortValue::Text),
            PostSortField::Title => Some(SortValue::Text(&self.title)),
            PostSortField::ReadTime => self.read_time.map(SortValue::Number),
            PostSortField::Category => self.category.as_deref().map(SortValue::Text),
            PostSortField::Slug => Some(SortValue::Text(&self.slug)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectSortField {
    CompletionDate,
    Title,
    Category,
    Featured,
    Client,
}

impl FromStr for ProjectSortField {
    type Err = UnknownSortField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "completionDate" | "completion_date" => Ok(Self::CompletionDate),
            "title" => Ok(Self::Title),
            "category" => Ok(Self::Category),
            "featured" => Ok(Self::Featured),
            "client" => Ok(Self::Client),
            other => Err(UnknownSortField(other.to_string())),
        }
    }
}

impl fmt::Display for ProjectSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CompletionDate => "completionDate",
            Self::Title => "title",
            Self::Category => "category",
            Self::Featured => "featured",
            Self::Client => "client",
        })
    }
}

impl Sortable for Project {
    type Field = ProjectSortField;

    fn sort_value(&self, field: ProjectSortField) -> Option<SortValue<'_>> {
        match field {
            ProjectSortField::CompletionDate => {
                self.completion_date.as_deref().map(SortValue::Text)
            }
            ProjectSortField::Title => Some(SortValue::Text(&self.title)),
            ProjectSortField::Category => self.category.as_deref().map(SortValue::Text),
            ProjectSortField::Featured => Some(SortValue::Flag(self.featured)),
            ProjectSortField::Client => self.client.as_deref().map(SortValue::Text),
        }
    }
}

/// Keep the items matching every constraint present in `descriptor`.
pub fn filter<T, D>(items: Vec<T>, descriptor: &D) -> Vec<T>
where
    D: Matches<T>,
{
    items
        .into_iter()
        .filter(|item| descriptor.matches(item))
        .collect()
}

/// Stable sort by `key`. Pairs where either side has no value compare equal.
pub fn sort<T: Sortable>(items: Vec<T>, key: SortKey<T::Field>) -> Vec<T> {
    let compare = |a: &T, b: &T| {
        let ordering = match (a.sort_value(key.field), b.sort_value(key.field)) {
            (Some(left), Some(right)) => left.cmp(&right),
            _ => Ordering::Equal,
        };
        match key.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    };
    // `compare` is not transitive once values are missing, and std's sort_by
    // requires a total order.
    merge_sort_by(items, &compare)
}

/// Truncate to the first `limit` items; `None` keeps everything.
pub fn paginate<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

fn merge_sort_by<T, F>(mut items: Vec<T>, compare: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, compare);
    let right = merge_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        if let Some(item) = next {
            merged.push(item);
        }
    }

    merged
}
