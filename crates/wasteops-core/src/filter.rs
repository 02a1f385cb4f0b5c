use crate::{Issue, IssueStatus, IssueType};
use std::fmt;

/// A filter slot over a closed enumeration: either everything or one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChoice<T> {
    All,
    Only(T),
}

impl<T> Default for FilterChoice<T> {
    fn default() -> Self {
        FilterChoice::All
    }
}

impl<T: PartialEq + Copy> FilterChoice<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            FilterChoice::All => true,
            FilterChoice::Only(wanted) => wanted == value,
        }
    }

    /// Steps through `All`, then each of `values` in order, wrapping around.
    pub fn cycle(self, values: &[T]) -> Self {
        match self {
            FilterChoice::All => values
                .first()
                .map(|first| FilterChoice::Only(*first))
                .unwrap_or(FilterChoice::All),
            FilterChoice::Only(current) => {
                match values.iter().position(|value| *value == current) {
                    Some(idx) if idx + 1 < values.len() => FilterChoice::Only(values[idx + 1]),
                    _ => FilterChoice::All,
                }
            }
        }
    }
}

impl<T: fmt::Display> fmt::Display for FilterChoice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterChoice::All => f.write_str("전체"),
            FilterChoice::Only(value) => value.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub status: FilterChoice<IssueStatus>,
    pub issue_type: FilterChoice<IssueType>,
    pub search: String,
}

impl FilterCriteria {
    /// Status and type must match; the search term is a case-sensitive
    /// substring of the address, the description or the id (any one).
    pub fn matches(&self, issue: &Issue) -> bool {
        self.status.matches(&issue.status)
            && self.issue_type.matches(&issue.issue_type)
            && self.matches_search(issue)
    }

    fn matches_search(&self, issue: &Issue) -> bool {
        let term = self.search.as_str();
        term.is_empty()
            || issue.address.contains(term)
            || issue.description.contains(term)
            || issue.id.contains(term)
    }

    pub fn is_default(&self) -> bool {
        *self == FilterCriteria::default()
    }
}

/// Ordered subsequence of `issues` accepted by `criteria`.
pub fn apply<'a>(issues: &'a [Issue], criteria: &FilterCriteria) -> Vec<&'a Issue> {
    issues.iter().filter(|issue| criteria.matches(issue)).collect()
}

/// KPI counters over the full issue set, independent of any filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub received: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut counts = StatusCounts::default();
        for issue in issues {
            match issue.status {
                IssueStatus::Received => counts.received += 1,
                IssueStatus::InProgress => counts.in_progress += 1,
                IssueStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }

    pub fn get(&self, status: IssueStatus) -> usize {
        match status {
            IssueStatus::Received => self.received,
            IssueStatus::InProgress => self.in_progress,
            IssueStatus::Completed => self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.received + self.in_progress + self.completed
    }
}
