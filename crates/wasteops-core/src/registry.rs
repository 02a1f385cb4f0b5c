use crate::geometry::Point;
use crate::{Issue, IssueStatus, Zone};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

pub const REPORTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const EXPECTED_AT_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("duplicate zone id '{0}'")]
    DuplicateZone(String),
    #[error("duplicate issue id '{0}'")]
    DuplicateIssue(String),
    #[error("issue '{issue_id}' references unknown zone '{zone_id}'")]
    UnknownZone { issue_id: String, zone_id: String },
    #[error("issue '{issue_id}' position ({x}, {y}) is outside the 0-100 map space")]
    PositionOutOfRange { issue_id: String, x: f64, y: f64 },
    #[error("zone '{zone_id}' {what} ({x}, {y}) is outside the 0-100 map space")]
    BoundaryOutOfRange {
        zone_id: String,
        what: &'static str,
        x: f64,
        y: f64,
    },
    #[error("zones '{first}' and '{second}' overlap")]
    ZoneOverlap { first: String, second: String },
    #[error("zone '{zone_id}' prediction score {score} is outside 0-100")]
    ScoreOutOfRange { zone_id: String, score: u8 },
    #[error("issue '{issue_id}' has invalid {field} '{value}'")]
    InvalidTimestamp {
        issue_id: String,
        field: &'static str,
        value: String,
    },
}

/// Canonical in-memory zones and issues, in load order.
#[derive(Debug, Clone)]
pub struct Registry {
    zones: Vec<Zone>,
    issues: Vec<Issue>,
}

impl Registry {
    pub fn new(zones: Vec<Zone>, issues: Vec<Issue>) -> Result<Self, RegistryError> {
        let mut zone_ids = HashSet::new();
        for zone in &zones {
            if !zone_ids.insert(zone.id.as_str()) {
                return Err(RegistryError::DuplicateZone(zone.id.clone()));
            }
            if zone.prediction.score > 100 {
                return Err(RegistryError::ScoreOutOfRange {
                    zone_id: zone.id.clone(),
                    score: zone.prediction.score,
                });
            }
            validate_extent(zone)?;
        }
        for (idx, first) in zones.iter().enumerate() {
            for second in &zones[idx + 1..] {
                if first.boundary.overlaps(&second.boundary) {
                    return Err(RegistryError::ZoneOverlap {
                        first: first.id.clone(),
                        second: second.id.clone(),
                    });
                }
            }
        }

        let mut issue_ids = HashSet::new();
        for issue in &issues {
            if !issue_ids.insert(issue.id.as_str()) {
                return Err(RegistryError::DuplicateIssue(issue.id.clone()));
            }
            let Some(zone) = zones.iter().find(|zone| zone.id == issue.zone_id) else {
                return Err(RegistryError::UnknownZone {
                    issue_id: issue.id.clone(),
                    zone_id: issue.zone_id.clone(),
                });
            };
            let position = issue.position();
            if !position.in_extent() {
                return Err(RegistryError::PositionOutOfRange {
                    issue_id: issue.id.clone(),
                    x: position.x,
                    y: position.y,
                });
            }
            validate_timestamps(issue)?;
            if !zone.boundary.contains(position) {
                warn!(
                    issue_id = %issue.id,
                    zone_id = %zone.id,
                    "issue pin lies outside its zone boundary"
                );
            }
        }

        Ok(Self { zones, issues })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    pub fn contains_issue(&self, id: &str) -> bool {
        self.issue(id).is_some()
    }

    /// Replaces the status of the one matching issue. Unknown ids are a
    /// silent no-op; the return value only reports whether anything matched.
    pub fn set_issue_status(&mut self, id: &str, status: IssueStatus) -> bool {
        match self.issues.iter_mut().find(|issue| issue.id == id) {
            Some(issue) => {
                issue.status = status;
                true
            }
            None => {
                debug!(issue_id = id, "status update for unknown issue ignored");
                false
            }
        }
    }

    /// First zone (in load order) whose boundary contains the point.
    pub fn zone_at(&self, point: Point) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.boundary.contains(point))
    }

    /// Nearest issue pin within `radius` map units.
    pub fn issue_near(&self, point: Point, radius: f64) -> Option<&Issue> {
        self.issues
            .iter()
            .map(|issue| (issue, issue.position().distance(point)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(issue, _)| issue)
    }
}

fn validate_extent(zone: &Zone) -> Result<(), RegistryError> {
    let vertices = zone.boundary.vertices().iter().map(|vertex| ("vertex", *vertex));
    let anchor = std::iter::once(("label anchor", zone.label_anchor()));
    match vertices.chain(anchor).find(|(_, point)| !point.in_extent()) {
        Some((what, point)) => Err(RegistryError::BoundaryOutOfRange {
            zone_id: zone.id.clone(),
            what,
            x: point.x,
            y: point.y,
        }),
        None => Ok(()),
    }
}

fn validate_timestamps(issue: &Issue) -> Result<(), RegistryError> {
    if NaiveDateTime::parse_from_str(&issue.reported_at, REPORTED_AT_FORMAT).is_err() {
        return Err(RegistryError::InvalidTimestamp {
            issue_id: issue.id.clone(),
            field: "reportedAt",
            value: issue.reported_at.clone(),
        });
    }
    if let Some(expected_at) = &issue.expected_at {
        if NaiveDate::parse_from_str(expected_at, EXPECTED_AT_FORMAT).is_err() {
            return Err(RegistryError::InvalidTimestamp {
                issue_id: issue.id.clone(),
                field: "expectedAt",
                value: expected_at.clone(),
            });
        }
    }
    Ok(())
}
