pub mod dashboard;
pub mod filter;
pub mod geometry;
pub mod notification;
pub mod overlay;
pub mod registry;
pub mod seed;
pub mod selection;
pub mod session;
pub mod workflow;

use geometry::{Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use dashboard::{Action, Dashboard, Effect, Panel};
pub use filter::{FilterChoice, FilterCriteria, StatusCounts};
pub use notification::{Notification, NotificationQueue, NOTIFICATION_TTL};
pub use overlay::{DisplayMode, MapView, PinTone, ZoneFill};
pub use registry::{Registry, RegistryError};
pub use seed::SeedError;
pub use selection::{Selection, SelectionSource};
pub use session::{LoginError, LoginForm, LoginRequest, Role, Session, User, LOGIN_DELAY};
pub use workflow::Transition;

/// A fixed district of the map. Reference data: never mutated after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "path")]
    pub boundary: Polygon,
    /// Label anchor.
    pub cx: f64,
    pub cy: f64,
    pub prediction: Prediction,
}

impl Zone {
    pub fn label_anchor(&self) -> Point {
        Point::new(self.cx, self.cy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub level: PredictionLevel,
    pub score: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub zone_id: String,
    /// Vertical position (y), 0-100.
    pub lat: f64,
    /// Horizontal position (x), 0-100.
    pub lng: f64,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub status: IssueStatus,
    pub priority: Priority,
    pub address: String,
    pub description: String,
    pub reported_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_at: Option<String>,
    pub manager_dept: String,
}

impl Issue {
    pub fn position(&self) -> Point {
        Point::new(self.lng, self.lat)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IssueStatus {
    #[serde(rename = "접수")]
    Received,
    #[serde(rename = "처리중")]
    InProgress,
    #[serde(rename = "완료")]
    Completed,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 3] = [
        IssueStatus::Received,
        IssueStatus::InProgress,
        IssueStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Received => "접수",
            IssueStatus::InProgress => "처리중",
            IssueStatus::Completed => "완료",
        }
    }

    /// Option text shown by the status control.
    pub fn control_label(&self) -> &'static str {
        match self {
            IssueStatus::Received => "접수 (대기중)",
            IssueStatus::InProgress => "처리중 (작업지시)",
            IssueStatus::Completed => "완료 (결과통보)",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "접수" | "received" => Ok(IssueStatus::Received),
            "처리중" | "in-progress" | "in_progress" | "inprogress" => Ok(IssueStatus::InProgress),
            "완료" | "completed" | "done" => Ok(IssueStatus::Completed),
            other => Err(format!("Unknown status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IssueType {
    #[serde(rename = "일반쓰레기")]
    GeneralWaste,
    #[serde(rename = "재활용(포장재)")]
    Recyclable,
    #[serde(rename = "음식물")]
    FoodWaste,
    #[serde(rename = "대형폐기물")]
    BulkWaste,
}

impl IssueType {
    pub const ALL: [IssueType; 4] = [
        IssueType::GeneralWaste,
        IssueType::Recyclable,
        IssueType::FoodWaste,
        IssueType::BulkWaste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::GeneralWaste => "일반쓰레기",
            IssueType::Recyclable => "재활용(포장재)",
            IssueType::FoodWaste => "음식물",
            IssueType::BulkWaste => "대형폐기물",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "일반쓰레기" | "general" => Ok(IssueType::GeneralWaste),
            "재활용(포장재)" | "재활용" | "recyclable" => Ok(IssueType::Recyclable),
            "음식물" | "food" => Ok(IssueType::FoodWaste),
            "대형폐기물" | "bulk" => Ok(IssueType::BulkWaste),
            other => Err(format!("Unknown issue type: {other}")),
        }
    }
}

/// Display-only; has no effect on the workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    #[serde(rename = "낮음")]
    Low,
    #[serde(rename = "보통")]
    Medium,
    #[serde(rename = "높음")]
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "낮음",
            Priority::Medium => "보통",
            Priority::High => "높음",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from calm to congested.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PredictionLevel {
    #[serde(rename = "원활")]
    Smooth,
    #[serde(rename = "보통")]
    Moderate,
    #[serde(rename = "주의")]
    Caution,
    #[serde(rename = "혼잡")]
    Congested,
}

impl PredictionLevel {
    pub const ALL: [PredictionLevel; 4] = [
        PredictionLevel::Smooth,
        PredictionLevel::Moderate,
        PredictionLevel::Caution,
        PredictionLevel::Congested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionLevel::Smooth => "원활",
            PredictionLevel::Moderate => "보통",
            PredictionLevel::Caution => "주의",
            PredictionLevel::Congested => "혼잡",
        }
    }
}

impl fmt::Display for PredictionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_korean_and_english_aliases() {
        assert_eq!("접수".parse::<IssueStatus>(), Ok(IssueStatus::Received));
        assert_eq!(
            " In-Progress ".parse::<IssueStatus>(),
            Ok(IssueStatus::InProgress)
        );
        assert_eq!("done".parse::<IssueStatus>(), Ok(IssueStatus::Completed));
        assert!("closed".parse::<IssueStatus>().is_err());
    }

    #[test]
    fn issue_deserializes_seed_shape() {
        let raw = r#"{
            "id": "ISS-1", "zoneId": "z1", "lat": 45, "lng": 80,
            "type": "재활용(포장재)", "status": "처리중", "priority": "높음",
            "address": "a", "description": "d",
            "reportedAt": "2023-10-24 09:15", "managerDept": "자원순환과"
        }"#;
        let issue: Issue = serde_json::from_str(raw).expect("parse issue");
        assert_eq!(issue.issue_type, IssueType::Recyclable);
        assert_eq!(issue.status, IssueStatus::InProgress);
        assert_eq!(issue.expected_at, None);
        assert_eq!(issue.position(), Point::new(80.0, 45.0));
    }

    #[test]
    fn prediction_levels_are_ordered() {
        assert!(PredictionLevel::Smooth < PredictionLevel::Moderate);
        assert!(PredictionLevel::Caution < PredictionLevel::Congested);
    }
}
