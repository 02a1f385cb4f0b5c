//! Map presentation model: which zones get which fill and which pins are
//! drawn. Mode switching never touches registry data.

use crate::registry::Registry;
use crate::selection::Selection;
use crate::{Issue, IssueStatus, PredictionLevel, Zone};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Current status: pins visible, neutral zones.
    #[default]
    Live,
    /// Predicted load: pins hidden, zones coloured by prediction level.
    Prediction,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Live => DisplayMode::Prediction,
            DisplayMode::Prediction => DisplayMode::Live,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Live => "현황",
            DisplayMode::Prediction => "분석",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Live => "live",
            DisplayMode::Prediction => "prediction",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" | "status" => Some(DisplayMode::Live),
            "prediction" | "predict" | "analysis" => Some(DisplayMode::Prediction),
            _ => None,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour class of a zone; the front end maps each class to a concrete colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneFill {
    Neutral,
    StrongWarning,
    Warning,
    NeutralInfo,
    Positive,
}

impl ZoneFill {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneFill::Neutral => "neutral",
            ZoneFill::StrongWarning => "strong-warning",
            ZoneFill::Warning => "warning",
            ZoneFill::NeutralInfo => "neutral-info",
            ZoneFill::Positive => "positive",
        }
    }
}

pub fn prediction_fill(level: PredictionLevel) -> ZoneFill {
    match level {
        PredictionLevel::Congested => ZoneFill::StrongWarning,
        PredictionLevel::Caution => ZoneFill::Warning,
        PredictionLevel::Moderate => ZoneFill::NeutralInfo,
        PredictionLevel::Smooth => ZoneFill::Positive,
    }
}

pub fn zone_fill(mode: DisplayMode, zone: &Zone) -> ZoneFill {
    match mode {
        DisplayMode::Live => ZoneFill::Neutral,
        DisplayMode::Prediction => prediction_fill(zone.prediction.level),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinTone {
    Received,
    InProgress,
    Completed,
}

impl From<IssueStatus> for PinTone {
    fn from(status: IssueStatus) -> Self {
        match status {
            IssueStatus::Received => PinTone::Received,
            IssueStatus::InProgress => PinTone::InProgress,
            IssueStatus::Completed => PinTone::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ZoneView<'a> {
    pub zone: &'a Zone,
    pub fill: ZoneFill,
}

#[derive(Debug, Clone, Copy)]
pub struct PinView<'a> {
    pub issue: &'a Issue,
    pub tone: PinTone,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct MapView<'a> {
    pub mode: DisplayMode,
    pub zones: Vec<ZoneView<'a>>,
    pub pins: Vec<PinView<'a>>,
}

impl<'a> MapView<'a> {
    pub fn build(registry: &'a Registry, selection: &Selection, mode: DisplayMode) -> Self {
        let zones = registry
            .zones()
            .iter()
            .map(|zone| ZoneView {
                zone,
                fill: zone_fill(mode, zone),
            })
            .collect();
        let pins = match mode {
            DisplayMode::Live => registry
                .issues()
                .iter()
                .map(|issue| PinView {
                    issue,
                    tone: PinTone::from(issue.status),
                    selected: selection.is_selected(&issue.id),
                })
                .collect(),
            DisplayMode::Prediction => Vec::new(),
        };
        Self { mode, zones, pins }
    }

    pub fn selected_pin(&self) -> Option<&PinView<'a>> {
        self.pins.iter().find(|pin| pin.selected)
    }
}
