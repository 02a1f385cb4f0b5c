use ratatui::style::{Color, Modifier, Style};
use wasteops_core::{IssueStatus, PinTone, PredictionLevel, Priority, ZoneFill};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const FOCUS_BORDER: Color = Color::Cyan;
pub const MUTED: Color = Color::DarkGray;
pub const ZONE_OUTLINE: Color = Color::Rgb(146, 131, 116);
pub const ZONE_LABEL: Color = Color::Rgb(235, 219, 178);
pub const SELECTION_RING: Color = Color::Rgb(245, 158, 11);
pub const LANDMARK: Color = Color::Rgb(168, 162, 158);
pub const TOAST_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 40))
    .fg(Color::Rgb(235, 219, 178));

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub mod icons {
    pub const PIN: &str = "●";
    pub const RECEIVED: &str = ".";
    pub const IN_PROGRESS: &str = ">";
    pub const COMPLETED: &str = "x";
    pub const PRIORITY_HIGH: &str = "!";
    pub const PRIORITY_MED: &str = "~";
    pub const PRIORITY_LOW: &str = "-";
}

pub fn status_color(status: IssueStatus) -> Color {
    pin_color(PinTone::from(status))
}

pub fn status_icon(status: IssueStatus) -> &'static str {
    match status {
        IssueStatus::Received => icons::RECEIVED,
        IssueStatus::InProgress => icons::IN_PROGRESS,
        IssueStatus::Completed => icons::COMPLETED,
    }
}

pub fn pin_legend(tone: PinTone) -> &'static str {
    match tone {
        PinTone::Received => "민원 접수",
        PinTone::InProgress => "처리중",
        PinTone::Completed => "처리 완료",
    }
}

pub fn pin_color(tone: PinTone) -> Color {
    match tone {
        PinTone::Received => Color::Rgb(148, 163, 184),
        PinTone::InProgress => Color::Rgb(0, 159, 227),
        PinTone::Completed => Color::Rgb(16, 185, 129),
    }
}

const FILL_STRONG_WARNING: Color = Color::Rgb(204, 36, 29);
const FILL_WARNING: Color = Color::Rgb(214, 93, 14);
const FILL_NEUTRAL_INFO: Color = Color::Rgb(69, 133, 136);
const FILL_POSITIVE: Color = Color::Rgb(104, 157, 106);

/// `None` means the zone is drawn as an outline only.
pub fn zone_fill_color(fill: ZoneFill) -> Option<Color> {
    match fill {
        ZoneFill::Neutral => None,
        ZoneFill::StrongWarning => Some(FILL_STRONG_WARNING),
        ZoneFill::Warning => Some(FILL_WARNING),
        ZoneFill::NeutralInfo => Some(FILL_NEUTRAL_INFO),
        ZoneFill::Positive => Some(FILL_POSITIVE),
    }
}

pub fn prediction_color(level: PredictionLevel) -> Color {
    match level {
        PredictionLevel::Congested => FILL_STRONG_WARNING,
        PredictionLevel::Caution => FILL_WARNING,
        PredictionLevel::Moderate => FILL_NEUTRAL_INFO,
        PredictionLevel::Smooth => FILL_POSITIVE,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Rgb(254, 128, 25),
        Priority::Medium => Color::Rgb(250, 189, 47),
        Priority::Low => Color::Rgb(131, 165, 152),
    }
}

pub fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => icons::PRIORITY_HIGH,
        Priority::Medium => icons::PRIORITY_MED,
        Priority::Low => icons::PRIORITY_LOW,
    }
}
