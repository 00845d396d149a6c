//! Marker styling.
//!
//! Styles are built per marker from fixed lookup tables. Values outside
//! the known category or severity sets get a neutral default.

use std::fmt;

use chrono::{DateTime, Local, Utc};
use emergency_map_emergency_models::evacuation::{CenterStatus, EvacuationCenter};
use emergency_map_emergency_models::{Emergency, EmergencyType, OpenEnum, Severity};

const DEFAULT_TYPE_COLOR: &str = "#ef4444";
const DEFAULT_ICON: &str = "⚠️";
const DEFAULT_SEVERITY_COLOR: &str = "#3b82f6";

const EMERGENCY_MARKER_SIZE: u32 = 35;
const EVACUATION_MARKER_SIZE: u32 = 30;
const EVACUATION_ICON: &str = "🏠";

/// Visual attributes of one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Glyph drawn inside the marker.
    pub icon: &'static str,
    /// Background color.
    pub fill: &'static str,
    /// Border color.
    pub accent: &'static str,
    /// Width and height in pixels.
    pub size: u32,
    /// Offset from the top-left corner to the anchored point.
    pub anchor: u32,
}

impl MarkerStyle {
    const fn sized(icon: &'static str, fill: &'static str, accent: &'static str, size: u32) -> Self {
        Self {
            icon,
            fill,
            accent,
            size,
            anchor: size / 2,
        }
    }
}

/// Text shown when a marker is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

impl fmt::Display for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for line in &self.lines {
            write!(f, "\n  {line}")?;
        }
        Ok(())
    }
}

#[must_use]
pub const fn type_color(emergency_type: &OpenEnum<EmergencyType>) -> &'static str {
    match emergency_type {
        OpenEnum::Known(EmergencyType::Fire) => "#f97316",
        OpenEnum::Known(EmergencyType::Flood) => "#3b82f6",
        OpenEnum::Known(EmergencyType::Earthquake) => "#92400e",
        OpenEnum::Unrecognized(_) => DEFAULT_TYPE_COLOR,
    }
}

#[must_use]
pub const fn type_icon(emergency_type: &OpenEnum<EmergencyType>) -> &'static str {
    match emergency_type {
        OpenEnum::Known(known) => known.icon(),
        OpenEnum::Unrecognized(_) => DEFAULT_ICON,
    }
}

#[must_use]
pub const fn severity_color(severity: &OpenEnum<Severity>) -> &'static str {
    match severity {
        OpenEnum::Known(Severity::High) => "#ef4444",
        OpenEnum::Known(Severity::Medium) => "#f59e0b",
        OpenEnum::Known(Severity::Low) | OpenEnum::Unrecognized(_) => DEFAULT_SEVERITY_COLOR,
    }
}

/// Style for an emergency marker: category icon and fill, severity border.
#[must_use]
pub const fn emergency_style(record: &Emergency) -> MarkerStyle {
    MarkerStyle::sized(
        type_icon(&record.emergency_type),
        type_color(&record.emergency_type),
        severity_color(&record.severity),
        EMERGENCY_MARKER_SIZE,
    )
}

/// Popup for an emergency marker.
#[must_use]
pub fn emergency_popup(record: &Emergency) -> Popup {
    let title = record.known_type().map_or_else(
        || format!("{} {}", DEFAULT_ICON, record.emergency_type),
        |known| format!("{} {}", known.icon(), known.label()),
    );
    Popup {
        title,
        lines: vec![
            record.address.clone(),
            format!(
                "Severity: {} ({})",
                record.severity.as_str().to_uppercase(),
                severity_color(&record.severity)
            ),
            format!("Reported: {}", local_time(record.timestamp)),
        ],
    }
}

const fn evacuation_color(status: CenterStatus) -> &'static str {
    match status {
        CenterStatus::Available => "#10b981",
        CenterStatus::Limited | CenterStatus::Full => "#f59e0b",
    }
}

#[must_use]
pub const fn evacuation_style(center: &EvacuationCenter) -> MarkerStyle {
    let color = evacuation_color(center.status);
    MarkerStyle::sized(EVACUATION_ICON, color, color, EVACUATION_MARKER_SIZE)
}

#[must_use]
pub fn evacuation_popup(center: &EvacuationCenter) -> Popup {
    Popup {
        title: center.name.clone(),
        lines: vec![
            format!("Capacity: {} people", center.capacity),
            format!("Status: {}", center.status.as_ref().to_uppercase()),
        ],
    }
}

fn local_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%b %-d, %Y %-I:%M %p")
        .to_string()
}
