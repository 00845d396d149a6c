#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Emergency record, category and severity types.
//!
//! This crate defines the record shape stored in the shared remote
//! emergency collection and the closed category/severity sets the map and
//! the reporting flow work with. Category and severity strings coming off
//! the wire that fall outside the known sets are kept verbatim in
//! [`OpenEnum::Unrecognized`] so that a read-modify-write cycle never
//! rewrites another reporter's data.

pub mod evacuation;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Address used when reverse geocoding fails or no position is known.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Top-level emergency categories a reporter can choose from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmergencyType {
    /// Building fire, forest fire, or fire hazard
    Fire,
    /// Flash flood, river overflow, or water accumulation
    Flood,
    /// Ground shaking, structural damage, or aftershocks
    Earthquake,
}

impl EmergencyType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Fire, Self::Flood, Self::Earthquake]
    }

    /// Human-readable label shown on report buttons and filter chips.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fire => "Fire",
            Self::Flood => "Flood",
            Self::Earthquake => "Earthquake",
        }
    }

    /// Emoji icon used on markers and in the report picker.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Fire => "🔥",
            Self::Flood => "🌊",
            Self::Earthquake => "🏚️",
        }
    }

    /// One-line description of what falls under this category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Fire => "Building fire, forest fire, or fire hazard",
            Self::Flood => "Flash flood, river overflow, or water accumulation",
            Self::Earthquake => "Ground shaking, structural damage, or aftershocks",
        }
    }
}

/// Severity of a reported emergency.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Severity assigned to user-submitted reports. The reporting flow has
    /// no severity input.
    pub const REPORTED: Self = Self::Medium;

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// A closed enum on the Rust side that stays open on the wire.
///
/// Values that parse into `T` become [`OpenEnum::Known`]; anything else is
/// carried as the original string and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OpenEnum<T> {
    /// A value from the known set.
    Known(T),
    /// A value outside the known set, preserved as received.
    Unrecognized(String),
}

impl<T: FromStr> OpenEnum<T> {
    /// Parses `raw`, falling back to [`OpenEnum::Unrecognized`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.parse::<T>()
            .map_or_else(|_| Self::Unrecognized(raw.to_string()), Self::Known)
    }
}

impl<T: Copy> OpenEnum<T> {
    /// Returns the known value, if any.
    #[must_use]
    pub const fn known(&self) -> Option<T> {
        match self {
            Self::Known(value) => Some(*value),
            Self::Unrecognized(_) => None,
        }
    }
}

impl<T: AsRef<str>> OpenEnum<T> {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(value) => value.as_ref(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl<T> From<T> for OpenEnum<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl<T: AsRef<str>> fmt::Display for OpenEnum<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: AsRef<str>> Serialize for OpenEnum<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, T: FromStr> Deserialize<'de> for OpenEnum<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair, validating both ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is out of range or not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinatesError> {
        let coords = Self { lat, lng };
        if coords.is_valid() {
            Ok(coords)
        } else {
            Err(InvalidCoordinatesError { lat, lng })
        }
    }

    /// Whether both components are finite and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// Error returned when a latitude/longitude pair is out of range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinatesError {
    /// The rejected latitude.
    pub lat: f64,
    /// The rejected longitude.
    pub lng: f64,
}

impl fmt::Display for InvalidCoordinatesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid coordinates ({}, {}): expected lat in [-90, 90] and lng in [-180, 180]",
            self.lat, self.lng
        )
    }
}

impl std::error::Error for InvalidCoordinatesError {}

/// One reported incident as stored in the shared collection.
///
/// Records have no client-assigned id; they are identified by their
/// position in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emergency {
    /// Emergency category.
    #[serde(rename = "type")]
    pub emergency_type: OpenEnum<EmergencyType>,
    /// Where the emergency was reported.
    pub location: Coordinates,
    /// Display address, or [`UNKNOWN_LOCATION`].
    pub address: String,
    /// Severity level.
    pub severity: OpenEnum<Severity>,
    /// Free-text details from the reporter.
    pub description: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
    /// Optional reporter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
}

impl Emergency {
    /// Known category of this record, if it has one.
    #[must_use]
    pub const fn known_type(&self) -> Option<EmergencyType> {
        self.emergency_type.known()
    }

    /// Known severity of this record, if it has one.
    #[must_use]
    pub const fn known_severity(&self) -> Option<Severity> {
        self.severity.known()
    }
}
