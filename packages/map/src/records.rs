//! The view's single copy of the emergency list.

use emergency_map_emergency_models::{Emergency, EmergencyType, Severity};

/// Versioned record list shared by the filter and the marker synchronizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Emergency>,
    version: u64,
}

impl RecordSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the list and bumps the version.
    pub fn replace(&mut self, records: Vec<Emergency>) {
        self.records = records;
        self.version += 1;
    }

    #[must_use]
    pub fn records(&self) -> &[Emergency] {
        &self.records
    }

    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.records
            .iter()
            .filter(|r| r.known_severity() == Some(severity))
            .count()
    }

    #[must_use]
    pub fn count_by_type(&self, emergency_type: EmergencyType) -> usize {
        self.records
            .iter()
            .filter(|r| r.known_type() == Some(emergency_type))
            .count()
    }

    /// Summary counts for the stats panel.
    #[must_use]
    pub fn stats(&self) -> RecordStats {
        RecordStats {
            total: self.len(),
            by_severity: Severity::all()
                .iter()
                .map(|&s| (s, self.count_by_severity(s)))
                .collect(),
            by_type: EmergencyType::all()
                .iter()
                .map(|&t| (t, self.count_by_type(t)))
                .collect(),
        }
    }
}

/// Counts over the current record list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStats {
    pub total: usize,
    pub by_severity: Vec<(Severity, usize)>,
    pub by_type: Vec<(EmergencyType, usize)>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use emergency_map_emergency_models::{Coordinates, OpenEnum};

    use super::*;

    fn record(emergency_type: &str, severity: &str) -> Emergency {
        Emergency {
            emergency_type: OpenEnum::parse(emergency_type),
            location: Coordinates { lat: 15.0, lng: 120.0 },
            address: "Angeles City".to_string(),
            severity: OpenEnum::parse(severity),
            description: String::new(),
            timestamp: Utc::now(),
            reported_by: None,
        }
    }

    #[test]
    fn replace_bumps_version() {
        let mut set = RecordSet::new();
        assert_eq!(set.version(), 0);
        set.replace(vec![record("fire", "high")]);
        set.replace(vec![]);
        assert_eq!(set.version(), 2);
        assert!(set.is_empty());
    }

    #[test]
    fn stats_skip_unrecognized_values() {
        let mut set = RecordSet::new();
        set.replace(vec![
            record("fire", "high"),
            record("flood", "medium"),
            record("fire", "medium"),
            record("landslide", "critical"),
        ]);

        let stats = set.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(
            stats.by_severity,
            [(Severity::High, 1), (Severity::Medium, 2), (Severity::Low, 0)]
        );
        assert_eq!(
            stats.by_type,
            [
                (EmergencyType::Fire, 2),
                (EmergencyType::Flood, 1),
                (EmergencyType::Earthquake, 0)
            ]
        );
    }
}
