use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use turni_core::types::{GroupId, PresenceStatus};

use crate::error::Result;

// On-disk layout: { "groups": [ { "name", "shifts": [ { "date", "presence" } ] } ] }
#[derive(Debug, Deserialize)]
struct ShiftFile {
    groups: Vec<GroupEntry>,
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    name: String,
    shifts: Vec<ShiftEntry>,
}

#[derive(Debug, Deserialize)]
struct ShiftEntry {
    date: NaiveDate,
    presence: bool,
}

/// Group → date → presence status. Absence of a date key means "no shift
/// recorded", which is distinct from either status.
#[derive(Debug, Clone, Default)]
pub struct ShiftTable {
    groups: HashMap<GroupId, HashMap<NaiveDate, PresenceStatus>>,
}

impl ShiftTable {
    /// Load the table from a JSON file. Called once at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let table = Self::parse(&raw)?;
        info!(
            path = %path.as_ref().display(),
            groups = table.groups.len(),
            "shift table loaded"
        );
        Ok(table)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let file: ShiftFile = serde_json::from_str(raw)?;
        let mut groups = HashMap::new();
        for group in file.groups {
            let days = group
                .shifts
                .into_iter()
                .map(|s| (s.date, PresenceStatus::from_presence(s.presence)))
                .collect();
            groups.insert(GroupId(group.name), days);
        }
        Ok(Self { groups })
    }

    pub fn is_valid_group(&self, group: &GroupId) -> bool {
        self.groups.contains_key(group)
    }

    /// Bare group codes (prefix stripped), sorted, for the login keyboard.
    pub fn group_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.groups.keys().map(|g| g.code().to_string()).collect();
        codes.sort();
        codes
    }

    /// The recorded status for a group on a date, `None` when no shift is
    /// recorded (or the group is unknown).
    pub fn status_on(&self, group: &GroupId, date: NaiveDate) -> Option<PresenceStatus> {
        self.groups.get(group)?.get(&date).copied()
    }

    pub fn is_remote_work_day(&self, group: &GroupId, date: NaiveDate) -> bool {
        self.status_on(group, date) == Some(PresenceStatus::RemoteWork)
    }

    pub fn is_in_office_day(&self, group: &GroupId, date: NaiveDate) -> bool {
        self.status_on(group, date) == Some(PresenceStatus::InOffice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "groups": [
            {
                "name": "gruppo-42",
                "shifts": [
                    { "date": "2026-08-06", "presence": true },
                    { "date": "2026-08-07", "presence": false }
                ]
            },
            { "name": "gruppo-7", "shifts": [] }
        ]
    }"#;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_lookup() {
        let table = ShiftTable::parse(SAMPLE).unwrap();
        let g = GroupId::from_code("42");
        assert!(table.is_valid_group(&g));
        assert_eq!(
            table.status_on(&g, date("2026-08-06")),
            Some(PresenceStatus::InOffice)
        );
        assert_eq!(
            table.status_on(&g, date("2026-08-07")),
            Some(PresenceStatus::RemoteWork)
        );
        assert_eq!(table.status_on(&g, date("2026-08-08")), None);
    }

    #[test]
    fn status_wrappers_are_mutually_exclusive() {
        let table = ShiftTable::parse(SAMPLE).unwrap();
        let g = GroupId::from_code("42");
        for d in ["2026-08-06", "2026-08-07"] {
            let d = date(d);
            assert_ne!(
                table.is_in_office_day(&g, d),
                table.is_remote_work_day(&g, d)
            );
        }
        // Absent date: both false.
        let absent = date("2026-01-01");
        assert!(!table.is_in_office_day(&g, absent));
        assert!(!table.is_remote_work_day(&g, absent));
    }

    #[test]
    fn unknown_group_has_no_status() {
        let table = ShiftTable::parse(SAMPLE).unwrap();
        let g = GroupId::from_code("99");
        assert!(!table.is_valid_group(&g));
        assert_eq!(table.status_on(&g, date("2026-08-06")), None);
    }

    #[test]
    fn group_codes_are_sorted_and_unprefixed() {
        let table = ShiftTable::parse(SAMPLE).unwrap();
        assert_eq!(table.group_codes(), vec!["42".to_string(), "7".to_string()]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(ShiftTable::parse("{\"groups\": 1}").is_err());
        assert!(ShiftTable::parse("not json").is_err());
    }
}
