// Copyright 2025 perf-graphs Contributors
// SPDX-License-Identifier: Apache-2.0

//! Decoding of single legacy test run records.
//!
//! A legacy fragment is one `meta.json` describing one project built with
//! one build variant. Only the canonical variant (`generic-all`, build
//! `000`) is merged; every other variant duplicates data already present.

use crate::aggregate::Sample;
use crate::date::parse_date;
use crate::error::RecordError;
use chrono::NaiveDateTime;
use serde_json::{Map, Value};

/// Build type of the canonical build variant.
pub const ACCEPTED_BUILD_TYPE: &str = "generic-all";

/// Build number of the canonical build variant.
pub const ACCEPTED_BUILD: &str = "000";

/// A decoded, accepted legacy record.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRunRecord {
    /// Project the record belongs to.
    pub project: String,
    /// When the record was produced.
    pub date: NaiveDateTime,
    /// The metrics carried by the record.
    pub sample: Sample,
}

impl TestRunRecord {
    /// Decode a legacy fragment, applying the build-variant filter first.
    ///
    /// Either every required field is present and a record is returned, or
    /// the fragment is rejected as a whole.
    pub fn from_legacy(value: &Value) -> Result<Self, RecordError> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

        let build_type = string_field(obj, "build_type")?;
        let build = build_number(obj)?;
        if build_type != ACCEPTED_BUILD_TYPE || build != ACCEPTED_BUILD {
            return Err(RecordError::Rejected {
                build_type: build_type.to_string(),
                build,
            });
        }

        let project = string_field(obj, "project")?.to_string();
        let raw_date = string_field(obj, "date")?;
        let date = parse_date(raw_date).map_err(|_| RecordError::InvalidDate {
            value: raw_date.to_string(),
        })?;

        let sample = Sample {
            board: field(obj, "board")?.clone(),
            toolchain: field(obj, "toolchain")?.clone(),
            runtime: field(obj, "runtime")?.clone(),
            resources: field(obj, "resources")?.clone(),
            maximum_memory_use: field(obj, "maximum_memory_use")?.clone(),
            max_freq: field(obj, "max_freq")?.clone(),
            device: field(obj, "device")?.clone(),
            wirelength: None,
        };

        Ok(Self {
            project,
            date,
            sample,
        })
    }
}

fn field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, RecordError> {
    obj.get(name).ok_or(RecordError::MissingField(name))
}

fn string_field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a str, RecordError> {
    field(obj, name)?.as_str().ok_or(RecordError::WrongType {
        field: name,
        expected: "string",
    })
}

// `build` is a zero-padded string in the harness output; a bare number is
// accepted and padded the same way.
fn build_number(obj: &Map<String, Value>) -> Result<String, RecordError> {
    match field(obj, "build")? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) if n.is_u64() => Ok(format!("{:03}", n.as_u64().unwrap_or_default())),
        _ => Err(RecordError::WrongType {
            field: "build",
            expected: "string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> Value {
        json!({
            "build_type": "generic-all",
            "build": "000",
            "project": "blinky",
            "date": "2020-11-03T12:00:00",
            "board": "arty",
            "toolchain": "vivado",
            "runtime": {"total": 42.0},
            "resources": {"LUT": 10, "FF": 20},
            "maximum_memory_use": 300.5,
            "max_freq": {"clk": {"actual": 120.0}},
            "device": "xc7a35tcsg324-1"
        })
    }

    #[test]
    fn test_complete_record_is_accepted() {
        let record = TestRunRecord::from_legacy(&complete()).unwrap();
        assert_eq!(record.project, "blinky");
        assert_eq!(record.sample.board, "arty");
        assert_eq!(record.sample.device, json!("xc7a35tcsg324-1"));
        assert_eq!(record.sample.wirelength, None);
    }

    #[test]
    fn test_other_build_variants_are_rejected() {
        let mut other_build = complete();
        other_build["build"] = json!("001");
        assert_eq!(
            TestRunRecord::from_legacy(&other_build),
            Err(RecordError::Rejected {
                build_type: "generic-all".to_string(),
                build: "001".to_string()
            })
        );

        let mut other_type = complete();
        other_type["build_type"] = json!("vendor");
        assert!(matches!(
            TestRunRecord::from_legacy(&other_type),
            Err(RecordError::Rejected { .. })
        ));
    }

    #[test]
    fn test_numeric_build_is_padded() {
        let mut numeric = complete();
        numeric["build"] = json!(0);
        assert!(TestRunRecord::from_legacy(&numeric).is_ok());
    }

    #[test]
    fn test_each_missing_required_field_rejects_record() {
        for name in crate::aggregate::REQUIRED_FIELDS {
            let mut value = complete();
            value.as_object_mut().unwrap().remove(name);
            assert_eq!(
                TestRunRecord::from_legacy(&value),
                Err(RecordError::MissingField(name)),
                "field {name}"
            );
        }
    }

    #[test]
    fn test_missing_filter_fields_reject_record() {
        let mut value = complete();
        value.as_object_mut().unwrap().remove("build_type");
        assert_eq!(
            TestRunRecord::from_legacy(&value),
            Err(RecordError::MissingField("build_type"))
        );
    }

    #[test]
    fn test_bad_date_rejects_record() {
        let mut value = complete();
        value["date"] = json!("last tuesday");
        assert!(matches!(
            TestRunRecord::from_legacy(&value),
            Err(RecordError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert_eq!(
            TestRunRecord::from_legacy(&json!([1, 2, 3])),
            Err(RecordError::NotAnObject)
        );
    }
}
