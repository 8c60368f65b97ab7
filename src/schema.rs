//! The canonical intake record shape and its completeness rules.
//!
//! The record accumulates across capture rounds: each extraction returns a
//! partial record which is merged over the running one, then the missing
//! required fields are recomputed. Submission is only allowed once
//! [`missing_fields`] comes back empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The seven fields that must be present before submission is allowed.
///
/// Fixed and ordered; [`missing_fields`] reports absences in exactly this
/// order regardless of how the record was assembled.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "first_name",
    "last_name",
    "date_of_birth",
    "phone_number",
    "email_address",
    "primary_language",
    "affected_address",
];

/// A disaster-relief intake record, assembled incrementally from speech.
///
/// Every field is optional because any one capture round may mention any
/// subset. A required string field counts as present only when it is
/// `Some` and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeRecord {
    // Required fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_address: Option<String>,

    // Optional fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_residence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_members: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_pets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_pets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_disaster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_home_habitable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_assessment: Option<NeedsAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_disabled_members: Option<bool>,
}

/// Material and medical needs, six independent flags.
///
/// `None` means "never asked"; `Some(false)` means the caller said no.
/// The distinction has no effect on submission gating (the completeness
/// check only inspects required string fields) but is preserved so the
/// review surface can tell an unanswered question from a declined one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsAssessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelter_needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_water_needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clothing_needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_services_needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_needed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baby_supplies_needed: Option<bool>,
}

impl IntakeRecord {
    /// Look up a required field's value by name.
    fn required_field(&self, name: &str) -> Option<&String> {
        match name {
            "first_name" => self.first_name.as_ref(),
            "last_name" => self.last_name.as_ref(),
            "date_of_birth" => self.date_of_birth.as_ref(),
            "phone_number" => self.phone_number.as_ref(),
            "email_address" => self.email_address.as_ref(),
            "primary_language" => self.primary_language.as_ref(),
            "affected_address" => self.affected_address.as_ref(),
            _ => None,
        }
    }

    /// Whether a required field is present and non-empty.
    pub fn has_required(&self, name: &str) -> bool {
        self.required_field(name).is_some_and(|v| !v.is_empty())
    }

    /// True when no field at all has been filled in.
    pub fn is_empty(&self) -> bool {
        *self == IntakeRecord::default()
    }

    /// Merge a newer partial record into this one.
    ///
    /// Right-biased shallow overwrite per top-level field: every field the
    /// newer partial carries replaces the accumulated value, fields it
    /// omits are kept. `needs_assessment` is replaced wholesale, not
    /// deep-merged, so a later capture that mentions only one flag drops
    /// any previously recorded values for the other five.
    pub fn merge(&mut self, newer: IntakeRecord) {
        macro_rules! overwrite {
            ($($field:ident),+ $(,)?) => {
                $(if newer.$field.is_some() {
                    self.$field = newer.$field;
                })+
            };
        }
        overwrite!(
            first_name,
            last_name,
            date_of_birth,
            phone_number,
            email_address,
            primary_language,
            affected_address,
            type_of_residence,
            ownership_status,
            household_members,
            number_of_pets,
            type_of_pets,
            type_of_disaster,
            incident_date,
            incident_time,
            damage_description,
            is_home_habitable,
            insurance_status,
            needs_assessment,
            has_disabled_members,
        );
    }

    /// Build a record from an untrusted JSON object, coercing field by
    /// field.
    ///
    /// The extraction service is free-text first and a formatter second:
    /// numbers arrive as strings, booleans as "yes"/"no", pet lists as a
    /// lone string. Values that cannot be coerced to the schema type are
    /// dropped (treated as not mentioned), never propagated.
    ///
    /// Returns `None` when `value` is not a JSON object.
    pub fn from_value(value: &Value) -> Option<IntakeRecord> {
        let obj = value.as_object()?;

        let string = |key: &str| obj.get(key).and_then(coerce_string);
        let count = |key: &str| obj.get(key).and_then(coerce_count);
        let flag = |key: &str| obj.get(key).and_then(coerce_bool);

        Some(IntakeRecord {
            first_name: string("first_name"),
            last_name: string("last_name"),
            date_of_birth: string("date_of_birth"),
            phone_number: string("phone_number"),
            email_address: string("email_address"),
            primary_language: string("primary_language"),
            affected_address: string("affected_address"),
            type_of_residence: string("type_of_residence"),
            ownership_status: string("ownership_status"),
            household_members: count("household_members"),
            number_of_pets: count("number_of_pets"),
            type_of_pets: obj.get("type_of_pets").and_then(coerce_string_list),
            type_of_disaster: string("type_of_disaster"),
            incident_date: string("incident_date"),
            incident_time: string("incident_time"),
            damage_description: string("damage_description"),
            is_home_habitable: flag("is_home_habitable"),
            insurance_status: string("insurance_status"),
            needs_assessment: obj
                .get("needs_assessment")
                .and_then(Value::as_object)
                .map(|needs| NeedsAssessment {
                    shelter_needed: needs.get("shelter_needed").and_then(coerce_bool),
                    food_water_needed: needs.get("food_water_needed").and_then(coerce_bool),
                    clothing_needed: needs.get("clothing_needed").and_then(coerce_bool),
                    health_services_needed: needs
                        .get("health_services_needed")
                        .and_then(coerce_bool),
                    medication_needed: needs.get("medication_needed").and_then(coerce_bool),
                    baby_supplies_needed: needs
                        .get("baby_supplies_needed")
                        .and_then(coerce_bool),
                }),
            has_disabled_members: flag("has_disabled_members"),
        })
    }
}

/// Required fields still absent from `record`, in [`REQUIRED_FIELDS`]
/// order.
///
/// Always a subsequence of `REQUIRED_FIELDS`; empty exactly when all
/// seven required fields are present and non-empty. Total and
/// deterministic.
pub fn missing_fields(record: &IntakeRecord) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| !record.has_required(name))
        .collect()
}

/// Display names for every field path in the schema, including the
/// dotted `needs_assessment.*` paths. The review surface renders from
/// this table, so it must cover the whole schema.
pub const FIELD_LABELS: &[(&str, &str)] = &[
    ("first_name", "First Name"),
    ("last_name", "Last Name"),
    ("date_of_birth", "Date of Birth"),
    ("phone_number", "Phone Number"),
    ("email_address", "Email Address"),
    ("primary_language", "Primary Language"),
    ("affected_address", "Affected Address"),
    ("type_of_residence", "Type of Residence"),
    ("ownership_status", "Ownership Status"),
    ("household_members", "Number of Household Members"),
    ("number_of_pets", "Number of Pets"),
    ("type_of_pets", "Type of Pets"),
    ("type_of_disaster", "Type of Disaster"),
    ("incident_date", "Incident Date"),
    ("incident_time", "Incident Time"),
    ("damage_description", "Damage Description"),
    ("is_home_habitable", "Is Home Habitable"),
    ("insurance_status", "Insurance Status"),
    ("needs_assessment.shelter_needed", "Needs Shelter"),
    ("needs_assessment.food_water_needed", "Needs Food/Water"),
    ("needs_assessment.clothing_needed", "Needs Clothing"),
    ("needs_assessment.health_services_needed", "Needs Health Services"),
    ("needs_assessment.medication_needed", "Needs Medication"),
    ("needs_assessment.baby_supplies_needed", "Needs Baby Supplies"),
    ("has_disabled_members", "Has Disabled Members"),
];

/// Display name for a field path, or the path itself when unknown.
pub fn field_label(path: &str) -> &str {
    FIELD_LABELS
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, label)| *label)
        .unwrap_or(path)
}

/// Coerce a JSON value to a schema string. Numbers are stringified
/// (phone digits sometimes arrive as a bare number); everything else is
/// a mismatch.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a JSON value to a non-negative count. Accepts integers and
/// numeric strings; negative numbers and fractions are mismatches.
fn coerce_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Coerce a JSON value to a boolean. Accepts booleans and the yes/no and
/// true/false spellings the service occasionally emits as strings.
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "yes" | "true" => Some(true),
            "no" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Coerce a JSON value to a list of strings. A lone string becomes a
/// one-element list; array elements that aren't strings are skipped.
fn coerce_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => {
            let list: Vec<String> = items.iter().filter_map(coerce_string).collect();
            if list.is_empty() { None } else { Some(list) }
        }
        Value::String(_) => coerce_string(value).map(|s| vec![s]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_record() -> IntakeRecord {
        IntakeRecord {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            date_of_birth: Some("1984-03-12".into()),
            phone_number: Some("555-012-3456".into()),
            email_address: Some("jane@example.com".into()),
            primary_language: Some("English".into()),
            affected_address: Some("42 Elm Street".into()),
            ..Default::default()
        }
    }

    // ── missing_fields ───────────────────────────────────────────────────

    #[test]
    fn test_empty_record_misses_all_seven_in_order() {
        let missing = missing_fields(&IntakeRecord::default());
        assert_eq!(missing, REQUIRED_FIELDS.to_vec());
    }

    #[test]
    fn test_complete_record_misses_nothing() {
        assert!(missing_fields(&complete_record()).is_empty());
    }

    #[test]
    fn test_complete_record_with_empty_needs_assessment_is_submittable() {
        let mut record = complete_record();
        record.needs_assessment = Some(NeedsAssessment::default());
        assert!(missing_fields(&record).is_empty());
    }

    #[test]
    fn test_empty_string_counts_as_absent() {
        let mut record = complete_record();
        record.phone_number = Some(String::new());
        assert_eq!(missing_fields(&record), vec!["phone_number"]);
    }

    #[test]
    fn test_missing_fields_preserve_required_order() {
        // Fill fields out of declaration order; the report must still
        // follow REQUIRED_FIELDS order.
        let record = IntakeRecord {
            affected_address: Some("42 Elm Street".into()),
            first_name: Some("Jane".into()),
            ..Default::default()
        };
        assert_eq!(
            missing_fields(&record),
            vec![
                "last_name",
                "date_of_birth",
                "phone_number",
                "email_address",
                "primary_language",
            ]
        );
    }

    #[test]
    fn test_missing_fields_is_deterministic() {
        let record = IntakeRecord {
            last_name: Some("Doe".into()),
            ..Default::default()
        };
        assert_eq!(missing_fields(&record), missing_fields(&record));
    }

    #[test]
    fn test_missing_fields_is_subsequence_of_required() {
        let record = IntakeRecord {
            date_of_birth: Some("1990-01-01".into()),
            primary_language: Some("Spanish".into()),
            ..Default::default()
        };
        let missing = missing_fields(&record);
        let mut required = REQUIRED_FIELDS.iter();
        for name in &missing {
            assert!(
                required.any(|r| r == name),
                "{} out of order or not required",
                name
            );
        }
    }

    #[test]
    fn test_optional_fields_do_not_affect_completeness() {
        let record = IntakeRecord {
            damage_description: Some("roof collapsed".into()),
            household_members: Some(4),
            is_home_habitable: Some(false),
            ..Default::default()
        };
        assert_eq!(missing_fields(&record).len(), 7);
    }

    // ── merge ────────────────────────────────────────────────────────────

    #[test]
    fn test_merge_is_right_biased() {
        let mut base = IntakeRecord {
            first_name: Some("Jane".into()),
            primary_language: Some("English".into()),
            ..Default::default()
        };
        base.merge(IntakeRecord {
            first_name: Some("Janet".into()),
            last_name: Some("Doe".into()),
            ..Default::default()
        });

        assert_eq!(base.first_name.as_deref(), Some("Janet"));
        assert_eq!(base.last_name.as_deref(), Some("Doe"));
        // Fields the newer partial omits are kept
        assert_eq!(base.primary_language.as_deref(), Some("English"));
    }

    #[test]
    fn test_merge_with_empty_partial_is_identity() {
        let mut record = complete_record();
        let before_missing = missing_fields(&record);
        record.merge(IntakeRecord::default());
        assert_eq!(record, complete_record());
        assert_eq!(missing_fields(&record), before_missing);
    }

    #[test]
    fn test_merge_replaces_needs_assessment_wholesale() {
        // A later capture that mentions only shelter wipes the earlier
        // food/water answer: the sub-object is replaced, not deep-merged.
        let mut record = IntakeRecord {
            needs_assessment: Some(NeedsAssessment {
                food_water_needed: Some(true),
                medication_needed: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        record.merge(IntakeRecord {
            needs_assessment: Some(NeedsAssessment {
                shelter_needed: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        });

        let needs = record.needs_assessment.unwrap();
        assert_eq!(needs.shelter_needed, Some(true));
        assert_eq!(needs.food_water_needed, None);
        assert_eq!(needs.medication_needed, None);
    }

    #[test]
    fn test_merge_keeps_needs_assessment_when_newer_omits_it() {
        let mut record = IntakeRecord {
            needs_assessment: Some(NeedsAssessment {
                clothing_needed: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        record.merge(IntakeRecord {
            first_name: Some("Jane".into()),
            ..Default::default()
        });
        assert!(record.needs_assessment.is_some());
    }

    // ── from_value coercion ──────────────────────────────────────────────

    #[test]
    fn test_from_value_plain_fields() {
        let record = IntakeRecord::from_value(&json!({
            "first_name": "Jane",
            "household_members": 4,
            "is_home_habitable": false,
        }))
        .unwrap();
        assert_eq!(record.first_name.as_deref(), Some("Jane"));
        assert_eq!(record.household_members, Some(4));
        assert_eq!(record.is_home_habitable, Some(false));
    }

    #[test]
    fn test_from_value_coerces_number_to_string_field() {
        let record = IntakeRecord::from_value(&json!({ "phone_number": 5550123456u64 })).unwrap();
        assert_eq!(record.phone_number.as_deref(), Some("5550123456"));
    }

    #[test]
    fn test_from_value_coerces_numeric_string_to_count() {
        let record = IntakeRecord::from_value(&json!({ "number_of_pets": "2" })).unwrap();
        assert_eq!(record.number_of_pets, Some(2));
    }

    #[test]
    fn test_from_value_coerces_yes_no_to_bool() {
        let record = IntakeRecord::from_value(&json!({
            "is_home_habitable": "No",
            "has_disabled_members": "yes",
        }))
        .unwrap();
        assert_eq!(record.is_home_habitable, Some(false));
        assert_eq!(record.has_disabled_members, Some(true));
    }

    #[test]
    fn test_from_value_drops_mismatched_types() {
        let record = IntakeRecord::from_value(&json!({
            "first_name": ["Jane"],
            "household_members": "several",
            "is_home_habitable": 7,
        }))
        .unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_from_value_lone_string_becomes_pet_list() {
        let record = IntakeRecord::from_value(&json!({ "type_of_pets": "dog" })).unwrap();
        assert_eq!(record.type_of_pets, Some(vec!["dog".to_string()]));
    }

    #[test]
    fn test_from_value_pet_list_skips_non_strings() {
        let record =
            IntakeRecord::from_value(&json!({ "type_of_pets": ["dog", 3, "cat"] })).unwrap();
        assert_eq!(
            record.type_of_pets,
            Some(vec!["dog".to_string(), "3".to_string(), "cat".to_string()])
        );
    }

    #[test]
    fn test_from_value_nested_needs_assessment() {
        let record = IntakeRecord::from_value(&json!({
            "needs_assessment": {
                "shelter_needed": true,
                "medication_needed": "no",
                "clothing_needed": "maybe",
            }
        }))
        .unwrap();
        let needs = record.needs_assessment.unwrap();
        assert_eq!(needs.shelter_needed, Some(true));
        assert_eq!(needs.medication_needed, Some(false));
        // Uncoercible answers are dropped, not guessed
        assert_eq!(needs.clothing_needed, None);
    }

    #[test]
    fn test_from_value_non_object_is_none() {
        assert!(IntakeRecord::from_value(&json!("just text")).is_none());
        assert!(IntakeRecord::from_value(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn test_from_value_whitespace_string_dropped() {
        let record = IntakeRecord::from_value(&json!({ "last_name": "   " })).unwrap();
        assert_eq!(record.last_name, None);
    }

    // ── labels ───────────────────────────────────────────────────────────

    #[test]
    fn test_label_table_covers_every_required_field() {
        for name in REQUIRED_FIELDS {
            assert_ne!(field_label(name), name, "missing label for {}", name);
        }
    }

    #[test]
    fn test_label_table_covers_dotted_needs_paths() {
        for flag in [
            "shelter_needed",
            "food_water_needed",
            "clothing_needed",
            "health_services_needed",
            "medication_needed",
            "baby_supplies_needed",
        ] {
            let path = format!("needs_assessment.{}", flag);
            assert_ne!(field_label(&path), path, "missing label for {}", path);
        }
    }

    #[test]
    fn test_label_table_matches_serialized_field_names() {
        // Every non-dotted label path must be a real top-level field name.
        let value = serde_json::to_value(IntakeRecord {
            first_name: Some("x".into()),
            last_name: Some("x".into()),
            date_of_birth: Some("x".into()),
            phone_number: Some("x".into()),
            email_address: Some("x".into()),
            primary_language: Some("x".into()),
            affected_address: Some("x".into()),
            type_of_residence: Some("x".into()),
            ownership_status: Some("x".into()),
            household_members: Some(1),
            number_of_pets: Some(1),
            type_of_pets: Some(vec!["x".into()]),
            type_of_disaster: Some("x".into()),
            incident_date: Some("x".into()),
            incident_time: Some("x".into()),
            damage_description: Some("x".into()),
            is_home_habitable: Some(true),
            insurance_status: Some("x".into()),
            needs_assessment: Some(NeedsAssessment::default()),
            has_disabled_members: Some(true),
        })
        .unwrap();
        let obj = value.as_object().unwrap();
        for (path, _) in FIELD_LABELS {
            let top = path.split('.').next().unwrap();
            assert!(obj.contains_key(top), "label path {} has no field", path);
        }
    }

    #[test]
    fn test_unknown_path_falls_back_to_path() {
        assert_eq!(field_label("no_such_field"), "no_such_field");
    }

    #[test]
    fn test_field_label_lookup() {
        assert_eq!(field_label("first_name"), "First Name");
        assert_eq!(
            field_label("needs_assessment.food_water_needed"),
            "Needs Food/Water"
        );
    }

    // ── serde shape ──────────────────────────────────────────────────────

    #[test]
    fn test_absent_fields_are_omitted_from_json() {
        let record = IntakeRecord {
            first_name: Some("Jane".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"first_name":"Jane"}"#);
    }

    #[test]
    fn test_deserializes_subset_of_keys() {
        let record: IntakeRecord =
            serde_json::from_str(r#"{"last_name":"Doe","number_of_pets":1}"#).unwrap();
        assert_eq!(record.last_name.as_deref(), Some("Doe"));
        assert_eq!(record.number_of_pets, Some(1));
        assert_eq!(record.first_name, None);
    }
}
