use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::domain::{
    Nip, Role, SchoolVisit, SupervisionReport, SupervisionType, User, VisitStatus,
};
use super::migration::{merge_evidence, merge_scores};
use crate::scoring::RubricScorer;

/// Nesting depth tolerated for maps that were JSON-encoded into a string more than once.
const MAX_ENCODING_DEPTH: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("user document is not a JSON object")]
    NotAnObject,
    #[error("user document has no nip")]
    MissingNip,
    #[error("user {nip} has unrecognized role {role:?}")]
    UnknownRole { nip: String, role: String },
    #[error("{record} document has no usable {field}")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    #[error("supervision report has unrecognized type {0:?}")]
    UnknownSupervisionType(String),
}

/// Reads a backend user document into the canonical [`User`] shape.
///
/// Both storage generations of the workload maps are merged here, so nothing past this
/// boundary needs to know about `workloadEvidence` versus `workloadEvidence_v2`. Maps that
/// cannot be parsed degrade to empty maps.
pub fn decode_user(document: &Value) -> Result<User, DecodeError> {
    let object = document.as_object().ok_or(DecodeError::NotAnObject)?;

    let nip = field(object, &["nip", "NIP"])
        .and_then(scalar_text)
        .filter(|value| !value.is_empty())
        .ok_or(DecodeError::MissingNip)?;

    let raw_role = field(object, &["role", "peran"])
        .and_then(scalar_text)
        .unwrap_or_default();
    let role = Role::parse(&raw_role).ok_or_else(|| DecodeError::UnknownRole {
        nip: nip.clone(),
        role: raw_role.clone(),
    })?;

    let name = field(object, &["name", "nama"])
        .and_then(scalar_text)
        .unwrap_or_default();
    let school = field(object, &["school", "sekolah"])
        .and_then(scalar_text)
        .unwrap_or_default();
    let active = field(object, &["active", "isActive", "isactive"])
        .and_then(lenient_bool)
        .unwrap_or(true);
    let is_premium = field(object, &["isPremium", "ispremium", "is_premium"])
        .and_then(lenient_bool)
        .unwrap_or(false);

    let workload_evidence = merge_evidence(
        string_map(field(object, &["workloadEvidence", "workloadevidence"])),
        string_map(field(
            object,
            &["workloadEvidence_v2", "workloadevidence_v2"],
        )),
    );
    let workload_scores = merge_scores(
        score_map(field(object, &["workloadScores", "workloadscores"])),
        score_map(field(object, &["workloadScores_v2", "workloadscores_v2"])),
    );
    let managed_schools = string_list(field(object, &["managedSchools", "managedschools"]));

    Ok(User {
        nip: Nip::new(nip),
        name,
        role,
        active,
        school,
        is_premium,
        workload_evidence,
        workload_scores,
        managed_schools,
        revision: 0,
    })
}

/// Reads a stored supervision report. Score and note maps degrade to empty maps like the
/// user workload maps do, and `final_score` is recomputed from the scores rather than
/// trusted.
pub fn decode_report(document: &Value) -> Result<SupervisionReport, DecodeError> {
    const RECORD: &str = "supervision";
    let object = document.as_object().ok_or(DecodeError::NotAnObject)?;

    let teacher_nip = field(object, &["teacherNip", "teacher_nip", "teachernip"])
        .and_then(scalar_text)
        .filter(|value| !value.is_empty())
        .map(Nip::new)
        .ok_or(DecodeError::MissingField {
            record: RECORD,
            field: "teacherNip",
        })?;
    let date = field(object, &["date"])
        .and_then(date_value)
        .ok_or(DecodeError::MissingField {
            record: RECORD,
            field: "date",
        })?;
    let raw_type = field(object, &["type", "supervisionType", "supervision_type"])
        .and_then(scalar_text)
        .unwrap_or_default();
    let supervision_type = SupervisionType::parse(&raw_type)
        .ok_or(DecodeError::UnknownSupervisionType(raw_type))?;

    let scores = score_map(field(object, &["scores"]));
    let final_score = RubricScorer::for_type(supervision_type)
        .score(&scores)
        .percentage;
    let id = field(object, &["id"])
        .and_then(scalar_text)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| SupervisionReport::storage_key(&teacher_nip, date, supervision_type));

    Ok(SupervisionReport {
        id,
        teacher_nip,
        teacher_name: text(object, &["teacherName", "teacher_name"]),
        school: text(object, &["school", "sekolah"]),
        assessor_nip: field(object, &["assessorNip", "assessor_nip"])
            .and_then(scalar_text)
            .filter(|value| !value.is_empty())
            .map(Nip::new),
        date,
        semester: text(object, &["semester"]),
        year: text(object, &["year", "tahun"]),
        supervision_type,
        scores,
        notes: string_map(field(object, &["notes"])),
        conclusion: text(object, &["conclusion"]),
        follow_up: text(object, &["followUp", "follow_up"]),
        final_score,
        subject: optional_text(object, &["subject"]),
        topic: optional_text(object, &["topic"]),
        grade: optional_text(object, &["grade"]),
        learning_goals: optional_text(object, &["learningGoals", "learning_goals"]),
        revision: 0,
    })
}

/// Reads a stored school visit. A missing or unrecognized status reads as planned so the
/// visit never counts as completed by accident.
pub fn decode_visit(document: &Value) -> Result<SchoolVisit, DecodeError> {
    const RECORD: &str = "visit";
    let object = document.as_object().ok_or(DecodeError::NotAnObject)?;

    let id = field(object, &["id"])
        .and_then(scalar_text)
        .filter(|value| !value.is_empty())
        .ok_or(DecodeError::MissingField {
            record: RECORD,
            field: "id",
        })?;
    let school_name = field(object, &["schoolName", "school_name", "schoolname"])
        .and_then(scalar_text)
        .filter(|value| !value.is_empty())
        .ok_or(DecodeError::MissingField {
            record: RECORD,
            field: "schoolName",
        })?;
    let date = field(object, &["date"])
        .and_then(date_value)
        .ok_or(DecodeError::MissingField {
            record: RECORD,
            field: "date",
        })?;
    let status = field(object, &["status"])
        .and_then(scalar_text)
        .map(|raw| visit_status(&raw))
        .unwrap_or(VisitStatus::Planned);

    Ok(SchoolVisit {
        id,
        school_name,
        visitor_nip: Nip::new(text(object, &["visitorNip", "visitor_nip"])),
        visitor_name: text(object, &["visitorName", "visitor_name"]),
        date,
        purpose: text(object, &["purpose", "tujuan"]),
        findings: text(object, &["findings", "temuan"]),
        recommendations: text(object, &["recommendations", "rekomendasi"]),
        status,
        revision: 0,
    })
}

fn visit_status(raw: &str) -> VisitStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "completed" | "complete" | "done" | "selesai" => VisitStatus::Completed,
        _ => VisitStatus::Planned,
    }
}

fn text(object: &Map<String, Value>, candidates: &[&str]) -> String {
    field(object, candidates)
        .and_then(scalar_text)
        .unwrap_or_default()
}

fn optional_text(object: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    field(object, candidates)
        .and_then(scalar_text)
        .filter(|value| !value.is_empty())
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
fn date_value(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    })
}

/// First candidate key present with a non-null value; candidates are listed canonical first.
fn field<'a>(object: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "ya" => Some(true),
            "false" | "0" | "no" | "tidak" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Peels string layers off a value that was JSON-encoded one or more times.
fn unwrap_encoded(value: &Value) -> Option<Value> {
    let mut current = value.clone();
    for _ in 0..MAX_ENCODING_DEPTH {
        match current {
            Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(parsed) => current = parsed,
                Err(_) => return None,
            },
            other => return Some(other),
        }
    }
    match current {
        Value::String(_) => None,
        other => Some(other),
    }
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(entries)) = value.and_then(unwrap_encoded) else {
        return BTreeMap::new();
    };

    entries
        .into_iter()
        .filter_map(|(key, value)| map_text(value).map(|text| (key, text)))
        .collect()
}

/// Map values are kept verbatim; only identifiers and flags are trimmed.
fn map_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        other => scalar_text(&other),
    }
}

fn score_map(value: Option<&Value>) -> BTreeMap<String, u32> {
    let Some(Value::Object(entries)) = value.and_then(unwrap_encoded) else {
        return BTreeMap::new();
    };

    entries
        .into_iter()
        .filter_map(|(key, value)| score_value(&value).map(|score| (key, score)))
        .collect()
}

fn score_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite() && *float >= 0.0 && float.fract() == 0.0)
                    .map(|float| float as u64)
            })
            .and_then(|score| u32::try_from(score).ok()),
        Value::String(text) => text.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value.and_then(unwrap_encoded) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(scalar_text)
        .filter(|item| !item.is_empty())
        .collect()
}
