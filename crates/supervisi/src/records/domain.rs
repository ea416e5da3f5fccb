use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::normalizer::normalize_school_name;

/// Employee identifier used as the primary key for every user-like record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nip(pub String);

impl Nip {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "guru")]
    Teacher,
    #[serde(alias = "kepala_sekolah", alias = "kepsek")]
    Principal,
    #[serde(alias = "pengawas")]
    Supervisor,
    #[serde(alias = "dinas")]
    EducationOffice,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Teacher => "Guru",
            Self::Principal => "Kepala Sekolah",
            Self::Supervisor => "Pengawas",
            Self::EducationOffice => "Dinas Pendidikan",
            Self::Admin => "Admin",
        }
    }

    /// Lenient parse of the role words used by backend documents and roster exports.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        match cleaned.as_str() {
            "teacher" | "guru" => Some(Self::Teacher),
            "principal" | "kepala sekolah" | "kepsek" => Some(Self::Principal),
            "supervisor" | "pengawas" => Some(Self::Supervisor),
            "education office" | "dinas" | "dinas pendidikan" => Some(Self::EducationOffice),
            "admin" | "administrator" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Canonical user record after the read boundary has merged schema generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub nip: Nip,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub school: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub workload_evidence: BTreeMap<String, String>,
    #[serde(default)]
    pub workload_scores: BTreeMap<String, u32>,
    #[serde(default)]
    pub managed_schools: Vec<String>,
    #[serde(default)]
    pub revision: u64,
}

impl User {
    pub fn new(nip: Nip, name: impl Into<String>, role: Role, school: impl Into<String>) -> Self {
        Self {
            nip,
            name: name.into(),
            role,
            active: true,
            school: school.into(),
            is_premium: false,
            workload_evidence: BTreeMap::new(),
            workload_scores: BTreeMap::new(),
            managed_schools: Vec::new(),
            revision: 0,
        }
    }

    pub fn normalized_school(&self) -> String {
        normalize_school_name(&self.school)
    }

    pub fn belongs_to(&self, normalized_school: &str) -> bool {
        !normalized_school.is_empty() && self.normalized_school() == normalized_school
    }

    pub fn has_evidence(&self, document_id: &str) -> bool {
        self.workload_evidence
            .get(document_id)
            .map(|url| !url.is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisionType {
    Administration,
    Observation,
    Planning,
    PlanningDeep,
}

impl SupervisionType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Administration,
            Self::Observation,
            Self::Planning,
            Self::PlanningDeep,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Administration => "Administrasi Pembelajaran",
            Self::Observation => "Observasi Pembelajaran",
            Self::Planning => "Perencanaan Pembelajaran",
            Self::PlanningDeep => "Perencanaan Pembelajaran Mendalam",
        }
    }

    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Administration => "administration",
            Self::Observation => "observation",
            Self::Planning => "planning",
            Self::PlanningDeep => "planning_deep",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "administration" | "administrasi" => Some(Self::Administration),
            "observation" | "observasi" => Some(Self::Observation),
            "planning" | "perencanaan" => Some(Self::Planning),
            "planning_deep" | "perencanaan_mendalam" => Some(Self::PlanningDeep),
            _ => None,
        }
    }
}

/// One supervisory observation of one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisionReport {
    pub id: String,
    #[serde(alias = "teacherNip")]
    pub teacher_nip: Nip,
    #[serde(default, alias = "teacherName")]
    pub teacher_name: String,
    #[serde(default)]
    pub school: String,
    #[serde(default, alias = "assessorNip")]
    pub assessor_nip: Option<Nip>,
    pub date: NaiveDate,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub year: String,
    #[serde(rename = "type")]
    pub supervision_type: SupervisionType,
    #[serde(default)]
    pub scores: BTreeMap<String, u32>,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default, alias = "followUp")]
    pub follow_up: String,
    #[serde(default, alias = "finalScore")]
    pub final_score: f64,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default, alias = "learningGoals")]
    pub learning_goals: Option<String>,
    #[serde(default)]
    pub revision: u64,
}

impl SupervisionReport {
    /// Storage key: one report per teacher, date and instrument.
    pub fn storage_key(teacher_nip: &Nip, date: NaiveDate, kind: SupervisionType) -> String {
        format!(
            "{}_{}_{}",
            teacher_nip,
            date.format("%Y-%m-%d"),
            kind.as_key()
        )
    }

    pub fn key(&self) -> String {
        Self::storage_key(&self.teacher_nip, self.date, self.supervision_type)
    }

    pub fn note(&self, category: &str) -> &str {
        self.notes.get(category).map(String::as_str).unwrap_or("")
    }

    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    pub fn topic(&self) -> &str {
        self.topic.as_deref().unwrap_or("")
    }

    pub fn grade(&self) -> &str {
        self.grade.as_deref().unwrap_or("")
    }

    pub fn learning_goals(&self) -> &str {
        self.learning_goals.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Planned,
    Completed,
}

impl VisitStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Planned => "Direncanakan",
            Self::Completed => "Selesai",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitCategory {
    Manajerial,
    Evaluasi,
    Akademik,
    Monitoring,
}

impl VisitCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Manajerial,
            Self::Evaluasi,
            Self::Akademik,
            Self::Monitoring,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Manajerial => "Supervisi Manajerial",
            Self::Evaluasi => "Evaluasi",
            Self::Akademik => "Supervisi Akademik",
            Self::Monitoring => "Monitoring",
        }
    }

    /// Free-text purposes are bucketed by the first keyword they contain.
    pub fn from_purpose(purpose: &str) -> Self {
        let lowered = purpose.to_lowercase();
        if lowered.contains("manajerial") {
            Self::Manajerial
        } else if lowered.contains("evaluasi") {
            Self::Evaluasi
        } else if lowered.contains("akademik") {
            Self::Akademik
        } else {
            Self::Monitoring
        }
    }
}

/// Supervisor visit to a school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolVisit {
    pub id: String,
    #[serde(alias = "schoolName")]
    pub school_name: String,
    #[serde(alias = "visitorNip")]
    pub visitor_nip: Nip,
    #[serde(default, alias = "visitorName")]
    pub visitor_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub recommendations: String,
    pub status: VisitStatus,
    #[serde(default)]
    pub revision: u64,
}

impl SchoolVisit {
    pub fn category(&self) -> VisitCategory {
        VisitCategory::from_purpose(&self.purpose)
    }
}

/// School statistics row; `guru_count` is the headcount reported by the school itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub name: String,
    #[serde(default, alias = "guruCount")]
    pub guru_count: Option<u32>,
}

impl School {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guru_count: None,
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_school_name(&self.name)
    }
}
