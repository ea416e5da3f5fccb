use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One roster line after trimming; blank cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RosterRecord {
    pub(crate) line: u64,
    pub(crate) nip: Option<String>,
    pub(crate) name: String,
    pub(crate) role: Option<String>,
    pub(crate) school: String,
    pub(crate) active: Option<String>,
    pub(crate) managed_schools: Vec<String>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<RosterRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut raw = csv::StringRecord::new();
    let mut records = Vec::new();

    // Blank lines are skipped and quoted cells may span lines, so the reader's position is
    // the only reliable spreadsheet line.
    while csv_reader.read_record(&mut raw)? {
        let line = raw
            .position()
            .map(csv::Position::line)
            .unwrap_or_default();
        let row: RosterRow = raw.deserialize(Some(&headers))?;
        records.push(RosterRecord {
            line,
            nip: row.nip,
            name: row.name.unwrap_or_default(),
            role: row.role,
            school: row.school.unwrap_or_default(),
            active: row.active,
            managed_schools: split_schools(row.managed_schools.as_deref()),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "NIP", default, deserialize_with = "empty_string_as_none")]
    nip: Option<String>,
    #[serde(rename = "Nama", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Peran", default, deserialize_with = "empty_string_as_none")]
    role: Option<String>,
    #[serde(rename = "Sekolah", default, deserialize_with = "empty_string_as_none")]
    school: Option<String>,
    #[serde(rename = "Aktif", default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
    #[serde(
        rename = "Sekolah Binaan",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    managed_schools: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn split_schools(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(';')
            .map(str::trim)
            .filter(|school| !school.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Roster spreadsheets use Indonesian and English words interchangeably.
pub(crate) fn parse_active(raw: Option<&str>) -> Option<bool> {
    let Some(value) = raw else {
        return Some(true);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "ya" | "y" | "yes" | "true" | "1" | "aktif" => Some(true),
        "tidak" | "t" | "no" | "false" | "0" | "nonaktif" | "non-aktif" | "pensiun" => {
            Some(false)
        }
        _ => None,
    }
}
