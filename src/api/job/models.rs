use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job record as returned by the data endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Job {
    #[serde(rename = "JobId")]
    pub job_id: i64,
    #[serde(rename = "StartDate")]
    pub start_date: String,
    #[serde(rename = "StartHour")]
    pub start_hour: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "IsActive", default, deserialize_with = "deserialize_flag")]
    pub is_active: bool,
}

/// Column names known to the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Column {
    JobId,
    StartDate,
    StartHour,
    Name,
    Description,
    IsActive,
}

impl Column {
    /// Columns a user may pick for a single-field update, in display order
    pub const EDITABLE: [Column; 5] = [
        Column::Name,
        Column::StartDate,
        Column::StartHour,
        Column::Description,
        Column::IsActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::JobId => "JobId",
            Column::StartDate => "StartDate",
            Column::StartHour => "StartHour",
            Column::Name => "Name",
            Column::Description => "Description",
            Column::IsActive => "IsActive",
        }
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self, Column::JobId)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a column name the service does not know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColumn(pub String);

impl fmt::Display for UnknownColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown column: {}", self.0)
    }
}

impl std::error::Error for UnknownColumn {}

impl FromStr for Column {
    type Err = UnknownColumn;

    // Exact, case-sensitive match on the wire names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JobId" => Ok(Column::JobId),
            "StartDate" => Ok(Column::StartDate),
            "StartHour" => Ok(Column::StartHour),
            "Name" => Ok(Column::Name),
            "Description" => Ok(Column::Description),
            "IsActive" => Ok(Column::IsActive),
            other => Err(UnknownColumn(other.to_string())),
        }
    }
}

/// Reads the IsActive flag from whatever the service sends.
///
/// Numbers are true when non-zero. Strings are false when empty, `"0"` or
/// `"false"` (any case) and true otherwise. `null` is false, arrays and
/// objects are true. A missing field falls back to false through `default`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    })
}
