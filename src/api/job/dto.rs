use serde::{Deserialize, Serialize};

/// Body sent to the update endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    #[serde(rename = "JobId")]
    pub job_id: i64,
    pub column: String,
    pub value: String,
}

/// Body sent to the insert endpoint; every field travels as a string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertRequest {
    #[serde(rename = "StartDate")]
    pub start_date: String,
    #[serde(rename = "StartHour")]
    pub start_hour: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "IsActive")]
    pub is_active: String,
}

/// Structured error body the remote service may answer with
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_request_uses_wire_field_names() {
        let body = serde_json::to_value(UpdateRequest {
            job_id: 1,
            column: "Name".to_string(),
            value: "Bob".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"JobId": 1, "column": "Name", "value": "Bob"}));
    }

    #[test]
    fn insert_request_sends_all_strings() {
        let body = serde_json::to_value(InsertRequest {
            start_date: "2024-02-02".to_string(),
            start_hour: "10:00:00".to_string(),
            name: "New".to_string(),
            description: "D".to_string(),
            is_active: "1".to_string(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "StartDate": "2024-02-02",
                "StartHour": "10:00:00",
                "Name": "New",
                "Description": "D",
                "IsActive": "1"
            })
        );
    }
}
