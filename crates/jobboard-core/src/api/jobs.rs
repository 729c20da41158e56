use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Search filters of `GET /vacancies`.
#[derive(Debug, Default, Clone)]
pub struct VacancyQuery {
    pub text: Option<String>,
    pub area: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl VacancyQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        [
            self.text.clone().map(|value| ("text".to_string(), value)),
            self.area.clone().map(|value| ("area".to_string(), value)),
            self.page.map(|value| ("page".to_string(), value.to_string())),
            self.per_page
                .map(|value| ("perPage".to_string(), value.to_string())),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Where the user is with a saved vacancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Saved,
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 5] = [
        ProgressStatus::Saved,
        ProgressStatus::Applied,
        ProgressStatus::Interview,
        ProgressStatus::Offer,
        ProgressStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::Saved => "saved",
            ProgressStatus::Applied => "applied",
            ProgressStatus::Interview => "interview",
            ProgressStatus::Offer => "offer",
            ProgressStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|status| status.as_str()).collect();
                format!("unknown status '{value}' (expected one of: {})", known.join(", "))
            })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCreate {
    pub vacancy_id: String,
    pub status: ProgressStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_skip_unset_filters() {
        let query = VacancyQuery {
            text: Some("rust developer".to_string()),
            per_page: Some(20),
            ..VacancyQuery::default()
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("text".to_string(), "rust developer".to_string()),
                ("perPage".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Applied".parse::<ProgressStatus>(), Ok(ProgressStatus::Applied));
        let err = "ghosted".parse::<ProgressStatus>().expect_err("unknown");
        assert!(err.contains("saved, applied"));
    }

    #[test]
    fn progress_create_wire_shape() {
        let body = ProgressCreate {
            vacancy_id: "42".to_string(),
            status: ProgressStatus::Interview,
        };
        assert_eq!(
            serde_json::to_value(body).expect("serialize"),
            serde_json::json!({ "vacancyId": "42", "status": "interview" })
        );
    }
}
