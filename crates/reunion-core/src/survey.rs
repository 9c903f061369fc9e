use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// `(id, label)` pairs offered by the survey form.
pub type Choice = (&'static str, &'static str);

pub const EVENT_TYPES: &[Choice] = &[
    ("networking", "Professional Networking"),
    ("startup", "Seeking Startup Partner(s)"),
    ("dating", "Seeking the Other Half"),
    ("career", "Career Development"),
    ("social", "Social Gathering"),
    ("entertainment", "Entertainment & Fun"),
];

pub const VENUES: &[Choice] = &[
    ("restaurants", "Restaurants"),
    ("pubs", "Pubs"),
    ("clubs", "Clubs"),
    ("event_spaces", "Event Spaces"),
    ("airbnb", "Airbnb"),
];

pub const ACADEMIC_STATUSES: &[Choice] = &[
    ("masters", "Master's Candidate"),
    ("phd", "PhD Candidate"),
    ("working", "Working Professional"),
    ("startup", "Founding a Start Up"),
    ("enjoying", "Enjoying Life"),
];

pub const ALCOHOL_PREFERENCES: &[Choice] = &[
    ("none", "No Alcohol"),
    ("beer_wine", "Beer & Wine"),
    ("full_bar", "Full Bar"),
    ("byob", "BYOB"),
];

/// Look up the display label for a choice id, falling back to the id itself.
pub fn label_for<'a>(choices: &[Choice], id: &'a str) -> &'a str {
    choices
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, label)| *label)
        .unwrap_or(id)
}

/// Times a respondent is available on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub times: Vec<String>,
}

/// Survey body as submitted by the two-step form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSurvey {
    pub email: String,
    pub budget: u32,
    pub location: String,
    #[serde(default)]
    pub transportation: String,
    #[serde(default)]
    pub event_types: Vec<String>,
    #[serde(default)]
    pub venues: Vec<String>,
    #[serde(default)]
    pub academic_status: String,
    #[serde(default)]
    pub availability: Vec<TimeSlot>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default = "default_alcohol")]
    pub alcohol_preference: String,
    #[serde(default)]
    pub couch_surfing: bool,
}

fn default_alcohol() -> String {
    "none".to_string()
}

/// A stored survey response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: i64,
    #[serde(flatten)]
    pub response: NewSurvey,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_payload_with_defaults() {
        let body = serde_json::json!({
            "email": "a@example.com",
            "budget": 80,
            "location": "Shanghai",
            "eventTypes": ["networking", "social"],
            "availability": [{ "date": "2025-01-04", "times": ["7:00 PM"] }],
        });
        let survey: NewSurvey = serde_json::from_value(body).unwrap();
        assert_eq!(survey.budget, 80);
        assert_eq!(survey.event_types.len(), 2);
        assert_eq!(survey.alcohol_preference, "none");
        assert!(!survey.couch_surfing);
        assert_eq!(
            survey.availability[0].date,
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
        );
    }

    #[test]
    fn stored_survey_flattens_response() {
        let body = serde_json::json!({
            "id": 3,
            "email": "b@example.com",
            "budget": 40,
            "location": "Beijing",
            "createdAt": "2025-01-01T00:00:00Z",
        });
        let survey: Survey = serde_json::from_value(body).unwrap();
        assert_eq!(survey.id, 3);
        assert_eq!(survey.response.location, "Beijing");

        let json = serde_json::to_value(&survey).unwrap();
        assert_eq!(json["email"], "b@example.com");
        assert_eq!(json["alcoholPreference"], "none");
    }

    #[test]
    fn labels_fall_back_to_id() {
        assert_eq!(label_for(VENUES, "pubs"), "Pubs");
        assert_eq!(label_for(VENUES, "rooftop"), "rooftop");
    }
}
