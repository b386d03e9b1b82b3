//! # Conditions and Severity Reduction
//!
//! Conditions are typed, categorized status markers attached to Plans,
//! Migrations and per-VM statuses. The set carries no uniqueness guarantee
//! on category, so consumers reduce it to a single "most serious"
//! [`StatusCategory`] through one fixed priority table.
//!
//! ## Priority Table
//!
//! | # | Rule | Result |
//! |---|------|--------|
//! | 1 | category `Critical` | `Critical` |
//! | 2 | category `Error` | `Error` |
//! | 3 | category `Warn` | `Warn` |
//! | 4 | reason `Started` or `Running` | `Pending` |
//! | 5 | type `Ready` or reason `Completed` | `Ready` |
//! | 6 | category `Required` | `Required` |
//! | 7 | category `Advisory` | `Advisory` |
//! | – | nothing matched | `Unknown` |
//!
//! Rules are tried top to bottom and a rule matches when *any* condition
//! satisfies it, so the result does not depend on input order.

use serde::{Deserialize, Serialize};

/// Condition category as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Critical,
    Error,
    Warn,
    Required,
    Advisory,
    /// Any category string this stack does not recognise.
    #[serde(other)]
    Other,
}

/// A typed, categorized status marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default = "default_category")]
    pub category: Category,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub durable: bool,
}

fn default_category() -> Category {
    Category::Other
}

impl Condition {
    /// Build a `status: "True"` condition of the given type and category.
    pub fn new(type_: impl Into<String>, category: Category) -> Self {
        Self {
            type_: type_.into(),
            category,
            status: "True".to_string(),
            reason: None,
            message: None,
            last_transition_time: None,
            durable: false,
        }
    }

    /// Attach a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn reason_is(&self, reason: &str) -> bool {
        self.reason.as_deref() == Some(reason)
    }
}

/// Reduced status category of a condition set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    Critical,
    Error,
    Warn,
    Pending,
    Ready,
    Required,
    Advisory,
    Unknown,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Pending => "Pending",
            Self::Ready => "Ready",
            Self::Required => "Required",
            Self::Advisory => "Advisory",
            Self::Unknown => "Unknown",
        }
    }

    /// Severity bucket used by status icons.
    pub fn status_type(&self) -> StatusType {
        match self {
            Self::Ready | Self::Required => StatusType::Ok,
            Self::Advisory => StatusType::Info,
            Self::Pending => StatusType::Loading,
            Self::Critical | Self::Error => StatusType::Error,
            Self::Warn | Self::Unknown => StatusType::Warning,
        }
    }
}

impl std::fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity bucket for status icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusType {
    Ok,
    Info,
    Loading,
    Warning,
    Error,
}

type Rule = fn(&Condition) -> bool;

/// The priority table, most serious first.
const SEVERITY_RULES: [(StatusCategory, Rule); 7] = [
    (StatusCategory::Critical, |c| c.category == Category::Critical),
    (StatusCategory::Error, |c| c.category == Category::Error),
    (StatusCategory::Warn, |c| c.category == Category::Warn),
    (StatusCategory::Pending, |c| {
        c.reason_is("Started") || c.reason_is("Running")
    }),
    (StatusCategory::Ready, |c| {
        c.type_ == "Ready" || c.reason_is("Completed")
    }),
    (StatusCategory::Required, |c| c.category == Category::Required),
    (StatusCategory::Advisory, |c| c.category == Category::Advisory),
];

/// Reduce a condition set to its most serious category.
pub fn most_severe_category(conditions: &[Condition]) -> StatusCategory {
    SEVERITY_RULES
        .iter()
        .find(|(_, rule)| conditions.iter().any(rule))
        .map(|(category, _)| *category)
        .unwrap_or(StatusCategory::Unknown)
}

/// Whether a condition of the given type is present.
pub fn has_condition(conditions: &[Condition], type_: &str) -> bool {
    conditions.iter().any(|c| c.type_ == type_)
}

/// First condition carrying the given category.
pub fn find_condition_by_category(
    conditions: &[Condition],
    category: Category,
) -> Option<&Condition> {
    conditions.iter().find(|c| c.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_unknown() {
        assert_eq!(most_severe_category(&[]), StatusCategory::Unknown);
    }

    #[test]
    fn critical_beats_everything() {
        let set = vec![
            Condition::new("Ready", Category::Required),
            Condition::new("VMNotFound", Category::Critical),
            Condition::new("Executing", Category::Advisory).with_reason("Started"),
        ];
        assert_eq!(most_severe_category(&set), StatusCategory::Critical);
    }

    #[test]
    fn running_reason_is_pending_even_with_ready() {
        let set = vec![
            Condition::new("Ready", Category::Required),
            Condition::new("Executing", Category::Advisory).with_reason("Running"),
        ];
        assert_eq!(most_severe_category(&set), StatusCategory::Pending);
    }

    #[test]
    fn completed_reason_is_ready() {
        let set = vec![Condition::new("Succeeded", Category::Advisory).with_reason("Completed")];
        assert_eq!(most_severe_category(&set), StatusCategory::Ready);
    }

    #[test]
    fn required_without_ready_type() {
        let set = vec![
            Condition::new("NetworkMapReady", Category::Required),
            Condition::new("Hint", Category::Advisory),
        ];
        assert_eq!(most_severe_category(&set), StatusCategory::Required);
    }

    #[test]
    fn advisory_only() {
        let set = vec![Condition::new("Hint", Category::Advisory)];
        assert_eq!(most_severe_category(&set), StatusCategory::Advisory);
    }

    #[test]
    fn unrecognised_category_alone_is_unknown() {
        let set = vec![Condition::new("Whatever", Category::Other)];
        assert_eq!(most_severe_category(&set), StatusCategory::Unknown);
    }

    #[test]
    fn status_type_mapping() {
        assert_eq!(StatusCategory::Ready.status_type(), StatusType::Ok);
        assert_eq!(StatusCategory::Required.status_type(), StatusType::Ok);
        assert_eq!(StatusCategory::Advisory.status_type(), StatusType::Info);
        assert_eq!(StatusCategory::Pending.status_type(), StatusType::Loading);
        assert_eq!(StatusCategory::Critical.status_type(), StatusType::Error);
        assert_eq!(StatusCategory::Error.status_type(), StatusType::Error);
        assert_eq!(StatusCategory::Warn.status_type(), StatusType::Warning);
        assert_eq!(StatusCategory::Unknown.status_type(), StatusType::Warning);
    }

    #[test]
    fn decode_tolerates_unknown_category_and_missing_fields() {
        let c: Condition = serde_json::from_value(serde_json::json!({
            "type": "Ready",
            "category": "Mystery"
        }))
        .unwrap();
        assert_eq!(c.category, Category::Other);
        assert_eq!(c.status, "");
        assert!(c.reason.is_none());
    }

    #[test]
    fn lookup_helpers() {
        let set = vec![
            Condition::new("Ready", Category::Required),
            Condition::new("Archived", Category::Advisory),
        ];
        assert!(has_condition(&set, "Archived"));
        assert!(!has_condition(&set, "Canceled"));
        assert_eq!(
            find_condition_by_category(&set, Category::Advisory).map(|c| c.type_.as_str()),
            Some("Archived")
        );
        assert!(find_condition_by_category(&set, Category::Critical).is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn condition() -> impl Strategy<Value = Condition> {
        let category = prop_oneof![
            Just(Category::Critical),
            Just(Category::Error),
            Just(Category::Warn),
            Just(Category::Required),
            Just(Category::Advisory),
            Just(Category::Other),
        ];
        let type_ = prop_oneof![
            Just("Ready".to_string()),
            Just("Executing".to_string()),
            Just("Canceled".to_string()),
            "[A-Z][a-z]{2,8}",
        ];
        let reason = prop_oneof![
            Just(None),
            Just(Some("Started".to_string())),
            Just(Some("Running".to_string())),
            Just(Some("Completed".to_string())),
            Just(Some("NotSet".to_string())),
        ];
        (type_, category, reason).prop_map(|(t, c, r)| Condition {
            reason: r,
            ..Condition::new(t, c)
        })
    }

    proptest! {
        /// The reduction does not depend on input order.
        #[test]
        fn reduction_is_order_independent(
            (set, shuffled) in prop::collection::vec(condition(), 0..8)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            prop_assert_eq!(most_severe_category(&set), most_severe_category(&shuffled));
        }

        /// Adding a Critical condition always yields Critical.
        #[test]
        fn critical_dominates(set in prop::collection::vec(condition(), 0..8)) {
            let mut set = set;
            set.push(Condition::new("Boom", Category::Critical));
            prop_assert_eq!(most_severe_category(&set), StatusCategory::Critical);
        }
    }
}
