//! Launch parameters taken from the query string the assessment was opened with

use shared_types::ScalingConfiguration;

pub const DEFAULT_USER_ID_PARAM: &str = "session";
pub const DEFAULT_USER_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchParameters {
    pub user_id: String,
    pub scaling: ScalingConfiguration,
}

impl Default for LaunchParameters {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            scaling: ScalingConfiguration::default(),
        }
    }
}

impl LaunchParameters {
    /// Parse `query` (with or without the leading `?`). The user id is read
    /// from `user_id_param`; missing values fall back to the defaults. When a
    /// key repeats, its first value counts.
    pub fn from_query(query: &str, user_id_param: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        let defaults = Self::default();
        Self {
            user_id: first(user_id_param).unwrap_or(defaults.user_id),
            scaling: ScalingConfiguration {
                scaling_mode: first("scalingMode").unwrap_or(defaults.scaling.scaling_mode),
                alignment_horizontal: first("alignmentHorizontal")
                    .unwrap_or(defaults.scaling.alignment_horizontal),
                alignment_vertical: first("alignmentVertical")
                    .unwrap_or(defaults.scaling.alignment_vertical),
            },
        }
    }
}
