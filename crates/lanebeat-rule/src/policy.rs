use serde::{Deserialize, Serialize};

/// What happens to a hold note released before its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EarlyRelease {
    /// Ticks already credited stay; only the untaken remainder is lost.
    #[default]
    KeepAccrued,
    /// The whole note counts as missed: head score and ticks are taken back.
    ForfeitAll,
}

/// Rule switches that differ between game versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayPolicy {
    /// A press with no note in reach resets the combo.
    pub phantom_press_breaks_combo: bool,
    pub early_release: EarlyRelease,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = PlayPolicy::default();
        assert!(!policy.phantom_press_breaks_combo);
        assert_eq!(policy.early_release, EarlyRelease::KeepAccrued);
    }

    #[test]
    fn deserialize_partial_policy() {
        let policy: PlayPolicy =
            serde_json::from_str(r#"{"early_release": "ForfeitAll"}"#).unwrap();
        assert_eq!(policy.early_release, EarlyRelease::ForfeitAll);
        assert!(!policy.phantom_press_breaks_combo);
    }
}
