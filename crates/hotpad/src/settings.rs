use serde::Deserialize;

use crate::error::Result;

/// Default length of a single rumble pulse. Motors are only committed when
/// their value changes, so the pulse has to outlast the gaps between commits.
pub const DEFAULT_RUMBLE_DURATION_MS: u32 = 10_000;

/// Driver options applied when the hotplug thread starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable rumble on PS4 controllers driven through HIDAPI.
    pub ps4_rumble: bool,
    /// Enable rumble on PS5 controllers driven through HIDAPI.
    pub ps5_rumble: bool,
    /// Use the HIDAPI Joy-Con driver.
    pub joy_cons: bool,
    /// Map face buttons by label instead of position.
    /// Only applied on SDL 2.0.14 and newer.
    pub use_button_labels: bool,
    /// Duration passed with every motor commit.
    pub rumble_duration_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ps4_rumble: true,
            ps5_rumble: true,
            joy_cons: true,
            use_button_labels: false,
            rumble_duration_ms: DEFAULT_RUMBLE_DURATION_MS,
        }
    }
}

impl Settings {
    /// Parse settings from a YAML document. Missing keys keep their defaults.
    pub fn from_yaml(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = Settings::from_yaml("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let settings = Settings::from_yaml(
            "ps5_rumble: false\nrumble_duration_ms: 250\n",
        )
        .unwrap();
        assert!(settings.ps4_rumble);
        assert!(!settings.ps5_rumble);
        assert!(settings.joy_cons);
        assert_eq!(settings.rumble_duration_ms, 250);
    }

    #[test]
    fn malformed_document_is_reported() {
        let err = Settings::from_yaml("rumble_duration_ms: loud").unwrap_err();
        assert!(matches!(err, crate::Error::Settings(_)));
    }
}
