use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Subsystem {
    Physical => "physical",
    Cardiac => "cardiac",
    Sleep => "sleep",
    Cognitive => "cognitive",
});

str_enum!(StabilityLevel {
    Stable => "stable",
    Moderate => "moderate",
    Attention => "attention",
    Alert => "alert",
});

str_enum!(ArrhythmiaRiskLevel {
    Low => "low",
    Moderate => "moderate",
    Elevated => "elevated",
    High => "high",
});

impl Subsystem {
    /// Fixed iteration order used for contributions, weights and history snapshots.
    pub const ALL: [Subsystem; 4] = [
        Subsystem::Physical,
        Subsystem::Cardiac,
        Subsystem::Sleep,
        Subsystem::Cognitive,
    ];

    /// Display label for result cards.
    pub fn label(self) -> &'static str {
        match self {
            Subsystem::Physical => "Mobility & Falls",
            Subsystem::Cardiac => "Heart Health",
            Subsystem::Sleep => "Sleep Quality",
            Subsystem::Cognitive => "Mood & Medication",
        }
    }
}

impl StabilityLevel {
    pub fn label(self) -> &'static str {
        match self {
            StabilityLevel::Stable => "Stable",
            StabilityLevel::Moderate => "Moderate",
            StabilityLevel::Attention => "Needs Attention",
            StabilityLevel::Alert => "Alert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn subsystem_round_trips_through_str() {
        for subsystem in Subsystem::ALL {
            assert_eq!(Subsystem::from_str(subsystem.as_str()).unwrap(), subsystem);
        }
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = StabilityLevel::from_str("critical").unwrap_err();
        match err {
            DatabaseError::InvalidEnum { field, value } => {
                assert_eq!(field, "StabilityLevel");
                assert_eq!(value, "critical");
            }
            other => panic!("Expected InvalidEnum, got: {:?}", other),
        }
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&StabilityLevel::Attention).unwrap();
        assert_eq!(json, "\"attention\"");
        let json = serde_json::to_string(&Subsystem::Cognitive).unwrap();
        assert_eq!(json, "\"cognitive\"");
    }

    #[test]
    fn all_subsystems_have_distinct_labels() {
        let mut labels: Vec<_> = Subsystem::ALL.iter().map(|s| s.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 4);
    }
}
