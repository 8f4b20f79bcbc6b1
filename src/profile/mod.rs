// fitagent — Profile document (personal info, goals, nutrition, notes)

pub mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use store::{ProfileStore, StoreError};

pub const MAX_AGE: u32 = 120;
pub const MAX_WEIGHT_KG: f64 = 300.0;
pub const MAX_HEIGHT_CM: f64 = 250.0;
pub const MAX_CALORIES: f64 = 20_000.0;
pub const MAX_MACRO_G: f64 = 2_000.0;

#[derive(Error, Debug, PartialEq)]
pub enum ProfileError {
    #[error("{field} must be between 0 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },
    #[error("no note at index {index} (have {len})")]
    NoteIndex { index: usize, len: usize },
    #[error("note text is empty")]
    EmptyNote,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender '{}' (male, female, other)", other)),
        }
    }
}

/// Fitness goal. Older data files spell the labels with a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    #[serde(alias = "Muscle Gain")]
    MuscleGain,
    #[serde(alias = "Weight Loss")]
    WeightLoss,
    Endurance,
    Rehab,
}

impl Goal {
    pub const ALL: [Goal; 4] = [
        Goal::MuscleGain,
        Goal::WeightLoss,
        Goal::Endurance,
        Goal::Rehab,
    ];
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Goal::MuscleGain => "MuscleGain",
            Goal::WeightLoss => "WeightLoss",
            Goal::Endurance => "Endurance",
            Goal::Rehab => "Rehab",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "musclegain" => Ok(Goal::MuscleGain),
            "weightloss" => Ok(Goal::WeightLoss),
            "endurance" => Ok(Goal::Endurance),
            "rehab" => Ok(Goal::Rehab),
            _ => Err(format!(
                "unknown goal '{}' (muscle-gain, weight-loss, endurance, rehab)",
                s
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Document sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Centimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl PersonalInfo {
    pub fn is_empty(&self) -> bool {
        self == &PersonalInfo::default()
    }

    /// Check the numeric fields against the form ranges.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if let Some(age) = self.age {
            if age > MAX_AGE {
                return Err(ProfileError::OutOfRange {
                    field: "age",
                    value: age as f64,
                    max: MAX_AGE as f64,
                });
            }
        }
        check_range("weight", self.weight, MAX_WEIGHT_KG)?;
        check_range("height", self.height, MAX_HEIGHT_CM)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: Option<f64>, max: f64) -> Result<(), ProfileError> {
    match value {
        Some(v) if !v.is_finite() || !(0.0..=max).contains(&v) => {
            Err(ProfileError::OutOfRange { field, value: v, max })
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
}

impl NutritionTargets {
    pub const DEFAULT_CALORIES: f64 = 2000.0;
    pub const DEFAULT_PROTEIN: f64 = 100.0;
    pub const DEFAULT_FAT: f64 = 70.0;
    pub const DEFAULT_CARBS: f64 = 250.0;

    pub fn is_empty(&self) -> bool {
        self == &NutritionTargets::default()
    }

    /// Reject negative and non-finite targets; JSON cannot hold NaN or infinity.
    pub fn validate(&self) -> Result<(), ProfileError> {
        check_range("calories", self.calories, MAX_CALORIES)?;
        check_range("protein", self.protein, MAX_MACRO_G)?;
        check_range("fat", self.fat, MAX_MACRO_G)?;
        check_range("carbs", self.carbs, MAX_MACRO_G)?;
        Ok(())
    }

    /// Targets with unset fields filled from the form defaults. Not persisted.
    pub fn or_defaults(&self) -> NutritionTargets {
        NutritionTargets {
            calories: Some(self.calories.unwrap_or(Self::DEFAULT_CALORIES)),
            protein: Some(self.protein.unwrap_or(Self::DEFAULT_PROTEIN)),
            fat: Some(self.fat.unwrap_or(Self::DEFAULT_FAT)),
            carbs: Some(self.carbs.unwrap_or(Self::DEFAULT_CARBS)),
        }
    }
}

// ---------------------------------------------------------------------------
// ProfileDocument
// ---------------------------------------------------------------------------

/// The persisted profile. The four section keys are always written, even
/// when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    #[serde(default)]
    pub personal: PersonalInfo,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub nutrition: NutritionTargets,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_plan: Option<String>,
}

impl ProfileDocument {
    /// Replace the goal set. Duplicates are dropped, first occurrence wins.
    pub fn set_goals(&mut self, goals: impl IntoIterator<Item = Goal>) {
        let mut unique = Vec::new();
        for goal in goals {
            if !unique.contains(&goal) {
                unique.push(goal);
            }
        }
        self.goals = unique;
    }

    pub fn add_note(&mut self, text: impl Into<String>) -> Result<usize, ProfileError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ProfileError::EmptyNote);
        }
        self.notes.push(text);
        Ok(self.notes.len() - 1)
    }

    pub fn edit_note(&mut self, index: usize, text: impl Into<String>) -> Result<(), ProfileError> {
        let len = self.notes.len();
        let slot = self
            .notes
            .get_mut(index)
            .ok_or(ProfileError::NoteIndex { index, len })?;
        *slot = text.into();
        Ok(())
    }

    /// Remove the note at `index`. Later notes move down by one.
    pub fn delete_note(&mut self, index: usize) -> Result<String, ProfileError> {
        if index >= self.notes.len() {
            return Err(ProfileError::NoteIndex {
                index,
                len: self.notes.len(),
            });
        }
        Ok(self.notes.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrition_targets_reject_non_finite() {
        let nan = NutritionTargets {
            calories: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(
            nan.validate(),
            Err(ProfileError::OutOfRange { field: "calories", .. })
        ));

        for bad in [f64::INFINITY, f64::NEG_INFINITY, -1.0] {
            let targets = NutritionTargets {
                fat: Some(bad),
                ..Default::default()
            };
            assert!(targets.validate().is_err(), "accepted {}", bad);
        }

        assert!(NutritionTargets::default().validate().is_ok());
        assert!(NutritionTargets::default().or_defaults().validate().is_ok());
    }

    #[test]
    fn test_default_document_has_four_keys() {
        let doc = ProfileDocument::default();
        let v = serde_json::to_value(&doc).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(v["personal"], serde_json::json!({}));
        assert_eq!(v["goals"], serde_json::json!([]));
        assert_eq!(v["nutrition"], serde_json::json!({}));
        assert_eq!(v["notes"], serde_json::json!([]));
    }

    #[test]
    fn test_delete_note_shifts_indices() {
        let mut doc = ProfileDocument::default();
        for n in ["a", "b", "c", "d"] {
            doc.add_note(n).unwrap();
        }
        let removed = doc.delete_note(1).unwrap();
        assert_eq!(removed, "b");
        assert_eq!(doc.notes, vec!["a", "c", "d"]);
        assert_eq!(doc.notes.len(), 3);
    }

    #[test]
    fn test_note_index_out_of_range() {
        let mut doc = ProfileDocument::default();
        doc.add_note("knee pain").unwrap();
        assert_eq!(
            doc.delete_note(3),
            Err(ProfileError::NoteIndex { index: 3, len: 1 })
        );
        assert!(doc.edit_note(1, "x").is_err());
        doc.edit_note(0, "left knee pain").unwrap();
        assert_eq!(doc.notes[0], "left knee pain");
    }

    #[test]
    fn test_empty_note_rejected() {
        let mut doc = ProfileDocument::default();
        assert_eq!(doc.add_note("   "), Err(ProfileError::EmptyNote));
        assert!(doc.notes.is_empty());
    }

    #[test]
    fn test_set_goals_dedupes_in_order() {
        let mut doc = ProfileDocument::default();
        doc.set_goals([Goal::Endurance, Goal::WeightLoss, Goal::Endurance]);
        assert_eq!(doc.goals, vec![Goal::Endurance, Goal::WeightLoss]);
    }

    #[test]
    fn test_legacy_goal_labels() {
        let json = r#"{"personal": {}, "goals": ["Muscle Gain", "Weight Loss", "Rehab"], "nutrition": {}, "notes": []}"#;
        let doc: ProfileDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.goals, vec![Goal::MuscleGain, Goal::WeightLoss, Goal::Rehab]);
    }

    #[test]
    fn test_parse_goal_and_gender() {
        assert_eq!("weight-loss".parse::<Goal>().unwrap(), Goal::WeightLoss);
        assert_eq!("Muscle Gain".parse::<Goal>().unwrap(), Goal::MuscleGain);
        assert!("flexibility".parse::<Goal>().is_err());
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
    }

    #[test]
    fn test_validate_ranges() {
        let ok = PersonalInfo {
            age: Some(30),
            weight: Some(80.0),
            height: Some(180.0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_old = PersonalInfo {
            age: Some(121),
            ..Default::default()
        };
        assert!(matches!(
            too_old.validate(),
            Err(ProfileError::OutOfRange { field: "age", .. })
        ));

        let negative = PersonalInfo {
            weight: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = PersonalInfo {
            height: Some(f64::NAN),
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_nutrition_or_defaults() {
        let partial = NutritionTargets {
            protein: Some(150.0),
            ..Default::default()
        };
        let filled = partial.or_defaults();
        assert_eq!(filled.protein, Some(150.0));
        assert_eq!(filled.calories, Some(2000.0));
        assert_eq!(filled.carbs, Some(250.0));
        assert!(partial.or_defaults() != partial);
    }
}
