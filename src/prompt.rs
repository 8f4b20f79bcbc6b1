// fitagent — Prompt assembly for the agent personas

use crate::profile::{Goal, PersonalInfo, ProfileDocument};
use std::fmt;

/// One of the fixed agent roles a question can be addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    Workout,
    Nutrition,
    Rehab,
    Calculator,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::Workout,
        Persona::Nutrition,
        Persona::Rehab,
        Persona::Calculator,
    ];

    /// Name used as the response key and as the export section header.
    pub fn title(&self) -> &'static str {
        match self {
            Persona::Workout => "Workout Planner",
            Persona::Nutrition => "Nutritionist",
            Persona::Rehab => "Rehab Advisor",
            Persona::Calculator => "Fitness Calculator",
        }
    }

    fn header(&self) -> &'static str {
        match self {
            Persona::Workout => "Design a personalized workout plan for the following user:",
            Persona::Nutrition => "You are a certified fitness nutritionist.",
            Persona::Rehab => "You are a certified rehab specialist.",
            Persona::Calculator => "You are a fitness calculator assistant.",
        }
    }

    fn notes_label(&self) -> &'static str {
        match self {
            Persona::Rehab => "Injury Notes",
            _ => "Notes",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "workout" | "workout planner" => Ok(Persona::Workout),
            "nutrition" | "nutritionist" => Ok(Persona::Nutrition),
            "rehab" | "rehab advisor" => Ok(Persona::Rehab),
            "calculator" | "fitness calculator" => Ok(Persona::Calculator),
            other => Err(format!(
                "unknown persona '{}' (workout, nutrition, rehab, calculator)",
                other
            )),
        }
    }
}

/// Build the prompt for `persona`. Pure: same inputs, same string.
///
/// `goals` is passed separately from the profile so a caller can ask with
/// goals that have not been saved yet.
pub fn build(persona: Persona, profile: &ProfileDocument, goals: &[Goal], question: &str) -> String {
    format!(
        "{}\nProfile: {}\nGoals: {}\n{}: {}\nQuestion: {}",
        persona.header(),
        describe_personal(&profile.personal),
        join_goals(goals),
        persona.notes_label(),
        profile.notes.join("; "),
        question
    )
}

/// One-line meal plan request from the profile basics.
pub fn meal_plan(profile: &ProfileDocument, goals: &[Goal]) -> String {
    let p = &profile.personal;
    format!(
        "Generate meal plan for a {}-year-old {} {}kg aiming {}.",
        p.age.unwrap_or(0),
        p.gender.map(|g| g.to_string()).unwrap_or_else(|| "person".into()),
        p.weight.unwrap_or(0.0),
        join_goals(goals)
    )
}

/// Ask for a new meal plan that follows the user's change request exactly.
pub fn plan_revision(profile: &ProfileDocument, feedback: &str) -> String {
    let p = &profile.personal;
    let goals = if profile.goals.is_empty() {
        "general fitness".to_string()
    } else {
        join_goals(&profile.goals)
    };

    format!(
        "As a nutrition expert, create a NEW MEAL PLAN with these specifications:\n\
         \n\
         USER PROFILE:\n\
         - Age: {} years old\n\
         - Gender: {}\n\
         - Weight: {}kg\n\
         - Goals: {}\n\
         \n\
         USER REQUEST:\n\
         \"{}\"\n\
         \n\
         The user's request above is VERY IMPORTANT and must be followed precisely.\n\
         Create a detailed meal plan that implements these exact requirements.",
        p.age.unwrap_or(30),
        p.gender.map(|g| g.to_string()).unwrap_or_else(|| "Male".into()),
        p.weight.unwrap_or(70.0),
        goals,
        feedback.trim()
    )
}

fn join_goals(goals: &[Goal]) -> String {
    goals
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the set personal fields as `key: value` pairs in a fixed order.
fn describe_personal(p: &PersonalInfo) -> String {
    let mut parts = Vec::new();
    if let Some(ref name) = p.name {
        parts.push(format!("name: {}", name));
    }
    if let Some(age) = p.age {
        parts.push(format!("age: {}", age));
    }
    if let Some(gender) = p.gender {
        parts.push(format!("gender: {}", gender));
    }
    if let Some(weight) = p.weight {
        parts.push(format!("weight: {} kg", weight));
    }
    if let Some(height) = p.height {
        parts.push(format!("height: {} cm", height));
    }

    if parts.is_empty() {
        "(not provided)".to_string()
    } else {
        parts.join(", ")
    }
}
