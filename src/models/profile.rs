//! User health profiles.
//!
//! A profile arrives with each recommendation request and is never stored by
//! the engine. Conditions live in a `BTreeSet` so iteration order, and with
//! it the order of personalized advice, is deterministic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Declared health condition that tailors recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthCondition {
    /// Asthma, COPD and other respiratory conditions.
    Respiratory,
    /// Heart disease, hypertension and other cardiovascular conditions.
    Cardiovascular,
    /// Pollen and particulate allergies.
    Allergy,
    /// Pregnancy.
    Pregnancy,
}

impl HealthCondition {
    /// All conditions, in advice ordering.
    pub const ALL: [HealthCondition; 4] = [
        HealthCondition::Respiratory,
        HealthCondition::Cardiovascular,
        HealthCondition::Allergy,
        HealthCondition::Pregnancy,
    ];

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            HealthCondition::Respiratory => "Respiratory",
            HealthCondition::Cardiovascular => "Cardiovascular",
            HealthCondition::Allergy => "Allergy",
            HealthCondition::Pregnancy => "Pregnancy",
        }
    }
}

/// Age bracket of the person the recommendations are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    Child,
    Adult,
    Elderly,
}

/// Typical outdoor activity intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

/// Health profile supplied per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthProfile {
    /// Declared conditions, if any.
    #[serde(default)]
    pub conditions: BTreeSet<HealthCondition>,
    /// Age bracket.
    pub age_group: AgeGroup,
    /// Outdoor activity intensity.
    pub activity_level: ActivityLevel,
}

impl HealthProfile {
    /// Profile with no conditions.
    pub fn new(age_group: AgeGroup, activity_level: ActivityLevel) -> Self {
        Self {
            conditions: BTreeSet::new(),
            age_group,
            activity_level,
        }
    }

    /// Add a condition, returning the profile for chaining.
    pub fn with_condition(mut self, condition: HealthCondition) -> Self {
        self.conditions.insert(condition);
        self
    }

    /// True when the profile belongs to a sensitive group: children, the
    /// elderly, or anyone with a declared condition.
    pub fn is_sensitive(&self) -> bool {
        !self.conditions.is_empty() || matches!(self.age_group, AgeGroup::Child | AgeGroup::Elderly)
    }
}

impl Default for HealthProfile {
    fn default() -> Self {
        Self::new(AgeGroup::Adult, ActivityLevel::Low)
    }
}
