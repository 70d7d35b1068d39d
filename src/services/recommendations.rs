//! Health recommendation engine.
//!
//! The rules live in data tables rather than branching logic: base advice is
//! indexed by band, condition advice by (condition, severity tier), and
//! protective measures are a single ladder of which more severe bands expose
//! a longer prefix. Adding a rule means adding a table entry.
//!
//! Output is deterministic for a given (AQI, profile) pair: conditions are
//! iterated in their set order and every table is fixed.

use std::collections::BTreeMap;

use crate::error::EngineResult;
use crate::models::{
    ActivityLevel, AgeGroup, HealthCondition, HealthProfile, PollutantAdvice, RecommendationSet,
    SeverityBand,
};
use crate::services::classifier::{classify, find_concentration};

/// Base advice per band, in band order.
const BASE_ADVICE: [&[&str]; 6] = [
    &[
        "Air quality is satisfactory and poses little or no risk.",
        "A great day for outdoor activities.",
        "Open windows to ventilate your home.",
    ],
    &[
        "Air quality is acceptable for most people.",
        "Unusually sensitive individuals should consider limiting prolonged outdoor exertion.",
        "Ventilate during the cleaner hours of the day.",
    ],
    &[
        "Members of sensitive groups may experience health effects.",
        "The general public is less likely to be affected.",
        "Reduce prolonged or heavy outdoor exertion if you notice symptoms.",
    ],
    &[
        "Some members of the general public may experience health effects.",
        "Sensitive groups are at risk of more serious effects.",
        "Move prolonged or heavy exertion indoors.",
    ],
    &[
        "Health alert: the risk of health effects is increased for everyone.",
        "Avoid prolonged or heavy outdoor exertion.",
        "Keep windows and doors closed.",
    ],
    &[
        "Health warning of emergency conditions: everyone is more likely to be affected.",
        "Remain indoors and keep activity levels low.",
        "Follow guidance from local authorities.",
    ],
];

/// Condition advice at four severity tiers: Good, Moderate, Unhealthy for
/// Sensitive Groups, and everything above.
const RESPIRATORY_ADVICE: [&str; 4] = [
    "Air quality is good. Enjoy outdoor activities, but keep your rescue inhaler handy.",
    "Consider shorter outdoor sessions and monitor for coughing or shortness of breath.",
    "Limit outdoor activity. Keep windows closed and have your medication within reach.",
    "Stay indoors with filtered air. Follow your action plan and seek care if symptoms escalate.",
];

const CARDIOVASCULAR_ADVICE: [&str; 4] = [
    "Conditions are good. Moderate outdoor exercise is encouraged.",
    "Avoid strenuous outdoor exercise during the most polluted hours.",
    "Limit exertion outdoors. Watch for palpitations, chest tightness or unusual fatigue.",
    "Avoid outdoor physical activity entirely. Contact a doctor if you notice chest discomfort.",
];

const ALLERGY_ADVICE: [&str; 4] = [
    "Irritant levels are low. A good day to air out your home.",
    "Particle levels may aggravate allergies. Consider an antihistamine before heading out.",
    "Keep windows closed and rinse off after spending time outside.",
    "Stay indoors where air is filtered. Launder clothes worn outside without shaking them out.",
];

const PREGNANCY_ADVICE: [&str; 4] = [
    "Air quality is good. Normal outdoor routines are fine.",
    "Prefer gentle activity and avoid busy roads where exhaust accumulates.",
    "Limit time outdoors and rest more often. Discuss persistent symptoms with your doctor.",
    "Remain indoors with clean air until conditions improve.",
];

/// Age-group advice per band, in band order.
const CHILD_ADVICE: [&str; 6] = [
    "Children can play outside as usual.",
    "Children can stay active outdoors; keep energetic play away from rush hours.",
    "Shorten outdoor playtime and swap intense games for calmer ones.",
    "Move playtime indoors. Watch children for coughing or irritated eyes.",
    "Keep children indoors. Postpone outdoor school and sports activities.",
    "Keep children indoors with filtered air and minimize physical activity.",
];

const ELDERLY_ADVICE: [&str; 6] = [
    "A pleasant day for a walk or light gardening.",
    "Outdoor time is fine; take breaks and stay hydrated.",
    "Prefer shorter, gentler outings and rest when needed.",
    "Stay indoors as much as possible and keep prescribed medication nearby.",
    "Remain indoors. Arrange deliveries instead of errands where possible.",
    "Do not go outside. Ask for help with errands and keep emergency contacts at hand.",
];

/// Exertion advice for high-activity profiles, per band.
const HIGH_ACTIVITY_ADVICE: [&str; 6] = [
    "Ideal conditions for training or working outdoors.",
    "Schedule hard sessions for early morning when pollution is usually lowest.",
    "Cut the intensity and length of outdoor sessions; line up indoor alternatives.",
    "Move workouts indoors. If you must work outside, take frequent breaks in clean air.",
    "Train indoors only. Outdoor workers should use respiratory protection and rotate tasks.",
    "Suspend outdoor training and non-essential outdoor work.",
];

/// Protective-measure ladder. Each band exposes a prefix of this list, so a
/// more severe band always includes everything a less severe band advises.
const PROTECTIVE_LADDER: [&str; 7] = [
    "Keep windows closed during peak pollution hours.",
    "Run an air purifier with a HEPA filter if available.",
    "Carry any rescue medication when leaving the house.",
    "Wear a well-fitting N95 or FFP2 mask outdoors.",
    "Plan errands for the time of day with the lowest readings.",
    "Set up a clean-air room where you spend most of your time.",
    "Avoid going outside unless absolutely necessary.",
];

/// Ladder prefix length per band, in band order.
const PROTECTIVE_COUNTS: [usize; 6] = [0, 0, 3, 5, 6, 7];

/// Map a band to its condition-advice tier.
fn advice_tier(band: SeverityBand) -> usize {
    match band {
        SeverityBand::Good => 0,
        SeverityBand::Moderate => 1,
        SeverityBand::UnhealthySensitive => 2,
        _ => 3,
    }
}

fn condition_advice(condition: HealthCondition, band: SeverityBand) -> &'static str {
    let table = match condition {
        HealthCondition::Respiratory => &RESPIRATORY_ADVICE,
        HealthCondition::Cardiovascular => &CARDIOVASCULAR_ADVICE,
        HealthCondition::Allergy => &ALLERGY_ADVICE,
        HealthCondition::Pregnancy => &PREGNANCY_ADVICE,
    };
    table[advice_tier(band)]
}

/// Compute recommendations for an AQI value and an optional health profile.
///
/// Without a profile only the band's base advice is returned. With one, the
/// profile's conditions, age group and activity level each contribute advice,
/// and sensitive profiles at elevated bands additionally receive protective
/// measures whose count grows with severity.
pub fn recommend(
    aqi_value: i64,
    profile: Option<&HealthProfile>,
) -> EngineResult<RecommendationSet> {
    let band = classify(aqi_value)?;
    let index = band as usize;

    let base_advice: Vec<String> = BASE_ADVICE[index].iter().map(|s| s.to_string()).collect();
    let mut personalized_advice = Vec::new();
    let mut protective_measures = Vec::new();

    if let Some(profile) = profile {
        for condition in &profile.conditions {
            personalized_advice.push(condition_advice(*condition, band).to_string());
        }
        match profile.age_group {
            AgeGroup::Child => personalized_advice.push(CHILD_ADVICE[index].to_string()),
            AgeGroup::Elderly => personalized_advice.push(ELDERLY_ADVICE[index].to_string()),
            AgeGroup::Adult => {}
        }
        if profile.activity_level == ActivityLevel::High {
            personalized_advice.push(HIGH_ACTIVITY_ADVICE[index].to_string());
        }
        if band.is_elevated() && profile.is_sensitive() {
            protective_measures = PROTECTIVE_LADDER[..PROTECTIVE_COUNTS[index]]
                .iter()
                .map(|s| s.to_string())
                .collect();
        }
    }

    log::debug!(
        "recommendations for AQI {aqi_value}: band {band}, {} personalized, {} protective",
        personalized_advice.len(),
        protective_measures.len()
    );

    Ok(RecommendationSet {
        band,
        base_advice,
        personalized_advice,
        protective_measures,
    })
}

/// Per-pollutant guidance derived from raw concentrations.
///
/// Covers PM2.5, PM10 and ozone, in that order; pollutants missing from the
/// map are skipped. Concentration thresholds follow the breakpoints used for
/// index conversion.
pub fn pollutant_advice(pollutants: &BTreeMap<String, f64>) -> Vec<PollutantAdvice> {
    let mut advice = Vec::new();

    if let Some(pm25) = find_concentration(pollutants, "pm25") {
        let guidance = if pm25 <= 12.0 {
            "PM2.5 is low; no precautions needed."
        } else if pm25 <= 35.4 {
            "PM2.5 is acceptable; unusually sensitive people should pace prolonged exertion."
        } else if pm25 <= 55.4 {
            "PM2.5 is elevated; sensitive groups should reduce prolonged or heavy exertion."
        } else {
            "PM2.5 is high; everyone should reduce outdoor exertion."
        };
        advice.push(PollutantAdvice {
            pollutant: "pm25".to_string(),
            concentration: pm25,
            guidance: guidance.to_string(),
        });
    }

    if let Some(pm10) = find_concentration(pollutants, "pm10") {
        let guidance = if pm10 <= 54.0 {
            "PM10 is low; no precautions needed."
        } else if pm10 <= 154.0 {
            "PM10 is moderate; dust-sensitive people should limit prolonged outdoor effort."
        } else if pm10 <= 254.0 {
            "PM10 is elevated; people with respiratory conditions should stay indoors more."
        } else {
            "PM10 is high; everyone should avoid prolonged outdoor exposure."
        };
        advice.push(PollutantAdvice {
            pollutant: "pm10".to_string(),
            concentration: pm10,
            guidance: guidance.to_string(),
        });
    }

    if let Some(o3) = find_concentration(pollutants, "o3") {
        let guidance = if o3 <= 54.0 {
            "Ozone is low; no precautions needed."
        } else if o3 <= 124.0 {
            "Ozone is moderate; sensitive groups should limit prolonged afternoon exertion."
        } else {
            "Ozone is high; children, older adults and sensitive groups should stay indoors."
        };
        advice.push(PollutantAdvice {
            pollutant: "o3".to_string(),
            concentration: o3,
            guidance: guidance.to_string(),
        });
    }

    advice
}
