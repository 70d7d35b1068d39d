//! Activity planning over a forecast.
//!
//! Annotates each forecast day with its severity band, picks the best and
//! worst days, and lists the days suitable for the profile's outdoor
//! activity. Thresholds follow the band boundaries: a day is recommended for
//! moderate or high activity while its estimate stays below the Unhealthy
//! for Sensitive Groups band.

use crate::error::{EngineError, EngineResult};
use crate::models::{ActivityLevel, ActivityPlan, ForecastResult, HealthProfile, PlannedDay};
use crate::services::classifier::classify_value;

/// Estimates at or above this value are not recommended for outdoor
/// activity.
const OUTDOOR_CUTOFF: f64 = 100.0;

/// Build a day-by-day plan from a forecast.
///
/// Fails with `InvalidInput` when the forecast is empty or its sequences are
/// misaligned. Ties for best and worst day go to the earlier day.
pub fn plan_activities(
    result: &ForecastResult,
    profile: Option<&HealthProfile>,
) -> EngineResult<ActivityPlan> {
    if result.is_empty() {
        return Err(EngineError::invalid_input("forecast is empty"));
    }
    if result.point_estimates.len() != result.horizon_dates.len()
        || result.lower_bound.len() != result.horizon_dates.len()
        || result.upper_bound.len() != result.horizon_dates.len()
    {
        return Err(EngineError::invalid_input(
            "forecast sequences are misaligned",
        ));
    }

    let mut days = Vec::with_capacity(result.len());
    for (date, aqi) in result.horizon_dates.iter().zip(&result.point_estimates) {
        days.push(PlannedDay {
            date: *date,
            aqi: *aqi,
            band: classify_value(*aqi)?,
        });
    }

    let mut best = 0;
    let mut worst = 0;
    for (index, day) in days.iter().enumerate() {
        if day.aqi < days[best].aqi {
            best = index;
        }
        if day.aqi > days[worst].aqi {
            worst = index;
        }
    }

    let wants_outdoor = profile.map_or(false, |p| {
        matches!(
            p.activity_level,
            ActivityLevel::Moderate | ActivityLevel::High
        )
    });
    let recommended_days: Vec<_> = if wants_outdoor {
        days.iter()
            .filter(|day| day.aqi < OUTDOOR_CUTOFF)
            .map(|day| day.date)
            .collect()
    } else {
        Vec::new()
    };

    let note = if wants_outdoor && recommended_days.is_empty() {
        Some(
            "No forecast day is suitable for outdoor activity; consider indoor alternatives."
                .to_string(),
        )
    } else {
        None
    };

    Ok(ActivityPlan {
        best_day: days[best].date,
        caution_day: days[worst].date,
        days,
        recommended_days,
        note,
    })
}
