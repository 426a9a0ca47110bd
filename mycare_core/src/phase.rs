//! Cycle phase classification and the built-in phase guidance table.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Hormone picture and advice shown for a phase
#[derive(Clone, Debug)]
pub struct PhaseGuidance {
    pub hormone_levels: HormoneLevels,
    pub tips: [&'static str; 3],
}

/// Guidance for every classifiable phase, built once
static PHASE_GUIDANCE: Lazy<HashMap<Phase, PhaseGuidance>> = Lazy::new(build_phase_guidance);

/// Look up hormone levels and tips for a phase.
///
/// Returns `None` for [`Phase::Unknown`].
pub fn guidance(phase: Phase) -> Option<&'static PhaseGuidance> {
    PHASE_GUIDANCE.get(&phase)
}

/// Classify a 1-based cycle day against the cycle and period averages
///
/// Conditions are checked in order and the first match wins, so every
/// integer day (including days <= 0 and days past the cycle) lands in
/// exactly one phase.
pub fn classify(current_cycle_day: i64, avg_cycle: i64, avg_period: i64) -> Phase {
    let half = avg_cycle / 2;

    if current_cycle_day <= avg_period {
        Phase::Menstruation
    } else if current_cycle_day <= half - 5 {
        Phase::Follicular
    } else if current_cycle_day <= half + 1 {
        Phase::Ovulation
    } else if current_cycle_day <= avg_cycle - 1 {
        Phase::Luteal
    } else {
        Phase::LateLuteal
    }
}

fn levels(
    estrogen: HormoneLevel,
    progesterone: HormoneLevel,
    testosterone: HormoneLevel,
) -> HormoneLevels {
    HormoneLevels {
        estrogen,
        progesterone,
        testosterone,
    }
}

fn build_phase_guidance() -> HashMap<Phase, PhaseGuidance> {
    use HormoneLevel::*;

    let mut table = HashMap::new();

    table.insert(
        Phase::Menstruation,
        PhaseGuidance {
            hormone_levels: levels(Low, Low, Low),
            tips: [
                "Rest and sleep are your best friends right now.",
                "Eat iron-rich foods like spinach and lean meats.",
                "Try gentle stretches or yoga for cramp relief.",
            ],
        },
    );

    table.insert(
        Phase::Follicular,
        PhaseGuidance {
            hormone_levels: levels(Rising, Low, Steady),
            tips: [
                "Your energy is rising! Great time for new projects.",
                "Try high-intensity workouts if you feel up to it.",
                "Eat fermented foods to support gut health.",
            ],
        },
    );

    table.insert(
        Phase::Ovulation,
        PhaseGuidance {
            hormone_levels: levels(High, Low, Peak),
            tips: [
                "You're at your peak! You might feel more social.",
                "Focus on anti-inflammatory foods like berries.",
                "Keep an eye out for changes in cervical discharge.",
            ],
        },
    );

    table.insert(
        Phase::Luteal,
        PhaseGuidance {
            hormone_levels: levels(Steady, Rising, Low),
            tips: [
                "Slow down and focus on self-care.",
                "Eat complex carbs to stabilize energy levels.",
                "Light cardio is better than intense workouts now.",
            ],
        },
    );

    table.insert(
        Phase::LateLuteal,
        PhaseGuidance {
            hormone_levels: levels(Falling, Falling, Low),
            tips: [
                "Drink plenty of water to reduce bloating.",
                "Limit caffeine and salt to manage PMS symptoms.",
                "Gentle walks can help improve your mood.",
            ],
        },
    );

    table
}
