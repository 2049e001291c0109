use afya_core::{Insight, Profile, Reading, Status, VitalStats};
use chrono::{DateTime, Utc};

pub const NO_READINGS_SUMMARY: &str = "No readings available yet.";
const GUIDELINES_NOTE: &str = "Analysis based on standard cardiovascular health guidelines.";
const BASELINE_RISK: u8 = 20;

struct Verdict {
    status: Status,
    summary: &'static str,
    recommendation: &'static str,
    risk_score: u8,
    factor: Option<&'static str>,
}

/// Blood-pressure bands, most severe first; the first match wins.
fn blood_pressure_verdict(systolic: f64, diastolic: f64) -> Verdict {
    if systolic >= 180.0 || diastolic >= 120.0 {
        Verdict {
            status: Status::Critical,
            summary: "Blood pressure is critically elevated. Immediate attention recommended.",
            recommendation: "Stop physical activity, sit or lie down, and contact a healthcare provider immediately.",
            risk_score: 95,
            factor: Some("Hypertensive crisis"),
        }
    } else if systolic >= 140.0 || diastolic >= 90.0 {
        Verdict {
            status: Status::Warning,
            summary: "Blood pressure indicates Stage 2 hypertension.",
            recommendation: "Consider resting and avoiding caffeine. Monitor closely and consult a doctor if persistent.",
            risk_score: 70,
            factor: Some("Stage 2 hypertension"),
        }
    } else if systolic >= 130.0 || diastolic >= 80.0 {
        Verdict {
            status: Status::Warning,
            summary: "Blood pressure is elevated (Stage 1 hypertension range).",
            recommendation: "Lifestyle modifications recommended: reduce salt intake, exercise regularly, manage stress.",
            risk_score: 50,
            factor: Some("Stage 1 hypertension"),
        }
    } else if systolic < 90.0 || diastolic < 60.0 {
        Verdict {
            status: Status::Warning,
            summary: "Blood pressure appears lower than typical range.",
            recommendation: "Stay hydrated and avoid standing up too quickly. Consult a doctor if you feel dizzy.",
            risk_score: 40,
            factor: Some("Low blood pressure"),
        }
    } else {
        Verdict {
            status: Status::Normal,
            summary: "All vital signs are within healthy ranges. Your cardiovascular metrics look stable.",
            recommendation: "Continue your healthy lifestyle. Stay active and maintain proper hydration.",
            risk_score: BASELINE_RISK,
            factor: None,
        }
    }
}

/// Threshold classifier over window means. The profile is accepted for
/// signature parity with the model path and does not change the outcome.
pub fn analyze(readings: &[Reading], profile: Option<&Profile>) -> Insight {
    analyze_at(readings, profile, Utc::now())
}

pub fn analyze_at(readings: &[Reading], _profile: Option<&Profile>, now: DateTime<Utc>) -> Insight {
    match VitalStats::from_readings(readings) {
        Some(stats) => analyze_stats(&stats, now),
        None => Insight::no_data(NO_READINGS_SUMMARY, now),
    }
}

pub fn analyze_stats(stats: &VitalStats, now: DateTime<Utc>) -> Insight {
    let bp = blood_pressure_verdict(stats.mean_systolic, stats.mean_diastolic);
    let mut status = bp.status;
    let mut summary = bp.summary;
    let mut recommendation = bp.recommendation;
    let mut risk_score = bp.risk_score;
    let mut factors: Vec<String> = bp.factor.into_iter().map(str::to_string).collect();

    // Heart rate always contributes its factor and score; it only takes over
    // the status and text while blood pressure left the window normal.
    let heart_rate = stats.mean_heart_rate;
    if heart_rate > 100.0 {
        if status == Status::Normal {
            status = Status::Warning;
            summary = "Heart rate is elevated above resting range.";
            recommendation = "If not exercising, consider relaxation techniques. Stay hydrated.";
        }
        risk_score = risk_score.saturating_add(15).min(100);
        factors.push("Elevated heart rate".to_string());
    } else if heart_rate < 50.0 {
        if status == Status::Normal {
            status = Status::Warning;
            summary = "Heart rate is lower than typical resting range.";
            recommendation = "This may be normal for athletes, but consult a doctor if you experience symptoms.";
        }
        risk_score = risk_score.saturating_add(10).min(100);
        factors.push("Low heart rate".to_string());
    }

    if status == Status::Normal {
        factors.push("Normal blood pressure".to_string());
        factors.push("Normal heart rate".to_string());
    }

    Insight {
        status,
        summary: summary.to_string(),
        recommendation: recommendation.to_string(),
        risk_score,
        factors,
        insights: Some(GUIDELINES_NOTE.to_string()),
        timestamp: now,
    }
}
