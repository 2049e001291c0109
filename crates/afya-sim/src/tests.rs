use crate::config::{Baseline, SimulatorConfig};
use crate::observer::ChannelObserver;
use crate::simulator::WristbandSimulator;
use afya_core::Reading;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::{mpsc, Arc, Mutex};

fn run(sim: &mut WristbandSimulator, ticks: usize) -> Vec<Reading> {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    (0..ticks)
        .map(|i| sim.tick_at(t0 + Duration::seconds(i as i64)))
        .collect()
}

#[test]
fn identical_seeds_reproduce_the_stream() {
    let mut a = WristbandSimulator::seeded(7, SimulatorConfig::with_fixed_drift(false));
    let mut b = WristbandSimulator::seeded(7, SimulatorConfig::with_fixed_drift(false));
    assert_eq!(run(&mut a, 200), run(&mut b, 200));

    let mut c = WristbandSimulator::seeded(7, SimulatorConfig::default());
    let mut d = WristbandSimulator::seeded(7, SimulatorConfig::default());
    assert_eq!(run(&mut c, 200), run(&mut d, 200));
}

#[test]
fn walk_starts_near_resting_baseline() {
    let mut sim = WristbandSimulator::seeded(1, SimulatorConfig::with_fixed_drift(false));
    let first = sim.tick();
    assert!((70..=74).contains(&first.heart_rate));
    assert!((118..=122).contains(&first.systolic));
    assert!((79..=81).contains(&first.diastolic));
}

#[test]
fn drift_persists_in_the_baseline() {
    let mut sim = WristbandSimulator::seeded(3, SimulatorConfig::with_fixed_drift(false));
    let reading = sim.tick();
    let baseline = sim.baseline();
    assert_eq!(baseline.heart_rate, reading.heart_rate as i32);
    assert_eq!(baseline.systolic, reading.systolic as i32);
    assert_eq!(baseline.diastolic, reading.diastolic as i32);
}

#[test]
fn clamps_hold_at_the_ceiling() {
    let config = SimulatorConfig {
        initial: Baseline {
            heart_rate: 500,
            systolic: 500,
            diastolic: 500,
        },
        ..SimulatorConfig::with_fixed_drift(true)
    };
    let mut sim = WristbandSimulator::seeded(11, config);
    assert_eq!(sim.baseline().heart_rate, 180);
    for reading in run(&mut sim, 500) {
        assert!(reading.within_physiological_limits(), "{reading:?}");
    }
}

#[test]
fn out_of_range_probabilities_are_clamped() {
    let config = SimulatorConfig {
        hr_drift_probability: 4.0,
        systolic_drift_probability: -1.0,
        diastolic_drift_probability: f64::NAN,
        ..SimulatorConfig::default()
    };
    let sim = WristbandSimulator::seeded(0, config);
    assert_eq!(sim.config().hr_drift_probability, 1.0);
    assert_eq!(sim.config().systolic_drift_probability, 0.0);
    assert_eq!(sim.config().diastolic_drift_probability, 0.0);
}

#[test]
fn observers_receive_readings_in_registration_order() {
    let log: Arc<Mutex<Vec<(&'static str, u16)>>> = Arc::new(Mutex::new(Vec::new()));
    let mut sim = WristbandSimulator::seeded(5, SimulatorConfig::default());

    let first = Arc::clone(&log);
    sim.connect(move |r: &Reading| first.lock().unwrap().push(("first", r.heart_rate)));
    let second = Arc::clone(&log);
    sim.connect(move |r: &Reading| second.lock().unwrap().push(("second", r.heart_rate)));
    assert!(sim.is_streaming());
    assert_eq!(sim.observer_count(), 2);

    let reading = sim.tick();
    let seen = log.lock().unwrap().clone();
    assert_eq!(seen, vec![("first", reading.heart_rate), ("second", reading.heart_rate)]);
}

#[test]
fn disconnect_stops_delivery_and_reconnect_restarts() {
    let (tx, rx) = mpsc::channel();
    let mut sim = WristbandSimulator::seeded(9, SimulatorConfig::default());
    assert!(!sim.is_streaming());

    sim.connect(ChannelObserver(tx));
    sim.tick();
    assert_eq!(rx.try_iter().count(), 1);

    sim.disconnect();
    assert!(!sim.is_streaming());
    assert_eq!(sim.observer_count(), 0);
    sim.tick();
    assert_eq!(rx.try_iter().count(), 0);

    let (tx2, rx2) = mpsc::channel();
    sim.connect(ChannelObserver(tx2));
    assert!(sim.is_streaming());
    sim.tick();
    sim.tick();
    assert_eq!(rx2.try_iter().count(), 2);
}

#[test]
fn closed_channels_are_pruned() {
    let (tx, rx) = mpsc::channel();
    let mut sim = WristbandSimulator::seeded(2, SimulatorConfig::default());
    sim.connect(ChannelObserver(tx));
    drop(rx);
    sim.tick();
    assert_eq!(sim.observer_count(), 0);
    assert!(sim.is_streaming());
}

#[test]
fn unsubscribe_detaches_one_observer() {
    let mut sim = WristbandSimulator::seeded(2, SimulatorConfig::default());
    let a = sim.connect(|_: &Reading| {});
    let _b = sim.connect(|_: &Reading| {});
    assert!(sim.unsubscribe(a));
    assert!(!sim.unsubscribe(a));
    assert_eq!(sim.observer_count(), 1);
}

proptest! {
    #[test]
    fn readings_stay_within_physiological_limits(seed in any::<u64>(), drift in any::<bool>()) {
        let mut sim = WristbandSimulator::seeded(seed, SimulatorConfig::with_fixed_drift(drift));
        for reading in run(&mut sim, 300) {
            prop_assert!((45..=180).contains(&reading.heart_rate));
            prop_assert!((90..=190).contains(&reading.systolic));
            prop_assert!((60..=120).contains(&reading.diastolic));
        }
    }
}
