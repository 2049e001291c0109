use crate::config::{Baseline, SimulatorConfig};
use crate::observer::{ReadingObserver, SubscriptionId};
use afya_core::{Reading, DIASTOLIC_LIMITS, HEART_RATE_LIMITS, SYSTOLIC_LIMITS};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{debug, trace};

/// Per-tick uniform noise amplitude (inclusive, both directions).
const HR_NOISE: i32 = 2;
const SYSTOLIC_NOISE: i32 = 2;
const DIASTOLIC_NOISE: i32 = 1;

/// Size of one persistent baseline drift step.
const HR_DRIFT_STEP: i32 = 2;
const SYSTOLIC_DRIFT_STEP: i32 = 2;
const DIASTOLIC_DRIFT_STEP: i32 = 1;

/// Wristband stand-in. Each instance owns its baseline triple and its random
/// source; nothing is shared between simulators.
pub struct WristbandSimulator<R = StdRng> {
    rng: R,
    config: SimulatorConfig,
    baseline: Baseline,
    observers: Vec<(SubscriptionId, Box<dyn ReadingObserver>)>,
    next_id: u64,
    streaming: bool,
    ticks: u64,
}

impl WristbandSimulator<StdRng> {
    pub fn seeded(seed: u64, config: SimulatorConfig) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), config)
    }

    pub fn from_entropy(config: SimulatorConfig) -> Self {
        Self::with_rng(StdRng::from_entropy(), config)
    }
}

impl<R: Rng> WristbandSimulator<R> {
    pub fn with_rng(rng: R, config: SimulatorConfig) -> Self {
        let config = config.normalized();
        let baseline = Baseline {
            heart_rate: HEART_RATE_LIMITS.clamp(config.initial.heart_rate),
            systolic: SYSTOLIC_LIMITS.clamp(config.initial.systolic),
            diastolic: DIASTOLIC_LIMITS.clamp(config.initial.diastolic),
        };
        Self {
            rng,
            config,
            baseline,
            observers: Vec::new(),
            next_id: 0,
            streaming: false,
            ticks: 0,
        }
    }

    /// Registers an observer. The first connection starts the stream; later
    /// ones only add to the delivery list.
    pub fn connect<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: ReadingObserver + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        if !self.streaming {
            self.streaming = true;
            debug!(subscription = id.0, "wristband stream started");
        }
        id
    }

    /// Detaches one observer; the stream keeps running.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Stops the stream and forgets every observer.
    pub fn disconnect(&mut self) {
        if self.streaming {
            debug!(observers = self.observers.len(), ticks = self.ticks, "wristband stream stopped");
        }
        self.streaming = false;
        self.observers.clear();
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms.max(1))
    }

    pub fn tick(&mut self) -> Reading {
        self.tick_at(Utc::now())
    }

    /// Advances the walk one step and delivers the reading, in registration
    /// order, to every observer if the stream is running.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Reading {
        let hr_noise = self.rng.gen_range(-HR_NOISE..=HR_NOISE);
        let sys_noise = self.rng.gen_range(-SYSTOLIC_NOISE..=SYSTOLIC_NOISE);
        let dia_noise = self.rng.gen_range(-DIASTOLIC_NOISE..=DIASTOLIC_NOISE);

        let hr_drift = self.drift(self.config.hr_drift_probability, HR_DRIFT_STEP);
        let sys_drift = self.drift(self.config.systolic_drift_probability, SYSTOLIC_DRIFT_STEP);
        let dia_drift = self.drift(self.config.diastolic_drift_probability, DIASTOLIC_DRIFT_STEP);

        self.baseline.heart_rate = HEART_RATE_LIMITS.clamp(self.baseline.heart_rate + hr_drift + hr_noise);
        self.baseline.systolic = SYSTOLIC_LIMITS.clamp(self.baseline.systolic + sys_drift + sys_noise);
        self.baseline.diastolic =
            DIASTOLIC_LIMITS.clamp(self.baseline.diastolic + dia_drift + dia_noise);
        self.ticks += 1;

        let reading = Reading::new(
            now,
            self.baseline.heart_rate as u16,
            self.baseline.systolic as u16,
            self.baseline.diastolic as u16,
        );
        trace!(
            hr = reading.heart_rate,
            sys = reading.systolic,
            dia = reading.diastolic,
            "tick"
        );

        if self.streaming {
            self.observers.retain_mut(|(id, observer)| {
                let keep = observer.on_reading(&reading);
                if !keep {
                    debug!(subscription = id.0, "observer closed, dropping");
                }
                keep
            });
        }
        reading
    }

    fn drift(&mut self, probability: f64, step: i32) -> i32 {
        if !self.rng.gen_bool(probability) {
            return 0;
        }
        if self.rng.gen_bool(0.5) {
            step
        } else {
            -step
        }
    }
}
