use rand::Rng;

use crate::callout::CalloutList;

/// Decides when the next combo is called during a work phase.
///
/// Spacing is a renewal process: each firing schedules the next one
/// `frequency ± randomness/2` seconds of work-time later. Thresholds are
/// compared against whole-second ticks, so firings land on 1 s resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CalloutScheduler {
    frequency: f64,
    randomness: f64,
    threshold: f64,
}

impl CalloutScheduler {
    pub fn new(frequency: f64, randomness: f64) -> Self {
        Self {
            frequency,
            randomness: randomness.max(0.0),
            threshold: frequency,
        }
    }

    /// Called on every entry into a work phase
    pub fn reset(&mut self) {
        self.threshold = self.frequency;
    }

    /// Elapsed work-time at which the next callout fires
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Evaluate one work tick. Returns the text to speak, if any.
    ///
    /// The threshold advances whenever it is crossed, even when no callout
    /// is active, so re-enabling callouts mid-round keeps the cadence.
    pub fn on_work_tick<R: Rng>(
        &mut self,
        elapsed_work: f64,
        callouts: &CalloutList,
        rng: &mut R,
    ) -> Option<String> {
        if elapsed_work < self.threshold {
            return None;
        }

        let picked = callouts.pick_random(rng).map(|c| c.text.clone());
        self.threshold = elapsed_work + self.frequency + self.jitter(rng);
        picked
    }

    fn jitter<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.randomness <= 0.0 {
            return 0.0;
        }
        let half = self.randomness / 2.0;
        rng.gen_range(-half..=half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fire_points(sched: &mut CalloutScheduler, work_secs: u32, seed: u64) -> Vec<u32> {
        let callouts = CalloutList::from_texts(["Jab"]);
        let mut rng = StdRng::seed_from_u64(seed);
        // Work ticks see elapsed 1..work_secs-1; the last second is the phase boundary.
        (1..work_secs)
            .filter(|&elapsed| {
                sched
                    .on_work_tick(elapsed as f64, &callouts, &mut rng)
                    .is_some()
            })
            .collect()
    }

    #[test]
    fn no_jitter_fires_on_exact_multiples() {
        let mut sched = CalloutScheduler::new(2.0, 0.0);
        assert_eq!(fire_points(&mut sched, 10, 0), vec![2, 4, 6, 8]);
    }

    #[test]
    fn reset_restores_the_first_threshold() {
        let mut sched = CalloutScheduler::new(3.0, 1.0);
        fire_points(&mut sched, 20, 3);
        assert!(sched.threshold() > 3.0);
        sched.reset();
        assert_eq!(sched.threshold(), 3.0);
    }

    #[test]
    fn jittered_spacing_stays_within_bounds() {
        let callouts = CalloutList::from_texts(["Jab"]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut sched = CalloutScheduler::new(4.0, 2.0);

        for elapsed in 1..500u32 {
            let before = sched.threshold();
            if sched
                .on_work_tick(elapsed as f64, &callouts, &mut rng)
                .is_some()
            {
                let gap = sched.threshold() - elapsed as f64;
                assert!((3.0..=5.0).contains(&gap), "gap {gap} out of bounds");
                assert!(elapsed as f64 >= before);
            }
        }
    }

    #[test]
    fn empty_active_set_still_advances_threshold() {
        let mut callouts = CalloutList::from_texts(["Jab"]);
        let id = callouts.iter().next().unwrap().id;
        callouts.toggle(id);

        let mut rng = StdRng::seed_from_u64(9);
        let mut sched = CalloutScheduler::new(2.0, 0.0);
        assert_eq!(sched.on_work_tick(2.0, &callouts, &mut rng), None);
        assert_eq!(sched.threshold(), 4.0);
    }

    #[test]
    fn before_threshold_nothing_fires() {
        let callouts = CalloutList::from_texts(["Jab"]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut sched = CalloutScheduler::new(5.0, 0.0);
        for elapsed in 1..5 {
            assert_eq!(sched.on_work_tick(elapsed as f64, &callouts, &mut rng), None);
        }
        assert_eq!(
            sched.on_work_tick(5.0, &callouts, &mut rng).as_deref(),
            Some("Jab")
        );
    }
}
