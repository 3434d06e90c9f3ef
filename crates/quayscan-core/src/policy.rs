//! Tabular interdiction policy stub.
//!
//! One-step Q-learning over anomaly buckets. There is no environment model:
//! the "next state" is the current bucket and the reward is a fixed linear
//! penalty on the anomaly score. The table, reward history, and per-state
//! visit counters exist so operators can watch which buckets recur; nothing
//! here learns a real policy and nothing pretends to.

use rand::Rng;

use crate::config::ScreenConfig;

/// One observed policy step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyStep {
    pub state: usize,
    pub action: usize,
    pub reward: f64,
}

/// States × actions Q-table with epsilon-greedy action selection.
#[derive(Debug, Clone)]
pub struct InterdictionPolicy {
    q: Vec<Vec<f64>>,
    alpha: f64,
    gamma: f64,
    epsilon: f64,
    reward_history: Vec<f64>,
    temporal_flags: Vec<u64>,
}

impl InterdictionPolicy {
    pub fn new(cfg: &ScreenConfig) -> Self {
        Self {
            q: vec![vec![0.0; cfg.actions]; cfg.states],
            alpha: cfg.alpha,
            gamma: cfg.gamma,
            epsilon: cfg.epsilon,
            reward_history: Vec::new(),
            temporal_flags: vec![0; cfg.states],
        }
    }

    /// Map an anomaly score to a state bucket, clamped to the table.
    pub fn bucket(&self, anomaly: f64) -> usize {
        let states = self.q.len();
        ((anomaly.max(0.0) * states as f64) as usize).min(states - 1)
    }

    /// Observe one anomaly score: pick an action epsilon-greedily, take the
    /// fixed penalty reward, and apply a one-step update with next == current.
    pub fn observe(&mut self, anomaly: f64, rng: &mut impl Rng) -> PolicyStep {
        let state = self.bucket(anomaly);
        let action = if rng.random::<f64>() > self.epsilon {
            self.greedy_action(state)
        } else {
            rng.random_range(0..self.q[state].len())
        };
        let reward = -anomaly * 10.0;
        self.update(state, action, reward, state);
        PolicyStep {
            state,
            action,
            reward,
        }
    }

    /// One-step tabular update: Q += alpha * (r + gamma * max Q[next] - Q).
    pub fn update(&mut self, state: usize, action: usize, reward: f64, next_state: usize) {
        let target = reward + self.gamma * self.max_q(next_state);
        let predict = self.q[state][action];
        self.q[state][action] += self.alpha * (target - predict);
        self.reward_history.push(reward);
        self.temporal_flags[state] += 1;
        if reward > 0.0 {
            log::info!("positive interdiction reward: {reward:.3}");
        }
    }

    fn greedy_action(&self, state: usize) -> usize {
        let row = &self.q[state];
        let mut best = 0;
        for (i, &v) in row.iter().enumerate() {
            if v > row[best] {
                best = i;
            }
        }
        best
    }

    fn max_q(&self, state: usize) -> f64 {
        self.q[state].iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn q_value(&self, state: usize, action: usize) -> f64 {
        self.q[state][action]
    }

    pub fn reward_history(&self) -> &[f64] {
        &self.reward_history
    }

    /// Visit count per state bucket.
    pub fn temporal_flags(&self) -> &[u64] {
        &self.temporal_flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn policy() -> InterdictionPolicy {
        InterdictionPolicy::new(&ScreenConfig::default())
    }

    #[test]
    fn bucket_clamps_to_table() {
        let p = policy();
        assert_eq!(p.bucket(0.0), 0);
        assert_eq!(p.bucket(0.55), 5);
        assert_eq!(p.bucket(1.0), 9);
        // Post-penalty scores above 1.0 land in the top bucket.
        assert_eq!(p.bucket(3.7), 9);
        assert_eq!(p.bucket(-0.2), 0);
    }

    #[test]
    fn update_applies_textbook_formula() {
        let mut p = policy();
        let cfg = ScreenConfig::default();
        p.update(2, 3, -5.0, 2);
        // Fresh table: max Q[next] = 0, predict = 0.
        let expected = cfg.alpha * (-5.0 + cfg.gamma * 0.0);
        assert!((p.q_value(2, 3) - expected).abs() < 1e-12);
        assert_eq!(p.reward_history(), &[-5.0]);
        assert_eq!(p.temporal_flags()[2], 1);
    }

    #[test]
    fn observe_penalizes_high_anomaly() {
        let mut p = policy();
        let mut rng = StdRng::seed_from_u64(17);
        let step = p.observe(0.8, &mut rng);
        assert_eq!(step.state, 8);
        assert!((step.reward + 8.0).abs() < 1e-12);
        assert!(step.action < 6);
    }

    #[test]
    fn visits_accumulate_per_state() {
        let mut p = policy();
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..5 {
            p.observe(0.31, &mut rng);
        }
        assert_eq!(p.temporal_flags()[3], 5);
        assert_eq!(p.reward_history().len(), 5);
    }
}
