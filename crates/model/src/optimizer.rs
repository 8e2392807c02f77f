//! Adam optimizer.
//!
//! One `Adam` instance tracks the moments of one parameter tensor; the
//! trainer keeps a pair per dense layer (weights, bias) and steps every
//! instance once per mini-batch.

/// Adam with bias correction
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    m: Vec<f32>, // First moment
    v: Vec<f32>, // Second moment
    t: usize,    // Timestep
}

impl Adam {
    pub fn new(dim: usize, lr: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            m: vec![0.0; dim],
            v: vec![0.0; dim],
            t: 0,
        }
    }

    /// Update `params` in place from `gradients`
    pub fn step(&mut self, params: &mut [f32], gradients: &[f32]) {
        debug_assert_eq!(params.len(), gradients.len());
        if self.m.len() != params.len() {
            self.m = vec![0.0; params.len()];
            self.v = vec![0.0; params.len()];
        }

        self.t += 1;
        let (beta1, beta2) = (self.beta1, self.beta2);
        let step_size = self.lr / (1.0 - beta1.powi(self.t as i32));
        let v_scale = 1.0 / (1.0 - beta2.powi(self.t as i32));

        let moments = self.m.iter_mut().zip(self.v.iter_mut());
        for ((p, &g), (m, v)) in params.iter_mut().zip(gradients).zip(moments) {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            *p -= step_size * *m / ((*v * v_scale).sqrt() + self.epsilon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut adam = Adam::new(2, 0.1);
        let mut params = vec![1.0, -1.0];
        adam.step(&mut params, &[0.5, -2.0]);

        // Bias-corrected first step is lr * sign(g)
        assert!((params[0] - 0.9).abs() < 1e-5);
        assert!((params[1] + 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_minimizes_quadratic() {
        let mut adam = Adam::new(1, 0.1);
        let mut x = vec![3.0f32];
        for _ in 0..500 {
            let grad = vec![2.0 * x[0]];
            adam.step(&mut x, &grad);
        }
        assert!(x[0].abs() < 0.05);
    }
}
