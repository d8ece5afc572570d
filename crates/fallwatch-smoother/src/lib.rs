// SPDX-License-Identifier: MIT
// Copyright © 2026 Fallwatch Contributors

//! # fallwatch-smoother
//!
//! Per-keypoint adaptive low-pass filtering ("One-Euro filter") that
//! suppresses jitter in detected keypoint positions without inducing lag:
//! the signal's cutoff frequency grows with the observed speed of motion,
//! so fast genuine movement passes through with little smoothing while a
//! near-stationary point is heavily smoothed.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::f64::consts::PI;

use fallwatch_core::{Keypoint, Skeleton};

/// Smallest positive `dt` substituted for non-positive (out-of-order)
/// time deltas, per spec §4.2's failure-mode note.
const MIN_DT: f64 = 1e-6;

/// One-Euro filter parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmootherConfig {
    /// Minimum cutoff frequency in Hz; lower means smoother output.
    pub min_cutoff: f32,
    /// Speed coefficient; higher means more responsive to fast motion.
    pub beta: f32,
    /// Fixed cutoff frequency for the derivative smoother, in Hz.
    pub d_cutoff: f32,
    /// Visibility below which a keypoint's filters reset and the raw
    /// value is passed through unchanged.
    pub min_visibility: f32,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.007,
            d_cutoff: 1.0,
            min_visibility: 0.3,
        }
    }
}

/// Adaptive low-pass filter over a single scalar stream.
///
/// Maintains two exponential smoothers: one over the raw signal, one over
/// its numerical derivative. The derivative's magnitude drives the
/// signal's effective cutoff frequency.
#[derive(Debug, Clone, Copy)]
pub struct OneEuroFilter {
    min_cutoff: f64,
    beta: f64,
    d_cutoff: f64,
    state: Option<State>,
}

#[derive(Debug, Clone, Copy)]
struct State {
    t_prev: f64,
    x_prev: f64,
    dx_hat: f64,
    x_hat: f64,
}

impl OneEuroFilter {
    /// Creates a new filter with the given parameters.
    #[must_use]
    pub fn new(min_cutoff: f32, beta: f32, d_cutoff: f32) -> Self {
        Self {
            min_cutoff: f64::from(min_cutoff),
            beta: f64::from(beta),
            d_cutoff: f64::from(d_cutoff),
            state: None,
        }
    }

    fn alpha(cutoff: f64, dt: f64) -> f64 {
        let tau = 1.0 / (2.0 * PI * cutoff);
        1.0 / (1.0 + tau / dt)
    }

    /// Filters one sample at time `t`. The first sample initializes the
    /// filter and is returned unchanged.
    pub fn filter(&mut self, x: f32, t: f64) -> f32 {
        let x = f64::from(x);
        let Some(prev) = self.state else {
            self.state = Some(State {
                t_prev: t,
                x_prev: x,
                dx_hat: 0.0,
                x_hat: x,
            });
            #[allow(clippy::cast_possible_truncation)]
            return x as f32;
        };

        let mut dt = t - prev.t_prev;
        if dt <= 0.0 {
            dt = MIN_DT;
        }

        let dx = (x - prev.x_prev) / dt;
        let a_d = Self::alpha(self.d_cutoff, dt);
        let dx_hat = a_d.mul_add(dx, (1.0 - a_d) * prev.dx_hat);

        let cutoff = self.min_cutoff + self.beta * dx_hat.abs();
        let a = Self::alpha(cutoff, dt);
        let x_hat = a.mul_add(x, (1.0 - a) * prev.x_hat);

        self.state = Some(State {
            t_prev: t,
            x_prev: x,
            dx_hat,
            x_hat,
        });

        #[allow(clippy::cast_possible_truncation)]
        {
            x_hat as f32
        }
    }

    /// Zeroes all filter state, as if no samples had ever been seen.
    pub fn reset(&mut self) {
        self.state = None;
    }
}

/// Per-keypoint adaptive smoother: 17 keypoints x (x, y) = 34 underlying
/// [`OneEuroFilter`] instances.
#[derive(Debug, Clone)]
pub struct KeypointSmoother {
    config: SmootherConfig,
    filters: [[OneEuroFilter; 2]; 17],
}

impl KeypointSmoother {
    /// Creates a new smoother with the given configuration.
    #[must_use]
    pub fn new(config: SmootherConfig) -> Self {
        let filter = OneEuroFilter::new(config.min_cutoff, config.beta, config.d_cutoff);
        Self {
            config,
            filters: [[filter; 2]; 17],
        }
    }

    /// Smooths a skeleton's keypoints given the sample's timestamp.
    ///
    /// Visibility values pass through unchanged. A keypoint whose
    /// visibility is below the configured threshold has its filters
    /// reset and its raw position passed through, preventing "ghost"
    /// anchoring of a previously-tracked point.
    pub fn smooth(&mut self, skeleton: &Skeleton, t: f64) -> Skeleton {
        let mut out = *skeleton;
        for (i, kp) in skeleton.keypoints.iter().enumerate() {
            if kp.visibility < self.config.min_visibility {
                self.filters[i][0].reset();
                self.filters[i][1].reset();
                out.keypoints[i] = *kp;
                continue;
            }
            let x = self.filters[i][0].filter(kp.x, t);
            let y = self.filters[i][1].filter(kp.y, t);
            out.keypoints[i] = Keypoint::new(x, y, kp.visibility);
        }
        out
    }

    /// Resets every keypoint's filter state.
    pub fn reset(&mut self) {
        for pair in &mut self.filters {
            pair[0].reset();
            pair[1].reset();
        }
    }
}
