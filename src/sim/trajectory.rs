//! Target-seeking pitch trajectories
//!
//! Spin is modelled as a constant acceleration that produces the profile's
//! tabulated break over the whole flight. The initial velocity is solved so
//! that constant-acceleration motion from the release point reaches the
//! target exactly at the plate, then the path is sampled with a fixed-step
//! Euler integrator and snapped onto the plate plane.

use glam::{DVec2, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::profile::PitchProfile;
use super::random;
use crate::consts::*;
use crate::error::SimError;
use crate::in_strike_zone;

/// Arrival classification, fixed when the trajectory is solved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Strike,
    Ball,
}

impl Classification {
    pub fn of(point: DVec2) -> Self {
        if in_strike_zone(point) {
            Classification::Strike
        } else {
            Classification::Ball
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Strike => "Strike",
            Classification::Ball => "Ball",
        }
    }
}

/// Sampled path from release to the plate-front plane.
///
/// x = lateral, y = vertical, z = depth. Depth never increases and the last
/// sample always sits exactly on the plate plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    samples: Vec<DVec3>,
}

impl Trajectory {
    pub fn samples(&self) -> &[DVec3] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    /// Sample at `index`, clamped to the final point
    pub fn at(&self, index: usize) -> DVec3 {
        self.samples
            .get(index.min(self.last_index()))
            .copied()
            .unwrap_or(DVec3::new(0.0, 0.0, PLATE_FRONT_DEPTH_FT))
    }

    pub fn start(&self) -> DVec3 {
        self.at(0)
    }

    /// Where the pitch crosses the plate plane
    pub fn plate_point(&self) -> DVec3 {
        self.at(self.last_index())
    }

    pub fn classification(&self) -> Classification {
        Classification::of(self.plate_point().truncate())
    }
}

/// Kinematic solution for one pitch
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub flight_time: f64,
    /// Lateral/vertical acceleration (ft/s²)
    pub acceleration: DVec2,
    /// Initial velocity; z is the (negative) depth rate
    pub velocity: DVec3,
    pub trajectory: Trajectory,
    pub classification: Classification,
}

/// Time for a pitch of `speed_mph` to travel from release to the plate
pub fn flight_time(speed_mph: f64) -> Result<f64, SimError> {
    let speed = speed_mph * MPH_TO_FT_PER_SEC;
    let flight_time = (RELEASE_DEPTH_FT - PLATE_FRONT_DEPTH_FT) / speed;
    if !speed_mph.is_finite() || speed_mph <= 0.0 || !flight_time.is_finite() || flight_time <= 0.0 {
        return Err(SimError::DegenerateFlight {
            speed_mph,
            flight_time,
        });
    }
    Ok(flight_time)
}

/// Solve and sample the trajectory of `profile` aimed at `target` (lateral, vertical)
pub fn solve(profile: &PitchProfile, target: DVec2) -> Result<Solution, SimError> {
    profile.validate()?;
    if !target.is_finite() {
        return Err(SimError::InvalidProfile {
            pitch_type: profile.pitch_type.clone(),
            reason: "target must be finite".to_string(),
        });
    }

    let flight_time = flight_time(profile.speed_mph)?;
    let depth_speed = profile.speed_mph * MPH_TO_FT_PER_SEC;

    let acceleration = 2.0 * profile.movement_ft() / (flight_time * flight_time);
    let lateral_vertical_v =
        (target - profile.release) / flight_time - 0.5 * acceleration * flight_time;
    let velocity = DVec3::new(lateral_vertical_v.x, lateral_vertical_v.y, -depth_speed);

    let start = DVec3::new(profile.release.x, profile.release.y, RELEASE_DEPTH_FT);
    let samples = integrate(start, velocity, acceleration, target);
    let trajectory = Trajectory { samples };
    let classification = trajectory.classification();

    Ok(Solution {
        flight_time,
        acceleration,
        velocity,
        trajectory,
        classification,
    })
}

fn integrate(start: DVec3, velocity: DVec3, acceleration: DVec2, target: DVec2) -> Vec<DVec3> {
    let stop_depth = PLATE_FRONT_DEPTH_FT - PLATE_OVERSHOOT_FT;
    let accel = acceleration.extend(0.0);

    // Leave room for the plate-plane point
    let budget = MAX_TRAJECTORY_SAMPLES - 1;
    let mut samples = Vec::with_capacity(128);
    let mut pos = start;
    let mut vel = velocity;

    samples.push(pos);
    while samples.len() < budget && pos.z > stop_depth {
        vel += accel * INTEGRATION_DT;
        pos += vel * INTEGRATION_DT;
        samples.push(pos);
    }

    // First sample at or past the plate plane
    let crossing = samples
        .iter()
        .position(|p| p.z <= PLATE_FRONT_DEPTH_FT)
        .filter(|&i| i > 0);

    let plate_point = match crossing {
        Some(i) => {
            let prev = samples[i - 1];
            let last = samples[i];
            let frac = (prev.z - PLATE_FRONT_DEPTH_FT) / (prev.z - last.z);
            samples.truncate(i);
            let mut point = prev.lerp(last, frac);
            point.z = PLATE_FRONT_DEPTH_FT;
            point
        }
        None => {
            log::debug!("Integration hit the sample cap before reaching the plate");
            samples.retain(|p| p.z > PLATE_FRONT_DEPTH_FT);
            target.extend(PLATE_FRONT_DEPTH_FT)
        }
    };
    samples.push(plate_point);
    samples
}

/// Automatic-mode target: 60% inside the zone, otherwise just off a random side
pub fn sample_auto_target<R: Rng + ?Sized>(rng: &mut R) -> DVec2 {
    if random::unit(rng) < AUTO_STRIKE_CHANCE {
        let x = random::span(rng, STRIKE_ZONE_LEFT_FT, STRIKE_ZONE_RIGHT_FT - STRIKE_ZONE_LEFT_FT);
        let y = random::span(rng, STRIKE_ZONE_BOTTOM_FT, STRIKE_ZONE_TOP_FT - STRIKE_ZONE_BOTTOM_FT);
        DVec2::new(x, y)
    } else {
        let side = if random::coin(rng) { 1.0 } else { -1.0 };
        let x = side * random::span(rng, STRIKE_ZONE_RIGHT_FT, BALL_TARGET_MARGIN_FT);
        let y = random::span(
            rng,
            STRIKE_ZONE_BOTTOM_FT - BALL_TARGET_MARGIN_FT,
            STRIKE_ZONE_TOP_FT - STRIKE_ZONE_BOTTOM_FT + 2.0 * BALL_TARGET_MARGIN_FT,
        );
        DVec2::new(x, y)
    }
}
