use rand::Rng;
use std::f64::consts::TAU;

use crate::config::{EffectsConfig, Theme};
use crate::gesture::Vector;

const FALLBACK_COLOR: &str = "#ffffff";
const BURST_MIN_TRAVEL_PX: f64 = 50.0;
const BURST_EXTRA_TRAVEL_PX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Confetti,
    Sparkle,
    Burst,
}

impl ParticleKind {
    pub fn class(self) -> &'static str {
        match self {
            ParticleKind::Confetti => "confetti-piece",
            ParticleKind::Sparkle => "sparkle",
            ParticleKind::Burst => "burst-particle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub left_pct: f64,
    pub top_pct: f64,
    pub color: String,
    pub delay_s: f64,
    pub duration_s: f64,
    /// End displacement for bursts; zero for the others.
    pub travel: Vector,
}

impl Particle {
    pub fn style(&self) -> String {
        match self.kind {
            ParticleKind::Confetti => format!(
                "left: {:.2}%; background-color: {}; animation-delay: {:.2}s; animation-duration: {:.2}s;",
                self.left_pct, self.color, self.delay_s, self.duration_s
            ),
            ParticleKind::Sparkle => format!(
                "left: {:.2}%; top: {:.2}%; animation-delay: {:.2}s; animation-duration: {:.2}s;",
                self.left_pct, self.top_pct, self.delay_s, self.duration_s
            ),
            ParticleKind::Burst => format!(
                "left: {:.2}%; top: {:.2}%; background-color: {}; --burst-x: {:.1}px; --burst-y: {:.1}px; animation-duration: {:.2}s;",
                self.left_pct, self.top_pct, self.color, self.travel.x, self.travel.y, self.duration_s
            ),
        }
    }
}

fn pick_color(rng: &mut impl Rng, palette: &[String]) -> String {
    if palette.is_empty() {
        return FALLBACK_COLOR.to_string();
    }
    palette[rng.gen_range(0..palette.len())].clone()
}

pub fn confetti(rng: &mut impl Rng, count: usize, palette: &[String]) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            kind: ParticleKind::Confetti,
            left_pct: rng.gen_range(0.0..100.0),
            top_pct: 0.0,
            color: pick_color(rng, palette),
            delay_s: rng.gen_range(0.0..3.0),
            duration_s: rng.gen_range(2.0..5.0),
            travel: Vector::ZERO,
        })
        .collect()
}

pub fn sparkles(rng: &mut impl Rng, count: usize) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            kind: ParticleKind::Sparkle,
            left_pct: rng.gen_range(0.0..100.0),
            top_pct: rng.gen_range(0.0..100.0),
            color: FALLBACK_COLOR.to_string(),
            delay_s: rng.gen_range(0.0..2.0),
            duration_s: 1.0,
            travel: Vector::ZERO,
        })
        .collect()
}

/// A single floating sparkle with no delay, used for the idle shimmer.
pub fn ambient_sparkle(rng: &mut impl Rng, lifetime_ms: u32) -> Particle {
    Particle {
        kind: ParticleKind::Sparkle,
        left_pct: rng.gen_range(0.0..100.0),
        top_pct: rng.gen_range(0.0..100.0),
        color: FALLBACK_COLOR.to_string(),
        delay_s: 0.0,
        duration_s: f64::from(lifetime_ms) / 1000.0,
        travel: Vector::ZERO,
    }
}

/// Particles flying outward from the stack centre at even angles.
pub fn burst(rng: &mut impl Rng, count: usize, palette: &[String], lifetime_ms: u32) -> Vec<Particle> {
    (0..count)
        .map(|i| {
            let angle = i as f64 / count as f64 * TAU;
            let distance = BURST_MIN_TRAVEL_PX + rng.gen_range(0.0..BURST_EXTRA_TRAVEL_PX);
            let color = if palette.is_empty() {
                FALLBACK_COLOR.to_string()
            } else {
                palette[i % palette.len()].clone()
            };
            Particle {
                kind: ParticleKind::Burst,
                left_pct: 50.0,
                top_pct: 50.0,
                color,
                delay_s: 0.0,
                duration_s: f64::from(lifetime_ms) / 1000.0,
                travel: Vector::new(angle.cos() * distance, angle.sin() * distance),
            }
        })
        .collect()
}

/// Batches fired for an accepted swipe, each paired with its lifetime.
pub fn swipe_celebration(
    rng: &mut impl Rng,
    config: &EffectsConfig,
    theme: &Theme,
) -> Vec<(Vec<Particle>, u32)> {
    vec![
        (
            confetti(rng, config.confetti_count, &theme.confetti_colors),
            config.confetti_lifetime_ms,
        ),
        (sparkles(rng, config.sparkle_count), config.sparkle_lifetime_ms),
        (
            burst(rng, config.burst_count, &theme.burst_colors, config.burst_lifetime_ms),
            config.burst_lifetime_ms,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub id: u64,
    pub particles: Vec<Particle>,
}

/// Live particle batches. Each batch is removed by id once its timer fires.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectsLayer {
    batches: Vec<Batch>,
    next_id: u64,
}

impl EffectsLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, particles: Vec<Particle>) -> Option<u64> {
        if particles.is_empty() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.batches.push(Batch { id, particles });
        Some(id)
    }

    pub fn expire(&mut self, id: u64) -> bool {
        let before = self.batches.len();
        self.batches.retain(|batch| batch.id != id);
        self.batches.len() != before
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn particle_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.particles.len()).sum()
    }
}
