use rand::seq::SliceRandom;
use rand::Rng;

use crate::session::ClearedStage;

const STAR: char = '★';
const COIN: char = '●';
const SPARKS: [char; 4] = ['✦', '✧', '·', '*'];

/// Fixed animation step per frame, in seconds
pub const FRAME_DT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Star,
    Coin,
    Spark,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub kind: ParticleKind,
    pub age: f64,
    pub max_age: f64,
}

impl Particle {
    fn burst<R: Rng>(x: f64, y: f64, kind: ParticleKind, rng: &mut R) -> Self {
        let symbol = match kind {
            ParticleKind::Star => STAR,
            ParticleKind::Coin => COIN,
            ParticleKind::Spark => *SPARKS.choose(rng).unwrap_or(&'*'),
        };

        Self {
            x,
            y,
            vel_x: rng.gen_range(-4.0..4.0),
            vel_y: rng.gen_range(-5.0..-1.5),
            symbol,
            kind,
            age: 0.0,
            max_age: rng.gen_range(2.0..3.5),
        }
    }

    /// Advance one step under gravity; false once the particle has expired
    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += 9.0 * dt;
        self.age += dt;
        self.age < self.max_age
    }

    pub fn fade(&self) -> f64 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

/// Burst of stars and coins shown while a stage-clear banner is up
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    pub elapsed: f64,
    pub duration: f64,
    pub is_active: bool,
    pub width: f64,
    pub height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            elapsed: 0.0,
            duration: 3.0,
            is_active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    /// Three stars per earned star, a coin per five coins, plus sparks
    pub fn start(&mut self, width: u16, height: u16, cleared: &ClearedStage) {
        self.start_with(width, height, cleared, &mut rand::thread_rng());
    }

    pub fn start_with<R: Rng>(&mut self, width: u16, height: u16, cleared: &ClearedStage, rng: &mut R) {
        self.particles.clear();
        self.elapsed = 0.0;
        self.is_active = true;
        self.width = width as f64;
        self.height = height as f64;

        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        let coins = (cleared.reward.coins / 5).max(1);

        let kinds = std::iter::repeat(ParticleKind::Star)
            .take(cleared.reward.stars as usize * 3)
            .chain(std::iter::repeat(ParticleKind::Coin).take(coins as usize))
            .chain(std::iter::repeat(ParticleKind::Spark).take(20));

        for kind in kinds {
            let x = cx + rng.gen_range(-12.0..12.0);
            let y = cy + rng.gen_range(-3.0..3.0);
            self.particles.push(Particle::burst(x, y, kind, rng));
        }
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        self.elapsed += FRAME_DT;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let margin = 3.0;
        let (width, height) = (self.width, self.height);
        self.particles.retain_mut(|p| {
            let alive = p.update(FRAME_DT);
            let off_screen = p.y > height + margin || p.x < -margin || p.x > width + margin;
            alive && !off_screen
        });
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}
