use crate::random::Random;
use crate::surface::{Rgb, Surface};
use std::f32::consts::PI;
use std::time::Duration;

pub const PALETTE: [Rgb; 5] = [
    (0xff, 0x8f, 0xb1), // rose
    (0xff, 0xd1, 0x66), // marigold
    (0xc3, 0xa7, 0xff), // lavender
    (0x7e, 0xd6, 0xff), // sky
    (0xff, 0xb9, 0x97), // peach
];

/// Tint of the translucent overlay painted every frame.
pub const TRAIL_COLOR: Rgb = (255, 245, 251);
const TRAIL_ALPHA: f32 = 0.18;

/// Still background painted when motion is reduced.
pub const STATIC_COLOR: Rgb = (0xff, 0xdc, 0xe9);

pub const LAUNCH_INTERVAL: Duration = Duration::from_millis(420);
pub const PROMPT_DELAY: Duration = Duration::from_millis(12_000);

const SPARK_GRAVITY: f32 = 180.0;
const PARTICLE_GRAVITY: f32 = 50.0;

const BURST_MIN: usize = 26;
const BURST_SPREAD: usize = 15;

#[derive(Clone, Debug, PartialEq)]
pub struct Spark {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub target_y: f32,
    pub color: Rgb,
}

impl Spark {
    fn step(&mut self, dt: f32) {
        self.y += self.vy * dt;
        self.vy += SPARK_GRAVITY * dt;
    }

    /// Reached its apex or stopped climbing.
    fn spent(&self) -> bool {
        self.y <= self.target_y || self.vy >= 0.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub alpha: f32,
    pub decay: f32,
    pub color: Rgb,
}

impl Particle {
    fn step(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.vy += PARTICLE_GRAVITY * dt;
        self.alpha -= self.decay;
    }
}

/// What the host should do after an engine transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Directives {
    /// Schedule another `on_frame`.
    pub request_frame: bool,
    /// Hide the prompt, drop any pending completion timer and arm a new one
    /// with this delay.
    pub arm_prompt: Option<Duration>,
}

pub struct FireworksEngine<R> {
    sparks: Vec<Spark>,
    particles: Vec<Particle>,
    last_frame: Option<Duration>,
    last_launch: Duration,
    reduced_motion: bool,
    trail: Rgb,
    rng: R,
}

impl<R: Random> FireworksEngine<R> {
    pub fn new(reduced_motion: bool, rng: R) -> Self {
        Self {
            sparks: Vec::new(),
            particles: Vec::new(),
            last_frame: None,
            last_launch: Duration::ZERO,
            reduced_motion,
            trail: TRAIL_COLOR,
            rng,
        }
    }

    /// Overrides the overlay tint.
    pub fn with_trail(mut self, trail: Rgb) -> Self {
        self.trail = trail;
        self
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// First paint. Either starts the frame loop with the full prompt delay or
    /// paints a still background and asks for the prompt right away.
    pub fn start<S: Surface>(&mut self, surface: &mut S) -> Directives {
        if self.reduced_motion {
            surface.fill(STATIC_COLOR);
            tracing::debug!("reduced motion at start, skipping animation");
            return Directives {
                request_frame: false,
                arm_prompt: Some(Duration::ZERO),
            };
        }
        Directives {
            request_frame: true,
            arm_prompt: Some(PROMPT_DELAY),
        }
    }

    /// One display frame at `now` (time since the view started).
    pub fn on_frame<S: Surface>(&mut self, now: Duration, surface: &mut S) -> Directives {
        if self.reduced_motion {
            self.clear();
            surface.fill(STATIC_COLOR);
            return Directives::default();
        }

        // Elapsed time stays a Duration; only the per-frame step becomes f32.
        let dt = match self.last_frame {
            Some(last) => now.saturating_sub(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_frame = Some(now);

        surface.fade(self.trail, TRAIL_ALPHA);

        if now.saturating_sub(self.last_launch) > LAUNCH_INTERVAL {
            let (w, h) = surface.logical_size();
            self.launch(w, h);
            self.last_launch = now;
        }

        let mut bursts = Vec::new();
        self.sparks.retain_mut(|spark| {
            spark.step(dt);
            surface.glow(spark.x, spark.y, 3.0, 25.0, spark.color, 1.0);
            if spark.spent() {
                bursts.push((spark.x, spark.y, spark.color));
                false
            } else {
                true
            }
        });
        for (x, y, color) in bursts {
            self.burst(x, y, color);
        }

        self.particles.retain_mut(|particle| {
            particle.step(dt);
            surface.glow(particle.x, particle.y, 2.0, 15.0, particle.color, particle.alpha);
            particle.alpha > 0.0
        });

        Directives {
            request_frame: true,
            arm_prompt: None,
        }
    }

    /// Host accessibility preference changed.
    pub fn on_preference_change<S: Surface>(&mut self, reduced: bool, surface: &mut S) -> Directives {
        if reduced == self.reduced_motion {
            return Directives::default();
        }
        self.reduced_motion = reduced;
        self.clear();

        if reduced {
            tracing::info!("motion reduced, animation stopped");
            surface.fill(STATIC_COLOR);
            return Directives {
                request_frame: false,
                arm_prompt: Some(Duration::ZERO),
            };
        }

        tracing::info!("motion restored, animation restarted");
        self.last_frame = None;
        self.last_launch = Duration::ZERO;
        Directives {
            request_frame: true,
            arm_prompt: Some(PROMPT_DELAY),
        }
    }

    fn clear(&mut self) {
        self.sparks.clear();
        self.particles.clear();
    }

    fn launch(&mut self, width: f32, height: f32) {
        let color = PALETTE[self.rng.index(PALETTE.len())];
        let spark = Spark {
            x: self.rng.range(width * 0.2, width * 0.8),
            y: height + 20.0,
            vy: self.rng.range(-420.0, -360.0),
            target_y: self.rng.range(height * 0.2, height * 0.45),
            color,
        };
        tracing::trace!(x = spark.x, target_y = spark.target_y, "launch");
        self.sparks.push(spark);
    }

    /// Replaces a spent spark with a ring of 26 to 40 fading particles.
    pub fn burst(&mut self, x: f32, y: f32, color: Rgb) {
        let count = BURST_MIN + self.rng.index(BURST_SPREAD);
        self.particles.reserve(count);
        for _ in 0..count {
            let angle = self.rng.unit() * PI * 2.0;
            let speed = self.rng.range(60.0, 160.0);
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                alpha: 1.0,
                decay: self.rng.range(0.01, 0.03),
                color,
            });
        }
        tracing::trace!(count, "burst");
    }
}
