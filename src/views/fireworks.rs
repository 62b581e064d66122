use super::{Navigation, View};
use crate::config::Config;
use crate::fireworks::{Directives, FireworksEngine, STATIC_COLOR, TRAIL_COLOR};
use crate::motion::{self, MotionWatch};
use crate::prompt::Prompt;
use crate::scheduler::{Scheduler, TimerId};
use crate::surface::{Canvas, Rgb};
use crossterm::event::Event;
use std::io;
use std::time::Duration;

/// Stand-in for the display refresh.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wake {
    Frame,
    ShowPrompt,
    PollMotion,
}

pub struct FireworksView {
    engine: FireworksEngine<fastrand::Rng>,
    canvas: Canvas,
    background: Rgb,
    prompt: Option<Prompt>,
    watch: MotionWatch,
    timers: Scheduler<Wake>,
    frame: Option<TimerId>,
    prompt_timer: Option<TimerId>,
    dirty: bool,
}

impl FireworksView {
    pub fn new(config: &Config, cols: u16, rows: u16, rng: fastrand::Rng) -> Self {
        let background = config.background.unwrap_or(TRAIL_COLOR);
        let watch = MotionWatch::detect(
            config.motion_file.as_deref(),
            config.motion_toggle,
            config.reduced_motion,
        );
        let reduced = motion::initial(config.reduced_motion, config.motion_file.as_deref());

        let mut view = Self {
            engine: FireworksEngine::new(reduced, rng).with_trail(background),
            canvas: Canvas::new(cols, rows, background),
            background,
            prompt: config.prompt.then(Prompt::new),
            watch,
            timers: Scheduler::new(),
            frame: None,
            prompt_timer: None,
            dirty: true,
        };

        if view.watch.needs_polling() {
            view.timers.set_interval(motion::POLL_INTERVAL, Wake::PollMotion);
        }
        let directives = view.engine.start(&mut view.canvas);
        view.apply(directives);
        view
    }

    fn apply(&mut self, directives: Directives) {
        if directives.request_frame && self.frame.is_none() {
            self.frame = Some(self.timers.set_timeout(FRAME_INTERVAL, Wake::Frame));
        }
        if let Some(delay) = directives.arm_prompt {
            if let Some(id) = self.prompt_timer.take() {
                self.timers.cancel(id);
            }
            if let Some(prompt) = &mut self.prompt {
                prompt.hide();
            }
            self.prompt_timer = Some(self.timers.set_timeout(delay, Wake::ShowPrompt));
        }
    }

    fn set_reduced(&mut self, reduced: bool) {
        tracing::debug!(
            reduced,
            sparks = self.engine.sparks().len(),
            particles = self.engine.particles().len(),
            "motion preference changed"
        );
        let directives = self.engine.on_preference_change(reduced, &mut self.canvas);
        self.dirty = true;
        self.apply(directives);
    }

    fn show_prompt(&mut self) {
        self.prompt_timer = None;
        match &mut self.prompt {
            Some(prompt) => {
                prompt.show();
                self.dirty = true;
            }
            None => tracing::debug!("no prompt to show"),
        }
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt.as_ref().is_some_and(Prompt::is_visible)
    }

    pub fn animating(&self) -> bool {
        self.frame.is_some()
    }
}

impl View for FireworksView {
    fn tick(&mut self, now: Duration) {
        self.timers.advance(now);
        while let Some(wake) = self.timers.pop_due() {
            match wake {
                Wake::Frame => {
                    self.frame = None;
                    let directives = self.engine.on_frame(self.timers.now(), &mut self.canvas);
                    self.dirty = true;
                    self.apply(directives);
                }
                Wake::ShowPrompt => self.show_prompt(),
                Wake::PollMotion => {
                    if let Some(reduced) = self.watch.poll() {
                        self.set_reduced(reduced);
                    }
                }
            }
        }
    }

    fn render(&mut self, out: &mut Vec<u8>) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;

        self.canvas.render(out)?;
        if let Some(prompt) = &self.prompt {
            let (cols, rows) = self.canvas.cells();
            prompt.draw(out, cols, rows)?;
        }
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let base = if self.engine.reduced_motion() {
            STATIC_COLOR
        } else {
            self.background
        };
        self.canvas.resize(cols, rows, base);
        self.dirty = true;
    }

    fn handle_event(&mut self, event: &Event) -> Option<Navigation> {
        if let Some(reduced) = self.watch.on_event(event, self.engine.reduced_motion()) {
            self.set_reduced(reduced);
            return None;
        }

        let choice = self.prompt.as_ref()?.choose(event)?;
        tracing::info!(choice = choice.id, "prompt answered");
        Some(Navigation::Blessings)
    }
}
