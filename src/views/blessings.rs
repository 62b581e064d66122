use super::{Navigation, View};
use crate::blessings::{Blessing, BlessingRotator, RotatorHost, TRANSITION_WINDOW, UserAction};
use crate::config::Config;
use crate::error::Result;
use crate::fireworks::STATIC_COLOR;
use crate::scheduler::{Scheduler, TimerId};
use crate::surface::Rgb;
use crossterm::{
    cursor::MoveTo,
    event::{Event, KeyCode, KeyEventKind},
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io;
use std::time::Duration;

const INK: Color = Color::Rgb { r: 110, g: 50, b: 80 };
const FADED: Color = Color::Rgb { r: 215, g: 170, b: 190 };
const META: Color = Color::Rgb { r: 190, g: 90, b: 130 };
const HINT: &str = "[n] next   [b] back   [q] quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wake {
    Advance,
    Commit,
}

/// One text slot. While a transition is pending the old text stays up,
/// faded, and the incoming text waits.
#[derive(Debug, Default)]
struct TextRegion {
    text: String,
    incoming: Option<String>,
}

impl TextRegion {
    fn replace(&mut self, text: &str) {
        self.text = text.to_string();
        self.incoming = None;
    }

    fn begin(&mut self, text: &str) {
        self.incoming = Some(text.to_string());
    }

    fn commit(&mut self) {
        if let Some(text) = self.incoming.take() {
            self.text = text;
        }
    }

    fn transitioning(&self) -> bool {
        self.incoming.is_some()
    }
}

/// Message and meta regions plus the timers that drive them.
struct Stage {
    message: TextRegion,
    meta: TextRegion,
    commit: Option<TimerId>,
    timers: Scheduler<Wake>,
}

impl RotatorHost for Stage {
    fn present(&mut self, blessing: &Blessing, animate: bool) {
        if let Some(id) = self.commit.take() {
            self.timers.cancel(id);
        }
        if animate {
            self.message.begin(&blessing.message);
            self.meta.begin(&blessing.relation);
            self.commit = Some(self.timers.set_timeout(TRANSITION_WINDOW, Wake::Commit));
        } else {
            self.message.replace(&blessing.message);
            self.meta.replace(&blessing.relation);
        }
    }

    fn start_interval(&mut self, period: Duration) -> TimerId {
        self.timers.set_interval(period, Wake::Advance)
    }

    fn cancel_timer(&mut self, id: TimerId) {
        self.timers.cancel(id);
    }
}

pub struct BlessingsView {
    rotator: BlessingRotator,
    stage: Stage,
    background: Rgb,
    cols: u16,
    rows: u16,
    dirty: bool,
}

impl BlessingsView {
    pub fn new(config: &Config, cols: u16, rows: u16, rng: &mut fastrand::Rng) -> Result<Self> {
        let rotator = BlessingRotator::with_random_start(config.blessings.clone(), rng)?;
        let mut view = Self {
            rotator,
            stage: Stage {
                message: TextRegion::default(),
                meta: TextRegion::default(),
                commit: None,
                timers: Scheduler::new(),
            },
            background: config.background.unwrap_or(STATIC_COLOR),
            cols,
            rows,
            dirty: true,
        };
        view.rotator.render(&mut view.stage, false);
        view.rotator.start_auto_cycle(&mut view.stage);
        tracing::debug!(index = view.rotator.index(), "blessings view opened");
        Ok(view)
    }

    fn action(event: &Event) -> Option<UserAction> {
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Char('n') | KeyCode::Char(' ') | KeyCode::Right | KeyCode::Enter => Some(UserAction::Next),
            KeyCode::Char('b') | KeyCode::Left | KeyCode::Backspace => Some(UserAction::Back),
            _ => None,
        }
    }

    fn draw_region(&self, out: &mut Vec<u8>, region: &TextRegion, top: u16, color: Color) -> io::Result<u16> {
        let width = (self.cols as usize).saturating_sub(4).max(1);
        let lines = wrap(&region.text, width);
        let color = if region.transitioning() { FADED } else { color };
        queue!(out, SetForegroundColor(color))?;
        for (i, line) in lines.iter().enumerate() {
            let row = top + i as u16;
            if row >= self.rows {
                break;
            }
            let left = (self.cols as usize).saturating_sub(line.chars().count()) / 2;
            queue!(out, MoveTo(left as u16, row), Print(line))?;
        }
        Ok(lines.len() as u16)
    }
}

impl View for BlessingsView {
    fn tick(&mut self, now: Duration) {
        self.stage.timers.advance(now);
        while let Some(wake) = self.stage.timers.pop_due() {
            match wake {
                Wake::Advance => self.rotator.on_interval_tick(&mut self.stage),
                Wake::Commit => {
                    self.stage.commit = None;
                    self.stage.message.commit();
                    self.stage.meta.commit();
                }
            }
            self.dirty = true;
        }
    }

    fn render(&mut self, out: &mut Vec<u8>) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;

        let (r, g, b) = self.background;
        queue!(out, SetBackgroundColor(Color::Rgb { r, g, b }), Clear(ClearType::All))?;
        if self.cols < 8 || self.rows < 3 {
            return queue!(out, ResetColor);
        }

        let width = (self.cols as usize).saturating_sub(4).max(1);
        let height = wrap(&self.stage.message.text, width).len() as u16 + 2;
        let top = self.rows.saturating_sub(height) / 2;

        queue!(out, SetAttribute(Attribute::Bold))?;
        let used = self.draw_region(out, &self.stage.message, top, INK)?;
        queue!(out, SetAttribute(Attribute::NormalIntensity))?;
        self.draw_region(out, &self.stage.meta, top + used + 1, META)?;

        if self.rows > height + 2 && self.cols as usize >= HINT.len() {
            let left = (self.cols as usize - HINT.len()) / 2;
            queue!(
                out,
                SetForegroundColor(FADED),
                MoveTo(left as u16, self.rows - 1),
                Print(HINT)
            )?;
        }
        queue!(out, ResetColor)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.dirty = true;
    }

    fn handle_event(&mut self, event: &Event) -> Option<Navigation> {
        match event {
            Event::FocusLost | Event::FocusGained => {
                let visible = matches!(event, Event::FocusGained);
                self.rotator.on_visibility_change(&mut self.stage, visible);
                tracing::debug!(visible, cycling = self.rotator.is_cycling(), "visibility changed");
                None
            }
            _ => {
                let action = Self::action(event)?;
                self.dirty = true;
                let nav = self.rotator.on_user_action(&mut self.stage, action);
                tracing::debug!(?action, cursor = self.rotator.cursor(), "blessing action");
                if nav.is_some() {
                    tracing::info!("leaving blessings");
                }
                nav
            }
        }
    }
}

/// Greedy word wrap. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let len = line.chars().count();
        if len > 0 && len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn view() -> BlessingsView {
        let config = Config {
            blessings: ["A", "B", "C"].iter().map(|m| Blessing::new(*m, "meta")).collect(),
            ..Config::default()
        };
        BlessingsView::new(&config, 80, 24, &mut fastrand::Rng::with_seed(2)).unwrap()
    }

    #[test]
    fn first_render_is_instant() {
        let v = view();
        assert!(!v.stage.message.transitioning());
        assert_eq!(v.stage.message.text, v.rotator.current().message);
        assert!(v.rotator.is_cycling());
    }

    #[test]
    fn next_fades_then_swaps() {
        let mut v = view();
        let before = v.stage.message.text.clone();
        assert_eq!(v.handle_event(&key(KeyCode::Char('n'))), None);

        assert!(v.stage.message.transitioning());
        assert_eq!(v.stage.message.text, before);
        v.tick(ms(179));
        assert!(v.stage.message.transitioning());
        v.tick(ms(180));
        assert!(!v.stage.message.transitioning());
        assert_eq!(v.stage.message.text, v.rotator.current().message);
        assert_ne!(v.stage.message.text, before);
    }

    #[test]
    fn auto_cycle_advances_every_six_seconds() {
        let mut v = view();
        let start = v.rotator.cursor();
        v.tick(ms(5_999));
        assert_eq!(v.rotator.cursor(), start);
        v.tick(ms(6_000));
        assert_eq!(v.rotator.cursor(), start + 1);
        v.tick(ms(6_180));
        assert_eq!(v.stage.meta.text, "meta");
    }

    #[test]
    fn focus_loss_pauses_cycle() {
        let mut v = view();
        let start = v.rotator.cursor();
        v.tick(ms(4_000));
        v.handle_event(&Event::FocusLost);
        v.tick(ms(20_000));
        assert_eq!(v.rotator.cursor(), start);

        v.handle_event(&Event::FocusGained);
        v.tick(ms(25_999));
        assert_eq!(v.rotator.cursor(), start);
        v.tick(ms(26_000));
        assert_eq!(v.rotator.cursor(), start + 1);
    }

    #[test]
    fn back_goes_to_fireworks() {
        let mut v = view();
        let cursor = v.rotator.cursor();
        assert_eq!(v.handle_event(&key(KeyCode::Left)), Some(Navigation::Fireworks));
        assert_eq!(v.rotator.cursor(), cursor);
    }

    #[test]
    fn render_draws_message_and_hint() {
        let mut v = view();
        let mut out = Vec::new();
        v.render(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains(&v.rotator.current().message));
        assert!(text.contains("meta"));
        assert!(text.contains(HINT));

        out.clear();
        v.resize(4, 2);
        v.render(&mut out).unwrap();
        assert!(!String::from_utf8_lossy(&out).contains("meta"));
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap("may your days be bright", 10), vec!["may your", "days be", "bright"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 5), vec![""]);
    }
}
