use crate::error::{Error, Result};
use crate::random::Random;
use crate::scheduler::TimerId;
use crate::views::Navigation;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CYCLE_INTERVAL: Duration = Duration::from_millis(6000);

/// How long old text stays marked before the new text replaces it.
pub const TRANSITION_WINDOW: Duration = Duration::from_millis(180);

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Blessing {
    pub message: String,
    pub relation: String,
}

impl Blessing {
    pub fn new(message: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            relation: relation.into(),
        }
    }
}

const BUILTIN: [(&str, &str); 8] = [
    ("May every year ahead be brighter than the one behind you.", "from Mum"),
    ("Wishing you calm mornings, loud laughter and good coffee.", "from your sister"),
    ("Keep being the person who lights up every room.", "from an old friend"),
    ("May your plans be bold and your worries be small.", "from Dad"),
    ("Here's to more adventures, and safe roads home after each one.", "from your cousin"),
    ("I hope this year treats you as kindly as you treat others.", "from a colleague"),
    ("Health, luck, and a little bit of mischief. Happy celebrations!", "from Grandma"),
    ("Whatever you chase next, may it be worth the run.", "from your best friend"),
];

pub fn builtin() -> Vec<Blessing> {
    BUILTIN
        .iter()
        .map(|(message, relation)| Blessing::new(*message, *relation))
        .collect()
}

#[derive(Deserialize)]
struct BlessingFile {
    #[serde(default, rename = "blessing")]
    blessings: Vec<Blessing>,
}

/// Reads `[[blessing]]` tables with `message` and `relation` keys.
pub fn load(path: &Path) -> Result<Vec<Blessing>> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::BlessingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: BlessingFile = toml::from_str(&text).map_err(|source| Error::BlessingsParse {
        path: path.to_path_buf(),
        source,
    })?;
    if file.blessings.is_empty() {
        return Err(Error::NoBlessings);
    }
    tracing::debug!(count = file.blessings.len(), path = %path.display(), "blessings loaded");
    Ok(file.blessings)
}

/// What the rotator needs from whoever shows its text and runs its timer.
pub trait RotatorHost {
    fn present(&mut self, blessing: &Blessing, animate: bool);
    fn start_interval(&mut self, period: Duration) -> TimerId;
    fn cancel_timer(&mut self, id: TimerId);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserAction {
    Next,
    Back,
}

/// Walks a fixed list of blessings, forever, on a timer or on request.
pub struct BlessingRotator {
    entries: Vec<Blessing>,
    cursor: u64,
    cycle: Option<TimerId>,
}

impl BlessingRotator {
    pub fn new(entries: Vec<Blessing>, start: u64) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::NoBlessings);
        }
        Ok(Self {
            entries,
            cursor: start,
            cycle: None,
        })
    }

    pub fn with_random_start<R: Random>(entries: Vec<Blessing>, rng: &mut R) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::NoBlessings);
        }
        let start = rng.index(entries.len()) as u64;
        Self::new(entries, start)
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn index(&self) -> usize {
        (self.cursor % self.entries.len() as u64) as usize
    }

    pub fn current(&self) -> &Blessing {
        &self.entries[self.index()]
    }

    pub fn is_cycling(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn render<H: RotatorHost>(&self, host: &mut H, animate: bool) {
        host.present(self.current(), animate);
    }

    pub fn advance<H: RotatorHost>(&mut self, host: &mut H, restart_timer: bool) {
        self.cursor += 1;
        self.render(host, true);
        if restart_timer {
            self.restart_auto_cycle(host);
        }
    }

    pub fn start_auto_cycle<H: RotatorHost>(&mut self, host: &mut H) {
        if self.cycle.is_some() {
            return;
        }
        self.cycle = Some(host.start_interval(CYCLE_INTERVAL));
    }

    pub fn stop_auto_cycle<H: RotatorHost>(&mut self, host: &mut H) {
        if let Some(id) = self.cycle.take() {
            host.cancel_timer(id);
        }
    }

    fn restart_auto_cycle<H: RotatorHost>(&mut self, host: &mut H) {
        self.stop_auto_cycle(host);
        self.start_auto_cycle(host);
    }

    pub fn on_interval_tick<H: RotatorHost>(&mut self, host: &mut H) {
        self.advance(host, false);
    }

    pub fn on_visibility_change<H: RotatorHost>(&mut self, host: &mut H, visible: bool) {
        if visible {
            self.restart_auto_cycle(host);
        } else {
            self.stop_auto_cycle(host);
        }
    }

    pub fn on_user_action<H: RotatorHost>(&mut self, host: &mut H, action: UserAction) -> Option<Navigation> {
        match action {
            UserAction::Next => {
                self.advance(host, true);
                None
            }
            UserAction::Back => Some(Navigation::Fireworks),
        }
    }
}
