use crossterm::event::Event;
use std::io;
use std::time::Duration;

pub mod blessings;
pub mod fireworks;

/// Where the app should go next. The current view is dropped and a fresh
/// one is built; nothing carries over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Fireworks,
    Blessings,
    Quit,
}

pub trait View {
    /// Runs every timer due at `now`, measured from when the view was built.
    fn tick(&mut self, now: Duration);

    /// Appends the escape sequences for the next screen update, or nothing
    /// if the screen is unchanged.
    fn render(&mut self, out: &mut Vec<u8>) -> io::Result<()>;

    fn resize(&mut self, cols: u16, rows: u16);

    fn handle_event(&mut self, _event: &Event) -> Option<Navigation> {
        None
    }
}
