use crate::config::{Config, StartView};
use crate::error::{Error, Result};
use crate::random;
use crate::views::{Navigation, View, blessings::BlessingsView, fireworks::FireworksView};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::time::{Duration, Instant};

fn is_exit(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
        && (key.code == KeyCode::Char('q')
            || key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)))
}

fn open(
    target: Navigation,
    config: &Config,
    rng: &mut fastrand::Rng,
    (cols, rows): (u16, u16),
) -> Result<Option<Box<dyn View>>> {
    let view: Box<dyn View> = match target {
        Navigation::Fireworks => Box::new(FireworksView::new(config, cols, rows, rng.fork())),
        Navigation::Blessings => Box::new(BlessingsView::new(config, cols, rows, rng)?),
        Navigation::Quit => return Ok(None),
    };
    tracing::info!(?target, cols, rows, "view opened");
    Ok(Some(view))
}

/// Takes over the terminal until the user quits, restoring it afterwards
/// even when the loop fails.
pub fn run(config: &Config) -> Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    let result = execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableFocusChange)
        .map_err(Error::from)
        .and_then(|()| event_loop(config, &mut stdout));

    let restored = restore(&mut stdout);
    settle(result, restored)
}

/// Leaves the alternate screen and raw mode. Both steps always run.
fn restore<W: Write>(out: &mut W) -> io::Result<()> {
    let screen = execute!(out, DisableFocusChange, Show, LeaveAlternateScreen);
    let raw = terminal::disable_raw_mode();
    screen.and(raw)
}

/// The loop's own error wins over a failed restore.
fn settle(result: Result<()>, restored: io::Result<()>) -> Result<()> {
    if let Err(err) = &restored {
        tracing::warn!(%err, "terminal restore failed");
    }
    result?;
    Ok(restored?)
}

fn event_loop(config: &Config, stdout: &mut BufWriter<Stdout>) -> Result<()> {
    let mut rng = random::source(config.seed);
    let mut size = terminal::size()?;

    let start = match config.start {
        StartView::Fireworks => Navigation::Fireworks,
        StartView::Blessings => Navigation::Blessings,
    };
    let Some(mut view) = open(start, config, &mut rng, size)? else {
        return Ok(());
    };
    let mut opened = Instant::now();
    let mut frame = Vec::with_capacity(1024 * 64);

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            let target = match &event {
                Event::Key(key) if is_exit(key) => Some(Navigation::Quit),
                Event::Resize(cols, rows) => {
                    size = (*cols, *rows);
                    view.resize(*cols, *rows);
                    execute!(stdout, Clear(ClearType::All))?;
                    None
                }
                _ => view.handle_event(&event),
            };

            if let Some(target) = target {
                match open(target, config, &mut rng, size)? {
                    Some(next) => {
                        view = next;
                        opened = Instant::now();
                        execute!(stdout, Clear(ClearType::All))?;
                    }
                    None => break,
                }
            }
        }

        view.tick(opened.elapsed());

        frame.clear();
        view.render(&mut frame)?;
        if !frame.is_empty() {
            stdout.write_all(&frame)?;
            stdout.flush()?;
        }
    }

    tracing::info!("bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn exit_keys() {
        assert!(is_exit(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_exit(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_exit(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_exit(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_exit(&key(KeyCode::Char('n'), KeyModifiers::NONE)));
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn restore_reports_a_dead_terminal() {
        assert!(restore(&mut Broken).is_err());
        let mut out = Vec::new();
        restore(&mut out).unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn loop_error_outranks_restore_error() {
        let broken = || -> io::Result<()> { Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")) };
        assert!(matches!(settle(Err(Error::NoBlessings), broken()), Err(Error::NoBlessings)));
        assert!(matches!(settle(Ok(()), broken()), Err(Error::Io(_))));
        assert!(matches!(settle(Err(Error::NoBlessings), Ok(())), Err(Error::NoBlessings)));
        assert!(settle(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn open_builds_each_view() {
        let config = Config::default();
        let mut rng = random::source(Some(4));
        assert!(open(Navigation::Fireworks, &config, &mut rng, (80, 24)).unwrap().is_some());
        assert!(open(Navigation::Blessings, &config, &mut rng, (80, 24)).unwrap().is_some());
        assert!(open(Navigation::Quit, &config, &mut rng, (80, 24)).unwrap().is_none());
    }

    #[test]
    fn empty_blessings_fail_to_open() {
        let config = Config {
            blessings: Vec::new(),
            ..Config::default()
        };
        let mut rng = random::source(Some(4));
        assert!(open(Navigation::Blessings, &config, &mut rng, (80, 24)).is_err());
    }
}
