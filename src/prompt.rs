use crossterm::{
    cursor::MoveTo,
    event::{Event, KeyCode, KeyEventKind},
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
};
use std::io::{self, Write};

#[derive(Debug, PartialEq, Eq)]
pub struct Choice {
    pub id: &'static str,
    pub key: char,
    pub label: &'static str,
}

pub static CHOICES: [Choice; 2] = [
    Choice {
        id: "yes",
        key: 'y',
        label: "Yes",
    },
    Choice {
        id: "of-course",
        key: 'o',
        label: "Of course",
    },
];

const TITLE: &str = "Will you accept a few wishes?";

const PANEL: Color = Color::Rgb { r: 255, g: 250, b: 252 };
const INK: Color = Color::Rgb { r: 120, g: 60, b: 90 };
const BUTTON: Color = Color::Rgb { r: 255, g: 143, b: 177 };

/// Overlay asking the viewer to move on once the show is over.
#[derive(Debug, Default)]
pub struct Prompt {
    visible: bool,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        if !self.visible {
            tracing::info!("prompt shown");
        }
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Choice picked by `event`, if the prompt is up.
    pub fn choose(&self, event: &Event) -> Option<&'static Choice> {
        if !self.visible {
            return None;
        }
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let KeyCode::Char(c) = key.code else {
            return None;
        };
        let c = c.to_ascii_lowercase();
        CHOICES.iter().find(|choice| choice.key == c)
    }

    fn buttons() -> String {
        CHOICES
            .iter()
            .map(|c| format!("[{}] {}", c.key, c.label))
            .collect::<Vec<_>>()
            .join("   ")
    }

    /// Centred box over whatever is on screen. Skipped when the terminal
    /// cannot fit it.
    pub fn draw<W: Write>(&self, out: &mut W, cols: u16, rows: u16) -> io::Result<()> {
        if !self.visible {
            return Ok(());
        }

        let buttons = Self::buttons();
        let inner = TITLE.chars().count().max(buttons.chars().count()) + 4;
        let (width, height) = (inner as u16, 5u16);
        if cols < width || rows < height {
            return Ok(());
        }

        let left = (cols - width) / 2;
        let top = (rows - height) / 2;
        let blank = " ".repeat(inner);

        queue!(out, SetBackgroundColor(PANEL), SetForegroundColor(INK))?;
        for row in 0..height {
            queue!(out, MoveTo(left, top + row), Print(&blank))?;
        }
        queue!(
            out,
            MoveTo(left + center(inner, TITLE), top + 1),
            SetAttribute(Attribute::Bold),
            Print(TITLE),
            SetAttribute(Attribute::NormalIntensity),
            MoveTo(left + center(inner, &buttons), top + 3),
            SetForegroundColor(BUTTON),
            Print(&buttons),
            ResetColor
        )?;
        Ok(())
    }
}

fn center(width: usize, text: &str) -> u16 {
    (width.saturating_sub(text.chars().count()) / 2) as u16
}
