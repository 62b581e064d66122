use crate::blessings::Blessing;
use crate::error::Error;
use crate::surface::Rgb;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StartView {
    Fireworks,
    Blessings,
}

/// Everything the views need, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub start: StartView,
    /// Overrides the pale trail/background tint.
    pub background: Option<Rgb>,
    pub reduced_motion: bool,
    pub motion_file: Option<PathBuf>,
    pub motion_toggle: bool,
    pub prompt: bool,
    pub blessings: Vec<Blessing>,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start: StartView::Fireworks,
            background: None,
            reduced_motion: false,
            motion_file: None,
            motion_toggle: true,
            prompt: true,
            blessings: crate::blessings::builtin(),
            seed: None,
        }
    }
}

pub fn parse_hex_color(hex: &str) -> Result<Rgb, Error> {
    let invalid = || Error::InvalidColor(hex.to_string());
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).map_err(|_| invalid());
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
