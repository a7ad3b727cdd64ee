//! The four layout strategies. Each mutates connected outputs in place and
//! reports whether it touched anything; disconnected outputs are never
//! repositioned, toggled, or re-moded.

use crate::model::{DisplayConfig, Position, Preset, Size};

impl Preset {
    /// Runs the strategy against `config`. Returns false when nothing was
    /// changed, which callers use to skip the apply/confirm round entirely.
    pub fn apply_to(self, config: &mut DisplayConfig) -> bool {
        match self {
            Preset::None => false,
            Preset::Extended => extended(config),
            Preset::Unified => unified(config),
            Preset::OnlyFirst => only_first(config),
            Preset::OnlySecond => only_second(config),
        }
    }
}

/// Lays connected outputs out in a row, left to right in list order. The
/// first connected output becomes primary and sits at x = 0.
fn extended(config: &mut DisplayConfig) -> bool {
    let mut width = 0i32;
    let mut first = true;
    let mut touched = false;
    for output in config.connected_mut() {
        output.pos = Position { x: width, y: 0 };
        output.enabled = true;
        output.primary = first;
        first = false;
        if output.current_mode.is_none() {
            output.current_mode = output.modes.first().map(|m| m.id.clone());
        }
        // An output with no modes keeps width at its current value.
        if let Some(mode) = output.current_mode() {
            width += mode.size.width as i32;
        }
        touched = true;
    }
    touched
}

/// Mirrors every connected output at (0,0) on the largest mode size they all
/// share. Aborts without changing anything when no common size exists.
fn unified(config: &mut DisplayConfig) -> bool {
    let mut connected = config.connected();
    let mut common_sizes: Vec<Size> = match connected.next() {
        Some(first) => first.modes.iter().map(|m| m.size).collect(),
        None => Vec::new(),
    };
    for output in connected {
        common_sizes.retain(|size| output.modes.iter().any(|m| m.size == *size));
    }
    let Some(target) = largest_size(&common_sizes) else {
        return false;
    };
    for output in config.connected_mut() {
        output.pos = Position::ZERO;
        output.enabled = true;
        let mut max_refresh = 0.0f64;
        for mode in &output.modes {
            if mode.size == target && mode.refresh > max_refresh {
                output.current_mode = Some(mode.id.clone());
                max_refresh = mode.refresh;
            }
        }
    }
    true
}

/// Largest area wins; equal areas resolve to the wider size, and a full tie
/// keeps the earliest entry.
fn largest_size(sizes: &[Size]) -> Option<Size> {
    let mut best: Option<Size> = None;
    for &size in sizes {
        match best {
            Some(b) if size.area() < b.area() => {}
            Some(b) if size.area() == b.area() && size.width <= b.width => {}
            _ => best = Some(size),
        }
    }
    best
}

fn only_first(config: &mut DisplayConfig) -> bool {
    let mut found = false;
    let mut touched = false;
    for output in config.connected_mut() {
        output.pos = Position::ZERO;
        output.enabled = !found;
        found = true;
        touched = true;
    }
    touched
}

fn only_second(config: &mut DisplayConfig) -> bool {
    let mut first = true;
    let mut touched = false;
    for output in config.connected_mut() {
        output.pos = Position::ZERO;
        output.enabled = !first;
        first = false;
        touched = true;
    }
    touched
}
