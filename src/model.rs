use std::fmt;

use clap::ValueEnum;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Position of an output's top-left corner in the global screen space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ZERO: Position = Position { x: 0, y: 0 };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Size { Size { width, height } }

    pub fn area(self) -> u64 { self.width as u64 * self.height as u64 }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Stable identifier used to re-select a mode on its output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeId(String);

impl ModeId {
    pub fn new(id: impl Into<String>) -> ModeId { ModeId(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A resolution/refresh-rate combination supported by one output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mode {
    pub id: ModeId,
    pub size: Size,
    pub refresh: f64,
}

impl Mode {
    pub fn new(size: Size, refresh: f64) -> Mode {
        Mode {
            id: ModeId::new(format!("{size}@{refresh:.2}")),
            size,
            refresh,
        }
    }
}

/// One display connector as reported by the backend. Disconnected outputs are
/// carried through unchanged by every preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub connected: bool,
    pub enabled: bool,
    pub primary: bool,
    pub pos: Position,
    /// Available modes, in the order the backend enumerates them.
    pub modes: Vec<Mode>,
    pub current_mode: Option<ModeId>,
}

impl Output {
    pub fn mode(&self, id: &ModeId) -> Option<&Mode> { self.modes.iter().find(|m| &m.id == id) }

    /// Resolves `current_mode` against the mode list.
    pub fn current_mode(&self) -> Option<&Mode> {
        self.current_mode.as_ref().and_then(|id| self.mode(id))
    }
}

/// The full display state. `Clone` produces the independent deep copy used
/// for rollback snapshots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub outputs: Vec<Output>,
}

impl DisplayConfig {
    pub fn connected(&self) -> impl Iterator<Item = &Output> {
        self.outputs.iter().filter(|o| o.connected)
    }

    pub fn connected_mut(&mut self) -> impl Iterator<Item = &mut Output> {
        self.outputs.iter_mut().filter(|o| o.connected)
    }
}

/// Layout presets, index-mapped to the order a selection control lists them.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, Display, ValueEnum, Serialize, Deserialize,
)]
#[repr(u8)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// The blank selection row; applying it is a no-op.
    #[value(skip)]
    None = 0,
    Extended = 1,
    Unified = 2,
    OnlyFirst = 3,
    OnlySecond = 4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_maps_from_selection_index() {
        assert_eq!(Preset::try_from(0u8), Ok(Preset::None));
        assert_eq!(Preset::try_from(1u8), Ok(Preset::Extended));
        assert_eq!(Preset::try_from(2u8), Ok(Preset::Unified));
        assert_eq!(Preset::try_from(3u8), Ok(Preset::OnlyFirst));
        assert_eq!(Preset::try_from(4u8), Ok(Preset::OnlySecond));
        assert!(Preset::try_from(5u8).is_err());
    }

    #[test]
    fn current_mode_resolves_against_mode_list() {
        let mode = Mode::new(Size::new(1920, 1080), 60.0);
        let output = Output {
            name: "HDMI-1".to_string(),
            connected: true,
            enabled: true,
            primary: false,
            pos: Position::ZERO,
            modes: vec![mode.clone()],
            current_mode: Some(mode.id.clone()),
        };
        assert_eq!(output.current_mode(), Some(&mode));

        let dangling = Output {
            current_mode: Some(ModeId::new("gone")),
            ..output
        };
        assert_eq!(dangling.current_mode(), None);
    }

    #[test]
    fn size_area_does_not_overflow_u32() {
        let size = Size::new(16384, 16384);
        assert_eq!(size.area(), 268_435_456);
        assert_eq!(size.to_string(), "16384x16384");
    }
}
