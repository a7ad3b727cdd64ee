//! Adapter for the xrandr(1) program, which owns output enumeration and the
//! actual configuration commit. `--dryrun` doubles as the validity gate.

use std::process::Command;

use tracing::{debug, trace};

use super::backend::{Backend, BackendError};
use crate::common::config::BackendSettings;
use crate::model::{DisplayConfig, Mode, Output, Position, Size};

pub struct XrandrBackend {
    program: String,
    extra_args: Vec<String>,
}

impl XrandrBackend {
    pub fn new(settings: &BackendSettings) -> Self {
        Self {
            program: "xrandr".to_string(),
            extra_args: settings.extra_args.clone(),
        }
    }

    fn run(&self, args: &[String]) -> Result<std::process::Output, BackendError> {
        trace!(?args, "running {}", self.program);
        let output = Command::new(&self.program)
            .args(&self.extra_args)
            .args(args)
            .output()
            .map_err(|source| BackendError::Spawn {
                command: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(BackendError::Failed {
                command: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }
}

impl Backend for XrandrBackend {
    fn snapshot(&mut self) -> Result<DisplayConfig, BackendError> {
        let output = self.run(&["--query".to_string()])?;
        parse_query(&String::from_utf8_lossy(&output.stdout))
    }

    fn can_apply(&self, config: &DisplayConfig) -> bool {
        let mut args = config_args(config);
        if args.is_empty() {
            return true;
        }
        args.push("--dryrun".to_string());
        match self.run(&args) {
            Ok(_) => true,
            Err(err) => {
                debug!(%err, "dry run rejected the layout");
                false
            }
        }
    }

    fn apply(&mut self, config: &DisplayConfig) -> Result<(), BackendError> {
        let args = config_args(config);
        if args.is_empty() {
            return Ok(());
        }
        self.run(&args)?;
        Ok(())
    }
}

/// Builds the argument list that brings the server to `config`. Disconnected
/// outputs are omitted so xrandr leaves them alone.
fn config_args(config: &DisplayConfig) -> Vec<String> {
    let mut args = Vec::new();
    for output in config.connected() {
        args.push("--output".to_string());
        args.push(output.name.clone());
        if !output.enabled {
            args.push("--off".to_string());
            continue;
        }
        match output.current_mode() {
            Some(mode) => {
                args.push("--mode".to_string());
                args.push(mode.size.to_string());
                args.push("--rate".to_string());
                args.push(format!("{:.2}", mode.refresh));
            }
            // No selectable mode recorded; let the server pick one.
            None => args.push("--auto".to_string()),
        }
        args.push("--pos".to_string());
        args.push(format!("{}x{}", output.pos.x, output.pos.y));
        if output.primary {
            args.push("--primary".to_string());
        }
    }
    args
}

fn parse_query(text: &str) -> Result<DisplayConfig, BackendError> {
    let mut outputs: Vec<Output> = Vec::new();
    for line in text.lines() {
        if line.is_empty() || line.starts_with("Screen ") {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            let Some(output) = outputs.last_mut() else {
                return Err(BackendError::Parse(line.to_string()));
            };
            parse_mode_line(line, output);
        } else {
            outputs.push(parse_output_line(line)?);
        }
    }
    Ok(DisplayConfig { outputs })
}

fn parse_output_line(line: &str) -> Result<Output, BackendError> {
    let mut tokens = line.split_whitespace();
    let (Some(name), Some(state)) = (tokens.next(), tokens.next()) else {
        return Err(BackendError::Parse(line.to_string()));
    };
    let connected = match state {
        "connected" => true,
        // "unknown connection" outputs are left alone, like disconnected ones.
        "disconnected" | "unknown" => false,
        _ => return Err(BackendError::Parse(line.to_string())),
    };
    let mut output = Output {
        name: name.to_string(),
        connected,
        enabled: false,
        primary: false,
        pos: Position::ZERO,
        modes: Vec::new(),
        current_mode: None,
    };
    for token in tokens {
        if token == "primary" {
            output.primary = true;
        } else if let Some(pos) = parse_geometry(token) {
            // A geometry field is only printed for active outputs.
            output.enabled = true;
            output.pos = pos;
        }
    }
    Ok(output)
}

/// `1920x1080+0+0` style geometry; offsets may be negative.
fn parse_geometry(token: &str) -> Option<Position> {
    let mut parts = token.split('+');
    let size = parts.next()?;
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let (w, h) = size.split_once('x')?;
    let (_, _): (u32, u32) = (w.parse().ok()?, h.parse().ok()?);
    Some(Position { x, y })
}

/// `   1920x1080  60.01*+  59.97`: one refresh column per mode, `*` marking
/// the mode the output is using and `+` the preferred one. Lines that do not
/// look like that (custom mode names and the like) are skipped.
fn parse_mode_line(line: &str, output: &mut Output) {
    let mut tokens = line.split_whitespace();
    let Some(size_token) = tokens.next() else {
        return;
    };
    // Interlaced modes print as e.g. 1920x1080i.
    let size_token = size_token.trim_end_matches('i');
    let Some((w, h)) = size_token.split_once('x') else {
        trace!(line, "ignoring unrecognised mode line");
        return;
    };
    let (Ok(width), Ok(height)) = (w.parse::<u32>(), h.parse::<u32>()) else {
        trace!(line, "ignoring unrecognised mode line");
        return;
    };
    let size = Size::new(width, height);
    for rate_token in tokens {
        let current = rate_token.contains('*');
        let Ok(refresh) = rate_token.trim_end_matches(['*', '+']).parse::<f64>() else {
            continue;
        };
        let mode = Mode::new(size, refresh);
        if current {
            output.current_mode = Some(mode.id.clone());
        }
        output.modes.push(mode);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ModeId;

    const QUERY: &str = "\
Screen 0: minimum 320 x 200, current 3840 x 1080, maximum 16384 x 16384
eDP-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 344mm x 194mm
   1920x1080     60.01*+  59.97    59.96
   1680x1050     59.95    59.88
   1280x1024     60.02
HDMI-1 connected 1920x1080+1920+0 (normal left inverted right x axis y axis) 527mm x 296mm
   1920x1080     60.00*+  50.00    59.94
   1920x1080i    60.00    50.00
   1280x720      60.00    50.00    59.94
DP-1 disconnected (normal left inverted right x axis y axis)
";

    #[test]
    fn parses_connected_and_disconnected_outputs() {
        let config = parse_query(QUERY).unwrap();
        assert_eq!(config.outputs.len(), 3);

        let edp = &config.outputs[0];
        assert_eq!(edp.name, "eDP-1");
        assert!(edp.connected && edp.enabled && edp.primary);
        assert_eq!(edp.pos, Position::ZERO);
        assert_eq!(edp.modes.len(), 6);
        assert_eq!(edp.current_mode, Some(ModeId::new("1920x1080@60.01")));

        let hdmi = &config.outputs[1];
        assert!(hdmi.connected && hdmi.enabled && !hdmi.primary);
        assert_eq!(hdmi.pos, Position { x: 1920, y: 0 });
        assert_eq!(hdmi.modes.len(), 8);
        // The interlaced row keeps its size but stays a distinct mode entry.
        assert_eq!(hdmi.modes[3].size, Size::new(1920, 1080));

        let dp = &config.outputs[2];
        assert!(!dp.connected && !dp.enabled);
        assert!(dp.modes.is_empty());
        assert_eq!(dp.current_mode, None);
    }

    #[test]
    fn mode_order_follows_the_listing() {
        let config = parse_query(QUERY).unwrap();
        let sizes: Vec<Size> = config.outputs[0].modes.iter().map(|m| m.size).collect();
        assert_eq!(sizes[0], Size::new(1920, 1080));
        assert_eq!(sizes[3], Size::new(1680, 1050));
        assert_eq!(sizes[5], Size::new(1280, 1024));
    }

    #[test]
    fn geometry_offsets_may_be_negative() {
        let line = "DP-2 connected 1920x1080+-1920+0 (normal left inverted right) 527mm x 296mm";
        let output = parse_output_line(line).unwrap();
        assert!(output.enabled);
        assert_eq!(output.pos, Position { x: -1920, y: 0 });
    }

    #[test]
    fn garbage_output_line_is_an_error() {
        assert!(matches!(
            parse_query("not an xrandr listing\n"),
            Err(BackendError::Parse(_))
        ));
    }

    #[test]
    fn mode_line_before_any_output_is_an_error() {
        assert!(matches!(
            parse_query("   1920x1080  60.00\n"),
            Err(BackendError::Parse(_))
        ));
    }

    #[test]
    fn custom_mode_names_are_skipped_not_fatal() {
        let text = "\
eDP-1 connected primary 1920x1080+0+0 (normal) 344mm x 194mm
   1920x1080     60.01*+
   3840x2160_30.00  30.00
";
        let config = parse_query(text).unwrap();
        assert_eq!(config.outputs[0].modes.len(), 1);
    }

    #[test]
    fn args_cover_enabled_disabled_and_primary() {
        let shared = Mode::new(Size::new(1920, 1080), 60.0);
        let config = DisplayConfig {
            outputs: vec![
                Output {
                    name: "eDP-1".to_string(),
                    connected: true,
                    enabled: true,
                    primary: true,
                    pos: Position::ZERO,
                    modes: vec![shared.clone()],
                    current_mode: Some(shared.id.clone()),
                },
                Output {
                    name: "HDMI-1".to_string(),
                    connected: true,
                    enabled: false,
                    primary: false,
                    pos: Position { x: 1920, y: 0 },
                    modes: vec![shared.clone()],
                    current_mode: Some(shared.id.clone()),
                },
                Output {
                    name: "DP-1".to_string(),
                    connected: false,
                    enabled: false,
                    primary: false,
                    pos: Position::ZERO,
                    modes: vec![],
                    current_mode: None,
                },
            ],
        };
        let args = config_args(&config);
        assert_eq!(
            args,
            vec![
                "--output", "eDP-1", "--mode", "1920x1080", "--rate", "60.00", "--pos", "0x0",
                "--primary", "--output", "HDMI-1", "--off",
            ]
        );
        assert!(!args.iter().any(|a| a == "DP-1"));
    }

    #[test]
    fn args_fall_back_to_auto_without_a_resolvable_mode() {
        let config = DisplayConfig {
            outputs: vec![Output {
                name: "eDP-1".to_string(),
                connected: true,
                enabled: true,
                primary: false,
                pos: Position { x: 0, y: 0 },
                modes: vec![],
                current_mode: None,
            }],
        };
        assert_eq!(
            config_args(&config),
            vec!["--output", "eDP-1", "--auto", "--pos", "0x0"]
        );
    }
}
