//! Control-thread command language.
//!
//! Each line typed at the control prompt maps to one [`ControlAction`]. Parts are addressed
//! by their row under the tree root, as shown by `tree`.

use crate::render::{Axis, Rgb};
use std::path::PathBuf;

/// High-level actions emitted by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    Load(PathBuf),
    StartVr,
    StopVr,
    Rotate { axis: Axis, degrees: f64 },
    SetVisible { row: usize, visible: bool },
    SetColour { row: usize, colour: Rgb },
    ShowTree,
    Help,
    Quit,
    NoAction,
    InvalidInput(String),
}

pub const HELP: &str = "\
commands:
  load <path>                 load an STL part under the root
  start | stop                start or stop the VR view
  rx|ry|rz <degrees>          rotation per animation tick about an axis
  show <row> | hide <row>     toggle a part's visibility
  colour <row> <r> <g> <b>    set a part's colour
  tree                        print the part tree
  quit";

pub fn parse_line(line: &str) -> ControlAction {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return ControlAction::NoAction;
    };
    let args: Vec<&str> = words.collect();

    match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("load", [_, ..]) => {
            // paths may contain spaces
            let path = line.trim_start()[verb.len()..].trim();
            ControlAction::Load(PathBuf::from(path))
        }
        ("start", []) => ControlAction::StartVr,
        ("stop", []) => ControlAction::StopVr,
        ("rx", [value]) => rotate(Axis::X, value),
        ("ry", [value]) => rotate(Axis::Y, value),
        ("rz", [value]) => rotate(Axis::Z, value),
        ("show", [row]) => visibility(row, true),
        ("hide", [row]) => visibility(row, false),
        ("colour" | "color", [row, r, g, b]) => {
            match (row.parse(), r.parse(), g.parse(), b.parse()) {
                (Ok(row), Ok(r), Ok(g), Ok(b)) => ControlAction::SetColour {
                    row,
                    colour: Rgb::new(r, g, b),
                },
                _ => invalid(line),
            }
        }
        ("tree", []) => ControlAction::ShowTree,
        ("help" | "?", []) => ControlAction::Help,
        ("quit" | "exit" | "q", []) => ControlAction::Quit,
        _ => invalid(line),
    }
}

fn rotate(axis: Axis, value: &str) -> ControlAction {
    match value.parse::<f64>() {
        Ok(degrees) if degrees.is_finite() => ControlAction::Rotate { axis, degrees },
        _ => invalid(value),
    }
}

fn visibility(row: &str, visible: bool) -> ControlAction {
    match row.parse() {
        Ok(row) => ControlAction::SetVisible { row, visible },
        Err(_) => invalid(row),
    }
}

fn invalid(input: &str) -> ControlAction {
    ControlAction::InvalidInput(input.trim().to_string())
}
