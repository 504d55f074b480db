//! Typeface JSON fonts.
//!
//! The descriptor maps each character to an advance width (`ha`) and an
//! outline string (`o`) of whitespace-separated commands in font units:
//!
//! | Command | Operands | Meaning |
//! |---|---|---|
//! | `m` | `x y` | start a new contour |
//! | `l` | `x y` | line to |
//! | `q` | `x y cx cy` | quadratic curve to `(x, y)` with control `(cx, cy)` |
//! | `b` | `x y c1x c1y c2x c2y` | cubic curve to `(x, y)` |
//!
//! Note the end point comes first in the curve commands.

use glam::Vec2;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::FontError;

/// A closed polyline. The last point connects back to the first.
pub type Contour = Vec<Vec2>;

#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    pub glyphs: HashMap<String, Glyph>,
    #[serde(default = "default_resolution")]
    pub resolution: f32,
    #[serde(rename = "boundingBox", default)]
    pub bounding_box: BoundingBox,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: f32,
    #[serde(rename = "familyName", default)]
    pub family_name: String,
}

fn default_resolution() -> f32 {
    1000.0
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units.
    #[serde(default)]
    pub ha: f32,
    /// Outline commands; absent for blank glyphs such as space.
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "yMin", default)]
    pub y_min: f32,
    #[serde(rename = "yMax", default)]
    pub y_max: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    CubicTo { ctrl1: Vec2, ctrl2: Vec2, to: Vec2 },
}

/// Parse a glyph outline string into path commands.
pub fn parse_outline(glyph: char, outline: &str) -> Result<Vec<PathCommand>, FontError> {
    let tokens: Vec<&str> = outline.split_whitespace().collect();
    let mut commands = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let op = tokens[i];
        let operands = match op {
            "m" | "l" => 2,
            "q" => 4,
            "b" => 6,
            // a trailing `z` closes the contour, which every contour already is
            "z" => {
                i += 1;
                continue;
            }
            _ => {
                return Err(FontError::MalformedOutline {
                    glyph,
                    command: op.to_string(),
                })
            }
        };

        let args = tokens
            .get(i + 1..i + 1 + operands)
            .ok_or_else(|| FontError::MalformedOutline {
                glyph,
                command: tokens[i..].join(" "),
            })?;
        let mut values = [0.0f32; 6];
        for (slot, token) in values.iter_mut().zip(args) {
            *slot = token.parse().map_err(|_| FontError::MalformedOutline {
                glyph,
                command: format!("{} {}", op, args.join(" ")),
            })?;
        }
        let point = |k: usize| Vec2::new(values[k * 2], values[k * 2 + 1]);

        commands.push(match op {
            "m" => PathCommand::MoveTo(point(0)),
            "l" => PathCommand::LineTo(point(0)),
            "q" => PathCommand::QuadTo {
                to: point(0),
                ctrl: point(1),
            },
            _ => PathCommand::CubicTo {
                to: point(0),
                ctrl1: point(1),
                ctrl2: point(2),
            },
        });
        i += 1 + operands;
    }

    Ok(commands)
}

/// Flatten path commands into closed contours, `segments` points per curve.
pub fn flatten(commands: &[PathCommand], segments: u32) -> Vec<Contour> {
    let segments = segments.max(1);
    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();
    let mut pen = Vec2::ZERO;

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                finish_contour(&mut contours, std::mem::take(&mut current));
                current.push(p);
                pen = p;
            }
            PathCommand::LineTo(p) => {
                current.push(p);
                pen = p;
            }
            PathCommand::QuadTo { ctrl, to } => {
                for s in 1..=segments {
                    let t = s as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push(pen * (u * u) + ctrl * (2.0 * u * t) + to * (t * t));
                }
                pen = to;
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                for s in 1..=segments {
                    let t = s as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push(
                        pen * (u * u * u) + ctrl1 * (3.0 * u * u * t) + ctrl2 * (3.0 * u * t * t) + to * (t * t * t),
                    );
                }
                pen = to;
            }
        }
    }
    finish_contour(&mut contours, current);
    contours
}

fn finish_contour(contours: &mut Vec<Contour>, mut contour: Contour) {
    contour.dedup_by(|a, b| a.distance_squared(*b) < 1e-12);
    while contour.len() > 1 && contour[0].distance_squared(contour[contour.len() - 1]) < 1e-12 {
        contour.pop();
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}

impl Typeface {
    pub fn from_json_str(json: &str) -> Result<Self, FontError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FontError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Font units to scene units at `size`.
    pub fn scale(&self, size: f32) -> f32 {
        size / self.resolution
    }

    pub fn line_height(&self, size: f32) -> f32 {
        (self.bounding_box.y_max - self.bounding_box.y_min + self.underline_thickness) * self.scale(size)
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs
            .get(&*c.encode_utf8(&mut buf))
            .or_else(|| self.glyphs.get("?"))
    }

    /// Lay out `text` and return the contours of each glyph in scene units.
    ///
    /// Glyphs run left to right from the origin; `\n` starts a new line below.
    /// Characters the font lacks (and no `?` fallback) advance by half the size.
    pub fn layout(&self, text: &str, size: f32, curve_segments: u32) -> Result<Vec<Vec<Contour>>, FontError> {
        let scale = self.scale(size);
        let line_height = self.line_height(size);
        let mut offset = Vec2::ZERO;
        let mut glyphs = Vec::new();

        for c in text.chars() {
            if c == '\n' {
                offset = Vec2::new(0.0, offset.y - line_height);
                continue;
            }
            let Some(glyph) = self.glyph(c) else {
                debug!("Glyph '{}' missing from {}", c, self.family_name);
                offset.x += size * 0.5;
                continue;
            };

            if let Some(outline) = glyph.o.as_deref() {
                let contours: Vec<Contour> = flatten(&parse_outline(c, outline)?, curve_segments)
                    .into_iter()
                    .map(|contour| contour.into_iter().map(|p| p * scale + offset).collect())
                    .collect();
                if !contours.is_empty() {
                    glyphs.push(contours);
                }
            }
            offset.x += glyph.ha * scale;
        }

        Ok(glyphs)
    }
}

/// Small font used across the text tests.
#[cfg(test)]
pub(crate) const TEST_FONT: &str = r#"{
    "familyName": "Test",
    "resolution": 100,
    "boundingBox": { "yMin": -20, "yMax": 80, "xMin": 0, "xMax": 100 },
    "underlineThickness": 5,
    "glyphs": {
        "o": { "ha": 100, "o": "m 0 0 l 80 0 l 80 80 l 0 80 z m 20 20 l 20 60 l 60 60 l 60 20 z" },
        "l": { "ha": 40, "o": "m 0 0 l 20 0 l 20 80 l 0 80" },
        " ": { "ha": 30 },
        "c": { "ha": 90, "o": "m 0 0 l 80 0 q 80 80 80 40 l 0 80" }
    }
}"#;
