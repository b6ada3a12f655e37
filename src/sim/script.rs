//! Event-script parsing for the simulator.
//!
//! A script is a list of steps separated by whitespace or commas. `#` starts
//! a comment that runs to the end of the line.
//!
//! ```text
//! NS+ NLK NS-        # hold NAS, tap numlock, release NAS
//! @45+ @9 @45-       # the same by physical key position
//! leds=0b001         # host reports num lock on
//! ```

use crate::models::{KeyEdge, Keycode, LockMask};
use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;

/// Which edges a step delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// `NAME+`
    Press,
    /// `NAME-`
    Release,
    /// `NAME` (press then release)
    Tap,
}

impl StepAction {
    /// Edges delivered, in order.
    #[must_use]
    pub fn edges(self) -> Vec<KeyEdge> {
        match self {
            Self::Press => vec![KeyEdge::Press],
            Self::Release => vec![KeyEdge::Release],
            Self::Tap => vec![KeyEdge::Press, KeyEdge::Release],
        }
    }

    fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "+" => Self::Press,
            "-" => Self::Release,
            _ => Self::Tap,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Press => "+",
            Self::Release => "-",
            Self::Tap => "",
        }
    }
}

/// One script step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// A keycode delivered directly
    Key {
        /// Keycode
        keycode: Keycode,
        /// Edges
        action: StepAction,
    },
    /// A physical key position resolved through the keymap
    Position {
        /// LAYOUT index
        index: usize,
        /// Edges
        action: StepAction,
    },
    /// Host lock-mask report
    LockMask(LockMask),
}

impl fmt::Display for ScriptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key { keycode, action } => write!(f, "{}{}", keycode, action.suffix()),
            Self::Position { index, action } => write!(f, "@{}{}", index, action.suffix()),
            Self::LockMask(mask) => write!(f, "leds={:#05b}", mask.0),
        }
    }
}

/// Parses a whole script.
///
/// Errors name the line and the offending token.
pub fn parse_script(content: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("");
        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let step = parse_step(token)
                .with_context(|| format!("Line {}: invalid step '{}'", line_idx + 1, token))?;
            steps.push(step);
        }
    }

    Ok(steps)
}

/// Parses a single step token.
pub fn parse_step(token: &str) -> Result<ScriptStep> {
    let leds_regex = Regex::new(r"^leds=(\S+)$").unwrap();
    let position_regex = Regex::new(r"^@(\d+)([+-]?)$").unwrap();
    let key_regex = Regex::new(r"^(.+?)([+-]?)$").unwrap();

    if let Some(caps) = leds_regex.captures(token) {
        return Ok(ScriptStep::LockMask(LockMask::parse(&caps[1])?));
    }

    if let Some(caps) = position_regex.captures(token) {
        let index: usize = caps[1]
            .parse()
            .context(format!("Invalid key position '{}'", &caps[1]))?;
        return Ok(ScriptStep::Position {
            index,
            action: StepAction::from_suffix(&caps[2]),
        });
    }

    if token.starts_with('@') {
        anyhow::bail!("Key positions are written @INDEX, @INDEX+ or @INDEX-");
    }

    if let Some(caps) = key_regex.captures(token) {
        let keycode = Keycode::parse(&caps[1])?;
        return Ok(ScriptStep::Key {
            keycode,
            action: StepAction::from_suffix(&caps[2]),
        });
    }

    anyhow::bail!("Unrecognised step")
}
