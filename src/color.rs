//! Palette cycling for printouts that are not coloured explicitly.

use indexmap::IndexMap;

use crate::options::ColorScheme;

/// Colour names usable in both the SVG and the X11 schemes.
pub const PALETTE: &[&str] = &[
    "black",
    "red",
    "green",
    "blue",
    "darkviolet",
    "gold",
    "deeppink",
    "brown",
    "bisque",
    "darkgreen",
    "yellow",
    "darkblue",
    "magenta",
    "steelblue2",
];

/// Hands out palette entries in turn. Create one per graph build.
#[derive(Debug, Clone)]
pub struct ColorCycle {
    palette: Vec<String>,
    counter: usize,
}

impl Default for ColorCycle {
    fn default() -> ColorCycle {
        ColorCycle::new(PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

impl ColorCycle {
    /// Panics if `palette` is empty.
    pub fn new(palette: Vec<String>) -> ColorCycle {
        assert!(!palette.is_empty(), "colour palette must not be empty");
        ColorCycle {
            palette,
            counter: 0,
        }
    }

    fn current(&self, scheme: ColorScheme) -> String {
        match scheme {
            ColorScheme::Named => self.palette[self.counter].clone(),
            ColorScheme::Numeric => (self.counter + 1).to_string(),
        }
    }

    /// Colours every context that has neither `color` nor `fontcolor` set,
    /// then moves on to the next palette entry if anything was coloured.
    ///
    /// Returns whether anything was assigned.
    pub fn assign(&mut self, contexts: &mut [(&mut IndexMap<String, String>, ColorScheme)]) -> bool {
        let mut used = false;
        for (attrs, scheme) in contexts.iter_mut() {
            if attrs.contains_key("color") || attrs.contains_key("fontcolor") {
                continue;
            }
            let color = self.current(*scheme);
            attrs.insert("color".to_string(), color.clone());
            attrs.insert("fontcolor".to_string(), color);
            used = true;
        }
        if used {
            self.counter = (self.counter + 1) % self.palette.len();
        }
        used
    }
}
