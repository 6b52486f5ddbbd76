use rand::{seq::SliceRandom, Rng};

pub const DEFAULT_PALETTE: [&str; 21] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#feca57", "#ff9ff3", "#54a0ff",
    "#5f27cd", "#00d2d3", "#ff9f43", "#10ac84", "#ee5a24", "#0984e3", "#6c5ce7",
    "#a29bfe", "#fd79a8", "#fdcb6e", "#e17055", "#00b894", "#e84393", "#74b9ff",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses `#rrggbb` or `#rgb`; the leading `#` is optional.
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self {
                r: channel(&digits[0..2])?,
                g: channel(&digits[2..4])?,
                b: channel(&digits[4..6])?,
            }),
            3 => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Some(Self {
                    r: short(0)?,
                    g: short(1)?,
                    b: short(2)?,
                })
            }
            _ => None,
        }
    }

    pub fn distance(self, other: Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

pub fn is_hex_color(value: &str) -> bool {
    value.starts_with('#') && Rgb::from_hex(value).is_some()
}

/// Picks the color for a new habit.
///
/// Unused palette entries are preferred. With a previous habit present the
/// unused entry farthest (RGB distance) from the most recently used color wins,
/// ties going to palette order. Without history the pick is random among the
/// unused entries, and once the palette is exhausted any palette entry may
/// repeat. Returns `None` only for an empty palette.
pub fn next_color<'a, U, P, R>(used: &[U], palette: &'a [P], rng: &mut R) -> Option<&'a str>
where
    U: AsRef<str>,
    P: AsRef<str>,
    R: Rng + ?Sized,
{
    let unused: Vec<&'a str> = palette
        .iter()
        .map(|color| color.as_ref())
        .filter(|candidate| {
            !used
                .iter()
                .any(|color| color.as_ref().eq_ignore_ascii_case(candidate))
        })
        .collect();

    if unused.is_empty() {
        return palette.choose(rng).map(|color| color.as_ref());
    }

    let Some(last) = used.last() else {
        return unused.choose(rng).copied();
    };
    let Some(anchor) = Rgb::from_hex(last.as_ref()) else {
        return unused.first().copied();
    };

    let mut best = unused[0];
    let mut best_distance = 0.0;
    for &candidate in &unused {
        let Some(rgb) = Rgb::from_hex(candidate) else {
            continue;
        };
        let distance = anchor.distance(rgb);
        if distance > best_distance {
            best_distance = distance;
            best = candidate;
        }
    }
    Some(best)
}
