//! Theme colors for the effects layer.
//!
//! The page's stylesheet exposes its colors as CSS custom properties. The host
//! reads them into a [`StyleSnapshot`]; [`sample_theme`] turns the snapshot
//! into a [`Palette`], keeping the previous color for anything missing.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const WHITE: Color = Color::rgb(255, 255, 255);

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Parses a CSS color string into a [`Color`].
///
/// Accepts hex (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`), `rgb()`/`rgba()` and
/// `hsl()`/`hsla()` in both the comma and the space-separated (`/ alpha`)
/// syntax, `black`, `white`, `transparent`, and a bare `r,g,b` triple (the
/// form `--fx-clear` uses). Returns `None` for anything else.
pub fn parse_color(color_str: &str) -> Option<Color> {
	let s = color_str.trim();
	if let Some(hex) = s.strip_prefix('#') {
		return parse_hex(hex);
	}
	match s.to_ascii_lowercase().as_str() {
		"black" => return Some(Color::rgb(0, 0, 0)),
		"white" => return Some(Color::WHITE),
		"transparent" => return Some(Color::rgba(0, 0, 0, 0.0)),
		_ => {}
	}
	if let Some((name, rest)) = s.split_once('(') {
		let args = components(rest.strip_suffix(')')?)?;
		return match name.trim().to_ascii_lowercase().as_str() {
			"rgb" | "rgba" => rgb_from(&args),
			"hsl" | "hsla" => hsl_from(&args),
			_ => None,
		};
	}
	rgb_from(&components(s)?)
}

/// Three or four arguments separated by commas, spaces or `/`.
fn components(body: &str) -> Option<Vec<&str>> {
	let parts: Vec<&str> = body
		.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
		.filter(|p| !p.is_empty())
		.collect();
	(3..=4).contains(&parts.len()).then_some(parts)
}

fn channel(arg: &str) -> Option<u8> {
	let v = match arg.strip_suffix('%') {
		Some(pct) => pct.parse::<f64>().ok()? * 2.55,
		None => arg.parse::<f64>().ok()?,
	};
	Some(v.round().clamp(0.0, 255.0) as u8)
}

/// `50%` or `0.5`, as a fraction.
fn fraction(arg: &str) -> Option<f64> {
	match arg.strip_suffix('%') {
		Some(pct) => pct.parse::<f64>().ok().map(|v| v / 100.0),
		None => arg.parse::<f64>().ok(),
	}
}

fn alpha(arg: Option<&&str>) -> Option<f64> {
	match arg {
		Some(a) => Some(fraction(a)?.clamp(0.0, 1.0)),
		None => Some(1.0),
	}
}

fn rgb_from(args: &[&str]) -> Option<Color> {
	Some(Color::rgba(
		channel(args[0])?,
		channel(args[1])?,
		channel(args[2])?,
		alpha(args.get(3))?,
	))
}

fn hsl_from(args: &[&str]) -> Option<Color> {
	let h = args[0].trim_end_matches("deg").parse::<f64>().ok()?.rem_euclid(360.0) / 360.0;
	let s = fraction(args[1])?.clamp(0.0, 1.0);
	let l = fraction(args[2])?.clamp(0.0, 1.0);
	let a = alpha(args.get(3))?;

	let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
	let p = 2.0 * l - q;
	let hue = |t: f64| {
		let t = t.rem_euclid(1.0);
		if t < 1.0 / 6.0 {
			p + (q - p) * 6.0 * t
		} else if t < 0.5 {
			q
		} else if t < 2.0 / 3.0 {
			p + (q - p) * (2.0 / 3.0 - t) * 6.0
		} else {
			p
		}
	};
	let byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
	Some(Color::rgba(
		byte(hue(h + 1.0 / 3.0)),
		byte(hue(h)),
		byte(hue(h - 1.0 / 3.0)),
		a,
	))
}

fn parse_hex(hex: &str) -> Option<Color> {
	if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
		return None;
	}
	let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
	let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
	match hex.len() {
		3 => Some(Color::rgb(digit(0)?, digit(1)?, digit(2)?)),
		4 => Some(Color::rgba(
			digit(0)?,
			digit(1)?,
			digit(2)?,
			digit(3)? as f64 / 255.0,
		)),
		6 => Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?)),
		8 => Some(Color::rgba(
			pair(0)?,
			pair(2)?,
			pair(4)?,
			pair(6)? as f64 / 255.0,
		)),
		_ => None,
	}
}

/// Raw values of the theme's custom properties, as read from computed style.
///
/// `None` (or an empty string) means the property was not set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleSnapshot {
	/// `--primary`
	pub primary: Option<String>,
	/// `--accent`
	pub accent: Option<String>,
	/// `--fx-clear`, an `r,g,b` triple.
	pub clear: Option<String>,
}

/// Colors the effects draw with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
	/// Glow color of the right half of the code-rain.
	pub primary: Color,
	/// Glow color of the left half of the code-rain.
	pub accent: Color,
	/// Trail-fade tint painted over each frame.
	pub clear: Color,
}

impl Default for Palette {
	fn default() -> Self {
		Self {
			primary: Color::rgb(0x8b, 0x5c, 0xf6),
			accent: Color::rgb(0x22, 0xd3, 0xee),
			clear: Color::rgb(0, 0, 0),
		}
	}
}

/// Builds a palette from a style snapshot.
///
/// Each color falls back to the one in `last` when the property is absent or
/// cannot be parsed.
pub fn sample_theme(snapshot: &StyleSnapshot, last: &Palette) -> Palette {
	let pick = |value: &Option<String>, fallback: Color| {
		value
			.as_deref()
			.filter(|v| !v.trim().is_empty())
			.and_then(parse_color)
			.unwrap_or(fallback)
	};
	Palette {
		primary: pick(&snapshot.primary, last.primary),
		accent: pick(&snapshot.accent, last.accent),
		clear: pick(&snapshot.clear, last.clear).with_alpha(1.0),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_supported_notations() {
		assert_eq!(parse_color("#8b5cf6"), Some(Color::rgb(139, 92, 246)));
		assert_eq!(parse_color(" #fff "), Some(Color::rgb(255, 255, 255)));
		assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
		assert_eq!(
			parse_color("rgba(10,20,30,0.5)"),
			Some(Color::rgba(10, 20, 30, 0.5))
		);
		assert_eq!(parse_color("245,245,250"), Some(Color::rgb(245, 245, 250)));
	}

	#[test]
	fn parses_modern_and_alpha_notations() {
		assert_eq!(
			parse_color("#8b5cf680"),
			Some(Color::rgba(139, 92, 246, 128.0 / 255.0))
		);
		assert_eq!(parse_color("#f008"), Some(Color::rgba(255, 0, 0, 136.0 / 255.0)));
		assert_eq!(parse_color("rgb(139 92 246)"), Some(Color::rgb(139, 92, 246)));
		assert_eq!(
			parse_color("rgb(139 92 246 / 50%)"),
			Some(Color::rgba(139, 92, 246, 0.5))
		);
		assert_eq!(parse_color("rgb(100%, 0%, 0%)"), Some(Color::rgb(255, 0, 0)));
		assert_eq!(parse_color("hsl(0, 100%, 50%)"), Some(Color::rgb(255, 0, 0)));
		assert_eq!(parse_color("hsl(120deg 100% 25%)"), Some(Color::rgb(0, 128, 0)));
		assert_eq!(
			parse_color("hsla(240, 100%, 50%, 0.25)"),
			Some(Color::rgba(0, 0, 255, 0.25))
		);
		assert_eq!(parse_color("White"), Some(Color::WHITE));
	}

	#[test]
	fn rejects_unsupported_notations() {
		assert_eq!(parse_color("lab(50% 40 59)"), None);
		assert_eq!(parse_color("#12345"), None);
		assert_eq!(parse_color("#ggg"), None);
		assert_eq!(parse_color("rebeccapurple"), None);
		assert_eq!(parse_color("1,2"), None);
	}

	#[test]
	fn empty_snapshot_yields_defaults() {
		let palette = sample_theme(&StyleSnapshot::default(), &Palette::default());
		assert_eq!(palette, Palette::default());
	}

	#[test]
	fn missing_or_bad_values_keep_last_known() {
		let last = Palette {
			primary: Color::rgb(1, 1, 1),
			accent: Color::rgb(2, 2, 2),
			clear: Color::rgb(3, 3, 3),
		};
		let snapshot = StyleSnapshot {
			primary: Some("#ff0000".into()),
			accent: Some("  ".into()),
			clear: Some("not-a-color".into()),
		};
		let palette = sample_theme(&snapshot, &last);
		assert_eq!(palette.primary, Color::rgb(255, 0, 0));
		assert_eq!(palette.accent, last.accent);
		assert_eq!(palette.clear, last.clear);
	}

	#[test]
	fn css_output_drops_alpha_when_opaque() {
		assert_eq!(Color::rgb(34, 211, 238).to_css(), "#22d3ee");
		assert_eq!(
			Color::rgb(0, 0, 0).with_alpha(0.1).to_css(),
			"rgba(0, 0, 0, 0.1)"
		);
	}
}
