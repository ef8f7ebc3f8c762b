use std::{fmt::Display, ops::BitOr};

pub trait Styled: Sized + Display {
	fn styled<S: Into<StyleSet>>(self, style: S) -> String {
		let styles: StyleSet = style.into();
		let reset = Style::Reset;
		format!("{styles}{self}{reset}")
	}
}

impl<T: Display> Styled for T {}

/// Enum representing a single ANSI style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
	Reset,
	Red,
	Green,
	Yellow,
	Blue,
	Magenta,
	Cyan,
	Bold,
}

impl Display for Style {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Style::Reset => write!(f, "\x1b[0m"),
			Style::Red => write!(f, "\x1b[31m"),
			Style::Green => write!(f, "\x1b[32m"),
			Style::Yellow => write!(f, "\x1b[33m"),
			Style::Blue => write!(f, "\x1b[34m"),
			Style::Magenta => write!(f, "\x1b[35m"),
			Style::Cyan => write!(f, "\x1b[36m"),
			Style::Bold => write!(f, "\x1b[1m"),
		}
	}
}

/// An accumulated set of styles, applied all at once
#[derive(Debug, Clone, Default)]
pub struct StyleSet(Vec<Style>);

impl From<Style> for StyleSet {
	fn from(style: Style) -> Self {
		Self(vec![style])
	}
}

impl BitOr for Style {
	type Output = StyleSet;
	fn bitor(self, rhs: Self) -> Self::Output {
		StyleSet(vec![self, rhs])
	}
}

impl BitOr<Style> for StyleSet {
	type Output = StyleSet;
	fn bitor(mut self, rhs: Style) -> Self::Output {
		self.0.push(rhs);
		self
	}
}

impl Display for StyleSet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for style in &self.0 {
			write!(f, "{style}")?;
		}
		Ok(())
	}
}
