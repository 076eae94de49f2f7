//! Closed parameter sets shared by the explorers and the query client.

use std::fmt;
use std::str::FromStr;

/// A closed set of choices rendered as a `<select>`.
pub trait Choice: Copy + PartialEq + Send + Sync + 'static {
	/// Every value, in display order.
	const ALL: &'static [Self];

	/// Wire and form value.
	fn value(self) -> &'static str;

	/// Human-readable option text.
	fn label(self) -> &'static str;

	/// Parses a form value back into a choice.
	fn parse(value: &str) -> Option<Self> {
		Self::ALL.iter().copied().find(|c| c.value() == value)
	}
}

/// Traversal depth bounded to `1..=MAX`.
///
/// There is no way to construct a value outside the bound, so a page using `Depth<5>`
/// can never request depth 6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Depth<const MAX: u8>(u8);

/// Call graph depth, `1..=5`.
pub type CallDepth = Depth<5>;
/// Data-flow slice depth, `1..=6`.
pub type FlowDepth = Depth<6>;
/// Package neighborhood depth, `1..=3`.
pub type PackageDepth = Depth<3>;

impl<const MAX: u8> Depth<MAX> {
	/// Returns `None` when `value` is outside `1..=MAX`.
	pub const fn new(value: u8) -> Option<Self> {
		if value >= 1 && value <= MAX {
			Some(Self(value))
		} else {
			None
		}
	}

	/// Nearest admitted depth to `value`.
	pub const fn saturating(value: u8) -> Self {
		if value < 1 {
			Self(1)
		} else if value > MAX {
			Self(MAX)
		} else {
			Self(value)
		}
	}

	/// The raw depth.
	pub const fn get(self) -> u8 {
		self.0
	}

	/// Every admitted depth in ascending order.
	pub fn all() -> impl Iterator<Item = Self> {
		(1..=MAX).map(Self)
	}
}

impl<const MAX: u8> fmt::Display for Depth<MAX> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl<const MAX: u8> FromStr for Depth<MAX> {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.trim()
			.parse::<u8>()
			.ok()
			.and_then(Self::new)
			.ok_or_else(|| format!("depth must be between 1 and {MAX}, got {s:?}"))
	}
}

macro_rules! choice_enum {
	(
		$(#[$meta:meta])*
		$name:ident { $($(#[$vmeta:meta])* $variant:ident => ($value:literal, $label:literal)),+ $(,)? }
	) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
		pub enum $name {
			$($(#[$vmeta])* $variant),+
		}

		impl Choice for $name {
			const ALL: &'static [Self] = &[$(Self::$variant),+];

			fn value(self) -> &'static str {
				match self {
					$(Self::$variant => $value),+
				}
			}

			fn label(self) -> &'static str {
				match self {
					$(Self::$variant => $label),+
				}
			}
		}

		impl ::std::fmt::Display for $name {
			fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
				f.write_str(self.value())
			}
		}
	};
}

pub(crate) use choice_enum;

choice_enum! {
	/// Which side of the root a call graph expands.
	CallDirection {
		/// Callers and callees.
		Both => ("both", "Both"),
		/// Callees only.
		Callees => ("callees", "Callees"),
		/// Callers only.
		Callers => ("callers", "Callers"),
	}
}

choice_enum! {
	/// Which way a data-flow slice follows definition-use edges.
	FlowDirection {
		/// From definitions to uses.
		Forward => ("forward", "Forward (uses)"),
		/// From uses back to definitions.
		Backward => ("backward", "Backward (defs)"),
		/// Both ways.
		Both => ("both", "Both"),
	}
}

choice_enum! {
	/// Which dependency edges a package neighborhood follows.
	PackageDirection {
		/// Imports and importers.
		Both => ("both", "Both"),
		/// Packages the focus imports.
		Dependencies => ("dependencies", "Dependencies"),
		/// Packages importing the focus.
		Dependents => ("dependents", "Dependents"),
	}
}

impl<const MAX: u8> Choice for Depth<MAX> {
	const ALL: &'static [Self] = &[Self(1), Self(2), Self(3), Self(4), Self(5), Self(6)]
		.split_at(MAX as usize)
		.0;

	fn value(self) -> &'static str {
		DEPTH_TEXT[self.0 as usize - 1]
	}

	fn label(self) -> &'static str {
		self.value()
	}
}

const DEPTH_TEXT: [&str; 6] = ["1", "2", "3", "4", "5", "6"];
