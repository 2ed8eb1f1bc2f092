//! Macro for implementing Display and FromStr for wire-named enums
//!
//! Presence states and sync triggers travel as lowercase strings (in the
//! presence record and in log fields). This macro keeps the mapping in one
//! place.
//!
//! # Example
//!
//! ```rust
//! use livesync_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Link {
//!     Up,
//!     Down,
//! }
//!
//! impl_wire_name_conversions!(Link {
//!     Up => "up",
//!     Down => "down",
//! });
//!
//! assert_eq!(Link::Up.to_string(), "up");
//! assert_eq!("DOWN".parse::<Link>(), Ok(Link::Down));
//! ```

/// Implements `Display`, `FromStr` and `as_str` for unit-variant enums
///
/// Parsing is case-insensitive; output is always the given name.
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire name of this variant
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
