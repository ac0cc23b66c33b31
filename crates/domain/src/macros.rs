//! Wire names for fieldless enums
//!
//! Break types and activity kinds travel as lowercase snake_case strings in
//! ledger rows, control commands and log fields. [`impl_wire_name!`] binds
//! each variant to its string once so `Display` and `FromStr` cannot drift.
//!
//! ```rust
//! use opsdesk_domain::impl_wire_name;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Shift {
//!     Morning,
//!     LateEvening,
//! }
//!
//! impl_wire_name!(Shift {
//!     Morning => "morning",
//!     LateEvening => "late_evening",
//! });
//!
//! assert_eq!(Shift::LateEvening.to_string(), "late_evening");
//! assert_eq!("MORNING".parse::<Shift>(), Ok(Shift::Morning));
//! ```

/// Derive `Display` (wire name) and `FromStr` (ASCII case-insensitive).
///
/// Wire names must be lowercase. Parse errors name the enum and the
/// rejected input.
#[macro_export]
macro_rules! impl_wire_name {
    ($enum_name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $enum_name {
            const fn wire_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.wire_name())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("unknown {} `{}`", stringify!($enum_name), s))
            }
        }
    };
}
