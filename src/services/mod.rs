//! Domain services over the transport client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` owns the login/register/validate/logout/profile flows and the
//! offline fallback built on `mock`. `dashboard` and `users` are pass-through
//! wrappers over their endpoints; `dashboard` also decides when to show the
//! bundled example dataset.

pub mod auth;
pub mod dashboard;
pub mod mock;
pub mod users;

/// A command-line token that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// `FromStr` + `Display` for a fieldless enum through a fixed token table.
macro_rules! token_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $token:literal),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::services::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($token => Ok(Self::$variant),)+
                    _ => Err($crate::services::UnknownVariant {
                        kind: $kind,
                        value: s.to_owned(),
                        expected: concat!($($token, " "),+).trim_ascii_end(),
                    }),
                }
            }
        }
    };
}

pub(crate) use token_enum;
