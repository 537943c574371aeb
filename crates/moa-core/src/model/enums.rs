//! Closed value sets stored on user records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored/wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(Error::validation_field(
                        $label,
                        format!("unknown value '{other}'"),
                    )),
                }
            }
        }
    };
}

text_enum!(
    /// Self-reported gender.
    Gender, "gender" {
        /// Male
        Male => "male",
        /// Female
        Female => "female",
        /// Other or undisclosed
        Other => "other",
    }
);

text_enum!(
    /// The cognitive area a user wants to train.
    Interest, "interest" {
        /// Memory improvement
        MemoryImprovement => "memory_improvement",
        /// Concentration training
        ConcentrationTraining => "concentration_training",
        /// Language ability
        LanguageAbility => "language_ability",
        /// Math ability
        MathAbility => "math_ability",
    }
);

text_enum!(
    /// Supported social login providers.
    SocialProvider, "provider" {
        /// Kakao
        Kakao => "kakao",
    }
);
