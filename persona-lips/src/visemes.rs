//! Phoneme to mouth-shape table

use persona_core::{ExpressionPreset, ExpressionWeight};

macro_rules! blend {
    ($($preset:ident: $weight:expr),+ $(,)?) => {
        &[$(ExpressionWeight { expression: ExpressionPreset::$preset, weight: $weight }),+]
    };
}

/// Fallback for symbols without an entry
pub const NEUTRAL: &[ExpressionWeight] = blend![Neutral: 1.0];

/// Weighted mouth shapes for a phoneme symbol
///
/// Lookup is by exact upper-case symbol. Unknown symbols, including
/// punctuation and spaces from character alignment, map to `NEUTRAL`.
pub fn expression_weights(phoneme: &str) -> &'static [ExpressionWeight] {
    match phoneme {
        // Open vowels
        "A" | "AA" => blend![Aa: 1.0],
        "AH" => blend![Aa: 0.8],
        "AE" => blend![Aa: 0.6, Ee: 0.4],
        "AO" => blend![Aa: 0.3, Oh: 0.7],
        "AW" => blend![Aa: 0.4, Oh: 0.6],
        "AY" => blend![Aa: 0.7, Ih: 0.3],

        "E" | "EY" => blend![Ee: 1.0],
        "EH" => blend![Ee: 0.7, Aa: 0.3],
        "ER" => blend![Ee: 0.4, Ih: 0.6],

        "I" | "IH" => blend![Ih: 1.0],
        "IY" => blend![Ih: 0.6, Ee: 0.4],

        "O" | "OH" | "OW" => blend![Oh: 1.0],
        "OY" => blend![Oh: 0.8, Ih: 0.2],

        "U" | "UW" => blend![Ou: 1.0],
        "UH" => blend![Ou: 0.7, Aa: 0.3],

        // Closed lips
        "M" | "B" | "P" => NEUTRAL,

        // Consonants with a slight mouth shape
        "F" | "V" => blend![Neutral: 0.8, Ou: 0.2],
        "TH" => blend![Neutral: 0.7, Aa: 0.3],
        "L" => blend![Neutral: 0.8, Ih: 0.2],
        "R" => blend![Neutral: 0.6, Ou: 0.4],

        _ => NEUTRAL,
    }
}
