//! Simulated identification of unidentified items.
//!
//! A positive identification rolls between 30% and 130% of its base value, a
//! negative one between 70% and 130%. The roll quality is shown as a
//! percentage where 100% is the best possible outcome, and the best positive
//! rolls earn one to three stars.

use rand::Rng;

use crate::wynn::structs::{Identification, Item};

/// One line of an identified item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedStat {
    pub display: &'static str,
    pub value: String,
}

/// Rolls every identification of `item`.
///
/// Pre-identified items and fixed identifications show their base value.
pub fn identify<R: Rng>(item: &Item, rng: &mut R) -> Vec<IdentifiedStat> {
    item.identifications
        .iter()
        .map(|identification| {
            let value = if item.identified || identification.fixed {
                format!("{}{}", identification.base, identification.suffix)
            } else if identification.base > 0 {
                format_positive(identification, rng.random_range(0..=100))
            } else {
                format_negative(identification, rng.random_range(0..=60))
            };
            IdentifiedStat {
                display: identification.display,
                value,
            }
        })
        .collect()
}

/// Rounds halves up, so `-2.5` gives `-2`.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn scale(base: i64, factor: f64) -> i64 {
    round_half_up(base as f64 * factor)
}

fn stars(roll: u32) -> &'static str {
    match roll {
        71..=94 => " *",
        95..=99 => " **",
        100 => " ***",
        _ => "",
    }
}

/// Formats a positive identification for a roll in `0..=100`.
fn format_positive(identification: &Identification, roll: u32) -> String {
    let base = identification.base;
    let suffix = identification.suffix;
    let value = scale(base, (f64::from(roll) + 30.0) / 100.0);

    format!(
        "{}{}{} [{}%], {}{} ~ {}{}",
        value,
        suffix,
        stars(roll),
        roll,
        scale(base, 0.3),
        suffix,
        scale(base, 1.3),
        suffix
    )
}

/// Formats a negative identification for a roll in `0..=60`.
///
/// A lower roll is closer to zero, hence better.
fn format_negative(identification: &Identification, roll: u32) -> String {
    let base = identification.base;
    let suffix = identification.suffix;
    let value = scale(base, (f64::from(roll) + 70.0) / 100.0);
    let percentage = (60 - roll) * 100 / 60;

    format!(
        "{}{} [{}%], {}{} ~ {}{}",
        value,
        suffix,
        percentage,
        scale(base, 1.3),
        suffix,
        scale(base, 0.7),
        suffix
    )
}
