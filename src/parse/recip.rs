//! Recip duration parsing
//!
//! Humdrum rhythm values are reciprocals of a whole note: `4` is a quarter,
//! `8` an eighth, `3` a triplet half. `0`, `00` and `000` are the breve, long
//! and maxima. `a%b` is the rational reciprocal `b/a` of a whole note, and
//! each dot anywhere in the token adds half of the previous value. Durations
//! are returned in quarter notes.

use num_rational::Ratio;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Exact rational duration measured in quarter notes
pub type HumNum = Ratio<i64>;

/// Most zeros or dots accepted before the value is considered garbage
const MAX_MARKS: usize = 16;

/// Reciprocals at or above this bound are rejected
const MAX_RECIP: i64 = 1 << 20;

static RECIP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)(?:%(\d+))?").expect("recip pattern is valid"));

/// Why a recip value could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipError {
    #[error("no rhythm value")]
    NoRhythm,

    #[error("zero divisor in rhythm value `{0}`")]
    ZeroDivisor(String),

    #[error("rhythm value `{0}` is out of range")]
    OutOfRange(String),
}

/// Read the duration of a token's first subtoken, in quarter notes
pub fn recip_to_duration(text: &str) -> Result<HumNum, RecipError> {
    let first = text.split(' ').next().unwrap_or(text);
    let caps = RECIP.captures(first).ok_or(RecipError::NoRhythm)?;
    let digits = &caps[1];
    let dots = first.matches('.').count();

    let whole = match caps.get(2) {
        Some(denominator) => {
            let a = parse_int(digits)?;
            let b = parse_int(denominator.as_str())?;
            if a == 0 || b == 0 {
                return Err(RecipError::ZeroDivisor(caps[0].to_string()));
            }
            HumNum::new(b, a)
        }
        None if digits.bytes().all(|b| b == b'0') => {
            if digits.len() > MAX_MARKS {
                return Err(RecipError::OutOfRange(digits.to_string()));
            }
            HumNum::from_integer(1 << digits.len())
        }
        None => HumNum::new(1, parse_int(digits)?),
    };

    if dots > MAX_MARKS {
        return Err(RecipError::OutOfRange(caps[0].to_string()));
    }
    let dot_factor = HumNum::new((1 << (dots + 1)) - 1, 1 << dots);

    Ok(whole * dot_factor * 4)
}

fn parse_int(digits: &str) -> Result<i64, RecipError> {
    digits
        .parse::<i64>()
        .ok()
        .filter(|n| *n < MAX_RECIP)
        .ok_or_else(|| RecipError::OutOfRange(digits.to_string()))
}

/// `a + b`, or `None` when the reduced result does not fit in `HumNum`
pub fn checked_add(a: HumNum, b: HumNum) -> Option<HumNum> {
    let (an, ad) = (i128::from(*a.numer()), i128::from(*a.denom()));
    let (bn, bd) = (i128::from(*b.numer()), i128::from(*b.denom()));
    narrow(Ratio::new(an * bd + bn * ad, ad * bd))
}

/// `a - b`, or `None` when the reduced result does not fit in `HumNum`
pub fn checked_sub(a: HumNum, b: HumNum) -> Option<HumNum> {
    checked_add(a, -b)
}

fn narrow(wide: Ratio<i128>) -> Option<HumNum> {
    let numer = i64::try_from(*wide.numer()).ok()?;
    let denom = i64::try_from(*wide.denom()).ok()?;
    Some(HumNum::new(numer, denom))
}
