use crate::{
    error::InvalidRankError,
    rank::{MAX_CHAR, MIN_CHAR, Rank},
};

// Highest scalar value below the UTF-16 surrogate gap.
const SURROGATE_FLOOR: char = '\u{D7FF}';

///
/// value_between
///
/// Compute the shortest rank that sorts strictly between `before` and `after`.
///
/// A missing `before` stands for `MIN_CHAR` and a missing `after` for
/// `MAX_CHAR`. Positions past the end of a bound read as that bound's
/// padding character. At the first position where the bounds differ, the
/// midpoint character is taken if one exists; otherwise the lower character
/// is kept and the walk continues one position deeper. Once the result has
/// dropped below `after` the upper bound no longer constrains deeper
/// positions, so they are read against `MAX_CHAR`.
///
/// The midpoint is the mean of the two code points rounded down.
///
/// Fails when the walk cannot stay strictly below `after`, which only
/// happens for bounds outside the alphabet, equal bounds, or inverted bounds.
///

pub fn value_between(before: Option<&str>, after: Option<&str>) -> Result<Rank, InvalidRankError> {
    let lower: Vec<char> = before.map_or_else(|| vec![MIN_CHAR], |s| s.chars().collect());
    let upper: Vec<char> = after.map_or_else(|| vec![MAX_CHAR], |s| s.chars().collect());

    let mut rank = String::with_capacity(lower.len().max(upper.len()) + 1);
    let mut below_upper = false;

    for i in 0..lower.len() + upper.len() {
        let low = lower.get(i).copied().unwrap_or(MIN_CHAR);
        let high = if below_upper {
            MAX_CHAR
        } else {
            upper.get(i).copied().unwrap_or(MAX_CHAR)
        };

        if low == high {
            rank.push(low);
            continue;
        }

        let mid = midpoint(low, high);
        if mid == low || mid == high {
            rank.push(low);
            below_upper |= low < high;
            continue;
        }

        rank.push(mid);
        break;
    }

    let upper_bound: String = upper.iter().collect();
    if rank >= upper_bound {
        return Err(InvalidRankError::new(before, after));
    }

    Ok(Rank::new(rank))
}

fn midpoint(low: char, high: char) -> char {
    let mean = (u32::from(low) + u32::from(high)) / 2;

    char::from_u32(mean).unwrap_or(SURROGATE_FLOOR)
}

///
/// TESTS
///
