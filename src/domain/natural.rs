//! Natural ("human") string ordering
//!
//! Digit runs compare by numeric value, everything else character by character,
//! ignoring ASCII case first so that "alpha" and "Beta" sort the way a user reads them.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two strings so that `"item2" < "item10"`.
///
/// Ties on the case-insensitive comparison are broken by leading zeros (fewer first)
/// and finally by plain `str` ordering, so the result is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();
    let mut zeros_tiebreak = Ordering::Equal;

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let (l_digits, l_zeros) = digit_run(&mut left);
                let (r_digits, r_zeros) = digit_run(&mut right);
                let ord = l_digits
                    .len()
                    .cmp(&r_digits.len())
                    .then_with(|| l_digits.cmp(&r_digits));
                if ord != Ordering::Equal {
                    return ord;
                }
                if zeros_tiebreak == Ordering::Equal {
                    zeros_tiebreak = l_zeros.cmp(&r_zeros);
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_ascii_lowercase().cmp(&r.to_ascii_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }

    zeros_tiebreak.then_with(|| a.cmp(b))
}

/// Consume a run of ASCII digits, returning the significant digits and the
/// number of leading zeros that were stripped.
fn digit_run(chars: &mut Peekable<Chars<'_>>) -> (String, usize) {
    let mut zeros = 0;
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        if c == '0' && digits.is_empty() {
            zeros += 1;
        } else {
            digits.push(c);
        }
        chars.next();
    }
    (digits, zeros)
}
