/// Round `value` to `places` decimal digits, ties away from zero.
///
/// Works on the shortest decimal representation of the float rather than its
/// binary value, so `0.9795` rounds to `0.98` even though the nearest `f64` is
/// slightly below the tie.
pub fn round_half_up(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let repr = value.abs().to_string();
    let Some((int_part, frac_part)) = repr.split_once('.') else {
        return value;
    };
    let places = places as usize;
    if frac_part.len() <= places {
        return value;
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part[..places].bytes())
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes()[places] >= b'5' {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let split = digits.len() - places;
    let mut rounded: String = digits[..split].iter().map(|d| char::from(b'0' + d)).collect();
    if places > 0 {
        rounded.push('.');
        rounded.extend(digits[split..].iter().map(|d| char::from(b'0' + d)));
    }

    // Rebuilt from ASCII digits, so parsing cannot fail
    let magnitude: f64 = rounded.parse().unwrap_or(value.abs());
    if value.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_round_up() {
        assert_eq!(round_half_up(0.9795, 3), 0.98);
        assert_eq!(round_half_up(0.2995, 3), 0.3);
        assert_eq!(round_half_up(0.0005, 3), 0.001);
        assert_eq!(round_half_up(0.0125, 3), 0.013);
    }

    #[test]
    fn below_tie_rounds_down() {
        assert_eq!(round_half_up(0.97949, 3), 0.979);
        assert_eq!(round_half_up(0.3004, 3), 0.3);
    }

    #[test]
    fn short_values_are_untouched() {
        assert_eq!(round_half_up(0.5, 3), 0.5);
        assert_eq!(round_half_up(1.0, 3), 1.0);
        assert_eq!(round_half_up(0.0, 3), 0.0);
    }

    #[test]
    fn carry_propagates_into_integer_part() {
        assert_eq!(round_half_up(0.9999, 3), 1.0);
        assert_eq!(round_half_up(9.9995, 3), 10.0);
    }

    #[test]
    fn negative_values_round_away_from_zero() {
        assert_eq!(round_half_up(-0.0125, 3), -0.013);
    }

    #[test]
    fn other_precisions() {
        assert_eq!(round_half_up(0.123456, 4), 0.1235);
        assert_eq!(round_half_up(2.5, 0), 3.0);
        assert!(round_half_up(f64::NAN, 3).is_nan());
    }
}
