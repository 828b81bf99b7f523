//! Auxiliary ASCII real <-> char codec (base-224), used by snapshot I/O to
//! dump numbers compactly as printable bytes. Not used by either kernel;
//! kept alongside them because this corpus keeps small serialization
//! helpers as leaf modules next to the numerics they serialize.

use crate::types::Scalar;

const BASE: Scalar = 224.0;
const OFFSET: u8 = 32;
const DIGITS: usize = 8;
const MANTISSA_EXP_BIAS: i32 = 112;

/// Encode `x`, assumed to lie in `[xmin, xmax)`, as 8 base-224 digits, each
/// offset by 32 so the output bytes lie in `[32, 255]`.
///
/// Values outside `[xmin, xmax)` are clamped rather than rejected, matching
/// the reference codec's saturating behavior for out-of-range snapshot data.
pub fn re2c(x: Scalar, xmin: Scalar, xmax: Scalar) -> [u8; DIGITS] {
    let normalized = ((x - xmin) / (xmax - xmin)).clamp(0.0, 1.0 - Scalar::EPSILON);
    encode_digits(normalized, DIGITS)
}

/// Inverse of [`re2c`]: decode 8 base-224 digits back into `[xmin, xmax)`.
pub fn c2re(bytes: &[u8; DIGITS], xmin: Scalar, xmax: Scalar) -> Scalar {
    xmin + decode_digits(bytes) * (xmax - xmin)
}

/// Encode an `f64` in `(-10^112, 10^112)` as 8 printable bytes: a signed
/// mantissa in `[-1, 1)` (via [`re2c`] against that range, 7 digits) and a
/// decimal exponent biased by 112 (the eighth byte).
///
/// `fl2c(0.0)` round-trips to exactly zero. Magnitudes at or beyond
/// `10^112` saturate to the largest representable exponent rather than
/// overflowing the single exponent byte.
pub fn fl2c(x: Scalar) -> [u8; DIGITS] {
    let (mantissa, exponent) = decompose(x);

    let mantissa_bytes = encode_digits((mantissa + 1.0) / 2.0, DIGITS - 1);
    let mut out = [0u8; DIGITS];
    out[..DIGITS - 1].copy_from_slice(&mantissa_bytes);

    let biased = (exponent + MANTISSA_EXP_BIAS).clamp(0, (u8::MAX - OFFSET) as i32);
    out[DIGITS - 1] = biased as u8 + OFFSET;
    out
}

/// Inverse of [`fl2c`].
pub fn c2fl(bytes: &[u8; DIGITS]) -> Scalar {
    let mantissa_bytes: [u8; DIGITS - 1] = bytes[..DIGITS - 1].try_into().unwrap();
    let mantissa = decode_digits(&mantissa_bytes) * 2.0 - 1.0;
    let biased = bytes[DIGITS - 1] as i32 - OFFSET as i32;
    let exponent = biased - MANTISSA_EXP_BIAS;

    mantissa * 10f64.powi(exponent)
}

/// Split `x` into a signed mantissa in `[-1, 1)` and a decimal exponent such
/// that `x == mantissa * 10^exponent`, clamping the exponent to
/// `[-112, 112]` for values at or beyond the codec's representable range.
fn decompose(x: Scalar) -> (Scalar, i32) {
    if x == 0.0 {
        return (0.0, 0);
    }

    let sign = x.signum();
    let ax = x.abs();
    let mut exponent = ax.log10().ceil() as i32;
    let mut mantissa = ax / 10f64.powi(exponent);

    while mantissa >= 1.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    while mantissa < 0.1 && exponent > -MANTISSA_EXP_BIAS {
        mantissa *= 10.0;
        exponent -= 1;
    }

    if exponent > MANTISSA_EXP_BIAS {
        exponent = MANTISSA_EXP_BIAS;
        mantissa = 1.0 - Scalar::EPSILON;
    }

    (sign * mantissa, exponent)
}

fn encode_digits(mut y: Scalar, n: usize) -> [u8; DIGITS] {
    debug_assert!((0.0..=1.0).contains(&y));
    let mut out = [OFFSET; DIGITS];
    for slot in out.iter_mut().take(n) {
        y *= BASE;
        let digit = y.floor().clamp(0.0, BASE - 1.0);
        *slot = digit as u8 + OFFSET;
        y -= digit;
    }
    out
}

fn decode_digits(bytes: &[u8]) -> Scalar {
    let mut y = 0.0;
    let mut scale = 1.0;
    for &b in bytes {
        scale /= BASE;
        y += (b as Scalar - OFFSET as Scalar) * scale;
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn re2c_round_trips_within_range() {
        for &x in &[0.0, 0.25, 0.5, 0.999, -0.8] {
            let bytes = re2c(x, -1.0, 1.0);
            let back = c2re(&bytes, -1.0, 1.0);
            assert_relative_eq!(back, x, epsilon = 1e-9);
        }
    }

    #[test]
    fn re2c_bytes_are_printable() {
        let bytes = re2c(0.123456, 0.0, 1.0);
        for b in bytes {
            assert!((32..=255).contains(&b));
        }
    }

    #[test]
    fn fl2c_zero_is_stable() {
        let bytes = fl2c(0.0);
        assert_relative_eq!(c2fl(&bytes), 0.0, epsilon = 1e-300);
    }

    #[test]
    fn fl2c_round_trips_within_relative_tolerance() {
        for &x in &[1.0, -3.14e15, 6.02e23, -1e-5, 42.0, -1.0] {
            let bytes = fl2c(x);
            let back = c2fl(&bytes);
            assert_relative_eq!(back, x, max_relative = 1e-4);
        }
    }

    #[test]
    fn fl2c_saturates_beyond_representable_magnitude() {
        let huge = 10f64.powi(130);
        let bytes = fl2c(huge);
        let back = c2fl(&bytes);
        assert!(back.is_finite());
        assert!(back > 10f64.powi(100));
    }

    #[test]
    fn fl2c_preserves_sign() {
        let bytes = fl2c(-2.5e8);
        assert!(c2fl(&bytes) < 0.0);
    }
}

#[cfg(test)]
mod proptest_codec {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Round trip holds to the codec's documented relative tolerance
        /// for any magnitude within the representable range.
        #[test]
        fn round_trip_within_tolerance(x in -1e20f64..1e20, sign in any::<bool>()) {
            let x = if sign { x } else { -x };
            prop_assume!(x != 0.0);
            let bytes = fl2c(x);
            let back = c2fl(&bytes);
            prop_assert!((back - x).abs() <= 1e-3 * x.abs().max(1.0));
        }
    }
}
