//! Binary wire format of PostgreSQL `numeric`: a header of ndigits, weight,
//! sign and display scale, followed by base-10000 digits.

use std::error::Error;

use tokio_postgres::types::{FromSql, Type};
use tokio_util::bytes::{BufMut, BytesMut};

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

type BoxError = Box<dyn Error + Sync + Send>;

/// A `numeric` value read as `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PgNumeric(pub f64);

fn read_u16(raw: &[u8], at: usize) -> Result<u16, BoxError> {
    raw.get(at..at + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| "truncated numeric value".into())
}

impl<'a> FromSql<'a> for PgNumeric {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let ndigits = usize::from(read_u16(raw, 0)?);
        let weight = i32::from(i16::from_be_bytes(read_u16(raw, 2)?.to_be_bytes()));
        let sign = read_u16(raw, 4)?;
        match sign {
            NUMERIC_NAN => return Ok(PgNumeric(f64::NAN)),
            NUMERIC_PINF => return Ok(PgNumeric(f64::INFINITY)),
            NUMERIC_NINF => return Ok(PgNumeric(f64::NEG_INFINITY)),
            NUMERIC_POS | NUMERIC_NEG => {}
            other => return Err(format!("invalid numeric sign {other:#06x}").into()),
        }

        let mut digits = Vec::with_capacity(ndigits);
        for i in 0..ndigits {
            digits.push(read_u16(raw, 8 + 2 * i)?);
        }
        let digit_at = |pos: i32| -> u16 {
            usize::try_from(weight - pos)
                .ok()
                .and_then(|i| digits.get(i).copied())
                .unwrap_or(0)
        };

        let mut text = String::with_capacity(4 * ndigits + 3);
        if sign == NUMERIC_NEG {
            text.push('-');
        }
        if weight >= 0 {
            for pos in (0..=weight).rev() {
                text.push_str(&format!("{:04}", digit_at(pos)));
            }
        } else {
            text.push('0');
        }
        let lowest = weight - i32::try_from(ndigits).unwrap_or(i32::MAX) + 1;
        if lowest < 0 {
            text.push('.');
            for pos in (lowest..0).rev() {
                text.push_str(&format!("{:04}", digit_at(pos)));
            }
        }
        Ok(PgNumeric(text.parse()?))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

/// Encode the decimal text of a finite number (as printed by `Display` for
/// `i64` or `f64`, never in exponent form) as `numeric`.
pub fn write_numeric_text(text: &str, out: &mut BytesMut) -> Result<(), BoxError> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(format!("cannot encode '{text}' as numeric").into());
    }
    let int_part = int_part.trim_start_matches('0');
    let frac_part = frac_part.trim_end_matches('0');
    let dscale = u16::try_from(frac_part.len())?;

    let mut padded = "0".repeat((4 - int_part.len() % 4) % 4);
    padded.push_str(int_part);
    let int_groups = padded.len() / 4;
    padded.push_str(frac_part);
    padded.push_str(&"0".repeat((4 - frac_part.len() % 4) % 4));

    let mut digits: Vec<u16> = padded
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0_u16, |acc, b| acc * 10 + u16::from(b - b'0'))
        })
        .collect();
    let mut weight = i16::try_from(int_groups)? - 1;
    let leading = digits.iter().take_while(|d| **d == 0).count();
    digits.drain(..leading);
    weight -= i16::try_from(leading)?;
    while digits.last() == Some(&0) {
        digits.pop();
    }

    let sign = if digits.is_empty() {
        weight = 0;
        NUMERIC_POS
    } else if negative {
        NUMERIC_NEG
    } else {
        NUMERIC_POS
    };
    out.put_u16(u16::try_from(digits.len())?);
    out.put_i16(weight);
    out.put_u16(sign);
    out.put_u16(dscale);
    for d in digits {
        out.put_u16(d);
    }
    Ok(())
}

/// Encode an `f64` as `numeric`, including NaN and the infinities.
pub fn write_numeric_f64(value: f64, out: &mut BytesMut) -> Result<(), BoxError> {
    let special = if value.is_nan() {
        Some(NUMERIC_NAN)
    } else if value == f64::INFINITY {
        Some(NUMERIC_PINF)
    } else if value == f64::NEG_INFINITY {
        Some(NUMERIC_NINF)
    } else {
        None
    };
    match special {
        Some(sign) => {
            out.put_u16(0);
            out.put_i16(0);
            out.put_u16(sign);
            out.put_u16(0);
            Ok(())
        }
        None => write_numeric_text(&value.to_string(), out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> Vec<u8> {
        let mut out = BytesMut::new();
        write_numeric_text(text, &mut out).unwrap();
        out.to_vec()
    }

    fn decode(raw: &[u8]) -> f64 {
        PgNumeric::from_sql(&Type::NUMERIC, raw).unwrap().0
    }

    #[test]
    fn encodes_like_the_server() {
        // SELECT numeric_send(12345.678)
        assert_eq!(
            encode("12345.678"),
            [0, 3, 0, 1, 0, 0, 0, 3, 0, 1, 0x09, 0x29, 0x1a, 0x7c]
        );
        // SELECT numeric_send(-0.0001)
        assert_eq!(encode("-0.0001"), [0, 1, 0xff, 0xff, 0x40, 0, 0, 4, 0, 1]);
        assert_eq!(encode("0"), [0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode("20000"), [0, 1, 0, 1, 0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn decodes_server_values() {
        assert!((decode(&[0, 3, 0, 1, 0, 0, 0, 3, 0, 1, 0x09, 0x29, 0x1a, 0x7c]) - 12345.678).abs() < 1e-9);
        assert!((decode(&[0, 1, 0xff, 0xff, 0x40, 0, 0, 4, 0, 1]) + 0.0001).abs() < 1e-12);
        assert_eq!(decode(&[0, 1, 0, 1, 0, 0, 0, 0, 0, 2]), 20000.0);
        assert_eq!(decode(&[0, 0, 0, 0, 0, 0, 0, 0]), 0.0);
        assert!(decode(&[0, 0, 0, 0, 0xc0, 0, 0, 0]).is_nan());
    }

    #[test]
    fn f64_values_survive_encoding() {
        for value in [0.5, -1.25, 1_234_567.891, 3.0] {
            let mut out = BytesMut::new();
            write_numeric_f64(value, &mut out).unwrap();
            assert_eq!(decode(&out), value);
        }
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(PgNumeric::from_sql(&Type::NUMERIC, &[0, 2, 0, 0]).is_err());
    }
}
