//! Text dump of the density field.
//!
//! One CSV line per grid row, highest `y` first, so the text reads like a
//! plot with y pointing up. Values use the C stream default (`%g`, six
//! significant digits), which keeps dumps byte-comparable across
//! implementations.

use crate::lattice::Lattice;
use std::fmt;
use std::io;

/// Significant digits used by [`format_general`].
pub const PRECISION: usize = 6;

/// Format like `printf("%g")`: six significant digits, trailing zeros
/// dropped, scientific notation outside `1e-4 <= |v| < 1e6`.
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to PRECISION digits can bump the exponent (9.999999 -> 1e1),
    // so take it from the rounded scientific form.
    let sci = format!("{:.*e}", PRECISION - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exponent) = exp.parse::<i32>() else {
        return sci;
    };

    if exponent < -4 || exponent >= PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (PRECISION as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width();
        for y in (0..self.height()).rev() {
            for x in 0..width {
                let site = x + y * width;
                if x > 0 {
                    f.write_str(",")?;
                }
                f.write_str(&format_general(self.density(site)))?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl Lattice {
    /// Write the density dump to a caller-owned sink.
    pub fn write_density<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }

    /// Density dump as a string.
    pub fn density_csv(&self) -> String {
        self.to_string()
    }
}
