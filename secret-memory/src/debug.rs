use std::fmt;

/// Writes the contents of an `&[u8]` as hexadecimal symbols to a
/// [std::fmt::Formatter], eliding the middle of long arrays
pub fn debug_crypto_array(v: &[u8], fmt: &mut fmt::Formatter) -> fmt::Result {
    if v.len() > 64 {
        for byte in &v[..32] {
            write!(fmt, "{byte:02x}")?;
        }
        fmt.write_str("..")?;
        for byte in &v[v.len() - 32..] {
            write!(fmt, "{byte:02x}")?;
        }
    } else {
        for byte in v {
            write!(fmt, "{byte:02x}")?;
        }
    }
    Ok(())
}
