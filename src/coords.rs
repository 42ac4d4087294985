/// Display strings for a pointer position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DmsCoords {
    pub lat: String,
    pub lng: String,
    pub raw: String,
}

/// Degrees and decimal minutes with hemisphere letters, plus the signed
/// decimal pair, e.g. `33° 51.90 S`, `151° 12.54 E`, `(-33.865000, 151.209000)`.
pub fn format_dms(lat: f64, lng: f64) -> DmsCoords {
    DmsCoords {
        lat: format_axis(lat, 'N', 'S'),
        lng: format_axis(lng, 'E', 'W'),
        raw: format!("({}, {})", to_fixed(lat, 6), to_fixed(lng, 6)),
    }
}

fn format_axis(value: f64, positive: char, negative: char) -> String {
    let dir = if value >= 0.0 { positive } else { negative };
    let abs = value.abs();
    let deg = abs.floor();
    let minutes = (abs - deg) * 60.0;
    format!("{deg:.0}° {} {dir}", to_fixed(minutes, 2))
}

/// Fixed-point rendering that rounds exact ties away from zero.
///
/// `format!` rounds the exact binary value and breaks ties to even, so a
/// value such as `0.125` would come out as `0.12`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    // Coordinates and minutes carry at most 52 fractional binary digits, so
    // this precision prints their exact decimal expansion.
    let exact = format!("{:.*}", digits + 60, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let kept = &frac_part[..digits];
    let rest = &frac_part[digits..];
    let round_up = rest.as_bytes().first().is_some_and(|b| *b >= b'5');

    let mut digits_buf: Vec<u8> = int_part.bytes().chain(kept.bytes()).collect();
    if round_up {
        let mut i = digits_buf.len();
        loop {
            if i == 0 {
                digits_buf.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits_buf[i] == b'9' {
                digits_buf[i] = b'0';
            } else {
                digits_buf[i] += 1;
                break;
            }
        }
    }

    let split = digits_buf.len() - digits;
    let int_digits = String::from_utf8_lossy(&digits_buf[..split]).into_owned();
    let frac_digits = String::from_utf8_lossy(&digits_buf[split..]).into_owned();
    let sign = if value < 0.0 { "-" } else { "" };
    if digits == 0 {
        format!("{sign}{int_digits}")
    } else {
        format!("{sign}{int_digits}.{frac_digits}")
    }
}
