//! symbol/code128.rs
//! Code 128 subset C for the per-page linking symbol.
//!
//! Industry notes:
//! - The linking text is always an even run of digits, so subset C (two
//!   digits per symbol character) is the only subset written or accepted.
//! - Check character: `(105 + sum((i + 1) * value_i)) mod 103`.

use image::{imageops, GrayImage, Luma};

use crate::symbol::types::SymbolError;

const PATTERNS: [&str; 106] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212", "221213",
    "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221", "223211", "221132",
    "221231", "213212", "223112", "312131", "311222", "321122", "321221", "312212", "322112", "322211",
    "212123", "212321", "232121", "111323", "131123", "131321", "112313", "132113", "132311", "211313",
    "231113", "231311", "112133", "112331", "132131", "113123", "113321", "133121", "313121", "211331",
    "231131", "213113", "213311", "213131", "311123", "311321", "331121", "312113", "312311", "332111",
    "314111", "221411", "431111", "111224", "111422", "121124", "121421", "141122", "141221", "112214",
    "112412", "122114", "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111",
    "111242", "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311", "113141",
    "114131", "311141", "411131", "211412", "211214", "211232",
];
const STOP: &str = "2331112";

const START_C: u16 = 105;
const CHECK_MODULUS: u32 = 103;
const CHAR_MODULES: u32 = 11;
const STOP_MODULES: u32 = 13;
/// Light run before the start character, in modules, for a read to count.
const MIN_QUIET_MODULES: u32 = 5;

fn widths(pattern: &str) -> impl Iterator<Item = u32> + '_ {
    pattern.bytes().map(|b| u32::from(b - b'0'))
}

fn check_value(values: &[u16]) -> u16 {
    let sum = values
        .iter()
        .enumerate()
        .fold(u32::from(START_C), |acc, (i, &v)| acc + (i as u32 + 1) * u32::from(v));
    (sum % CHECK_MODULUS) as u16
}

/// Digit pairs of `text` as subset C values.
fn text_values(text: &str) -> Result<Vec<u16>, SymbolError> {
    if text.is_empty() || text.len() % 2 != 0 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SymbolError::InvalidText(format!("{:?} is not an even run of digits", text)));
    }
    Ok(text
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| u16::from(pair[0] - b'0') * 10 + u16::from(pair[1] - b'0'))
        .collect())
}

/// Render `text` at one pixel per module with a quiet zone on both sides.
pub fn encode_linking(text: &str, height_px: u32, quiet_zone_modules: u32) -> Result<GrayImage, SymbolError> {
    let values = text_values(text)?;
    let check = check_value(&values);

    let mut bars: Vec<u32> = Vec::new();
    bars.extend(widths(PATTERNS[START_C as usize]));
    for &v in values.iter().chain(std::iter::once(&check)) {
        bars.extend(widths(PATTERNS[v as usize]));
    }
    bars.extend(widths(STOP));

    let modules: u32 = bars.iter().sum::<u32>() + 2 * quiet_zone_modules;
    let height = height_px.max(1);
    let mut img = GrayImage::from_pixel(modules, height, Luma([255]));

    let mut x = quiet_zone_modules;
    for (i, &w) in bars.iter().enumerate() {
        if i % 2 == 0 {
            for px in x..x + w {
                for py in 0..height {
                    img.put_pixel(px, py, Luma([0]));
                }
            }
        }
        x += w;
    }
    Ok(img)
}

/// Read the linking text, trying the upright and rotated orientations.
pub fn read_linking(img: &GrayImage) -> Result<String, SymbolError> {
    let mut last = match read_upright(img) {
        Ok(text) => return Ok(text),
        Err(e) => e,
    };
    let rotations: [fn(&GrayImage) -> GrayImage; 3] = [imageops::rotate90, imageops::rotate270, imageops::rotate180];
    for rotate in rotations {
        match read_upright(&rotate(img)) {
            Ok(text) => return Ok(text),
            Err(SymbolError::NotFound) => {}
            Err(e) => last = e,
        }
    }
    Err(last)
}

fn read_upright(img: &GrayImage) -> Result<String, SymbolError> {
    let mut last = SymbolError::NotFound;
    // A middle band of rows is enough; bars span the full height.
    let step = (img.height() / 8).max(1);
    for y in (0..img.height()).step_by(step as usize) {
        match read_row(&runs(img, y)) {
            Ok(text) => return Ok(text),
            Err(SymbolError::NotFound) => {}
            Err(e) => last = e,
        }
    }
    Err(last)
}

/// Run lengths of one pixel row, light first (a leading zero-length light
/// run when the row starts dark).
fn runs(img: &GrayImage, y: u32) -> Vec<u32> {
    let mut out = Vec::new();
    let mut dark = false;
    let mut len = 0u32;
    for x in 0..img.width() {
        let is_dark = img.get_pixel(x, y)[0] < 128;
        if is_dark == dark {
            len += 1;
        } else {
            out.push(len);
            dark = is_dark;
            len = 1;
        }
    }
    out.push(len);
    out
}

fn normalise(runs: &[u32], units: u32) -> Option<String> {
    let total: u32 = runs.iter().sum();
    if total == 0 {
        return None;
    }
    let mut text = String::with_capacity(runs.len());
    let mut sum = 0;
    for &w in runs {
        let m = (2 * w * units + total) / (2 * total);
        if m == 0 || m > 4 {
            return None;
        }
        sum += m;
        text.push(char::from(b'0' + m as u8));
    }
    (sum == units).then_some(text)
}

fn read_row(runs: &[u32]) -> Result<String, SymbolError> {
    let start_pattern = PATTERNS[START_C as usize];

    // Odd indices are dark runs.
    let mut i = 1;
    while i + 6 <= runs.len() {
        let window = &runs[i..i + 6];
        let module = window.iter().sum::<u32>() as f32 / CHAR_MODULES as f32;
        let quiet_ok = runs[i - 1] as f32 >= MIN_QUIET_MODULES as f32 * module;
        if quiet_ok && normalise(window, CHAR_MODULES).as_deref() == Some(start_pattern) {
            return read_from(&runs[i + 6..]);
        }
        i += 2;
    }
    Err(SymbolError::NotFound)
}

fn read_from(runs: &[u32]) -> Result<String, SymbolError> {
    let mut values = Vec::new();
    let mut pos = 0;
    loop {
        if pos + 7 <= runs.len() && normalise(&runs[pos..pos + 7], STOP_MODULES).as_deref() == Some(STOP) {
            break;
        }
        let pattern = runs
            .get(pos..pos + 6)
            .and_then(|w| normalise(w, CHAR_MODULES))
            .ok_or_else(|| SymbolError::Structure("unreadable linking character".into()))?;
        let value = PATTERNS
            .iter()
            .position(|p| *p == pattern)
            .ok_or_else(|| SymbolError::Structure(format!("unknown linking pattern {}", pattern)))?;
        values.push(value as u16);
        pos += 6;
    }

    let (&check, data) = values
        .split_last()
        .ok_or_else(|| SymbolError::Structure("no check character".into()))?;
    let expected = check_value(data);
    if expected != check {
        return Err(SymbolError::Checksum { expected, actual: check });
    }
    if let Some(&v) = data.iter().find(|&&v| v >= 100) {
        return Err(SymbolError::InvalidText(format!("subset switch {} not supported", v)));
    }
    Ok(data.iter().map(|v| format!("{:02}", v)).collect())
}
