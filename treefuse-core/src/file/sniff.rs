/// How many leading bytes are examined. Classification never reads the
/// whole file into the decision; the prefix is representative enough.
const SAMPLE_WINDOW: usize = 8192;

/// Fraction of suspicious bytes above which content counts as binary.
const SUSPICIOUS_RATIO: f64 = 0.30;

/// Heuristic binary/text classification over raw bytes.
///
/// A NUL byte anywhere in the sample window classifies immediately.
/// Otherwise the ratio of non-printable, non-whitespace bytes over the
/// window decides. Empty content is text. Never fails; unreadable files
/// surface their own read errors downstream.
pub fn is_binary(content: &[u8]) -> bool {
    if content.is_empty() {
        return false;
    }

    let window = &content[..content.len().min(SAMPLE_WINDOW)];
    if window.contains(&0) {
        return true;
    }

    let suspicious = window.iter().filter(|&&b| is_suspicious(b)).count();
    (suspicious as f64 / window.len() as f64) > SUSPICIOUS_RATIO
}

/// Control bytes other than common whitespace. Bytes >= 0x80 are left
/// alone so UTF-8 multibyte text is not misclassified.
fn is_suspicious(byte: u8) -> bool {
    match byte {
        b'\n' | b'\r' | b'\t' | 0x0b | 0x0c => false,
        0x00..=0x1f | 0x7f => true,
        _ => false,
    }
}
