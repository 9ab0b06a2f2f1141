use tracing::trace;

// ── Numeric coercion ──────────────────────────────────────────────────────────

/// Strip surrounding whitespace and digit-group commas.
/// " 1,234 " → "1234" | "N/A" → "N/A"
fn normalise_digits(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parse a signed count. Anything that is not an integer is missing.
/// "240" → 240 | "-3" → -3 | "N/A" → None | "" → None
pub fn parse_signed_count(s: &str) -> Option<i64> {
    let cleaned = normalise_digits(s);
    let parsed = cleaned.parse().ok();
    if parsed.is_none() && !cleaned.is_empty() {
        trace!("Non-numeric cell {:?} coerced to missing", s);
    }
    parsed
}

/// Parse an unsigned count (seats, votes).
/// "33,587,202" → 33587202 | "-1" → None
pub fn parse_count(s: &str) -> Option<u64> {
    let cleaned = normalise_digits(s);
    let parsed = cleaned.parse().ok();
    if parsed.is_none() && !cleaned.is_empty() {
        trace!("Non-numeric cell {:?} coerced to missing", s);
    }
    parsed
}

/// Cell text with leading and trailing whitespace removed; inner text is
/// kept as rendered.
pub fn normalise_cell(s: &str) -> String {
    s.trim().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
