// best-effort device fingerprint, only ever used to enrich analytics
// NOT an identifier for anything security related

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct FingerprintSignals {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub screen_resolution: String,
    #[serde(default)]
    pub timezone_offset_minutes: i32,
    #[serde(default)]
    pub canvas_signature: String,
}

impl FingerprintSignals {
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let combined = [
            self.user_agent.as_str(),
            self.language.as_str(),
            self.screen_resolution.as_str(),
            &self.timezone_offset_minutes.to_string(),
            self.canvas_signature.as_str(),
        ]
        .join("|");

        to_base36(rolling_hash(&combined).unsigned_abs())
    }
}

// hash * 31 + code unit over UTF-16, wrapping at 32 bits
#[must_use]
pub fn rolling_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
