use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

pub const DEFAULT_MAX_INPUT_LENGTH: usize = 100;

const DENIED_PATTERNS: [&str; 4] = ["<script>", "../", ";", "--"];

static CARD_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{16}$").unwrap());

/// Denylist check for free-form user input. Rejects, never rewrites.
pub fn validate_user_input(text: &str, max_length: usize) -> bool {
    if text.is_empty() || text.chars().count() > max_length {
        return false;
    }

    let lowered = text.to_lowercase();
    !DENIED_PATTERNS.iter().any(|pattern| lowered.contains(pattern))
}

/// `ORD<unix seconds><1000..=9999>`. Two ids minted in the same second may collide.
pub fn generate_order_id() -> String {
    let timestamp = Utc::now().timestamp();
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("ORD{}{}", timestamp, suffix)
}

/// Returns the card number with spaces removed when it is exactly 16 digits.
pub fn normalize_card_number(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(|c| *c != ' ').collect();
    CARD_NUMBER_REGEX.is_match(&digits).then_some(digits)
}
