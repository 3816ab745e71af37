/// Hide most of a push key or webhook URL before it reaches the logs.
///
/// Keeps a short prefix so operators can still tell destinations apart.
pub fn mask_secret(secret: &str) -> String {
    let total = secret.chars().count();
    if total <= 4 {
        return "***".to_string();
    }
    let keep = (total / 4).clamp(2, 12);
    let prefix: String = secret.chars().take(keep).collect();
    format!("{}***", prefix)
}

/// Char-safe preview of a response body for error messages.
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}...", cut)
}
