/// Masks a card number for logs and debug output, keeping the last four digits.
pub fn mask_card_number(number: &str) -> String {
    let len = number.chars().count();
    if len > 4 {
        let end: String = number.chars().skip(len - 4).collect();
        format!("{}{}", "*".repeat(len - 4), end)
    } else {
        "****".to_string()
    }
}

/// Masks a secret, keeping a short prefix when the value is long enough.
pub fn mask_secret(value: &str) -> String {
    if value.chars().count() > 8 {
        let visible: String = value.chars().take(4).collect();
        format!("{}****", visible)
    } else {
        "****".to_string()
    }
}

/// Hides the password part of a connection URL.
pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user = &url[slash_pos + 2..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}
