use ammonia;

/// Clean user-supplied HTML using the ammonia library.
///
/// Review comments are rendered by the frontend, so they pass through a
/// whitelist-based sanitizer: safe tags (like <b>, <p>) are preserved while
/// dangerous tags (like <script>, <iframe>) and malicious attributes (like
/// onclick) are stripped. This is a fail-safe against stored XSS.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
