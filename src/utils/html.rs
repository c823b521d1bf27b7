use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based sanitization: safe tags (<b>, <p>) survive, dangerous
/// tags (<script>, <iframe>) and attributes (onclick) are stripped.
/// Question explanations are admin-supplied rich text and pass through here
/// before storage as a fail-safe against Stored XSS.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
