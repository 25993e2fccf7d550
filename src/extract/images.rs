use once_cell::sync::Lazy;
use regex::Regex;

/// Matches an embedded size/format token such as `._SS40_.` or `._SR38,50_.`
static SIZE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\._[A-Za-z0-9,]+_\.").expect("size token regex is hardcoded and valid")
});

/// Rewrites a gallery thumbnail URL to its full-resolution form
///
/// Strips every size/format token, repeating until none remains, so applying
/// the transform twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use listing_harvester::extract::normalize_image_url;
///
/// let full = normalize_image_url("https://m.media-amazon.com/images/I/41abc._SS40_.jpg");
/// assert_eq!(full, "https://m.media-amazon.com/images/I/41abc.jpg");
/// ```
pub fn normalize_image_url(src: &str) -> String {
    let mut current = src.to_string();
    loop {
        let next = SIZE_TOKEN.replace_all(&current, ".").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
