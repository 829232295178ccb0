use std::time::Duration;
use url::Url;

/// Picks a uniformly random duration in `[min, max]`. A reversed range is
/// treated as `[max, min]`.
pub fn jittered(min: Duration, max: Duration) -> Duration {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let span = (hi - lo).as_secs_f64();
    lo + Duration::from_secs_f64(rand::random::<f64>() * span)
}

/// Formats a counter the way the profile card shows it.
///
/// # Example
///
/// ```
/// use instascope::core::utils::format_count;
///
/// assert_eq!(format_count(1_500_000), "1.5M");
/// assert_eq!(format_count(12_345), "12.3K");
/// assert_eq!(format_count(950), "950");
/// ```
pub fn format_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Reduces a profile reference (bare handle or profile URL) to its last path
/// segment: query string dropped, surrounding slashes stripped, whitespace trimmed.
///
/// # Example
///
/// ```
/// use instascope::core::utils::reference_slug;
///
/// assert_eq!(reference_slug("https://example.com/jane_doe/?hl=en"), "jane_doe");
/// assert_eq!(reference_slug("  jane_doe "), "jane_doe");
/// ```
pub fn reference_slug(raw: &str) -> String {
    let without_query = raw.split('?').next().unwrap_or_default();
    without_query
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Path segments that precede a media shortcode in post URLs.
const MEDIA_PATH_MARKERS: &[&str] = &["p", "reel", "reels", "tv"];

/// Extracts the media shortcode from a post/reel URL, or returns the input
/// trimmed when it is already a bare code. A path that stops at a marker
/// (`/p/`, `/reel/`) has no code.
pub fn media_code_from_reference(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let Ok(url) = Url::parse(raw) else {
        let slug = reference_slug(raw);
        return (!slug.is_empty() && !MEDIA_PATH_MARKERS.contains(&slug.as_str())).then_some(slug);
    };

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    segments
        .windows(2)
        .find(|pair| MEDIA_PATH_MARKERS.contains(&pair[0]))
        .map(|pair| pair[1].to_string())
        .or_else(|| {
            segments
                .last()
                .filter(|seg| !MEDIA_PATH_MARKERS.contains(*seg))
                .map(|seg| seg.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jittered_stays_in_range() {
        let min = Duration::from_millis(1000);
        let max = Duration::from_millis(3000);
        for _ in 0..200 {
            let d = jittered(min, max);
            assert!(d >= min && d <= max, "{:?} out of range", d);
        }
    }

    #[test]
    fn test_jittered_degenerate_and_reversed_ranges() {
        let d = Duration::from_millis(500);
        assert_eq!(jittered(d, d), d);
        let r = jittered(Duration::from_secs(2), Duration::from_secs(1));
        assert!(r >= Duration::from_secs(1) && r <= Duration::from_secs(2));
        assert_eq!(jittered(Duration::ZERO, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(950), "950");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(12_345), "12.3K");
        assert_eq!(format_count(1_500_000), "1.5M");
    }

    #[test]
    fn test_reference_slug_variants() {
        assert_eq!(reference_slug("jane_doe"), "jane_doe");
        assert_eq!(reference_slug("https://example.com/jane_doe/?hl=en"), "jane_doe");
        assert_eq!(reference_slug("https://www.instagram.com/jane_doe"), "jane_doe");
        assert_eq!(reference_slug("/jane_doe/"), "jane_doe");
        assert_eq!(reference_slug(""), "");
    }

    #[test]
    fn test_media_code_from_post_url() {
        assert_eq!(
            media_code_from_reference("https://www.instagram.com/p/Cx1AbCdEf/?igsh=abc"),
            Some("Cx1AbCdEf".to_string())
        );
        assert_eq!(
            media_code_from_reference("https://www.instagram.com/reel/Cz9Reel00/"),
            Some("Cz9Reel00".to_string())
        );
        assert_eq!(
            media_code_from_reference("https://www.instagram.com/jane_doe/p/CodeX1/"),
            Some("CodeX1".to_string())
        );
    }

    #[test]
    fn test_media_code_from_bare_code() {
        assert_eq!(media_code_from_reference("  Cx1AbCdEf "), Some("Cx1AbCdEf".to_string()));
        assert_eq!(media_code_from_reference("   "), None);
    }

    #[test]
    fn test_media_code_missing_after_marker() {
        assert_eq!(media_code_from_reference("https://www.instagram.com/p/"), None);
        assert_eq!(media_code_from_reference("https://www.instagram.com/reel/?igsh=abc"), None);
        assert_eq!(media_code_from_reference("/tv/"), None);
        assert_eq!(
            media_code_from_reference("https://www.instagram.com/reel/Cabc/"),
            Some("Cabc".to_string())
        );
    }
}
