use std::sync::LazyLock;

use regex::Regex;
use url::Url;

const WATCH_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];
const SHORT_LINK_HOST: &str = "youtu.be";

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+$").expect("valid video id pattern"));

/// Accept a YouTube watch URL or short link, upgraded to `https`.
/// Anything else yields `None`.
pub fn normalize_youtube_url(text: &str) -> Option<String> {
    let mut url = Url::parse(text.trim()).ok()?;

    // Scheme and host come back lower-cased from the parser
    match url.scheme() {
        "https" => {}
        "http" => url.set_scheme("https").ok()?,
        _ => return None,
    }

    let video_id = extract_video_id(&url)?;
    VIDEO_ID.is_match(&video_id).then(|| url.to_string())
}

fn extract_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?;

    if host == SHORT_LINK_HOST {
        return url
            .path_segments()?
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
    }

    if WATCH_HOSTS.contains(&host) && url.path() == "/watch" {
        return url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_watch_url_is_upgraded() {
        assert_eq!(
            normalize_youtube_url("http://www.youtube.com/watch?v=abc").as_deref(),
            Some("https://www.youtube.com/watch?v=abc")
        );
    }

    #[test]
    fn test_https_and_short_links_are_kept() {
        assert_eq!(
            normalize_youtube_url("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
        assert_eq!(
            normalize_youtube_url(" https://m.youtube.com/watch?v=abc&t=10 \n").as_deref(),
            Some("https://m.youtube.com/watch?v=abc&t=10")
        );
        assert_eq!(
            normalize_youtube_url("http://youtu.be/abc").as_deref(),
            Some("https://youtu.be/abc")
        );
    }

    #[test]
    fn test_video_param_need_not_come_first() {
        assert_eq!(
            normalize_youtube_url("https://www.youtube.com/watch?feature=share&v=abc").as_deref(),
            Some("https://www.youtube.com/watch?feature=share&v=abc")
        );
    }

    #[test]
    fn test_scheme_and_host_case_is_ignored() {
        assert_eq!(
            normalize_youtube_url("HTTP://WWW.YouTube.com/watch?v=abc").as_deref(),
            Some("https://www.youtube.com/watch?v=abc")
        );
    }

    #[test]
    fn test_other_text_is_rejected() {
        assert_eq!(normalize_youtube_url("hello world"), None);
        assert_eq!(normalize_youtube_url("https://vimeo.com/12345"), None);
        assert_eq!(normalize_youtube_url("https://www.youtube.com/channel/abc"), None);
        assert_eq!(normalize_youtube_url("https://www.youtube.com/watch?list=abc"), None);
        assert_eq!(normalize_youtube_url("https://youtu.be/"), None);
        assert_eq!(normalize_youtube_url("ftp://youtu.be/abc"), None);
        assert_eq!(normalize_youtube_url("www.youtube.com/watch?v=abc"), None);
        assert_eq!(normalize_youtube_url(""), None);
    }
}
