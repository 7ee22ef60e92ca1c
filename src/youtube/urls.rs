/// URL scraping from free-form text (bookmark exports, channel lists)
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref WATCH_URL: Regex =
        Regex::new(r"https?://(?:www\.)?youtube\.com/watch\?v=[\w-]+").unwrap();
    static ref SHORTS_URL: Regex =
        Regex::new(r"https?://(?:www\.)?youtube\.com/shorts/[\w-]+").unwrap();
    static ref CHANNEL_URL: Regex =
        Regex::new(r"https://www\.youtube\.com/@[\w\-\.]+").unwrap();

    static ref WATCH_ID: Regex = Regex::new(r"youtube\.com/watch\?v=([^&]+)").unwrap();
    static ref SHORTS_ID: Regex = Regex::new(r"youtube\.com/shorts/([^&?]+)").unwrap();
    static ref HANDLE: Regex = Regex::new(r"@([\w\-\.]+)").unwrap();
}

/// URL shapes the extractor knows how to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlPattern {
    /// `youtube.com/watch?v=<id>`
    WatchUrl,
    /// `youtube.com/shorts/<id>`
    ShortsUrl,
    /// `www.youtube.com/@<handle>`
    ChannelHandle,
}

impl UrlPattern {
    fn regex(&self) -> &'static Regex {
        match self {
            UrlPattern::WatchUrl => &WATCH_URL,
            UrlPattern::ShortsUrl => &SHORTS_URL,
            UrlPattern::ChannelHandle => &CHANNEL_URL,
        }
    }

    /// Trailing slashes go; video URLs also lose everything from the first `&`
    fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim_end_matches('/');
        match self {
            UrlPattern::WatchUrl | UrlPattern::ShortsUrl => {
                trimmed.split('&').next().unwrap_or(trimmed).to_string()
            }
            UrlPattern::ChannelHandle => trimmed.to_string(),
        }
    }
}

/// Finds URLs of the configured shapes and returns them unique, in order of first occurrence
#[derive(Debug, Clone)]
pub struct UrlExtractor {
    patterns: Vec<UrlPattern>,
}

impl UrlExtractor {
    pub fn new(patterns: Vec<UrlPattern>) -> Self {
        Self { patterns }
    }

    /// Watch and shorts links
    pub fn videos() -> Self {
        Self::new(vec![UrlPattern::WatchUrl, UrlPattern::ShortsUrl])
    }

    /// Channel handle links
    pub fn channels() -> Self {
        Self::new(vec![UrlPattern::ChannelHandle])
    }

    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = Vec::new();
        for pattern in &self.patterns {
            for m in pattern.regex().find_iter(text) {
                found.push((m.start(), pattern.normalize(m.as_str())));
            }
        }
        found.sort_by_key(|(start, _)| *start);

        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter_map(|(_, url)| seen.insert(url.clone()).then_some(url))
            .collect()
    }
}

/// Video id from a watch or shorts URL
pub fn extract_video_id(url: &str) -> Option<String> {
    [&*WATCH_ID, &*SHORTS_ID]
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Channel handle (the part after `@`), used as the channel name
pub fn channel_handle(url: &str) -> Option<String> {
    HANDLE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
