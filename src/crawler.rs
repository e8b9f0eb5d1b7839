/// Substrings of user agents that belong to search engines, SEO tools,
/// uptime monitors and headless browsers.
pub const CRAWLER_PATTERNS: &[&str] = &[
    "googlebot",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "sogou",
    "exabot",
    "facebot",
    "ia_archiver",
    "crawler",
    "spider",
    "bot",
    "crawl",
    "APIs-Google",
    "AdsBot",
    "mediapartners",
    "Google-Read-Aloud",
    "semrushbot",
    "ahrefsbot",
    "mj12bot",
    "dotbot",
    "petalbot",
    "uptimerobot",
    "pingdom",
    "gtmetrix",
    "lighthouse",
    "pagespeed",
    "headlesschrome",
    "phantomjs",
    "selenium",
    "puppeteer",
    "playwright",
];

/// True for automated traffic. A request without a user agent counts as one.
pub fn is_crawler(user_agent: Option<&str>) -> bool {
    let Some(ua) = user_agent.filter(|ua| !ua.is_empty()) else {
        return true;
    };
    let ua = ua.to_lowercase();
    CRAWLER_PATTERNS
        .iter()
        .any(|pattern| ua.contains(&pattern.to_lowercase()))
}
