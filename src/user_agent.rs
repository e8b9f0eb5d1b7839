use woothee::parser::{Parser, WootheeResult};

/// Browser details stored on each visitor record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserInfo {
    pub browser: String,
    pub browser_version: String,
    pub os: String,
    pub platform: String,
    pub is_mobile: bool,
    pub is_desktop: bool,
    pub is_tablet: bool,
}

impl Default for BrowserInfo {
    fn default() -> Self {
        Self {
            browser: "unknown".to_string(),
            browser_version: "unknown".to_string(),
            os: "unknown".to_string(),
            platform: "unknown".to_string(),
            is_mobile: false,
            is_desktop: false,
            is_tablet: false,
        }
    }
}

impl BrowserInfo {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.trim().is_empty() {
            return Self::default();
        }

        match Parser::new().parse(user_agent) {
            Some(result) => Self::from_woothee_result(&result),
            None => Self::default(),
        }
    }

    fn from_woothee_result(result: &WootheeResult) -> Self {
        let is_tablet = result.category == "tablet";
        let is_mobile = matches!(result.category, "smartphone" | "mobilephone");
        Self {
            browser: clean(result.name),
            browser_version: clean(result.version),
            os: clean(result.os),
            platform: platform_for(result.os, result.category),
            is_mobile,
            is_desktop: result.category == "pc",
            is_tablet,
        }
    }
}

fn clean(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value == "UNKNOWN" {
        "unknown".to_string()
    } else {
        value.to_string()
    }
}

fn platform_for(os: &str, category: &str) -> String {
    match os {
        "iPhone" => "iPhone".to_string(),
        "iPad" => "iPad".to_string(),
        "iPod" => "iPod".to_string(),
        "Android" => "Android".to_string(),
        "Mac OSX" | "Mac OS" => "Apple Mac".to_string(),
        "Linux" => "Linux".to_string(),
        os if os.starts_with("Windows") => "Microsoft Windows".to_string(),
        _ if category == "pc" => "Desktop".to_string(),
        _ => "unknown".to_string(),
    }
}
