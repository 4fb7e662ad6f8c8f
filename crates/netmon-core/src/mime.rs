#![forbid(unsafe_code)]

//! MIME type abbreviation and content-category predicates.

/// Subtype of a MIME type with parameters and structured suffixes removed.
///
/// `"text/html; charset=utf-8"` becomes `"html"`, `"image/svg+xml"` becomes
/// `"svg"`. Missing input yields an empty string.
pub fn abbreviate_mime(mime: Option<&str>) -> &str {
    let Some(mime) = mime else {
        return "";
    };
    let essence = mime.split(';').next().unwrap_or_default();
    let subtype = essence.split('/').nth(1).unwrap_or_default();
    subtype.split('+').next().unwrap_or_default()
}

/// Short label shown in the type column.
pub fn display_type(mime: Option<&str>) -> &str {
    match abbreviate_mime(mime) {
        "ecmascript" | "javascript" | "x-javascript" => "js",
        other => other,
    }
}

/// Content categories offered by the request filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentCategory {
    Html,
    Css,
    Js,
    Xhr,
    Fonts,
    Images,
    Media,
    Flash,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 8] = [
        Self::Html,
        Self::Css,
        Self::Js,
        Self::Xhr,
        Self::Fonts,
        Self::Images,
        Self::Media,
        Self::Flash,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
            Self::Xhr => "xhr",
            Self::Fonts => "fonts",
            Self::Images => "images",
            Self::Media => "media",
            Self::Flash => "flash",
        }
    }

    /// Parse a category name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// Whether a request with these attributes belongs to the category.
    pub fn matches(self, mime: Option<&str>, url: &str, is_xhr: bool) -> bool {
        let has = |needle: &str| mime.is_some_and(|m| m.contains(needle));
        match self {
            Self::Html => has("/html"),
            Self::Css => has("/css"),
            Self::Js => has("/ecmascript") || has("/javascript") || has("/x-javascript"),
            Self::Xhr => is_xhr,
            Self::Fonts => {
                has("font/")
                    || has("/font")
                    || [".eot", ".ttf", ".otf", ".woff"]
                        .iter()
                        .any(|ext| url.contains(ext))
            }
            Self::Images => has("image/"),
            Self::Media => has("audio/") || has("video/") || has("model/"),
            Self::Flash => {
                has("/x-flv")
                    || has("/x-shockwave-flash")
                    || url.contains(".swf")
                    || url.contains(".flv")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviation_strips_params_and_suffix() {
        assert_eq!(abbreviate_mime(Some("text/html; charset=utf-8")), "html");
        assert_eq!(abbreviate_mime(Some("image/svg+xml")), "svg");
        assert_eq!(abbreviate_mime(Some("garbage")), "");
        assert_eq!(abbreviate_mime(None), "");
    }

    #[test]
    fn javascript_variants_display_as_js() {
        for mime in [
            "application/javascript",
            "application/x-javascript",
            "text/ecmascript",
        ] {
            assert_eq!(display_type(Some(mime)), "js");
        }
        assert_eq!(display_type(Some("text/css")), "css");
    }

    #[test]
    fn fonts_match_by_url_without_mime() {
        assert!(ContentCategory::Fonts.matches(None, "https://x.test/a.woff2", false));
        assert!(ContentCategory::Fonts.matches(Some("font/woff"), "https://x.test/f", false));
        assert!(!ContentCategory::Fonts.matches(None, "https://x.test/a.js", false));
    }

    #[test]
    fn media_excludes_images() {
        assert!(ContentCategory::Media.matches(Some("video/mp4"), "", false));
        assert!(!ContentCategory::Media.matches(Some("image/png"), "", false));
        assert!(ContentCategory::Images.matches(Some("image/png"), "", false));
    }

    #[test]
    fn xhr_uses_flag_only() {
        assert!(ContentCategory::Xhr.matches(None, "", true));
        assert!(!ContentCategory::Xhr.matches(Some("text/html"), "", false));
    }

    #[test]
    fn flash_by_mime_or_extension() {
        assert!(ContentCategory::Flash.matches(Some("application/x-shockwave-flash"), "", false));
        assert!(ContentCategory::Flash.matches(None, "https://x.test/movie.flv", false));
    }

    #[test]
    fn category_names_round_trip() {
        for category in ContentCategory::ALL {
            assert_eq!(ContentCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(ContentCategory::parse("all"), None);
    }
}
