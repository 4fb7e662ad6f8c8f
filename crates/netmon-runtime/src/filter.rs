#![forbid(unsafe_code)]

//! Visibility filters for the request list.

use std::fmt;

use netmon_core::mime::ContentCategory;
use netmon_core::record::RequestRecord;

/// Which requests are visible.
#[derive(Default)]
pub enum Filter {
    #[default]
    All,
    Category(ContentCategory),
    Custom(Box<dyn Fn(&RequestRecord) -> bool>),
}

impl Filter {
    /// `"all"` or a category name.
    pub fn parse(name: &str) -> Option<Self> {
        if name == "all" {
            return Some(Self::All);
        }
        ContentCategory::parse(name).map(Self::Category)
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&RequestRecord) -> bool + 'static,
    {
        Self::Custom(Box::new(predicate))
    }

    pub fn matches(&self, record: &RequestRecord) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => {
                category.matches(record.mime_type.as_deref(), &record.url, record.is_xhr)
            }
            Self::Custom(predicate) => predicate(record),
        }
    }
}

impl From<ContentCategory> for Filter {
    fn from(category: ContentCategory) -> Self {
        Self::Category(category)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Category(c) => f.debug_tuple("Category").field(c).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
