use serde::Deserialize;

use crate::config::ApiConfig;
use crate::database::Page;

/// `?pageNumber=&pageSize=` as sent by clients. Values are parsed leniently:
/// anything missing, unparseable or below 1 falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn to_page(&self, config: &ApiConfig) -> Page {
        let number = positive(self.page_number.as_deref()).unwrap_or(1);
        let size = positive(self.page_size.as_deref())
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size.max(1));
        Page::new(number, size)
    }
}

fn positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n > 0)
}
