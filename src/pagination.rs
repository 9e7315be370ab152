use serde::{Deserialize, Serialize};

const fn default_page() -> usize {
    1
}

const fn default_page_size() -> usize {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl PaginationQuery {
    #[must_use]
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size.clamp(1, 100)
    }

    // absurd page numbers land past the end instead of overflowing
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page() - 1).saturating_mul(self.page_size())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl PaginationMeta {
    #[must_use]
    pub fn from_total(total_items: usize, query: &PaginationQuery) -> Self {
        let page_size = query.page_size();

        Self {
            page: query.page(),
            page_size,
            total_items,
            total_pages: total_items.div_ceil(page_size),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    // the remote hands back whole tables, slice the requested page out of them
    #[must_use]
    pub fn from_items(items: Vec<T>, query: &PaginationQuery) -> Self {
        let pagination = PaginationMeta::from_total(items.len(), query);
        let data = items
            .into_iter()
            .skip(query.offset())
            .take(query.page_size())
            .collect();

        Self { data, pagination }
    }
}
