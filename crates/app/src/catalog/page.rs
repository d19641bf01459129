//! Pagination.

/// Grid or list layout; each has a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    #[must_use]
    pub const fn page_size(self) -> usize {
        match self {
            Self::Grid => 12,
            Self::List => 10,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "grid" => Some(Self::Grid),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

/// One page of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, clamped into range.
    pub number: usize,
    /// Always at least 1.
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// Cut `items` to page `page` of `size`.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, size: usize) -> Page<T> {
    let size = size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(size).max(1);
    let number = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((number - 1) * size)
        .take(size)
        .collect();

    Page {
        items,
        number,
        total_pages,
        total_items,
    }
}

/// Page to show: the requested one, or 1 if the filter changed since the
/// last render of this view.
#[must_use]
pub fn effective_page(requested: Option<usize>, previous: Option<&str>, current: &str) -> usize {
    match previous {
        Some(previous) if previous != current => 1,
        _ => requested.unwrap_or(1).max(1),
    }
}
