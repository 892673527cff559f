/// Posts shown per listing page.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: u64,
    per_page: u32,
}

impl Paginator {
    pub fn new(total: u64, per_page: u32) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    /// An empty listing still has one (empty) page.
    pub fn num_pages(&self) -> u32 {
        if self.total == 0 {
            return 1;
        }
        self.total.div_ceil(self.per_page as u64) as u32
    }

    /// Lenient lookup of the `?page=` value: garbage or a missing value
    /// gives the first page, anything out of range gives the last one.
    pub fn page_number(&self, raw: Option<&str>) -> u32 {
        let Some(number) = raw.and_then(|raw| raw.trim().parse::<i64>().ok()) else {
            return 1;
        };

        let last = self.num_pages();
        if number < 1 || number > last as i64 {
            last
        } else {
            number as u32
        }
    }

    pub fn offset(&self, number: u32) -> u32 {
        number.saturating_sub(1) * self.per_page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number,
            num_pages: self.num_pages(),
            total: self.total,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> u32 {
        self.number + 1
    }

    pub fn previous_page_number(&self) -> u32 {
        self.number.saturating_sub(1)
    }
}
