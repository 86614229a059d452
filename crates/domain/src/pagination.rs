/// Page size used when the caller asks for something out of range
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest page a caller may request
pub const MAX_LIMIT: u64 = 100;

/// A clamped limit/offset pair, safe to hand to a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

impl Pagination {
    /// Clamp caller-supplied values.
    ///
    /// A limit outside `1..=100` falls back to [`DEFAULT_LIMIT`] (it is not
    /// saturated to the bound); a negative offset becomes `0`.
    pub fn clamped(limit: i64, offset: i64) -> Self {
        let limit = match u64::try_from(limit) {
            Ok(l) if (1..=MAX_LIMIT).contains(&l) => l,
            _ => DEFAULT_LIMIT,
        };
        let offset = u64::try_from(offset).unwrap_or(0);

        Pagination { limit, offset }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
