use super::params::SqlParam;

/// Accumulates parameterized WHERE predicates for list endpoints.
/// Column expressions passed in are always compile-time constants.
#[derive(Debug, Default, Clone)]
pub struct Filters {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = $n`
    pub fn eq(&mut self, column: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.params.push(value.into());
        self.clauses.push(format!("{} = ${}", column, self.params.len()));
        self
    }

    /// Case-insensitive substring match over any of `columns`
    pub fn search(&mut self, columns: &[&'static str], term: &str) -> &mut Self {
        let pattern = format!("%{}%", escape_like(term));
        self.params.push(SqlParam::Text(Some(pattern)));
        let n = self.params.len();
        let any = columns
            .iter()
            .map(|c| format!("{} ILIKE ${} ESCAPE '\\'", c, n))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.clauses.push(format!("({})", any));
        self
    }

    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Params plus trailing LIMIT/OFFSET, and the placeholders for them
    pub fn paged(&self, page: Page) -> (String, Vec<SqlParam>) {
        let mut params = self.params.clone();
        params.push(SqlParam::BigInt(Some(page.limit)));
        params.push(SqlParam::BigInt(Some(page.offset)));
        let n = params.len();
        (format!(" LIMIT ${} OFFSET ${}", n - 1, n), params)
    }
}

/// Escape LIKE metacharacters so user input matches literally
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Apply the endpoint default and clamp into `1..=max` / `>= 0`
    pub fn resolve(limit: Option<i64>, offset: Option<i64>, default: i64, max: i64) -> Self {
        let max = max.max(1);
        Self {
            limit: limit.unwrap_or(default).clamp(1, max),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}
