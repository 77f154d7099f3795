//! WHERE-clause assembly shared by listing, export and aggregates

use sqlx::{Postgres, QueryBuilder};

use crate::models::{EmployeeFilter, Sort};

/// Append `WHERE year = $n [AND ...]` for `filter`.
pub fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, filter: &EmployeeFilter) {
    builder.push(" WHERE year = ");
    builder.push_bind(filter.year);

    if let Some(department) = &filter.department {
        builder.push(" AND department = ");
        builder.push_bind(department.clone());
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder.push(" AND (name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR title ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    if let Some(component) = filter.earnings_type {
        // column() comes from a closed enum
        builder.push(" AND ");
        builder.push(component.column());
        builder.push(" > 0");
    }
}

/// Append `WHERE year = $n AND department IS NOT NULL AND department != ''`.
pub fn push_department_scope(builder: &mut QueryBuilder<'_, Postgres>, year: i32) {
    builder.push(" WHERE year = ");
    builder.push_bind(year);
    builder.push(" AND department IS NOT NULL AND department != ''");
}

/// Append `ORDER BY <col> <dir>, id` (id keeps paging stable on ties).
pub fn push_order(builder: &mut QueryBuilder<'_, Postgres>, sort: Sort) {
    builder.push(" ORDER BY ");
    builder.push(sort.column.column());
    builder.push(" ");
    builder.push(sort.order.keyword());
    builder.push(", id");
}

/// Escape LIKE wildcards so search text matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
