//! SELECT composition from descriptor tables
//!
//! ```text
//! SELECT DISTINCT base.<col> AS <col>, ...
//! FROM <table> AS base
//! [JOIN <link table> AS link ON link.<entity>_id = base.id]
//! [JOIN hgnc_hgnc AS hgnc ON hgnc.id = base.hgnc_id | link.hgnc_id]
//! [WHERE <predicate> AND ...]
//! ORDER BY base.id
//! [LIMIT ? OFFSET ?]
//! ```

use sqlx::{QueryBuilder, Sqlite};

use super::descriptor::{EntityDescriptor, FilterDescriptor, JoinTarget, MatchKind, Relation};
use super::limit::Limit;
use super::value::{Filters, SqlValue};
use super::QueryError;
use crate::db::schema::tables;

const BASE: &str = "base";
const LINK: &str = "link";
const HGNC: &str = "hgnc";

struct Predicate {
    filter: &'static FilterDescriptor,
    kind: MatchKind,
    values: Vec<SqlValue>,
}

impl Predicate {
    fn qualified_column(&self, relation: Relation) -> String {
        let alias = match (self.filter.join, relation) {
            (JoinTarget::Hgnc, Relation::Owned | Relation::Shared { .. }) => HGNC,
            _ => BASE,
        };
        format!("{}.{}", alias, self.filter.column)
    }
}

/// Validate `filters` against `descriptor` and compose the SELECT
///
/// Unknown filter names and uncoercible values are rejected before any SQL
/// is produced.
pub fn select(
    descriptor: &'static EntityDescriptor,
    filters: &Filters,
    limit: &Limit,
) -> Result<QueryBuilder<'static, Sqlite>, QueryError> {
    for name in filters.keys() {
        if descriptor.filter(name).is_none() {
            return Err(QueryError::UnknownFilter(name.clone()));
        }
    }

    // Descriptor order keeps the generated SQL stable
    let mut predicates = Vec::with_capacity(filters.len());
    for filter in descriptor.filters {
        if let Some(value) = filters.get(filter.name) {
            predicates.push(Predicate {
                filter,
                kind: value.match_kind(filter),
                values: value.coerce(filter)?,
            });
        }
    }

    let bounds = limit.bounds()?;

    let mut builder = QueryBuilder::new("SELECT DISTINCT ");
    for (i, column) in descriptor.columns.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(format!("{}.{} AS {}", BASE, column, column));
    }
    builder.push(format!(" FROM {} AS {}", descriptor.table, BASE));

    let needs_hgnc = predicates.iter().any(|p| p.filter.join == JoinTarget::Hgnc);
    if needs_hgnc {
        push_hgnc_join(&mut builder, descriptor.relation);
    }

    for (i, predicate) in predicates.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(&mut builder, predicate, descriptor.relation);
    }

    builder.push(format!(" ORDER BY {}.id", BASE));

    if let Some((rows, offset)) = bounds {
        builder.push(" LIMIT ");
        builder.push_bind(rows);
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }

    Ok(builder)
}

/// Join `hgnc_hgnc` once, through the link table for shared entities
fn push_hgnc_join(builder: &mut QueryBuilder<'static, Sqlite>, relation: Relation) {
    match relation {
        Relation::Root => {},
        Relation::Owned => {
            builder.push(format!(
                " JOIN {table} AS {hgnc} ON {hgnc}.id = {base}.hgnc_id",
                table = tables::HGNC,
                hgnc = HGNC,
                base = BASE,
            ));
        },
        Relation::Shared {
            link_table,
            link_column,
        } => {
            builder.push(format!(
                " JOIN {link_table} AS {link} ON {link}.{link_column} = {base}.id \
                 JOIN {table} AS {hgnc} ON {hgnc}.id = {link}.hgnc_id",
                link_table = link_table,
                link = LINK,
                link_column = link_column,
                base = BASE,
                table = tables::HGNC,
                hgnc = HGNC,
            ));
        },
    }
}

fn push_predicate(builder: &mut QueryBuilder<'static, Sqlite>, predicate: &Predicate, relation: Relation) {
    builder.push(predicate.qualified_column(relation));
    match predicate.kind {
        MatchKind::Equals => {
            builder.push(" = ");
            push_value(builder, &predicate.values[0]);
        },
        MatchKind::Like => {
            builder.push(" LIKE ");
            push_value(builder, &predicate.values[0]);
        },
        MatchKind::Membership => {
            builder.push(" IN (");
            for (i, value) in predicate.values.iter().enumerate() {
                if i > 0 {
                    builder.push(", ");
                }
                push_value(builder, value);
            }
            builder.push(")");
        },
    }
}

fn push_value(builder: &mut QueryBuilder<'static, Sqlite>, value: &SqlValue) {
    match value {
        SqlValue::Int(n) => builder.push_bind(*n),
        SqlValue::Text(s) => builder.push_bind(s.clone()),
        SqlValue::Bool(b) => builder.push_bind(*b),
    };
}
