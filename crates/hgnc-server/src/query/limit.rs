//! Row caps and pagination

use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use super::QueryError;

/// Result size limit
///
/// `Page { page, page_size }` skips `page * page_size` rows, pages count from 0.
/// `Rows(0)` places no cap, like `Unbounded`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLimit")]
pub enum Limit {
    #[default]
    Unbounded,
    Rows(u64),
    Page { page: u64, page_size: u64 },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLimit {
    Rows(u64),
    Page(u64, u64),
    Text(String),
}

impl TryFrom<RawLimit> for Limit {
    type Error = QueryError;

    fn try_from(raw: RawLimit) -> Result<Self, Self::Error> {
        match raw {
            RawLimit::Rows(rows) => Ok(Limit::Rows(rows)),
            RawLimit::Page(page, page_size) => Limit::page(page, page_size),
            RawLimit::Text(text) => text.parse(),
        }
    }
}

impl FromStr for Limit {
    type Err = QueryError;

    /// `"10"` or `"page,page_size"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || QueryError::InvalidLimit(format!("'{}' is neither N nor PAGE,SIZE", s));
        let number = |part: &str| part.trim().parse::<u64>().map_err(|_| invalid());

        match s.split_once(',') {
            None => Ok(Limit::Rows(number(s)?)),
            Some((page, page_size)) => Limit::page(number(page)?, number(page_size)?),
        }
    }
}

impl Limit {
    pub fn page(page: u64, page_size: u64) -> Result<Self, QueryError> {
        if page_size == 0 {
            return Err(QueryError::InvalidLimit("page size must be greater than 0".to_string()));
        }
        Ok(Limit::Page { page, page_size })
    }

    /// Read a JSON limit: null, an integer, `[page, size]` or their text forms
    pub fn from_json(value: &Value) -> Result<Self, QueryError> {
        if value.is_null() {
            return Ok(Limit::Unbounded);
        }
        let raw: RawLimit = serde_json::from_value(value.clone())
            .map_err(|_| QueryError::InvalidLimit(format!("unsupported limit {}", value)))?;
        Limit::try_from(raw)
    }

    /// `(LIMIT, OFFSET)`, `None` when unbounded or capped at zero rows
    pub fn bounds(&self) -> Result<Option<(i64, i64)>, QueryError> {
        let to_sql = |n: u64| {
            i64::try_from(n).map_err(|_| QueryError::InvalidLimit(format!("{} is out of range", n)))
        };

        match *self {
            Limit::Unbounded | Limit::Rows(0) => Ok(None),
            Limit::Rows(rows) => Ok(Some((to_sql(rows)?, 0))),
            Limit::Page { page, page_size } => {
                let offset = page
                    .checked_mul(page_size)
                    .ok_or_else(|| QueryError::InvalidLimit("page offset overflows".to_string()))?;
                Ok(Some((to_sql(page_size)?, to_sql(offset)?)))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert_eq!(Limit::from_json(&json!(null)).unwrap(), Limit::Unbounded);
        assert_eq!(Limit::from_json(&json!(10)).unwrap(), Limit::Rows(10));
        assert_eq!(
            Limit::from_json(&json!([2, 25])).unwrap(),
            Limit::Page { page: 2, page_size: 25 }
        );
        assert_eq!(Limit::from_json(&json!("1,5")).unwrap(), Limit::Page { page: 1, page_size: 5 });
    }

    #[test]
    fn test_invalid_limits() {
        for value in [json!(-1), json!([1]), json!([1, 2, 3]), json!("ten"), json!({"rows": 1}), json!([0, 0])] {
            assert!(
                matches!(Limit::from_json(&value), Err(QueryError::InvalidLimit(_))),
                "accepted {}",
                value
            );
        }
    }

    #[test]
    fn test_parse_text() {
        assert_eq!("3".parse::<Limit>().unwrap(), Limit::Rows(3));
        assert_eq!(" 0 , 10 ".parse::<Limit>().unwrap(), Limit::Page { page: 0, page_size: 10 });
        assert!("1,".parse::<Limit>().is_err());
    }

    #[test]
    fn test_bounds() {
        assert_eq!(Limit::Unbounded.bounds().unwrap(), None);
        assert_eq!(Limit::Rows(7).bounds().unwrap(), Some((7, 0)));
        assert_eq!(Limit::Rows(0).bounds().unwrap(), None);
        assert_eq!(
            Limit::Page { page: 3, page_size: 20 }.bounds().unwrap(),
            Some((20, 60))
        );
        assert!(Limit::Page { page: u64::MAX, page_size: 2 }.bounds().is_err());
    }

    #[test]
    fn test_deserialize_in_struct() {
        #[derive(Deserialize)]
        struct Request {
            limit: Option<Limit>,
        }

        let request: Request = serde_json::from_value(json!({"limit": [1, 2]})).unwrap();
        assert_eq!(request.limit, Some(Limit::Page { page: 1, page_size: 2 }));

        let request: Request = serde_json::from_value(json!({"limit": null})).unwrap();
        assert_eq!(request.limit, None);
    }
}
