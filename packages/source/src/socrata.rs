//! Socrata SODA API fetcher.
//!
//! Pages through a dataset with the `$limit`, `$offset`, `$order`, and
//! `$where` query parameters and returns the raw JSON rows.

use chrono::NaiveDateTime;

use crate::parsing::format_socrata_date;
use crate::{FetchOptions, SourceError, retry};

/// Configuration for a Socrata fetch operation.
pub struct SocrataConfig<'a> {
    /// Resource URL (e.g., `"https://data.lacity.org/resource/yru6-6re4.json"`).
    pub api_url: &'a str,
    /// Date column used for ordering and `$where` filtering.
    pub date_column: &'a str,
    /// Label for log messages.
    pub label: &'a str,
    /// Page size for pagination.
    pub page_size: u64,
}

/// Builds the `$where` clause restricting rows to `date_column >= since`.
#[must_use]
pub fn since_clause(date_column: &str, since: &NaiveDateTime) -> String {
    format!("{date_column} >= '{}'", format_socrata_date(since))
}

/// Fetches all rows from a Socrata dataset, one page at a time.
///
/// Rows are ordered by `date_column` then `:id` so that offsets stay stable
/// across pages.
///
/// # Errors
///
/// Returns [`SourceError`] if an HTTP request fails after retries or a page
/// is not a JSON array.
pub async fn fetch_socrata(
    config: &SocrataConfig<'_>,
    options: &FetchOptions,
) -> Result<Vec<serde_json::Value>, SourceError> {
    let client = reqwest::Client::builder()
        .user_agent("la-crime-map/1.0")
        .build()?;
    let mut all_records: Vec<serde_json::Value> = Vec::new();
    let mut offset: u64 = 0;
    let fetch_limit = options.limit.unwrap_or(u64::MAX);
    let order = format!("{} ASC, :id", config.date_column);
    let where_clause = options
        .since
        .as_ref()
        .map(|since| since_clause(config.date_column, since));

    loop {
        let remaining = fetch_limit.saturating_sub(offset);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(config.page_size);

        log::info!(
            "Fetching {} data: offset={offset}, limit={page_limit}",
            config.label
        );

        let body = retry::send_json(|| {
            let mut params = vec![
                ("$limit", page_limit.to_string()),
                ("$offset", offset.to_string()),
                ("$order", order.clone()),
            ];
            if let Some(clause) = &where_clause {
                params.push(("$where", clause.clone()));
            }
            client.get(config.api_url).query(&params)
        })
        .await?;

        let serde_json::Value::Array(records) = body else {
            return Err(SourceError::Normalization {
                message: format!("{} page at offset {offset} is not a JSON array", config.label),
            });
        };

        let count = records.len() as u64;
        if count == 0 {
            break;
        }

        all_records.extend(records);
        offset += count;

        if count < page_limit {
            break;
        }
    }

    log::info!(
        "Downloaded {} {} records total",
        all_records.len(),
        config.label
    );

    Ok(all_records)
}
