//! Google Sheets v4 REST client implementing the ArticleStore interface.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, instrument};

use litscout_common::sandbox::SandboxClient;
use litscout_common::{Article, ArticleStore, LitscoutError};

use crate::auth::TokenProvider;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct SheetsClient {
    http: SandboxClient,
    auth: TokenProvider,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(http: SandboxClient, auth: TokenProvider, spreadsheet_id: impl Into<String>) -> Self {
        Self { http, auth, spreadsheet_id: spreadsheet_id.into() }
    }

    async fn get_json(&self, url: &str) -> litscout_common::Result<serde_json::Value> {
        let token = self.auth.token().await?;
        let resp = self.http
            .get(url)?
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| LitscoutError::StoreUnavailable(e.to_string()))?;
        check_sheets_status(resp).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> litscout_common::Result<serde_json::Value> {
        let token = self.auth.token().await?;
        let resp = self.http
            .post(url)?
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(|e| LitscoutError::StoreUnavailable(e.to_string()))?;
        check_sheets_status(resp).await
    }
}

async fn check_sheets_status(
    resp: reqwest::Response,
) -> litscout_common::Result<serde_json::Value> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(LitscoutError::StoreUnavailable(format!(
            "sheets API [{status}]: {body}"
        )));
    }
    resp.json()
        .await
        .map_err(|e| LitscoutError::StoreUnavailable(e.to_string()))
}

/// 1-based column number → A1 letter ("A", "Z", "AA", …). Column 0 has no
/// letter and would produce the malformed range `{tab}!:`.
pub fn column_letter(mut n: u32) -> litscout_common::Result<String> {
    if n == 0 {
        return Err(LitscoutError::Config(
            "sheet columns are 1-based; 0 is not a valid column".to_string(),
        ));
    }
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    Ok(letters.into_iter().rev().map(char::from).collect())
}

#[async_trait]
impl ArticleStore for SheetsClient {
    #[instrument(skip(self))]
    async fn existing_titles(
        &self,
        tab: &str,
        column: u32,
    ) -> litscout_common::Result<HashSet<String>> {
        let letter = column_letter(column)?;
        let url = format!(
            "{SHEETS_BASE_URL}/{}/values/{tab}!{letter}:{letter}?majorDimension=COLUMNS",
            self.spreadsheet_id
        );

        let json = self.get_json(&url).await?;
        let titles: HashSet<String> = json["values"][0]
            .as_array()
            .unwrap_or(&vec![])
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();

        debug!(count = titles.len(), tab, "existing titles snapshot read");
        Ok(titles)
    }

    #[instrument(skip(self, articles), fields(n = articles.len()))]
    async fn append(&self, articles: &[Article], tab: &str) -> litscout_common::Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        let url = format!(
            "{SHEETS_BASE_URL}/{}/values/{tab}:append?valueInputOption=RAW",
            self.spreadsheet_id
        );
        let rows: Vec<Vec<String>> = articles.iter().map(Article::row).collect();
        let body = serde_json::json!({ "values": rows });

        let json = self.post_json(&url, &body).await?;
        let appended = json["updates"]["updatedRows"]
            .as_u64()
            .map(|n| n as usize)
            .unwrap_or(articles.len());

        debug!(appended, tab, "articles appended to sheet");
        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter_single() {
        assert_eq!(column_letter(1).unwrap(), "A");
        assert_eq!(column_letter(2).unwrap(), "B");
        assert_eq!(column_letter(26).unwrap(), "Z");
    }

    #[test]
    fn test_column_letter_double() {
        assert_eq!(column_letter(27).unwrap(), "AA");
        assert_eq!(column_letter(28).unwrap(), "AB");
        assert_eq!(column_letter(52).unwrap(), "AZ");
        assert_eq!(column_letter(702).unwrap(), "ZZ");
        assert_eq!(column_letter(703).unwrap(), "AAA");
    }

    #[test]
    fn test_column_zero_is_a_config_error() {
        assert!(matches!(column_letter(0), Err(LitscoutError::Config(_))));
    }
}
