//! Web scraping tool definition.
//!
//! `scraper::Html` is not `Send`, so parsing happens in a plain function that
//! never holds the document across an await.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{info, instrument};

use super::{http_client, parse_url};
use crate::core::config::Config;
use crate::domains::tools::definitions::common::ok_text;
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct WebScrapeTool {
    config: Arc<Config>,
}

impl WebScrapeTool {
    pub const NAME: &'static str = "web_scrape";

    pub const DESCRIPTION: &'static str = "Fetch a web page and extract the text (or an attribute) of elements matching a CSS selector.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("url"))
            .field(FieldSpec::string("selector").default("body").describe("CSS selector"))
            .field(
                FieldSpec::string("attribute")
                    .optional()
                    .describe("Return this attribute instead of the element text (e.g. 'href')"),
            )
            .field(FieldSpec::integer("limit").range(1.0, 1000.0).default(50))
    }

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(),
            Self {
                config: ctx.config.clone(),
            },
        )
    }
}

pub(crate) fn extract(
    html: &str,
    selector: &str,
    attribute: Option<&str>,
    limit: usize,
) -> Result<Vec<String>, ToolError> {
    let selector = Selector::parse(selector)
        .map_err(|e| ToolError::failed(format!("Invalid CSS selector '{}': {}", selector, e)))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|element| match attribute {
            Some(attr) => element.value().attr(attr).map(str::to_string),
            None => {
                let text = element.text().collect::<Vec<_>>().join(" ");
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                (!text.is_empty()).then_some(text)
            }
        })
        .take(limit)
        .collect())
}

#[async_trait]
impl ToolHandler for WebScrapeTool {
    #[instrument(skip_all, fields(url = args.opt_str("url").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let url = parse_url(args.str("url")?)?;
        let selector = args.opt_str("selector").unwrap_or("body");
        let limit = args.int("limit")? as usize;

        let client = http_client(self.config.tools.http_timeout_secs)?;
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ToolError::failed(format!("HTTP request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::failed(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }
        let html = response
            .text()
            .await
            .map_err(|e| ToolError::failed(format!("Failed to read response body: {}", e)))?;

        let results = extract(&html, selector, args.opt_str("attribute"), limit)?;
        info!("Selector '{}' matched {} element(s) on {}", selector, results.len(), url);

        if results.is_empty() {
            return ok_text(format!("No elements matched '{}'", selector));
        }
        let numbered: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("{}. {}", i + 1, r))
            .collect();
        ok_text(numbered.join("\n"))
    }
}
