//! Fetch stage: download the three raw datasets into the raw staging directory.
//!
//! The two FDIC institution files live at fixed URLs. The failed bank list is
//! linked from the FDIC landing page, so that page is scraped for the first
//! link to `banklist.csv`. Each file gets a single attempt; failures are
//! logged and the remaining downloads continue.

use reqwest::Client;
use scraper::{Html, Selector};
use std::path::PathBuf;
use url::Url;

use crate::config::PipelineConfig;
use crate::error::{FetchError, FetchResult};
use crate::logs::Diagnostics;
use crate::models::Source;

/// Landing page that links the failed bank list.
pub const FAILED_BANK_PAGE_URL: &str = "https://www.fdic.gov/bank-failures/failed-bank-list";

/// Substring identifying the failed bank list link.
pub const FAILED_BANK_LINK_NEEDLE: &str = "banklist.csv";

pub const OFFICE_LOCATIONS_URL: &str =
    "https://s3-us-gov-west-1.amazonaws.com/cg-2e5c99a6-e282-42bf-9844-35f5430338a5/downloads/locations.csv";

pub const INSTITUTIONS_URL: &str =
    "https://s3-us-gov-west-1.amazonaws.com/cg-2e5c99a6-e282-42bf-9844-35f5430338a5/downloads/institutions.csv";

/// First `<a href>` on the page whose target contains `needle`, resolved
/// against `page_url`.
pub fn find_csv_link(html: &str, page_url: &Url, needle: &str) -> Option<Url> {
    let selector = Selector::parse("a[href]").ok()?;
    let document = Html::parse_document(html);
    let link = document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains(needle))
        .find_map(|href| page_url.join(href).ok());
    link
}

/// HTTP client for one fetch run.
pub fn build_client(config: &PipelineConfig) -> FetchResult<Client> {
    let client = Client::builder()
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;
    Ok(client)
}

/// GET `url` and return the body bytes. Non-success statuses are errors.
async fn download(client: &Client, url: &str) -> FetchResult<Vec<u8>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}

/// Download `url` into the raw file of `source`, unmodified.
async fn download_to(
    client: &Client,
    config: &PipelineConfig,
    source: Source,
    url: &str,
    log: &mut Diagnostics,
) -> FetchResult<PathBuf> {
    let path = config.raw_path(source);
    log.info(format!("Downloading {} from {}", source, url));

    let bytes = download(client, url).await?;
    tokio::fs::create_dir_all(&config.raw_dir).await?;
    tokio::fs::write(&path, &bytes).await?;

    log.success(format!(
        "Downloaded {} ({} bytes) to {}",
        source,
        bytes.len(),
        path.display()
    ));
    Ok(path)
}

/// Resolve the failed bank list URL from the landing page.
async fn resolve_failed_bank_url(client: &Client, log: &mut Diagnostics) -> FetchResult<Url> {
    log.info("🔎 Scraping FDIC failed bank list page...");
    let page_url = Url::parse(FAILED_BANK_PAGE_URL)?;
    let body = download(client, FAILED_BANK_PAGE_URL).await?;
    let html = String::from_utf8_lossy(&body).into_owned();

    find_csv_link(&html, &page_url, FAILED_BANK_LINK_NEEDLE).ok_or_else(|| {
        FetchError::LinkNotFound {
            page: FAILED_BANK_PAGE_URL.to_string(),
            needle: FAILED_BANK_LINK_NEEDLE.to_string(),
        }
    })
}

async fn fetch_source(
    client: &Client,
    config: &PipelineConfig,
    source: Source,
    log: &mut Diagnostics,
) -> FetchResult<PathBuf> {
    match source {
        Source::FailedBank => {
            let url = resolve_failed_bank_url(client, log).await?;
            download_to(client, config, source, url.as_str(), log).await
        }
        Source::OfficeLocation => {
            download_to(client, config, source, OFFICE_LOCATIONS_URL, log).await
        }
        Source::FinancialInstitution => {
            download_to(client, config, source, INSTITUTIONS_URL, log).await
        }
    }
}

/// Download every source in turn. A failure is logged and does not stop the
/// others.
pub async fn fetch_all(
    config: &PipelineConfig,
    log: &mut Diagnostics,
) -> Vec<(Source, FetchResult<PathBuf>)> {
    let client = match build_client(config) {
        Ok(c) => c,
        Err(e) => {
            log.error(format!("Cannot build HTTP client: {}", e));
            return Vec::new();
        }
    };

    let mut results = Vec::with_capacity(Source::ALL.len());
    // fixed-URL files first
    for source in [Source::OfficeLocation, Source::FinancialInstitution, Source::FailedBank] {
        let result = fetch_source(&client, config, source, log).await;
        if let Err(ref e) = result {
            log.error(format!("Failed to download {}: {}", source, e));
        }
        results.push((source, result));
    }
    results
}
