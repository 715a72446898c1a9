//! Headless Chromium session that loads a page and prints it.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetLocaleOverrideParams, SetTimezoneOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use futures::StreamExt;

use crate::error::{Error, Result};
use crate::margin::{MarginInserter, MarginOptions};
use crate::output::write_atomic;

use super::filename::pdf_filename_now;
use super::options::PrintOptions;
use super::PrintOutcome;

/// Load `url` in headless Chromium and save it as a PDF.
///
/// The browser is closed on every path, including errors.
pub async fn print_url(url: &str, options: &PrintOptions) -> Result<PrintOutcome> {
    let filename = pdf_filename_now(url)?;
    log::info!("printing {}", url);

    let config = browser_config(options)?;
    let (mut browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| Error::Print(format!("failed to launch browser: {}", e)))?;

    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let result = print_in_browser(&browser, url, filename, options).await;

    log::info!("closing browser");
    if let Err(e) = browser.close().await {
        log::warn!("browser did not close cleanly: {}", e);
    }
    if let Err(e) = browser.wait().await {
        log::warn!("waiting for browser exit failed: {}", e);
    }
    handle.abort();

    if let Err(e) = &result {
        log::error!("failed to print {}: {}", url, e);
    }
    result
}

fn browser_config(options: &PrintOptions) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder().args(options.browser_args.iter().cloned());
    if let Some(path) = &options.chrome_executable {
        builder = builder.chrome_executable(path);
    }
    builder
        .build()
        .map_err(|e| Error::Print(format!("invalid browser configuration: {}", e)))
}

async fn print_in_browser(
    browser: &Browser,
    url: &str,
    filename: String,
    options: &PrintOptions,
) -> Result<PrintOutcome> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| Error::Print(format!("failed to open page: {}", e)))?;

    apply_overrides(&page, options).await?;

    log::info!("navigating to {}", url);
    match tokio::time::timeout(options.navigation_timeout, page.goto(url)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(Error::Print(format!("navigation failed: {}", e))),
        Err(_) => {
            return Err(Error::Print(format!(
                "navigation timed out after {}s",
                options.navigation_timeout.as_secs()
            )))
        }
    }

    match tokio::time::timeout(options.navigation_timeout, page.wait_for_navigation()).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => log::warn!("page did not finish loading, continuing: {}", e),
        Err(_) => log::warn!("timed out waiting for page load, continuing"),
    }

    log::info!("scrolling to the bottom of the page");
    if let Err(e) = page.evaluate(options.scroll_script()).await {
        log::warn!("scrolling failed: {}", e);
    }

    if !options.print {
        log::info!("printing disabled, no PDF generated");
        return Ok(PrintOutcome::Skipped);
    }

    let (paper_width, paper_height) = options.paper.size_inches();
    let params = PrintToPdfParams {
        print_background: Some(options.print_background),
        paper_width: Some(paper_width),
        paper_height: Some(paper_height),
        ..Default::default()
    };
    let mut pdf = page
        .pdf(params)
        .await
        .map_err(|e| Error::Print(format!("printing failed: {}", e)))?;

    if options.add_margin {
        log::info!("adding {}px margins", options.margin_px);
        let inserter = MarginInserter::new(MarginOptions::new().with_margin_px(options.margin_px));
        pdf = inserter.insert_bytes(&pdf)?;
    }

    let dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let path = dir.join(&filename);
    write_atomic(&path, &pdf)?;

    log::info!("PDF saved to {}", path.display());
    Ok(PrintOutcome::Saved { filename, path })
}

async fn apply_overrides(page: &Page, options: &PrintOptions) -> Result<()> {
    page.execute(SetTimezoneOverrideParams::new(options.timezone.clone()))
        .await
        .map_err(|e| Error::Print(format!("cannot set timezone {}: {}", options.timezone, e)))?;

    let locale = SetLocaleOverrideParams {
        locale: Some(options.locale.clone()),
    };
    page.execute(locale)
        .await
        .map_err(|e| Error::Print(format!("cannot set locale {}: {}", options.locale, e)))?;
    Ok(())
}
