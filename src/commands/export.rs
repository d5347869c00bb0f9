//! Writes streamed pages either as JSON lines on stdout or as files.

use anyhow::{Context, Result};
use futures_util::{Stream, TryStreamExt};
use log::info;
use std::path::Path;
use std::pin::pin;

use crate::{
    error::LfError,
    models::{AnalyticResponse, LabelMode},
    runtime::Runtime,
};

/// File name of the `index`-th page (1-based) in an output directory.
pub(crate) fn page_file_name(index: usize) -> String {
    format!("page-{:04}.json", index)
}

/// Consumes `pages`, returning the number of pages written.
///
/// With an output directory each page is saved as `page-NNNN.json`;
/// otherwise every row is printed as one JSON object per line.
pub(crate) async fn write_pages<R, S>(
    runtime: &R,
    pages: S,
    output: Option<&Path>,
    labels: LabelMode,
) -> Result<usize>
where
    R: Runtime,
    S: Stream<Item = Result<AnalyticResponse, LfError>>,
{
    if let Some(dir) = output {
        runtime.create_dir_all(dir)?;
    }

    let mut pages = pin!(pages);
    let mut count = 0;
    let mut rows = 0;
    while let Some(page) = pages.try_next().await? {
        count += 1;
        rows += page.len();
        match output {
            Some(dir) => {
                let path = dir.join(page_file_name(count));
                let body = serde_json::to_vec_pretty(&page)?;
                runtime
                    .write(&path, &body)
                    .with_context(|| format!("Failed to save page {}", count))?;
            }
            None => {
                for row in page.rows(labels) {
                    println!("{}", serde_json::to_string(&row)?);
                }
            }
        }
    }

    info!("Wrote {} row(s) from {} page(s)", rows, count);
    Ok(count)
}
