//! Parallel Selection and Conversion
//!
//! Uses Rayon over immutable markup values. Nothing here mutates its input,
//! so one tree can be shared by every worker.

use crate::convert::{to_document, ToDocumentOptions};
use crate::dom::{Markup, MarkupNode};
use crate::error::Result;
use crate::xpath::Selector;
use rayon::prelude::*;

/// Evaluate several selectors against one value in parallel
pub fn select_parallel(markup: &Markup, selectors: &[&str]) -> Vec<Result<Markup>> {
    selectors
        .par_iter()
        .map(|source| markup.select(&Selector::parse(source)?))
        .collect()
}

/// Evaluate one selector and map every selected node
pub fn select_map<F, T>(markup: &Markup, selector: &str, mapper: F) -> Result<Vec<T>>
where
    F: Fn(&MarkupNode) -> T + Sync + Send,
    T: Send,
{
    let selected = markup.select(&Selector::parse(selector)?)?;
    Ok(selected.nodes().par_iter().map(mapper).collect())
}

/// Evaluate keyed selectors in parallel; the first failure wins
pub fn xmap(markup: &Markup, queries: &[(&str, &str)]) -> Result<Vec<(String, Markup)>> {
    queries
        .par_iter()
        .map(|(key, source)| {
            let selected = markup.select(&Selector::parse(source)?)?;
            Ok((key.to_string(), selected))
        })
        .collect()
}

/// Convert many values to documents in parallel, keeping their order
pub fn to_documents_parallel(values: &[Markup], options: &ToDocumentOptions) -> Vec<serde_json::Value> {
    values.par_iter().map(|markup| to_document(markup, options)).collect()
}
