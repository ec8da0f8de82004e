pub mod closure;
pub mod composition;
pub mod dialect;
pub mod model_builder;
pub mod name_normalizer;
pub mod operation_builder;
pub mod postprocess;
pub mod service;
pub mod type_mapper;

use crate::error::TransformError;
use crate::ir::Client;
use crate::parse::document::Document;

use dialect::Dialect;
use model_builder::ModelBuilder;
use postprocess::postprocess;
use service::build_services;

pub use closure::{OperationFragment, extract_operation, import_closure};

/// Options controlling how services are assembled.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Also produce services for tags operations use but the document never
    /// declares.
    pub include_undeclared_tags: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            include_undeclared_tags: true,
        }
    }
}

/// Resolve a parsed document into a `Client`.
pub fn resolve(doc: &Document) -> Result<Client, TransformError> {
    resolve_with_options(doc, &ResolveOptions::default())
}

/// Resolve with explicit options.
pub fn resolve_with_options(
    doc: &Document,
    options: &ResolveOptions,
) -> Result<Client, TransformError> {
    // Phase 1: Pick the dialect
    let dialect = Dialect::detect(doc)?;
    log::debug!("resolving {} document", dialect.as_str());

    // Phase 2: Build top-level models
    let models = ModelBuilder::new(doc, dialect).build_definitions()?;
    log::debug!("built {} models", models.len());

    // Phase 3: Build operations and group them into services
    let services = build_services(doc, dialect, options)?;

    // Phase 4: Dedupe, sort and disambiguate
    Ok(postprocess(Client {
        version: doc.info.version.clone(),
        models,
        services,
    }))
}
