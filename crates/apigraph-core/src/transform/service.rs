use super::ResolveOptions;
use super::dialect::Dialect;
use super::model_builder::ModelBuilder;
use super::name_normalizer::NameRegistry;
use super::operation_builder::OperationBuilder;
use crate::error::ResolveError;
use crate::ir::{Operation, Service};
use crate::parse::document::Document;

/// Give every operation of a service a name no earlier operation holds.
pub fn disambiguate(service: &mut Service) {
    let mut names = NameRegistry::default();
    for operation in &mut service.operations {
        let unique = names.claim(&operation.name);
        if unique != operation.name {
            log::warn!(
                "operation {} in service {} renamed to {unique}",
                operation.name,
                service.name
            );
            operation.name = unique;
        }
    }
}

/// Group operations by tag into services.
///
/// Declared tags come first in declaration order, then (unless disabled)
/// tags that operations use without declaring, in first-use order.
/// Operations without tags belong to no service.
pub fn build_services(
    doc: &Document,
    dialect: Dialect,
    options: &ResolveOptions,
) -> Result<Vec<Service>, ResolveError> {
    let mut builder = OperationBuilder::new(ModelBuilder::new(doc, dialect));
    let mut operations: Vec<Operation> = Vec::new();

    // Phase 1: build every tagged operation once
    for (path, item) in &doc.paths {
        for (method, node) in item.operations() {
            if node.tags.is_empty() {
                log::warn!("skipping untagged operation {} {path}", method.to_uppercase());
                continue;
            }
            operations.push(builder.build(path, method, node, &item.parameters)?);
        }
    }

    // Phase 2: collect service tags
    let mut tags: Vec<(String, Option<String>)> = doc
        .tags
        .iter()
        .map(|tag| (tag.name.clone(), tag.description.clone()))
        .collect();
    if options.include_undeclared_tags {
        for tag in operations.iter().flat_map(|op| op.tags.iter()) {
            if !tags.iter().any(|(name, _)| name == tag) {
                tags.push((tag.clone(), None));
            }
        }
    }

    // Phase 3: distribute operations, each service naming its own
    let services = tags
        .into_iter()
        .map(|(name, description)| {
            let mut service = Service {
                name,
                description,
                operations: Vec::new(),
                imports: Vec::new(),
            };
            for operation in operations.iter().filter(|op| op.tags.contains(&service.name)) {
                service.imports.extend(operation.imports.iter().cloned());
                service.operations.push(operation.clone());
            }
            disambiguate(&mut service);
            log::debug!(
                "service {} has {} operations",
                service.name,
                service.operations.len()
            );
            service
        })
        .collect();

    Ok(services)
}
