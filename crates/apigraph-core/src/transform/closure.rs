use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::ir::{Client, Model, Operation};

/// One operation plus every model it needs, for emitting a self-contained
/// fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationFragment {
    pub operation: Operation,
    pub models: Vec<Model>,
}

/// Every model name an operation depends on, transitively, in breadth-first
/// order. Names are never enqueued twice, so self- and mutually-referencing
/// models terminate.
pub fn import_closure(client: &Client, operation: &Operation) -> Vec<String> {
    let index: HashMap<&str, &Model> = client
        .models
        .iter()
        .map(|model| (model.name.as_str(), model))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for name in &operation.imports {
        if seen.insert(name.as_str()) {
            queue.push_back(name.as_str());
        }
    }

    let mut closure = Vec::new();
    while let Some(name) = queue.pop_front() {
        log::trace!("closure visiting {name}");
        closure.push(name.to_string());
        let Some(model) = index.get(name) else {
            continue;
        };
        for import in &model.imports {
            if seen.insert(import.as_str()) {
                queue.push_back(import.as_str());
            }
        }
    }
    closure
}

/// The operation with id `operation_id` and the models of its import
/// closure, or `None` when no service has such an operation.
pub fn extract_operation(client: &Client, operation_id: &str) -> Option<OperationFragment> {
    let operation = client.operations().find(|op| op.id == operation_id)?;
    let models = import_closure(client, operation)
        .iter()
        .filter_map(|name| client.model(name).cloned())
        .collect();
    Some(OperationFragment {
        operation: operation.clone(),
        models,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Model, Service};

    fn model(name: &str, imports: &[&str]) -> Model {
        let mut model = Model::generic(name, "any");
        model.imports = imports.iter().map(|s| s.to_string()).collect();
        model
    }

    fn client(models: Vec<Model>, imports: &[&str]) -> Client {
        Client {
            version: "1".into(),
            models,
            services: vec![Service {
                name: "t".into(),
                description: None,
                operations: vec![Operation {
                    id: "op".into(),
                    name: "op".into(),
                    summary: None,
                    description: None,
                    deprecated: false,
                    method: "GET".into(),
                    path: "/".into(),
                    tags: vec!["t".into()],
                    parameters: vec![],
                    imports: imports.iter().map(|s| s.to_string()).collect(),
                    errors: vec![],
                    results: vec![],
                    response_header: None,
                    external_docs: None,
                }],
                imports: vec![],
            }],
        }
    }

    #[test]
    fn test_breadth_first_closure() {
        let client = client(
            vec![
                model("A", &["B", "C"]),
                model("B", &["D"]),
                model("C", &[]),
                model("D", &[]),
                model("Unused", &[]),
            ],
            &["A"],
        );
        let op = &client.services[0].operations[0];
        assert_eq!(import_closure(&client, op), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_cycles_terminate() {
        let client = client(
            vec![model("A", &["A", "B"]), model("B", &["A"])],
            &["A", "B"],
        );
        let op = &client.services[0].operations[0];
        assert_eq!(import_closure(&client, op), vec!["A", "B"]);
    }

    #[test]
    fn test_extract_operation() {
        let client = client(vec![model("A", &["B"]), model("B", &[])], &["A"]);
        let fragment = extract_operation(&client, "op").unwrap();
        assert_eq!(fragment.operation.id, "op");
        let names: Vec<&str> = fragment.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(extract_operation(&client, "missing").is_none());
    }
}
