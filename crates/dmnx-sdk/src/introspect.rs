//! Static model description for the `info` command

use dmnx_core::ast::DecisionService;
use dmnx_core::ir::CompiledModel;
use serde_json::{json, Map, Value as Json};

/// The part of a reference after the last `#`, or the whole reference
pub fn local_reference(href: &str) -> &str {
    match href.rsplit_once('#') {
        Some((_, local)) => local,
        None => href,
    }
}

/// Describe every loaded model without evaluating anything
pub fn describe(models: &[CompiledModel]) -> Json {
    json!({
        "modelsLoaded": models.len(),
        "models": models.iter().map(describe_model).collect::<Vec<_>>(),
    })
}

fn describe_model(model: &CompiledModel) -> Json {
    let mut info = Map::new();
    info.insert("name".to_string(), json!(model.name));
    info.insert("namespace".to_string(), json!(model.namespace));

    let inputs: Vec<Json> = model
        .inputs
        .iter()
        .map(|i| named(&i.name, i.type_ref.as_deref()))
        .collect();
    info.insert("inputs".to_string(), Json::Array(inputs));

    let decisions: Vec<Json> = model
        .decisions
        .iter()
        .map(|d| named(&d.name, d.type_ref.as_deref()))
        .collect();
    info.insert("decisions".to_string(), Json::Array(decisions));

    let definitions = &model.definitions;
    if !definitions.decision_services.is_empty() {
        let services: Vec<Json> = definitions
            .decision_services
            .iter()
            .map(describe_service)
            .collect();
        info.insert("decisionServices".to_string(), Json::Array(services));
    }

    if !model.item_definitions.is_empty() {
        let types: Vec<Json> = model
            .item_definitions
            .iter()
            .map(|def| {
                let mut entry = Map::new();
                entry.insert("name".to_string(), json!(def.name));
                if let Some(type_ref) = &def.type_ref {
                    entry.insert("type".to_string(), json!(type_ref));
                }
                Json::Object(entry)
            })
            .collect();
        info.insert("itemDefinitions".to_string(), Json::Array(types));
    }

    if !model.bkms.is_empty() {
        let bkms: Vec<&str> = model.bkms.iter().map(|b| b.name.as_str()).collect();
        info.insert("businessKnowledgeModels".to_string(), json!(bkms));
    }

    if model.has_errors() {
        let errors: Vec<&str> = model
            .messages
            .iter()
            .filter(|m| m.is_error())
            .map(|m| m.text.as_str())
            .collect();
        info.insert("errors".to_string(), json!(errors));
    }

    Json::Object(info)
}

fn named(name: &str, type_ref: Option<&str>) -> Json {
    json!({ "name": name, "type": type_ref.unwrap_or("Any") })
}

fn describe_service(service: &DecisionService) -> Json {
    let mut entry = Map::new();
    entry.insert("name".to_string(), json!(service.name));
    let lists = [
        ("inputData", &service.input_data),
        ("inputDecisions", &service.input_decisions),
        ("outputDecisions", &service.output_decisions),
        ("encapsulatedDecisions", &service.encapsulated_decisions),
    ];
    for (key, hrefs) in lists {
        if !hrefs.is_empty() {
            let names: Vec<&str> = hrefs.iter().map(|h| local_reference(h)).collect();
            entry.insert(key.to_string(), json!(names));
        }
    }
    Json::Object(entry)
}
