//! Local introspection queries answered from the manager's own state.
//!
//! | Query | Answer |
//! |-------|--------|
//! | `inputs`, `publications` | JSON array of registered keys |
//! | `subscriptions` | JSON array of every target key: input targets, input aliases and publication destinations |
//! | `updated_input_indices` | JSON array of indices with an unread update |
//! | `updated_input_names` | JSON array of their display names |
//! | `updates` | JSON object of updated inputs and their values |
//! | `values` | JSON object of every input and the value it would read now |
//!
//! Anything else is answered with an empty string.
//!
//! `values` re-evaluates a copy of each input against the data the Core
//! currently holds, so values delivered since the last time grant show up
//! without touching the inputs' own state.

use crate::application::manager::ManagerShared;
use crate::domain::input_record::{Incoming, InputRecord};
use crate::domain::multi_input::MultiInputMode;
use cs_04_query_aggregator::JsonBuilder;
use shared_types::{DataType, InterfaceHandle, Value};
use std::collections::BTreeMap;
use tracing::debug;

impl ManagerShared {
    pub(super) fn local_query(&self, query: &str) -> String {
        match query {
            "inputs" => json_array(self.inputs.read().iter().map(|rec| rec.name.clone())),
            "publications" => {
                json_array(self.publications.read().iter().map(|rec| rec.name.clone()))
            }
            "subscriptions" => json_array(self.target_keys().into_iter()),
            "updated_input_indices" => {
                serde_json::Value::from(self.query_updates()).to_string()
            }
            "updated_input_names" => {
                let targets = self.input_targets.read().clone();
                let names: Vec<String> = self
                    .inputs
                    .read()
                    .iter()
                    .filter(|rec| rec.updated)
                    .map(|rec| display_name(rec, &targets))
                    .collect();
                json_array(names.into_iter())
            }
            "updates" => self.values_document(true),
            "values" => self.values_document(false),
            _ => String::new(),
        }
    }

    fn values_document(&self, updated_only: bool) -> String {
        let targets = self.input_targets.read().clone();
        let records = self.inputs.snapshot();
        let mut builder = JsonBuilder::new();
        for rec in records {
            if updated_only && !rec.updated {
                continue;
            }
            let rec = if updated_only { rec } else { self.reevaluated(rec) };
            let key = display_name(&rec, &targets);
            if key.is_empty() {
                continue;
            }
            add_value(&mut builder, &key, &rec);
        }
        builder.generate()
    }

    /// Run a copy of `rec` through the data the Core holds for it.
    fn reevaluated(&self, mut rec: InputRecord) -> InputRecord {
        let core = self.core();
        if !rec.source_resolved {
            rec.resolve_source(
                &core.get_injection_type(rec.handle),
                &core.get_injection_units(rec.handle),
            );
        }
        let incoming = if rec.multi_input_mode == MultiInputMode::NoOp {
            let bytes = core.get_value(rec.handle);
            if bytes.is_empty() {
                return rec;
            }
            Incoming::Single(bytes)
        } else {
            Incoming::Multiple(core.get_all_values(rec.handle))
        };
        if let Err(err) = rec.ingest(&incoming, self.config.encoding, self.units.as_ref()) {
            debug!(handle = %rec.handle, error = %err, "Query re-evaluation failed");
        }
        rec
    }
}

fn add_value(builder: &mut JsonBuilder, key: &str, rec: &InputRecord) {
    match rec.target_type() {
        DataType::Double => {
            builder.add_double(key, rec.last_value.as_f64().unwrap_or(f64::NAN));
        }
        DataType::Vector => match rec.last_value.convert_to(DataType::Vector) {
            Ok(Value::Vector(v)) => builder.add_vector(key, &v),
            _ => builder.add_string(key, &rec.last_value.to_text()),
        },
        _ => builder.add_string(key, &rec.last_value.to_text()),
    }
}

fn display_name(rec: &InputRecord, targets: &BTreeMap<InterfaceHandle, Vec<String>>) -> String {
    let first = targets
        .get(&rec.handle)
        .and_then(|t| t.first())
        .map(String::as_str);
    rec.display_name(first).to_string()
}

fn json_array(names: impl Iterator<Item = String>) -> String {
    let names: Vec<String> = names.filter(|n| !n.is_empty()).collect();
    serde_json::Value::from(names).to_string()
}
