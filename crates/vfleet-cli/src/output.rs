//! Output helpers for human and JSON modes.
//!
//! Human mode prints one line of success/failure per engine, plus any data
//! a synchronous operation produced. JSON mode wraps the whole run in a
//! `{ data: { engines: ... } }` envelope and respects `--pretty`.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use vfleet_engine::{EngineCatalog, EngineOutcome, FleetReport};

use crate::opts::FleetOpts;

pub fn print_report(opts: &FleetOpts, report: &FleetReport, data: &BTreeMap<String, Value>) {
    if opts.json || opts.pretty {
        let engines: serde_json::Map<String, Value> = report
            .outcomes
            .iter()
            .map(|(name, outcome)| {
                let mut entry = match outcome {
                    EngineOutcome::Done => json!({ "outcome": "done" }),
                    EngineOutcome::Failed(err) => {
                        json!({ "outcome": "failed", "error": err.to_string() })
                    }
                    EngineOutcome::Aborted => json!({ "outcome": "aborted" }),
                };
                if let Some(value) = data.get(name) {
                    entry["result"] = value.clone();
                }
                (name.clone(), entry)
            })
            .collect();
        print_json(opts, json!({ "engines": engines }));
    } else {
        for (name, outcome) in &report.outcomes {
            match outcome {
                EngineOutcome::Done => {
                    println!("{name}: success");
                    if let Some(value) = data.get(name) {
                        print_value(value);
                    }
                }
                EngineOutcome::Failed(err) => eprintln!("{name}: failed: {err}"),
                EngineOutcome::Aborted => eprintln!("{name}: aborted"),
            }
        }
    }
}

pub fn print_catalog(opts: &FleetOpts, catalog: &EngineCatalog) {
    if opts.json || opts.pretty {
        let engines: Vec<Value> = catalog
            .engines()
            .iter()
            .map(|e| {
                json!({
                    "name": e.name,
                    "address": e.address,
                    "default": e.default,
                })
            })
            .collect();
        print_json(opts, json!({ "engines": engines }));
    } else {
        for engine in catalog.engines() {
            let marker = if engine.default { " (default)" } else { "" };
            println!("{}\t{}{marker}", engine.name, engine.address);
        }
    }
}

fn print_json(opts: &FleetOpts, data: Value) {
    let root = json!({ "data": data });
    if opts.pretty {
        println!("{:#}", root);
    } else {
        println!("{}", root);
    }
}

fn print_value(value: &Value) {
    match value {
        Value::String(s) => println!("{s}"),
        other => println!("{other:#}"),
    }
}
