//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Otx.
//! The Otx project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Flattening of OTLP/JSON export payloads into records.
//!
//! Resource and scope attributes are prefixed with `resource.` and `scope.`;
//! span and log-record attributes land at the top level next to the core
//! fields of the item.

use serde_json::{Map, Value};

use crate::record::{OtRecord, OtRecordBatch};

const RESOURCE_SPANS: &str = "resourceSpans";
const RESOURCE_LOGS: &str = "resourceLogs";
const RESOURCE_METRICS: &str = "resourceMetrics";

/// True when the object looks like an OTLP export request.
pub fn is_otlp_payload(object: &Map<String, Value>) -> bool {
    [RESOURCE_SPANS, RESOURCE_LOGS, RESOURCE_METRICS]
        .iter()
        .any(|key| object.get(*key).is_some_and(Value::is_array))
}

/// Flattens every span and log record of `payload`.
///
/// Metric payloads carry no per-record attributes worth previewing and are
/// skipped with a warning.
pub fn flatten_payload(payload: &Map<String, Value>) -> OtRecordBatch {
    let mut records = OtRecordBatch::new();

    for resource in array(payload, RESOURCE_SPANS) {
        let base = resource_base(resource);
        for scope in array(resource, "scopeSpans").chain(array(resource, "instrumentationLibrarySpans")) {
            let scoped = scope_base(&base, scope);
            for span in array(scope, "spans") {
                records.push(flatten_span(&scoped, span));
            }
        }
    }

    for resource in array(payload, RESOURCE_LOGS) {
        let base = resource_base(resource);
        for scope in array(resource, "scopeLogs").chain(array(resource, "instrumentationLibraryLogs")) {
            let scoped = scope_base(&base, scope);
            for entry in array(scope, "logRecords") {
                records.push(flatten_log(&scoped, entry));
            }
        }
    }

    if let Some(metrics) = payload.get(RESOURCE_METRICS).and_then(Value::as_array) {
        if !metrics.is_empty() {
            log::warn!(
                "skipping {} OTLP resourceMetrics entr(ies); metric payloads are not previewed",
                metrics.len()
            );
        }
    }

    records
}

fn array<'a>(object: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn resource_base(resource: &Map<String, Value>) -> OtRecord {
    let mut record = OtRecord::new();
    if let Some(attributes) = resource.get("resource").and_then(Value::as_object) {
        merge_attributes(&mut record, attributes, "resource.");
    }
    record
}

fn scope_base(base: &OtRecord, scope: &Map<String, Value>) -> OtRecord {
    let mut record = base.clone();
    let scope_object = scope
        .get("scope")
        .or_else(|| scope.get("instrumentationLibrary"))
        .and_then(Value::as_object);
    if let Some(scope_object) = scope_object {
        merge_attributes(&mut record, scope_object, "scope.");
    }
    record
}

fn merge_attributes(record: &mut OtRecord, holder: &Map<String, Value>, prefix: &str) {
    let Some(attributes) = holder.get("attributes").and_then(Value::as_array) else {
        return;
    };
    for attribute in attributes.iter().filter_map(Value::as_object) {
        let Some(key) = attribute.get("key").and_then(Value::as_str) else {
            continue;
        };
        let value = attribute.get("value").map(any_value).unwrap_or(Value::Null);
        record.insert(format!("{prefix}{key}"), value);
    }
}

fn copy_field(record: &mut OtRecord, source: &Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = source.get(from) {
        record.insert(to.to_string(), value.clone());
    }
}

fn flatten_span(base: &OtRecord, span: &Map<String, Value>) -> OtRecord {
    let mut record = base.clone();
    merge_attributes(&mut record, span, "");

    copy_field(&mut record, span, "traceId", "trace.id");
    copy_field(&mut record, span, "spanId", "span.id");
    copy_field(&mut record, span, "name", "span.name");
    copy_field(&mut record, span, "kind", "span.kind");
    record.insert(
        "span.parent_span_id".to_string(),
        span.get("parentSpanId").cloned().unwrap_or_else(|| Value::String(String::new())),
    );
    copy_field(&mut record, span, "startTimeUnixNano", "span.start_time");
    copy_field(&mut record, span, "endTimeUnixNano", "span.end_time");

    let status = span.get("status").and_then(Value::as_object);
    if let Some(code) = status.and_then(|s| s.get("code")) {
        record.insert("span.status.code".to_string(), code.clone());
    }
    record.insert(
        "span.status.message".to_string(),
        status
            .and_then(|s| s.get("message"))
            .cloned()
            .unwrap_or_else(|| Value::String(String::new())),
    );
    record
}

fn flatten_log(base: &OtRecord, entry: &Map<String, Value>) -> OtRecord {
    let mut record = base.clone();
    merge_attributes(&mut record, entry, "");

    if let Some(body) = entry.get("body") {
        record.insert("log.body".to_string(), any_value(body));
    }
    copy_field(&mut record, entry, "severityText", "log.severity_text");
    copy_field(&mut record, entry, "severityNumber", "log.severity_number");
    copy_field(&mut record, entry, "timeUnixNano", "log.time");
    copy_field(&mut record, entry, "traceId", "trace.id");
    copy_field(&mut record, entry, "spanId", "span.id");
    record
}

/// Converts an OTLP `AnyValue` into plain JSON.
fn any_value(value: &Value) -> Value {
    let Some(object) = value.as_object() else {
        return value.clone();
    };
    if let Some(v) = object.get("stringValue") {
        return v.clone();
    }
    if let Some(v) = object.get("intValue") {
        return match v {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or_else(|_| v.clone()),
            _ => v.clone(),
        };
    }
    if let Some(v) = object.get("doubleValue") {
        return v.clone();
    }
    if let Some(v) = object.get("boolValue") {
        return v.clone();
    }
    if let Some(v) = object.get("bytesValue") {
        return v.clone();
    }
    if let Some(array) = object.get("arrayValue").and_then(Value::as_object) {
        let values = array
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(any_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    if let Some(kvlist) = object.get("kvlistValue").and_then(Value::as_object) {
        let mut map = Map::new();
        merge_kvlist(&mut map, kvlist);
        return Value::Object(map);
    }
    Value::Null
}

fn merge_kvlist(map: &mut Map<String, Value>, kvlist: &Map<String, Value>) {
    for entry in kvlist
        .get("values")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
    {
        if let Some(key) = entry.get("key").and_then(Value::as_str) {
            let value = entry.get("value").map(any_value).unwrap_or(Value::Null);
            map.insert(key.to_string(), value);
        }
    }
}
