use chrono::{DateTime, Utc};

use datamold_core::{
    GroupFields, Schema, SchemaNode, ValidationIssue, ValidationReport, child_path, classify,
};

use crate::generators::{CheckContext, GeneratorRegistry, RegistryEntry};
use crate::model::GenerationSettings;

struct Frame<'s> {
    fields: GroupFields<'s>,
    path: String,
    depth: usize,
}

/// Walk `schema` and report every problem generation would hit, plus unknown
/// constraint keys as warnings. No values are generated.
///
/// Relative date bounds are checked against the current instant.
pub fn validate_schema(
    schema: &Schema,
    registry: &GeneratorRegistry,
    settings: &GenerationSettings,
) -> ValidationReport {
    validate_schema_at(schema, registry, settings, Utc::now())
}

/// Like `validate_schema`, with an explicit reference instant.
///
/// Issues are reported in schema key order.
pub fn validate_schema_at(
    schema: &Schema,
    registry: &GeneratorRegistry,
    settings: &GenerationSettings,
    now: DateTime<Utc>,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut stack = vec![Frame {
        fields: GroupFields::new(schema.root(), false),
        path: String::new(),
        depth: 1,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some((key, value)) = frame.fields.next() else {
            stack.pop();
            continue;
        };
        let node_path = child_path(&frame.path, key);
        let depth = frame.depth + 1;

        let children = match classify(value, &node_path) {
            Err(err) => {
                report.push(ValidationIssue::error(
                    "malformed_node",
                    node_path,
                    err.to_string(),
                ));
                continue;
            }
            Ok(SchemaNode::Untyped(map)) => GroupFields::new(map, false),
            Ok(SchemaNode::Typed { tag, spec }) => match registry.lookup(tag) {
                Some(RegistryEntry::Group) => GroupFields::new(spec, true),
                Some(RegistryEntry::Scalar(generator)) => {
                    let ctx = CheckContext {
                        path: &node_path,
                        now,
                        settings,
                    };
                    for issue in generator.check(&ctx, spec) {
                        report.push(issue);
                    }
                    continue;
                }
                None => {
                    report.push(ValidationIssue::error(
                        "unknown_generator_type",
                        node_path,
                        format!("type '{tag}' is not registered"),
                    ));
                    continue;
                }
            },
        };

        if depth > settings.max_depth {
            report.push(ValidationIssue::error(
                "max_depth_exceeded",
                node_path,
                format!("nesting exceeds max depth {}", settings.max_depth),
            ));
            continue;
        }
        stack.push(Frame {
            fields: children,
            path: node_path,
            depth,
        });
    }

    report
}
