use crate::analysis::ElementAnalysis;
use crate::block::BlockObject;

use super::{AnalysisContext, ErrorReporter};

/// Statically applied objects from unrelated blocks that set the same
/// property must say which one wins with `property: resolve("<other>")`.
pub(super) fn validate(element: &ElementAnalysis, _context: &AnalysisContext<'_>, reporter: &mut ErrorReporter) {
    let objects: Vec<&BlockObject> = element.static_objects().collect();
    for (idx, a) in objects.iter().enumerate() {
        for b in &objects[idx + 1..] {
            if a.block().is_related_to(b.block()) {
                continue;
            }
            let shared = a
                .properties()
                .intersection(b.properties())
                .find(|property| !resolves(a, property, b) && !resolves(b, property, a));
            if let Some(property) = shared {
                reporter.report(format!(
                    "The property \"{property}\" is set by both \"{}\" and \"{}\" on the same element and must be resolved.",
                    a.qualified_name(),
                    b.qualified_name()
                ));
                return;
            }
        }
    }
}

/// True when `object` declares `property: resolve(...)` against `other` or
/// the class `other` belongs to.
fn resolves(object: &BlockObject, property: &str, other: &BlockObject) -> bool {
    object
        .resolutions()
        .iter()
        .filter(|r| r.property == property)
        .filter_map(|r| object.block().lookup(&r.target))
        .any(|target| target == *other || target.as_class().is_some_and(|c| c == other.class()))
}
