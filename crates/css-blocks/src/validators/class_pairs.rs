use std::collections::BTreeMap;

use crate::analysis::ElementAnalysis;
use crate::block::{BlockId, ClassRef};

use super::{AnalysisContext, ErrorReporter};

/// Two non-root classes of one block cannot both be applied statically:
/// each styles a different element of the block's design.
pub(super) fn validate(element: &ElementAnalysis, _context: &AnalysisContext<'_>, reporter: &mut ErrorReporter) {
    let mut seen: BTreeMap<BlockId, &ClassRef> = BTreeMap::new();
    for class in element.static_objects().filter_map(|o| o.as_class()) {
        if class.is_root() {
            continue;
        }
        if let Some(previous) = seen.insert(class.block().id(), class) {
            reporter.report(format!(
                "Classes \"{}\" and \"{}\" from the same block are not allowed on the same element at the same time.",
                previous.as_source(),
                class.as_source()
            ));
            return;
        }
    }
}
