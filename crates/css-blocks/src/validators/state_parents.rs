use crate::analysis::ElementAnalysis;
use crate::block::BlockObject;

use super::{AnalysisContext, ErrorReporter};

/// A state only applies together with its class. A same-named class of a
/// block inheriting from the state's block also counts.
pub(super) fn validate(element: &ElementAnalysis, _context: &AnalysisContext<'_>, reporter: &mut ErrorReporter) {
    let objects = element.all_objects();
    for state in objects.iter().filter_map(|o| o.as_state()) {
        let owner = state.class();
        let has_parent = objects.iter().filter_map(|o| o.as_class()).any(|class| {
            class.name() == owner.name() && class.block().is_or_inherits_from(owner.block())
        });
        if !has_parent {
            reporter.report(format!(
                "Cannot use state \"{}\" without its class \"{}\" also applied to the element.",
                BlockObject::from(state.clone()).qualified_name(),
                BlockObject::from(owner.clone()).qualified_name()
            ));
            return;
        }
    }
}
