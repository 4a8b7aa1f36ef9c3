use crate::analysis::ElementAnalysis;

use super::{AnalysisContext, ErrorReporter};

pub(super) fn validate(element: &ElementAnalysis, _context: &AnalysisContext<'_>, reporter: &mut ErrorReporter) {
    let objects = element.all_objects();
    let classes: Vec<_> = objects.iter().filter_map(|o| o.as_class()).collect();
    for root in classes.iter().filter(|c| c.is_root()) {
        let sibling = classes
            .iter()
            .find(|c| !c.is_root() && c.block().id() == root.block().id());
        if let Some(class) = sibling {
            reporter.report(format!(
                "Cannot put block classes on the block's root element: \"{}\" and \"{}\" of block \"{}\"",
                root.as_source(),
                class.as_source(),
                root.block().name()
            ));
            return;
        }
    }
}
