mod history;

use atelier_test_utils::{stock_flow_constraints, stock_flow_metamodel};
use atelier_types::{FrameId, ObjectId};

use crate::Design;

pub(crate) fn design() -> Design {
    Design::new(stock_flow_metamodel(), stock_flow_constraints())
}

/// One stock, one flow, one drain between them; accepted onto the
/// history. Returns the frame id and the three object ids.
pub(crate) fn design_with_drain() -> (Design, FrameId, ObjectId, ObjectId, ObjectId) {
    let mut design = design();
    let frame = design.create_frame();
    let mut editor = design.edit(frame);
    let stock = editor.create_node("Stock").unwrap();
    let flow = editor.create_node("Flow").unwrap();
    let drain = editor.create_edge("Drains", stock, flow).unwrap();
    let accepted = design.accept(frame).unwrap();
    (design, accepted, stock, flow, drain)
}
