use folio_content::Matrix;

use crate::context::RenderContext;
use crate::layout::render_row;
use crate::view::ViewNode;

/// Renders every row in order. An empty matrix renders nothing.
pub fn render_matrix(matrix: &Matrix, context: &RenderContext) -> ViewNode {
    ViewNode::Fragment(
        matrix
            .rows
            .iter()
            .map(|row| render_row(row, context))
            .collect(),
    )
}
