//! Presentation helpers used by the binary.

mod display;

// Re-export public API
pub use display::{
    format_result_row, format_summary, render_matrix, render_monitor_view, render_results,
    render_watch_view,
};
