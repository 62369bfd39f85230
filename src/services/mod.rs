pub mod session_gate;
pub mod theory_result;
pub mod workbook_export;
pub mod workbook_import;

pub use session_gate::{GateState, SessionGate};
pub use theory_result::{build_theory_results, format_local_datetime, TheoryEdits};
pub use workbook_export::{export_workbook, ExportRow, ExportedWorkbook};
pub use workbook_import::{parse_workbook, parse_workbook_bytes};
