mod common;

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use common::{batch_b100, upload_workbook, UploadCell};
use result_desk::error::{AppError, ValidationError};
use result_desk::models::{AssessmentType, MarkResponse, SelectionSet};
use result_desk::services::workbook_export::{HEADERS, SHEET_NAME};
use result_desk::services::{export_workbook, parse_workbook_bytes};

fn select_all(ids: &[&str]) -> SelectionSet {
    let mut selection = SelectionSet::new();
    for id in ids {
        selection.set(id, true);
    }
    selection
}

#[test]
fn test_export_b100_practical_has_six_rows_grouped_by_candidate() {
    let data = batch_b100();
    let selection = select_all(&["c1", "c2"]);

    let exported = export_workbook(
        &data.candidates,
        &selection,
        &data.practical_questions,
        AssessmentType::Practical,
    )
    .unwrap();
    assert_eq!(exported.file_name, "candidates_practical.xlsx");
    assert_eq!(exported.rows.len(), 6);

    let buffer = exported.to_buffer().unwrap();
    let mut workbook = Xlsx::new(Cursor::new(buffer)).unwrap();
    assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);

    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();
    assert_eq!(rows.len(), 1 + 6);

    let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
    assert_eq!(header, HEADERS.map(str::to_string).to_vec());

    let pairs: Vec<(String, String)> = rows[1..]
        .iter()
        .map(|r| (r[0].to_string(), r[3].to_string()))
        .collect();
    let expected: Vec<(String, String)> = [
        ("c1", "q1"),
        ("c1", "q2"),
        ("c1", "q3"),
        ("c2", "q1"),
        ("c2", "q2"),
        ("c2", "q3"),
    ]
    .iter()
    .map(|(c, q)| (c.to_string(), q.to_string()))
    .collect();
    assert_eq!(pairs, expected);

    // 满分写成数字，姓名和报名号原样
    assert_eq!(rows[1][4], Data::Float(10.0));
    assert_eq!(rows[4][1].to_string(), "EN002");
    assert_eq!(rows[4][2].to_string(), "Ravi Menon");
}

#[test]
fn test_export_then_import_keeps_candidate_and_question_ids() {
    let data = batch_b100();
    let selection = select_all(&["c2", "c1"]);

    let buffer = export_workbook(
        &data.candidates,
        &selection,
        &data.viva_questions,
        AssessmentType::Viva,
    )
    .unwrap()
    .to_buffer()
    .unwrap();

    let results = parse_workbook_bytes(&buffer).unwrap();
    let ids: Vec<(&str, Vec<&str>)> = results
        .iter()
        .map(|r| {
            (
                r.candidate_id.as_str(),
                r.responses.iter().map(|m| m.question.as_str()).collect(),
            )
        })
        .collect();
    assert_eq!(ids, vec![("c1", vec!["v1", "v2"]), ("c2", vec!["v1", "v2"])]);
    // 未填写的分数为空
    assert!(results
        .iter()
        .flat_map(|r| &r.responses)
        .all(|m| m.marks_obtained.is_empty()));
}

#[test]
fn test_import_groups_marked_rows() {
    let buffer = upload_workbook(
        &["Candidate ID", "Enrollment No", "Name", "Question Id", "Max Marks", "Update Marks"],
        &[
            vec![
                UploadCell::Text("c1"),
                UploadCell::Text("EN001"),
                UploadCell::Text("Asha Kulkarni"),
                UploadCell::Text("q1"),
                UploadCell::Number(10.0),
                UploadCell::Number(8.0),
            ],
            vec![
                UploadCell::Text("c1"),
                UploadCell::Text("EN001"),
                UploadCell::Text("Asha Kulkarni"),
                UploadCell::Text("q2"),
                UploadCell::Number(5.0),
                UploadCell::Number(5.0),
            ],
        ],
    );

    let results = parse_workbook_bytes(&buffer).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].candidate_id, "c1");
    assert_eq!(
        results[0].responses,
        vec![
            MarkResponse {
                question: "q1".to_string(),
                marks_obtained: "8".to_string()
            },
            MarkResponse {
                question: "q2".to_string(),
                marks_obtained: "5".to_string()
            },
        ]
    );
}

#[test]
fn test_import_passes_malformed_marks_through() {
    let buffer = upload_workbook(
        &["Question Id", "Candidate ID", "Update Marks", "Remarks"],
        &[vec![
            UploadCell::Text("q1"),
            UploadCell::Text("c1"),
            UploadCell::Text("eight"),
            UploadCell::Text("checked twice"),
        ]],
    );

    let results = parse_workbook_bytes(&buffer).unwrap();
    assert_eq!(results[0].responses[0].marks_obtained, "eight");
}

#[test]
fn test_import_without_candidate_ids_is_no_rows() {
    let buffer = upload_workbook(
        &["Candidate ID", "Question Id", "Update Marks"],
        &[
            vec![UploadCell::Blank, UploadCell::Text("q1"), UploadCell::Number(4.0)],
            vec![UploadCell::Blank, UploadCell::Text("q2"), UploadCell::Number(3.0)],
        ],
    );
    let err = parse_workbook_bytes(&buffer).unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::NoRows)));
    assert_eq!(err.to_string(), "no candidates selected");

    let buffer = upload_workbook(&["Question Id", "Update Marks"], &[vec![
        UploadCell::Text("q1"),
        UploadCell::Number(4.0),
    ]]);
    let err = parse_workbook_bytes(&buffer).unwrap_err();
    assert!(matches!(err, AppError::Validation(ValidationError::NoRows)));
}
