// tests/ingest_csv.rs
//
// End-to-end properties of the CSV ingest pipeline: count/order round-trip,
// whole-batch atomicity, header flexibility, and the error taxonomy with
// human-countable row numbers.

use chrono::NaiveDate;
use metricdeck::ingest::{parse_metrics_csv, IngestError};
use metricdeck::record::MetricRecord;

const CANONICAL: &str = "date,mrr,users,churn,new_users,revenue\n\
                         2024-01-01,5000,120,3.2,15,5500\n\
                         2024-02-01,5800,135,2.9,18,6400\n";

/// Everything except the assembly-time upload timestamp.
fn stable_fields(r: &MetricRecord) -> (String, NaiveDate, f64, u64, f64, u64, f64) {
    (
        r.owner_id.clone(),
        r.date,
        r.mrr,
        r.users,
        r.churn,
        r.new_users,
        r.revenue,
    )
}

#[test]
fn round_trip_preserves_count_and_order() {
    let records = parse_metrics_csv(CANONICAL, "u1").expect("canonical csv must parse");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
}

#[test]
fn single_row_maps_every_field() {
    let csv = "date,mrr,users,churn,new_users,revenue\n2024-01-01,5000,120,3.2,15,5500";
    let records = parse_metrics_csv(csv, "u1").unwrap();
    assert_eq!(records.len(), 1);

    let r = &records[0];
    assert_eq!(r.owner_id, "u1");
    assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(r.mrr, 5000.0);
    assert_eq!(r.users, 120);
    assert_eq!(r.churn, 3.2);
    assert_eq!(r.new_users, 15);
    assert_eq!(r.revenue, 5500.0);
}

#[test]
fn header_order_does_not_matter() {
    let reordered = "revenue,new_users,churn,users,mrr,date\n\
                     5500,15,3.2,120,5000,2024-01-01\n\
                     6400,18,2.9,135,5800,2024-02-01\n";

    let a = parse_metrics_csv(CANONICAL, "u1").unwrap();
    let b = parse_metrics_csv(reordered, "u1").unwrap();

    let a: Vec<_> = a.iter().map(stable_fields).collect();
    let b: Vec<_> = b.iter().map(stable_fields).collect();
    assert_eq!(a, b);
}

#[test]
fn header_synonyms_bind_to_the_same_field() {
    for header in ["New Users", "new_users", "NEW_USERS"] {
        let csv = format!(
            "date,mrr,users,churn,{header},revenue\n2024-01-01,5000,120,3.2,15,5500\n"
        );
        let records = parse_metrics_csv(&csv, "u1")
            .unwrap_or_else(|e| panic!("header '{header}' should bind: {e}"));
        assert_eq!(records[0].new_users, 15);
    }
}

#[test]
fn idempotent_modulo_upload_timestamp() {
    let a = parse_metrics_csv(CANONICAL, "u1").unwrap();
    let b = parse_metrics_csv(CANONICAL, "u1").unwrap();
    let a: Vec<_> = a.iter().map(stable_fields).collect();
    let b: Vec<_> = b.iter().map(stable_fields).collect();
    assert_eq!(a, b);
}

#[test]
fn missing_revenue_column_is_named() {
    let csv = "date,mrr,users,churn,new_users\n2024-01-01,5000,120,3.2,15\n";
    match parse_metrics_csv(csv, "u1").unwrap_err() {
        IngestError::MalformedHeader { missing } => {
            assert_eq!(missing, vec!["revenue".to_string()]);
        }
        other => panic!("expected MalformedHeader, got {other:?}"),
    }
}

#[test]
fn negative_users_reported_at_csv_line_3() {
    let csv = "date,mrr,users,churn,new_users,revenue\n\
               2024-01-01,5000,120,3.2,15,5500\n\
               2024-01-02,5800,-5,2.9,18,6400\n";
    match parse_metrics_csv(csv, "u1").unwrap_err() {
        IngestError::NegativeValue { row: 3, field: "users" } => {}
        other => panic!("expected NegativeValue at row 3, got {other:?}"),
    }
}

#[test]
fn churn_over_bound_rejects_the_batch() {
    let csv = "date,mrr,users,churn,new_users,revenue\n\
               2024-01-01,5000,120,150,15,5500\n";
    assert!(matches!(
        parse_metrics_csv(csv, "u1").unwrap_err(),
        IngestError::ChurnBound { row: 2 }
    ));
}

#[test]
fn one_bad_row_fails_the_whole_batch() {
    // rows 2 and 4 are fine; row 3 has unparseable mrr
    let csv = "date,mrr,users,churn,new_users,revenue\n\
               2024-01-01,5000,120,3.2,15,5500\n\
               2024-02-01,oops,135,2.9,18,6400\n\
               2024-03-01,6100,150,2.5,20,7000\n";
    match parse_metrics_csv(csv, "u1").unwrap_err() {
        IngestError::MissingField { row: 3, field: "mrr" } => {}
        other => panic!("expected MissingField(mrr) at row 3, got {other:?}"),
    }
}

#[test]
fn header_only_input_is_rejected() {
    let err = parse_metrics_csv("date,mrr,users,churn,new_users,revenue\n", "u1").unwrap_err();
    assert!(matches!(err, IngestError::EmptyBatch));
}

#[test]
fn crlf_and_quoted_cells_parse() {
    let csv = "date,mrr,users,churn,new_users,revenue\r\n\
               \"2024-01-01\",5000,120,3.2,15,\"5500\"\r\n";
    let records = parse_metrics_csv(csv, "u1").unwrap();
    assert_eq!(records[0].revenue, 5500.0);
}

#[test]
fn owner_comes_from_the_caller_not_the_file() {
    let records = parse_metrics_csv(CANONICAL, "acct-42").unwrap();
    assert!(records.iter().all(|r| r.owner_id == "acct-42"));
}
