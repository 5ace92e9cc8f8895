//! End-to-end integration tests for hl7-pipeline

use std::io::Write;
use tempfile::NamedTempFile;

use hl7_adapter_v2::split_messages;
use hl7_ir::{LocationSpecs, TidyTable};
use hl7_pipeline::{Error, InputKind, Pipeline, PipelineConfig, TidyConfig, tidy_segments};

const ADT_A: &str = "MSH|^~\\&||^Facility A|||20170515104040||ADT^A08^ADT A08\r\
                     EVN|A08|20170515104040\r\
                     PID|1||123^^^FACILITY A||DOE^JOHN\r\
                     DG1|1||D53.9^Nutritional anemia, unspecified^I10|||AM\r";

const ADT_B: &str = "MSH|^~\\&||^Facility B|||20170711123256||ADT^A08^ADT A08\r\
                     EVN|A08|20170711123256\r\
                     PID|1||456^^^FACILITY B||SMITH^JANE\r\
                     DG1|1||M43.16^Spondylolisthesis, lumbar region^I10|||AM\r";

/// Four diagnoses; the last has no diagnosis type
const ADT_MANY_DG1: &str = "MSH|^~\\&||^Facility C|||20170322123231||ADT^A08^ADT A08\n\
                            PID|1||789^^^FACILITY C||BROWN^JOAN\n\
                            DG1|1||I10^Essential hypertension^I10|||AM\n\
                            DG1|2||E11.9^Type 2 diabetes mellitus^I10|||F\n\
                            DG1|3||J45.909^Unspecified asthma^I10|||F\n\
                            DG1|4||Z79.4^Long term use of insulin^I10\n";

/// No DG1 segment at all
const ADT_NO_DG1: &str = "MSH|^~\\&||^Facility D|||20170101000000||ADT^A08^ADT A08\n\
                          PID|1||999^^^FACILITY D||ROE^RICHARD\n\
                          PR1|1|I10P|0W9L0ZX|Drainage of Lower Back, Open Approach, Diagnostic\n";

fn specs(locations: &[&str]) -> LocationSpecs {
    LocationSpecs::from_locations(locations).unwrap()
}

fn column(table: &TidyTable, name: &str) -> Vec<Option<String>> {
    (0..table.len())
        .map(|row| table.cell(row, name).unwrap())
        .collect()
}

fn texts(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

#[test]
fn test_scenario_single_diagnosis_per_message() {
    let table = tidy_segments(
        &specs(&["MSH.7", "PID.3.1", "PID.3.4"]),
        &specs(&["DG1.3.1", "DG1.6"]),
        &[ADT_B, ADT_A],
    )
    .unwrap();

    assert_eq!(
        table.columns,
        vec!["MSH.7", "PID.3.1", "PID.3.4", "seg", "DG1.3.1", "DG1.6"]
    );
    assert_eq!(table.len(), 2);

    // Sorted by composite identity, so the May message comes first
    assert_eq!(
        table.rows[0].ids,
        vec!["20170515104040", "123", "FACILITY A"]
    );
    assert_eq!(
        table.rows[1].ids,
        vec!["20170711123256", "456", "FACILITY B"]
    );
    assert_eq!(column(&table, "seg"), texts(&[Some("0"), Some("0")]));
    assert_eq!(
        column(&table, "DG1.3.1"),
        texts(&[Some("D53.9"), Some("M43.16")])
    );
    assert_eq!(column(&table, "DG1.6"), texts(&[Some("AM"), Some("AM")]));
}

#[test]
fn test_scenario_repeated_segments_keep_missing_field() {
    let table = tidy_segments(
        &specs(&["PID.3.1"]),
        &specs(&["DG1.3.1", "DG1.6"]),
        &[ADT_MANY_DG1, ADT_A],
    )
    .unwrap();

    assert_eq!(table.len(), 5);
    let rows: Vec<(&str, Option<usize>)> = table
        .rows
        .iter()
        .map(|row| (row.ids[0].as_str(), row.segment_index))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("123", Some(0)),
            ("789", Some(0)),
            ("789", Some(1)),
            ("789", Some(2)),
            ("789", Some(3)),
        ]
    );
    assert_eq!(
        column(&table, "DG1.6"),
        texts(&[Some("AM"), Some("AM"), Some("F"), Some("F"), None])
    );
    assert_eq!(table.cell(4, "DG1.3.1"), Some(Some("Z79.4".to_string())));
}

#[test]
fn test_scenario_message_without_segment_is_pruned() {
    let output = Pipeline::with_defaults()
        .run(
            &specs(&["PID.3.1"]),
            &specs(&["DG1.3.1", "DG1.6"]),
            &[ADT_A, ADT_NO_DG1],
        )
        .unwrap();

    assert_eq!(output.table.len(), 1);
    assert_eq!(output.table.rows[0].ids, vec!["123"]);
    assert!(output.table.rows.iter().all(|row| row.segment_index.is_some()));
    assert_eq!(output.stats.rows_joined, 2);
    assert_eq!(output.stats.rows_pruned, 1);
}

#[test]
fn test_scenario_duplicate_message_text_is_collapsed() {
    let output = Pipeline::with_defaults()
        .run(
            &specs(&["MSH.7", "PID.3.1"]),
            &specs(&["DG1.3.1"]),
            &[ADT_A, ADT_B, ADT_A],
        )
        .unwrap();

    assert_eq!(output.stats.messages_in, 3);
    assert_eq!(output.stats.messages_unique, 2);
    assert_eq!(output.table.len(), 2);
}

#[test]
fn test_segment_order_is_numeric() {
    let mut message = String::from(
        "MSH|^~\\&||^Facility E|||20180101000000||ADT^A08^ADT A08\nPID|1||555^^^FACILITY E\n",
    );
    for n in 1..=12 {
        message.push_str(&format!("DG1|{n}||CODE{n}^Diagnosis {n}^I10|||AM\n"));
    }

    let table = tidy_segments(&specs(&["PID.3.1"]), &specs(&["DG1.1"]), &[message]).unwrap();

    let indices: Vec<Option<usize>> = table.rows.iter().map(|row| row.segment_index).collect();
    assert_eq!(indices, (0..12).map(Some).collect::<Vec<_>>());
    assert_eq!(table.cell(10, "DG1.1"), Some(Some("11".to_string())));
}

#[test]
fn test_renamed_columns_and_config_settings() {
    let yaml = "identity:\n  PID.3.1: patient_id\n  PID.3.4: facility\n\
                report:\n  DG1.3.1: diag_code\n  DG1.6: diag_type\n\
                segment_column: diagnosis\nsegment_index_base: 1\nidentity_separator: '|'\n";
    let config = TidyConfig::from_yaml_str(yaml, "<inline>").unwrap();

    let output = config
        .build_pipeline()
        .run(&config.identity, &config.report, &[ADT_A])
        .unwrap();
    let table = output.table;

    assert_eq!(
        table.columns,
        vec!["patient_id", "facility", "diagnosis", "diag_code", "diag_type"]
    );
    assert_eq!(table.segment_column(), Some("diagnosis"));
    assert_eq!(table.cell(0, "diagnosis"), Some(Some("1".to_string())));
    assert_eq!(table.cell(0, "facility"), Some(Some("FACILITY A".to_string())));
    assert_eq!(table.cell(0, "DG1.6"), None);
}

#[test]
fn test_config_file_drives_pipeline() -> anyhow::Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"identity: [PID.3.1]\nreport: [DG1.6]\n")?;
    let config = TidyConfig::from_path(file.path())?;

    let table = config
        .build_pipeline()
        .run(&config.identity, &config.report, &[ADT_A, ADT_B])?
        .table;
    assert_eq!(table.to_records(""), vec![
        vec!["123".to_string(), "0".to_string(), "AM".to_string()],
        vec!["456".to_string(), "0".to_string(), "AM".to_string()],
    ]);
    Ok(())
}

#[test]
fn test_split_batch_feeds_pipeline() {
    let batch = format!("{ADT_MANY_DG1}{ADT_NO_DG1}");
    let messages = split_messages(&batch).unwrap();
    assert_eq!(messages.len(), 2);

    let table = tidy_segments(&specs(&["PID.3.1"]), &specs(&["DG1.3.1"]), &messages).unwrap();
    assert_eq!(table.len(), 4);
    assert!(table.rows.iter().all(|row| row.ids == vec!["789"]));
}

#[test]
fn test_error_empty_inputs() {
    let none = LocationSpecs::new();
    let err = tidy_segments(&none, &specs(&["DG1.6"]), &[ADT_A]).unwrap_err();
    assert_eq!(err, Error::EmptyInput { input: InputKind::IdentityLocations });

    let no_messages: Vec<String> = Vec::new();
    let err = tidy_segments(&specs(&["MSH.7"]), &specs(&["DG1.6"]), &no_messages).unwrap_err();
    assert_eq!(err, Error::EmptyInput { input: InputKind::Messages });
}

#[test]
fn test_error_mixed_report_segments() {
    let err = tidy_segments(&specs(&["MSH.7"]), &specs(&["DG1.3.1", "PR1.3"]), &[ADT_A]).unwrap_err();
    assert!(matches!(err, Error::MixedSegmentReportLocations { .. }));
}

#[test]
fn test_error_ambiguous_identity() {
    let err = tidy_segments(&specs(&["DG1.1"]), &specs(&["PID.5.1"]), &[ADT_MANY_DG1]).unwrap_err();
    assert_eq!(
        err,
        Error::AmbiguousIdentityField {
            locations: vec!["DG1.1".to_string()]
        }
    );
}

#[test]
fn test_error_missing_identity() {
    let err = tidy_segments(&specs(&["EVN.2"]), &specs(&["DG1.6"]), &[ADT_A, ADT_MANY_DG1])
        .unwrap_err();
    assert_eq!(
        err,
        Error::MissingIdentityValue {
            locations: vec!["EVN.2".to_string()]
        }
    );
}

#[test]
fn test_error_duplicate_identity() {
    let err = tidy_segments(&specs(&["MSH.9.1"]), &specs(&["DG1.6"]), &[ADT_A, ADT_B]).unwrap_err();
    assert_eq!(
        err,
        Error::DuplicateMessageIdentity {
            identities: vec!["ADT".to_string()]
        }
    );
}

#[test]
fn test_error_malformed_message() {
    let err = tidy_segments(&specs(&["MSH.7"]), &specs(&["DG1.6"]), &[ADT_A, "MSH|"]).unwrap_err();
    assert_eq!(
        err,
        Error::Message(hl7_adapter_v2::Error::MalformedMessage { index: 1, length: 4 })
    );
}

#[test]
fn test_error_segment_index_base_overflow() {
    let yaml = "identity: [PID.3.1]\nreport: [DG1.6]\nsegment_index_base: 18446744073709551615\n";
    let config = TidyConfig::from_yaml_str(yaml, "<inline>").unwrap();

    let err = config
        .build_pipeline()
        .run(&config.identity, &config.report, &[ADT_MANY_DG1])
        .unwrap_err();
    assert_eq!(
        err,
        Error::SegmentIndexOverflow {
            index: 1,
            base: usize::MAX
        }
    );
}

#[test]
fn test_error_malformed_location_in_config() {
    let err = TidyConfig::from_yaml_str("identity: [MSH.x]\nreport: [DG1.6]\n", "tidy.yaml")
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("MSH.x"));
}

#[test]
fn test_custom_config_has_no_effect_on_row_set() {
    let config = PipelineConfig {
        identity_separator: "|".to_string(),
        ..Default::default()
    };
    let custom = Pipeline::new(config)
        .run(&specs(&["PID.3.1", "MSH.7"]), &specs(&["DG1.6"]), &[ADT_A, ADT_B])
        .unwrap()
        .table;
    let default = tidy_segments(&specs(&["PID.3.1", "MSH.7"]), &specs(&["DG1.6"]), &[ADT_A, ADT_B])
        .unwrap();
    assert_eq!(custom, default);
}
