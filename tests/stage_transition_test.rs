// ==========================================
// 阶段流转校验 - 集成测试
// ==========================================
// 职责: 验证两个业务域的阶段目录、必填字段、时长约束
// 场景: 从门面入口调用, 时钟固定为 2026-06-01
// ==========================================


use cultivation_batch_rules::domain::Domain;
use cultivation_batch_rules::engine::StageCatalog;
use serde_json::json;
use test_helpers::{create_test_api, BatchBuilder};

// ==========================================
// 目录与合法性
// ==========================================

#[test]
fn test_harvest_to_grading_is_domain_scoped() {
    let catalog = StageCatalog::built_in();
    assert!(!catalog.is_valid_transition(Domain::Cannabis, "harvest", "grading"));
    assert!(catalog.is_valid_transition(Domain::Produce, "harvest", "grading"));
}

#[test]
fn test_closed_has_no_successors() {
    let api = create_test_api();
    for domain in Domain::ALL {
        assert!(api.catalog().is_terminal(domain, "closed"));
        assert!(api.catalog().next_stages(domain, "closed").is_empty());

        let r = api.validate_stage_transition(domain, "closed", "packaging", None);
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("none (terminal stage)"));
    }
}

#[test]
fn test_invalid_transition_lists_allowed_stages() {
    let r = create_test_api().validate_stage_transition(Domain::Cannabis, "drying", "packaging", None);
    assert_eq!(
        r.error(),
        Some("Invalid transition from 'drying' to 'packaging'. Allowed next stages: curing, testing")
    );
}

#[test]
fn test_unknown_stage_passes_with_warning() {
    let r = create_test_api().validate_stage_transition(Domain::Produce, "hydro_cloning", "growing", None);
    assert!(r.is_valid());
    assert!(r.warnings()[0].starts_with("No rules defined for this stage"));
}

#[test]
fn test_stage_positions_follow_catalog_order() {
    let catalog = StageCatalog::built_in();
    let pos = catalog.stage_position(Domain::Cannabis, "propagation").unwrap();
    assert_eq!((pos.index, pos.total), (1, 9));
    let pos = catalog.stage_position(Domain::Produce, "closed").unwrap();
    assert_eq!(pos.index, pos.total);
}

// ==========================================
// 必填字段
// ==========================================

#[test]
fn test_testing_to_packaging_requires_test_results() {
    let api = create_test_api();
    let batch = BatchBuilder::cannabis("C-1", "testing").build();

    let r = api.validate_stage_transition(Domain::Cannabis, "testing", "packaging", Some(&batch));
    assert!(!r.is_valid());
    let error = r.error().unwrap();
    assert!(error.contains("testResults"));
    assert!(error.contains("Lab test results are required before packaging"));

    let batch = BatchBuilder::cannabis("C-1", "testing")
        .field("testResults", json!({"thc": 22.1, "passed": true}))
        .build();
    let r = api.validate_stage_transition(Domain::Cannabis, "testing", "packaging", Some(&batch));
    assert!(r.is_valid());
}

#[test]
fn test_zero_plant_count_counts_as_missing() {
    let api = create_test_api();
    let batch = BatchBuilder::produce("P-1", "seeding").plants(0).build();
    let r = api.validate_stage_transition(Domain::Produce, "seeding", "germination", Some(&batch));
    assert!(!r.is_valid());
    assert!(r.error().unwrap().contains("plantCount"));

    let batch = BatchBuilder::produce("P-1", "seeding").plants(120).build();
    let r = api.validate_stage_transition(Domain::Produce, "seeding", "germination", Some(&batch));
    assert!(r.is_valid());
}

#[test]
fn test_empty_string_field_counts_as_missing() {
    let batch = BatchBuilder::produce("P-2", "grading")
        .field("qualityGrade", json!(""))
        .build();
    let r = create_test_api().validate_stage_transition(Domain::Produce, "grading", "packaging", Some(&batch));
    assert!(r.error().unwrap().contains("qualityGrade"));
}

#[test]
fn test_illegal_target_reported_before_missing_fields() {
    let batch = BatchBuilder::cannabis("C-2", "testing").build();
    let r = create_test_api().validate_stage_transition(Domain::Cannabis, "testing", "closed", Some(&batch));
    assert!(r.error().unwrap().starts_with("Invalid transition"));
}

// ==========================================
// 时长约束
// ==========================================

#[test]
fn test_propagation_too_short_blocks() {
    let batch = BatchBuilder::cannabis("C-3", "propagation")
        .plants(40)
        .started_days_ago(3)
        .build();
    let r = create_test_api().validate_stage_transition(Domain::Cannabis, "propagation", "vegetative", Some(&batch));
    assert!(!r.is_valid());
    assert_eq!(r.elapsed_days(), Some(3));
    assert!(r.error().unwrap().contains("at least 7 days"));
}

#[test]
fn test_flowering_overdue_warns_but_passes() {
    let batch = BatchBuilder::cannabis("C-4", "flowering").started_days_ago(95).build();
    let r = create_test_api().validate_stage_transition(Domain::Cannabis, "flowering", "harvest", Some(&batch));
    assert!(r.is_valid());
    assert!(r.error().is_none());
    assert_eq!(r.warnings().len(), 1);
    assert!(r.warnings()[0].contains("recommended maximum of 90 days"));
}

#[test]
fn test_minimum_duration_boundary_is_inclusive() {
    let batch = BatchBuilder::cannabis("C-5", "propagation")
        .plants(40)
        .started_days_ago(7)
        .build();
    let r = create_test_api().validate_stage_transition(Domain::Cannabis, "propagation", "vegetative", Some(&batch));
    assert!(r.is_valid());
    assert!(!r.has_warnings());
}

// ==========================================
// 确定性 / 幂等
// ==========================================

#[test]
fn test_same_inputs_same_verdict() {
    let api = create_test_api();
    let batch = BatchBuilder::cannabis("C-6", "flowering").started_days_ago(95).build();

    let first = api.validate_stage_transition(Domain::Cannabis, "flowering", "harvest", Some(&batch));
    for _ in 0..5 {
        let again = api.validate_stage_transition(Domain::Cannabis, "flowering", "harvest", Some(&batch));
        assert_eq!(again, first);
    }
}
