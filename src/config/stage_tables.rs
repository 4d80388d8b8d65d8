// ==========================================
// 种植批次规则引擎 - 内置规则表
// ==========================================
// 职责: 两个业务域的阶段目录 + 数量规则默认值
// 红线: 终态 closed 无后继; 所有分支最终汇入 closed
// ==========================================

use crate::domain::{QuantityOperation, QuantityRule, StageDefinition};
use std::collections::BTreeMap;

pub const GRAMS: &str = "grams";

// ==========================================
// 大麻阶段目录 (9 个阶段)
// ==========================================
pub fn cannabis_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new("propagation")
            .next(&["vegetative"])
            .duration(Some(7), Some(21))
            .requires(
                &["plantCount"],
                "Plant count must be recorded before moving clones to vegetative",
            ),
        StageDefinition::new("vegetative")
            .next(&["flowering"])
            .previous(&["propagation"])
            .duration(Some(14), Some(60))
            .requires(
                &["lightingSchedule"],
                "A lighting schedule must be set before flipping to flowering",
            ),
        StageDefinition::new("flowering")
            .next(&["harvest"])
            .previous(&["vegetative"])
            .duration(Some(42), Some(90)),
        StageDefinition::new("harvest")
            .next(&["drying"])
            .previous(&["flowering"])
            .requires(&["harvestDate"], "Harvest date must be recorded before drying"),
        StageDefinition::new("drying")
            .next(&["curing", "testing"])
            .previous(&["harvest"])
            .duration(Some(7), None),
        StageDefinition::new("curing")
            .next(&["testing"])
            .previous(&["drying"])
            .duration(Some(14), None),
        StageDefinition::new("testing")
            .next(&["packaging"])
            .previous(&["drying", "curing"])
            .requires(
                &["testResults"],
                "Lab test results are required before packaging",
            ),
        StageDefinition::new("packaging")
            .next(&["closed"])
            .previous(&["testing"])
            .requires(
                &["metrcPackageTag"],
                "A METRC package tag must be assigned before closing the batch",
            ),
        StageDefinition::new("closed").previous(&["packaging"]),
    ]
}

// ==========================================
// 农产品阶段目录 (14 个阶段)
// ==========================================
pub fn produce_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new("seeding")
            .next(&["germination"])
            .duration(None, Some(14))
            .requires(
                &["plantCount"],
                "Seeded count must be recorded before germination",
            ),
        StageDefinition::new("germination")
            .next(&["seedling", "growing"])
            .previous(&["seeding"])
            .duration(Some(5), Some(21)),
        StageDefinition::new("seedling")
            .next(&["transplant", "growing"])
            .previous(&["germination"])
            .duration(Some(14), None),
        StageDefinition::new("transplant")
            .next(&["growing"])
            .previous(&["seedling"]),
        StageDefinition::new("growing")
            .next(&["pre_harvest", "harvest"])
            .previous(&["germination", "seedling", "transplant"])
            .duration(Some(21), Some(120)),
        StageDefinition::new("pre_harvest")
            .next(&["harvest"])
            .previous(&["growing"]),
        StageDefinition::new("harvest")
            .next(&["washing", "sorting", "grading"])
            .previous(&["growing", "pre_harvest"])
            .requires(
                &["harvestDate"],
                "Harvest date must be recorded before post-harvest handling",
            ),
        StageDefinition::new("washing")
            .next(&["sorting"])
            .previous(&["harvest"]),
        StageDefinition::new("sorting")
            .next(&["grading"])
            .previous(&["harvest", "washing"]),
        StageDefinition::new("grading")
            .next(&["ripening", "packaging", "storage"])
            .previous(&["harvest", "sorting"])
            .requires(
                &["qualityGrade"],
                "A quality grade must be assigned before product leaves grading",
            ),
        StageDefinition::new("ripening")
            .next(&["packaging"])
            .previous(&["grading"]),
        StageDefinition::new("packaging")
            .next(&["storage", "closed"])
            .previous(&["grading", "ripening"])
            .requires(
                &["lotCode"],
                "A lot code must be printed before packaged product leaves the line",
            ),
        StageDefinition::new("storage")
            .next(&["closed"])
            .previous(&["grading", "packaging"]),
        StageDefinition::new("closed").previous(&["packaging", "storage"]),
    ]
}

// ==========================================
// 数量规则默认值 (单位: 克)
// ==========================================

pub fn cannabis_quantity_rules() -> BTreeMap<QuantityOperation, QuantityRule> {
    let precision = "METRC requires a minimum precision of 0.1 grams for cannabis tracking";

    let mut rules = BTreeMap::new();
    for op in [
        QuantityOperation::Split,
        QuantityOperation::Waste,
        QuantityOperation::Transfer,
    ] {
        rules.insert(op, quantity_rule(0.1, None, precision));
    }
    rules.insert(
        QuantityOperation::Merge,
        quantity_rule(
            0.1,
            Some(50_000.0),
            "Cannabis merges must be at least 0.1 grams and at most 50 kg",
        ),
    );
    rules
}

pub fn produce_quantity_rules() -> BTreeMap<QuantityOperation, QuantityRule> {
    let minimum = "Produce operations require a minimum of 5 grams";

    let mut rules = BTreeMap::new();
    for op in [
        QuantityOperation::Split,
        QuantityOperation::Waste,
        QuantityOperation::Transfer,
    ] {
        rules.insert(op, quantity_rule(5.0, None, minimum));
    }
    rules.insert(
        QuantityOperation::Merge,
        quantity_rule(
            5.0,
            Some(907_185.0),
            "Produce merges must be at least 5 grams and at most 1 ton (907,185 grams)",
        ),
    );
    rules
}

fn quantity_rule(min_weight: f64, max_weight: Option<f64>, context: &str) -> QuantityRule {
    QuantityRule {
        min_weight,
        max_weight,
        unit: GRAMS.to_string(),
        context_message: context.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_counts() {
        assert_eq!(cannabis_stages().len(), 9);
        assert_eq!(produce_stages().len(), 14);
    }

    #[test]
    fn test_first_and_last_stage() {
        let cannabis = cannabis_stages();
        assert_eq!(cannabis.first().unwrap().stage, "propagation");
        assert!(cannabis.last().unwrap().is_terminal());

        let produce = produce_stages();
        assert_eq!(produce.first().unwrap().stage, "seeding");
        assert_eq!(produce.last().unwrap().stage, "closed");
    }

    #[test]
    fn test_every_operation_has_a_rule() {
        for op in QuantityOperation::ALL {
            assert!(cannabis_quantity_rules().contains_key(&op));
            assert!(produce_quantity_rules().contains_key(&op));
        }
    }
}
