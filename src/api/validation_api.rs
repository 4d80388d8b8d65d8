// ==========================================
// 种植批次规则引擎 - 校验门面 API
// ==========================================
// 职责: 组装五个校验器 + 时钟, 对外提供单一入口
//       复合操作(拆分/合并/报废/转移/加株)按顺序调用多个校验器并合并结论
// 红线: 门面只做分派与合并, 不新增任何业务规则之外的判定;
//       每个结论都记录日志(拒绝 → info, 放行 → debug)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::request::OperationRequest;
use crate::config::{ConfigManager, RuleSet};
use crate::domain::{
    BatchSnapshot, BatchStatus, Domain, LocationSnapshot, QuantityOperation, ValidationResult,
};
use crate::engine::{
    CapacityValidator, Clock, CompatibilityValidator, QuantityValidator, StageCatalog,
    StageTransitionValidator, SystemClock, TimelineValidator,
};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// BatchValidationApi - 校验门面
// ==========================================
pub struct BatchValidationApi {
    rule_set: Arc<RuleSet>,
    clock: Arc<dyn Clock>,
    transition: StageTransitionValidator,
    quantity: QuantityValidator,
    timeline: TimelineValidator,
    capacity: CapacityValidator,
    compatibility: CompatibilityValidator,
}

impl BatchValidationApi {
    /// 创建门面(规则集与时钟均由调用方注入)
    pub fn new(rule_set: Arc<RuleSet>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transition: StageTransitionValidator::new(StageCatalog::new(Arc::clone(&rule_set))),
            quantity: QuantityValidator::new(Arc::clone(&rule_set)),
            timeline: TimelineValidator::new(Arc::clone(&rule_set)),
            capacity: CapacityValidator::new(Arc::clone(&rule_set)),
            compatibility: CompatibilityValidator::new(Arc::clone(&rule_set)),
            rule_set,
            clock,
        }
    }

    /// 内置规则表 + 系统时钟
    pub fn built_in() -> Self {
        Self::new(Arc::new(RuleSet::default()), Arc::new(SystemClock))
    }

    /// 按配置优先级加载规则(见 ConfigManager::load)
    ///
    /// 阶段目录存在结构性问题(死路/不可达/前驱不镜像)时仅记录警告,
    /// 不阻止加载: 自定义目录可能有意为之。
    pub fn load(rules_path: Option<&Path>, clock: Arc<dyn Clock>) -> ApiResult<Self> {
        let manager = ConfigManager::load(rules_path).map_err(ApiError::from)?;
        let api = Self::new(manager.rule_set(), clock);

        for issue in api.catalog().check_consistency() {
            warn!(source = %manager.source(), issue = %issue, "阶段目录一致性问题");
        }
        info!(source = %manager.source(), "校验门面已就绪");

        Ok(api)
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub fn catalog(&self) -> &StageCatalog {
        self.transition.catalog()
    }

    /// 当前日期(来自注入的时钟)
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ==========================================
    // 单一校验器入口
    // ==========================================

    pub fn validate_stage_transition(
        &self,
        domain: Domain,
        current_stage: &str,
        next_stage: &str,
        batch: Option<&BatchSnapshot>,
    ) -> ValidationResult {
        self.transition
            .validate(domain, current_stage, next_stage, batch, self.today())
    }

    /// 阶段流转(业务域为原始字符串)
    ///
    /// # 返回
    /// - Err(ApiError::UnknownDomain): 业务域不可识别
    pub fn validate_stage_transition_for(
        &self,
        domain: &str,
        current_stage: &str,
        next_stage: &str,
        batch: Option<&BatchSnapshot>,
    ) -> ApiResult<ValidationResult> {
        let domain: Domain = domain.parse()?;
        Ok(self.validate_stage_transition(domain, current_stage, next_stage, batch))
    }

    pub fn validate_quantity(
        &self,
        domain: Domain,
        operation: &str,
        quantity: f64,
        unit: &str,
    ) -> ValidationResult {
        self.quantity.validate(domain, operation, quantity, unit)
    }

    pub fn validate_harvest_date(
        &self,
        domain: Domain,
        harvest_date: NaiveDate,
        start_date: Option<NaiveDate>,
    ) -> ValidationResult {
        self.timeline
            .validate_harvest_date(domain, harvest_date, start_date, self.today())
    }

    pub fn validate_packaging_date(
        &self,
        domain: Domain,
        packaging_date: NaiveDate,
        harvest_date: Option<NaiveDate>,
    ) -> ValidationResult {
        self.timeline
            .validate_packaging_date(domain, packaging_date, harvest_date, self.today())
    }

    /// 储存时长(current_date 缺省为今天)
    pub fn validate_storage_duration(
        &self,
        domain: Domain,
        entry_date: NaiveDate,
        current_date: Option<NaiveDate>,
        max_shelf_life_days: i64,
    ) -> ValidationResult {
        let current_date = current_date.unwrap_or_else(|| self.today());
        self.timeline
            .validate_storage_duration(domain, entry_date, current_date, max_shelf_life_days)
    }

    pub fn validate_plant_capacity(
        &self,
        location: &LocationSnapshot,
        additional_plants: u32,
    ) -> ValidationResult {
        self.capacity
            .validate_plant_capacity(location, additional_plants)
    }

    pub fn validate_area_capacity(
        &self,
        location: &LocationSnapshot,
        additional_area: f64,
    ) -> ValidationResult {
        self.capacity.validate_area_capacity(location, additional_area)
    }

    pub fn validate_merge(&self, batches: &[BatchSnapshot]) -> ValidationResult {
        self.compatibility.validate_merge(batches)
    }

    pub fn validate_split(&self, batch: &BatchSnapshot, split_count: u32) -> ValidationResult {
        self.compatibility.validate_split(batch, split_count)
    }

    // ==========================================
    // 操作请求入口
    // ==========================================

    /// 校验一个拟执行操作
    ///
    /// # 复合操作
    /// - split: 拆分合法性 + 数量(split, 若提供)
    /// - merge: 合并兼容性 + 数量(merge, 各批次数量之和, 若提供; 数量个数须与批次数一致)
    /// - waste: 数量(waste) + 批次未关闭
    /// - transfer: 数量(transfer, 若提供) + 非隔离 + 目标场地株数容量(若提供)
    /// - addPlants: 株数容量 + 面积容量(若提供)
    pub fn validate_operation(&self, request: &OperationRequest) -> ValidationResult {
        let verdict = self.dispatch(request);
        log_verdict(request, &verdict);
        verdict
    }

    /// 解析 JSON 请求并校验; 解析失败同样返回(失败的)结论
    pub fn validate_json(&self, json: &str) -> ValidationResult {
        match OperationRequest::from_json(json) {
            Ok(request) => self.validate_operation(&request),
            Err(err) => {
                info!(error = %err, "请求解析失败");
                err.into_verdict()
            }
        }
    }

    fn dispatch(&self, request: &OperationRequest) -> ValidationResult {
        match request {
            OperationRequest::StageTransition {
                domain,
                current_stage,
                next_stage,
                batch,
            } => self.validate_stage_transition(*domain, current_stage, next_stage, batch.as_ref()),

            OperationRequest::Split {
                batch,
                split_count,
                quantity,
                unit,
            } => {
                let mut results = vec![self.validate_split(batch, *split_count)];
                if let Some(quantity) = quantity {
                    results.push(self.quantity.validate_operation(
                        batch.domain_type,
                        QuantityOperation::Split,
                        *quantity,
                        unit,
                    ));
                }
                ValidationResult::merge_all(results)
            }

            OperationRequest::Merge {
                batches,
                quantities,
                unit,
            } => {
                let mut results = vec![self.validate_merge(batches)];
                if !quantities.is_empty() && quantities.len() != batches.len() {
                    results.push(ValidationResult::invalid(format!(
                        "Merge request lists {} quantities for {} batches; provide one quantity per batch",
                        quantities.len(),
                        batches.len()
                    )));
                } else if let (Some(first), false) = (batches.first(), quantities.is_empty()) {
                    let total: f64 = quantities.iter().sum();
                    results.push(self.quantity.validate_operation(
                        first.domain_type,
                        QuantityOperation::Merge,
                        total,
                        unit,
                    ));
                }
                ValidationResult::merge_all(results)
            }

            OperationRequest::Waste {
                batch,
                quantity,
                unit,
            } => {
                let mut results = vec![self.quantity.validate_operation(
                    batch.domain_type,
                    QuantityOperation::Waste,
                    *quantity,
                    unit,
                )];
                if batch.status == BatchStatus::Closed {
                    results.push(ValidationResult::invalid(format!(
                        "Cannot record waste for closed batch '{}'",
                        batch.id
                    )));
                }
                ValidationResult::merge_all(results)
            }

            OperationRequest::Transfer {
                batch,
                quantity,
                unit,
                destination,
            } => {
                let mut results = Vec::new();
                if let Some(quantity) = quantity {
                    results.push(self.quantity.validate_operation(
                        batch.domain_type,
                        QuantityOperation::Transfer,
                        *quantity,
                        unit,
                    ));
                }
                if batch.is_quarantined() {
                    results.push(ValidationResult::invalid(format!(
                        "Cannot transfer quarantined batch '{}'; release quarantine first",
                        batch.id
                    )));
                }
                if let Some(destination) = destination {
                    results.push(
                        self.validate_plant_capacity(destination, batch.plant_count.unwrap_or(0)),
                    );
                }
                ValidationResult::merge_all(results)
            }

            OperationRequest::AddPlants {
                location,
                plant_count,
                area,
            } => {
                let mut results = vec![self.validate_plant_capacity(location, *plant_count)];
                if let Some(area) = area {
                    results.push(self.validate_area_capacity(location, *area));
                }
                ValidationResult::merge_all(results)
            }

            OperationRequest::HarvestDate {
                domain,
                harvest_date,
                start_date,
            } => self.validate_harvest_date(*domain, *harvest_date, *start_date),

            OperationRequest::PackagingDate {
                domain,
                packaging_date,
                harvest_date,
            } => self.validate_packaging_date(*domain, *packaging_date, *harvest_date),

            OperationRequest::Storage {
                domain,
                entry_date,
                current_date,
                max_shelf_life_days,
            } => self.validate_storage_duration(
                *domain,
                *entry_date,
                *current_date,
                *max_shelf_life_days,
            ),
        }
    }
}

fn log_verdict(request: &OperationRequest, verdict: &ValidationResult) {
    let domain = request.domain().map(|d| d.as_str()).unwrap_or("-");
    if verdict.is_valid() {
        debug!(
            operation = request.kind(),
            domain,
            warnings = verdict.warnings().len(),
            "操作放行"
        );
    } else {
        info!(
            operation = request.kind(),
            domain,
            reason = verdict.error().unwrap_or_default(),
            "操作被拒绝"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuarantineStatus;
    use crate::engine::FixedClock;

    fn api() -> BatchValidationApi {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        BatchValidationApi::new(Arc::new(RuleSet::default()), Arc::new(FixedClock(today)))
    }

    fn produce_batch(id: &str) -> BatchSnapshot {
        BatchSnapshot::new(id, Domain::Produce, "grading").with_cultivar("roma")
    }

    #[test]
    fn test_split_merges_compatibility_and_quantity_errors() {
        let request = OperationRequest::Split {
            batch: produce_batch("P-1").with_quarantine(QuarantineStatus::Quarantined),
            split_count: 3,
            quantity: Some(1.0),
            unit: "grams".to_string(),
        };
        let r = api().validate_operation(&request);
        assert!(!r.is_valid());
        let error = r.error().unwrap();
        assert!(error.contains("release quarantine first"));
        assert!(error.contains("; Quantity 1 grams is below the minimum of 5"));
    }

    #[test]
    fn test_waste_on_closed_batch_rejected() {
        let request = OperationRequest::Waste {
            batch: produce_batch("P-1").with_status(BatchStatus::Closed),
            quantity: 50.0,
            unit: "grams".to_string(),
        };
        let r = api().validate_operation(&request);
        assert_eq!(r.error(), Some("Cannot record waste for closed batch 'P-1'"));
    }

    #[test]
    fn test_transfer_checks_destination_capacity() {
        let request = OperationRequest::Transfer {
            batch: produce_batch("P-1").with_plant_count(30),
            quantity: None,
            unit: "grams".to_string(),
            destination: Some(LocationSnapshot::new("L-2", "Greenhouse 2", 100).with_plant_count(80)),
        };
        let r = api().validate_operation(&request);
        assert!(!r.is_valid());
        assert_eq!(r.available_capacity(), Some(20.0));
    }

    #[test]
    fn test_merge_sums_quantities() {
        let request = OperationRequest::Merge {
            batches: vec![produce_batch("P-1"), produce_batch("P-2")],
            quantities: vec![500_000.0, 500_000.0],
            unit: "grams".to_string(),
        };
        let r = api().validate_operation(&request);
        assert!(!r.is_valid());
        assert!(r.error().unwrap().contains("exceeds the maximum of 907185"));
    }

    #[test]
    fn test_merge_quantity_count_must_match_batches() {
        let request = OperationRequest::Merge {
            batches: vec![produce_batch("P-1"), produce_batch("P-2"), produce_batch("P-3")],
            quantities: vec![100.0, 200.0],
            unit: "grams".to_string(),
        };
        let r = api().validate_operation(&request);
        assert!(!r.is_valid());
        assert!(r
            .error()
            .unwrap()
            .contains("lists 2 quantities for 3 batches"));
        assert!(r.rule().is_none());
    }

    #[test]
    fn test_storage_defaults_to_clock_today() {
        let entry = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let r = api().validate_storage_duration(Domain::Produce, entry, None, 30);
        assert!(!r.is_valid());
        assert_eq!(r.elapsed_days(), Some(31));
    }

    #[test]
    fn test_validate_json_never_errors() {
        let r = api().validate_json("{not json");
        assert!(!r.is_valid());
        assert!(r.error().unwrap().starts_with("Invalid request"));
    }

    #[test]
    fn test_named_domain_entry() {
        let a = api();
        assert!(matches!(
            a.validate_stage_transition_for("hemp", "harvest", "drying", None),
            Err(ApiError::UnknownDomain(_))
        ));
        let r = a
            .validate_stage_transition_for("Produce", "harvest", "grading", None)
            .unwrap();
        assert!(r.is_valid());
    }
}
