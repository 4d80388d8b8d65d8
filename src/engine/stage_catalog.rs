// ==========================================
// 种植批次规则引擎 - 阶段目录
// ==========================================
// 职责: 按业务域提供有序阶段列表、阶段查询、流转合法性判断
// 红线: 无状态、无副作用、加载后只读
// ==========================================

use crate::config::RuleSet;
use crate::domain::{Domain, StageDefinition};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// 终态阶段ID
pub const CLOSED_STAGE: &str = "closed";

/// 阶段在目录中的位置(用于进度展示)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePosition {
    /// 从 1 开始
    pub index: usize,
    pub total: usize,
}

// ==========================================
// StageCatalog - 阶段目录
// ==========================================
#[derive(Debug, Clone)]
pub struct StageCatalog {
    rule_set: Arc<RuleSet>,
}

impl StageCatalog {
    pub fn new(rule_set: Arc<RuleSet>) -> Self {
        Self { rule_set }
    }

    /// 使用内置规则表
    pub fn built_in() -> Self {
        Self::new(Arc::new(RuleSet::default()))
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    /// 业务域的有序阶段列表
    pub fn stages(&self, domain: Domain) -> &[StageDefinition] {
        self.rule_set.stages(domain)
    }

    /// 查询阶段定义(未找到 → None)
    pub fn stage(&self, domain: Domain, stage_id: &str) -> Option<&StageDefinition> {
        self.stages(domain).iter().find(|s| s.stage == stage_id)
    }

    /// 判断 from → to 是否为合法流转
    ///
    /// # 规则
    /// - to ∈ from.allowed_next_stages → true
    /// - from 未知 → false
    pub fn is_valid_transition(&self, domain: Domain, from: &str, to: &str) -> bool {
        self.stage(domain, from)
            .map(|def| def.allows_next(to))
            .unwrap_or(false)
    }

    /// 业务域的初始阶段(目录第一项)
    pub fn initial_stage(&self, domain: Domain) -> Option<&StageDefinition> {
        self.stages(domain).first()
    }

    /// 是否为终态(未知阶段 → false)
    pub fn is_terminal(&self, domain: Domain, stage_id: &str) -> bool {
        self.stage(domain, stage_id)
            .map(StageDefinition::is_terminal)
            .unwrap_or(false)
    }

    /// 合法后继阶段(未知阶段 → 空)
    pub fn next_stages(&self, domain: Domain, stage_id: &str) -> &[String] {
        self.stage(domain, stage_id)
            .map(|def| def.allowed_next_stages.as_slice())
            .unwrap_or(&[])
    }

    pub fn stage_position(&self, domain: Domain, stage_id: &str) -> Option<StagePosition> {
        let stages = self.stages(domain);
        stages
            .iter()
            .position(|s| s.stage == stage_id)
            .map(|i| StagePosition {
                index: i + 1,
                total: stages.len(),
            })
    }

    /// 目录语义一致性检查
    ///
    /// # 检查项
    /// 1. 目录非空, 且包含终态 closed(无后继)
    /// 2. closed 以外不存在其他终态
    /// 3. 所有阶段可由初始阶段到达
    /// 4. 所有阶段均可到达 closed
    /// 5. 前驱集合与后继集合互为镜像
    ///
    /// # 返回
    /// - Vec<String>: 问题列表(空 → 一致), 每项以业务域为前缀
    pub fn check_consistency(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for domain in Domain::ALL {
            for issue in catalog_issues(self.stages(domain)) {
                issues.push(format!("{}: {}", domain, issue));
            }
        }
        issues
    }
}

fn catalog_issues(stages: &[StageDefinition]) -> Vec<String> {
    let mut issues = Vec::new();

    let Some(initial) = stages.first() else {
        issues.push("catalog is empty".to_string());
        return issues;
    };

    let by_id: HashMap<&str, &StageDefinition> =
        stages.iter().map(|s| (s.stage.as_str(), s)).collect();

    match by_id.get(CLOSED_STAGE) {
        Some(closed) if !closed.is_terminal() => {
            issues.push("'closed' must not have next stages".to_string());
        }
        None => issues.push("missing terminal stage 'closed'".to_string()),
        _ => {}
    }

    for def in stages {
        if def.is_terminal() && def.stage != CLOSED_STAGE {
            issues.push(format!("'{}' is a dead end (no next stages)", def.stage));
        }
    }

    // 正向可达
    let forward = reachable(initial.stage.as_str(), |id| {
        by_id
            .get(id)
            .map(|d| d.allowed_next_stages.iter().map(String::as_str).collect())
            .unwrap_or_default()
    });
    for def in stages {
        if !forward.contains(def.stage.as_str()) {
            issues.push(format!(
                "'{}' is unreachable from '{}'",
                def.stage, initial.stage
            ));
        }
    }

    // 反向可达 closed
    if by_id.contains_key(CLOSED_STAGE) {
        let mut predecessors: HashMap<&str, Vec<&str>> = HashMap::new();
        for def in stages {
            for next in &def.allowed_next_stages {
                predecessors
                    .entry(next.as_str())
                    .or_default()
                    .push(def.stage.as_str());
            }
        }
        let backward = reachable(CLOSED_STAGE, |id| {
            predecessors.get(id).cloned().unwrap_or_default()
        });
        for def in stages {
            if !backward.contains(def.stage.as_str()) {
                issues.push(format!("'{}' cannot reach 'closed'", def.stage));
            }
        }
    }

    // 前驱/后继镜像
    for def in stages {
        for next in &def.allowed_next_stages {
            if let Some(target) = by_id.get(next.as_str()) {
                if !target.allowed_previous_stages.iter().any(|p| p == &def.stage) {
                    issues.push(format!(
                        "'{}' -> '{}' is not mirrored in '{}'.allowedPreviousStages",
                        def.stage, next, next
                    ));
                }
            }
        }
        for prev in &def.allowed_previous_stages {
            if let Some(source) = by_id.get(prev.as_str()) {
                if !source.allows_next(&def.stage) {
                    issues.push(format!(
                        "'{}' lists previous stage '{}' which cannot move to it",
                        def.stage, prev
                    ));
                }
            }
        }
    }

    issues
}

fn reachable<'a, F>(start: &'a str, neighbours: F) -> HashSet<&'a str>
where
    F: Fn(&'a str) -> Vec<&'a str>,
{
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        for n in neighbours(id) {
            if seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen
}
