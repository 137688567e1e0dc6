use metrics_exporter_prometheus::PrometheusHandle;
use mortgage_rules::config::EngineConfig;
use mortgage_rules::engine::facade::ToolFacade;
use mortgage_rules::engine::repository::GraphRuleRepository;
use mortgage_rules::engine::RulesEvaluationService;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// The concrete facade this binary serves: the evaluation pipeline
/// over the seeded graph repository.
pub(crate) type EngineFacade = ToolFacade<GraphRuleRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_facade(config: EngineConfig) -> Arc<EngineFacade> {
    let repository = Arc::new(GraphRuleRepository::seeded());
    let service = Arc::new(RulesEvaluationService::new(repository, config));
    Arc::new(ToolFacade::new(service))
}
