//! Compliance Engine - per-event triage and escalation
//!
//! detect → featurize → score → gate → (escalate: question → RAG → report)
//!
//! The engine is built once at startup and shared by reference. It keeps
//! no per-event state; the only cross-event state is the counters.

use std::sync::Arc;

use super::stats::{CounterSnapshot, EvaluationCounters};
use super::types::{EngineError, Evaluation, EvaluationOutcome};
use crate::logic::ai_bridge::{Embedder, TextGenerator};
use crate::logic::config::ServiceConfig;
use crate::logic::events::LogEvent;
use crate::logic::features::{featurize, EventFeatures};
use crate::logic::index::PolicyStore;
use crate::logic::model::{AnomalyOutcome, AnomalyScorer, ModelError, TrainSummary};
use crate::logic::rag::{PipelineError, PipelineResult, RagPipeline};
use crate::logic::report::{AuditReport, ReportSink};
use crate::logic::risk::RiskKeywordRules;
use crate::logic::sensitivity::{SensitivityDetector, SensitivityResult, SensitivityRules};

/// Opening line of every escalation question
pub const ESCALATION_PREAMBLE: &str = "Is the following activity compliant with HIPAA?";

/// Compliance question for an escalated event
pub fn escalation_question(event: &LogEvent) -> String {
    format!(
        "{}\nAction: {}\nMessage: {}\nTime: {}",
        ESCALATION_PREAMBLE,
        event.action,
        event.message,
        event.timestamp_str()
    )
}

pub struct ComplianceEngine {
    config: ServiceConfig,
    detector: SensitivityDetector,
    scorer: Arc<AnomalyScorer>,
    pipeline: RagPipeline,
    counters: Arc<EvaluationCounters>,
    sink: Option<Arc<dyn ReportSink>>,
}

impl ComplianceEngine {
    pub fn new(
        config: ServiceConfig,
        detector: SensitivityDetector,
        scorer: Arc<AnomalyScorer>,
        pipeline: RagPipeline,
        counters: Arc<EvaluationCounters>,
    ) -> Self {
        Self {
            config,
            detector,
            scorer,
            pipeline,
            counters,
            sink: None,
        }
    }

    /// Wire every component from configuration
    pub fn from_config(
        config: ServiceConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
        counters: Arc<EvaluationCounters>,
    ) -> Result<Self, EngineError> {
        let rules = match &config.sensitivity_rules_path {
            Some(path) => SensitivityRules::load(path)?,
            None => SensitivityRules::default(),
        };
        let detector = SensitivityDetector::new(&rules)?;
        let scorer = Arc::new(AnomalyScorer::new(config.model_path(), config.min_training_events));
        let store = Arc::new(PolicyStore::open_or_empty(config.index_dir(), embedder.dimension())?);
        let mut pipeline = RagPipeline::new(embedder, generator, store);
        if let Some(path) = &config.risk_rules_path {
            pipeline = pipeline.with_risk_rules(RiskKeywordRules::load(path)?);
        }

        log::info!(
            "Compliance engine ready: index {} rows, anomaly model {}",
            pipeline.store().len(),
            if scorer.is_ready() { "loaded" } else { "not trained" }
        );

        Ok(Self::new(config, detector, scorer, pipeline, counters))
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn detector(&self) -> &SensitivityDetector {
        &self.detector
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    pub fn pipeline(&self) -> &RagPipeline {
        &self.pipeline
    }

    /// Sensitivity + features for one event
    pub fn inspect(&self, event: &LogEvent) -> (SensitivityResult, EventFeatures) {
        let sensitivity = self.detector.detect(&event.message);
        let features = featurize(event, &sensitivity);
        (sensitivity, features)
    }

    pub fn evaluate(&self, event: &LogEvent) -> Result<Evaluation, EngineError> {
        self.counters.record_event();

        let (sensitivity, features) = self.inspect(event);
        let anomaly = self.scorer.score(&features);

        if sensitivity.has_sensitive_data {
            self.counters.record_sensitive();
        }
        if anomaly.is_anomaly() {
            self.counters.record_anomaly();
        }

        if !(sensitivity.has_sensitive_data || anomaly.is_anomaly()) {
            let reason = match &anomaly {
                AnomalyOutcome::Unavailable { .. } => "no sensitive data; anomaly model unavailable",
                AnomalyOutcome::Scored(_) => "no sensitive data; activity within normal range",
            };
            return Ok(Evaluation {
                event: event.clone(),
                sensitivity,
                features,
                anomaly,
                outcome: EvaluationOutcome::Triaged {
                    reason: reason.to_string(),
                },
            });
        }

        self.counters.record_escalation();
        let question = escalation_question(event);
        log::info!(
            "Escalating event (action={}, sensitivity={}, anomaly={})",
            event.action,
            sensitivity.sensitivity,
            anomaly.is_anomaly()
        );

        let report = self.build_report(&question, self.config.top_k)?;

        Ok(Evaluation {
            event: event.clone(),
            sensitivity,
            features,
            anomaly,
            outcome: EvaluationOutcome::Escalated {
                question,
                report: Box::new(report),
            },
        })
    }

    /// Ad-hoc question through the pipeline
    pub fn ask(&self, question: &str, top_k: usize) -> Result<PipelineResult, PipelineError> {
        self.pipeline.answer(question, top_k)
    }

    /// Ad-hoc question assembled into an audit report (also handed to the sink)
    pub fn audit_report(&self, question: &str, top_k: usize) -> Result<AuditReport, EngineError> {
        self.build_report(question, top_k)
    }

    /// Detect + featurize each event, then retrain the outlier model
    pub fn retrain(&self, events: &[LogEvent]) -> Result<TrainSummary, ModelError> {
        let features: Vec<EventFeatures> = events.iter().map(|e| self.inspect(e).1).collect();
        self.scorer.train(&features)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    fn build_report(&self, question: &str, top_k: usize) -> Result<AuditReport, EngineError> {
        let result = self.pipeline.answer(question, top_k)?;
        let report = AuditReport::assemble(&result, &self.config.policy_source);

        if let Some(sink) = &self.sink {
            sink.submit(&report)?;
        }
        Ok(report)
    }
}
