//! Risk Engine - Analysis Pipeline
//!
//! host facts → features → classifier → attribution → hybrid decision,
//! plus on-demand drift checks. Shared state is read-only apart from the
//! model registry's atomic swap and an analyses counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::logic::config::EngineConfig;
use crate::logic::drift::{
    retrain_eligibility, DriftMonitor, DriftReport, DriftStatus, RetrainEligibility,
};
use crate::logic::explain::{explain, Attribution};
use crate::logic::features::{FeatureBuilder, FeatureVector};
use crate::logic::host::HostFacts;
use crate::logic::hybrid::{combine, HybridVerdict};
use crate::logic::intel::{PortIntelligenceStore, PortRecord};
use crate::logic::model::{ClassifierVerdict, ModelMetadata, ModelRegistry, RiskClassifier};
use crate::logic::posture::{self, SecurityPosture};


/// One open port with the catalog knowledge applied to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortFinding {
    pub port: u16,
    pub service: String,
    /// Host-supplied, else catalog, else 0
    pub cvss: f64,
    pub record: Option<PortRecord>,
}

/// Everything derived from one host. Projections are views over this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostAnalysis {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub host: HostFacts,
    pub ports: Vec<PortFinding>,
    pub features: FeatureVector,
    pub classifier: ClassifierVerdict,
    pub attribution: Attribution,
    pub hybrid: HybridVerdict,
    pub posture: SecurityPosture,
    pub model: ModelMetadata,
}

pub struct RiskEngine {
    store: Arc<PortIntelligenceStore>,
    models: Arc<ModelRegistry>,
    config: Arc<EngineConfig>,
    drift: DriftMonitor,
    analyses: AtomicU64,
    started_at: DateTime<Utc>,
}

impl RiskEngine {
    pub fn new(
        store: Arc<PortIntelligenceStore>,
        models: Arc<ModelRegistry>,
        config: Arc<EngineConfig>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Risk engine ready: {} catalog records, model loaded: {}",
            store.len(),
            models.is_loaded()
        );
        Ok(Self {
            drift: DriftMonitor::new(config.drift.clone()),
            store,
            models,
            config,
            analyses: AtomicU64::new(0),
            started_at: Utc::now(),
        })
    }

    pub fn analyze(&self, host: &HostFacts) -> Result<HostAnalysis, EngineError> {
        // Pin one model for the whole request
        let active = self.models.current()?;
        let model = active.model();

        let features = FeatureBuilder::new(&self.store, &self.config.features).build(host);
        if !features.is_finite() {
            return Err(EngineError::InvalidHostFacts(format!(
                "host {} produced non-finite features",
                host.host_id()
            )));
        }

        let classifier = model.predict(&features)?;
        let attribution = explain(&features, model, classifier.tier)?;
        let hybrid = combine(&features, &classifier, host, &self.store, &self.config.hybrid)?;
        let posture = posture::assess(&features, hybrid.critical_port_count, hybrid.high_port_count);
        let ports = self
            .store
            .resolve(host)
            .iter()
            .map(|r| PortFinding {
                port: r.port.port,
                service: r.port.service.clone(),
                cvss: r.cvss,
                record: r.record.cloned(),
            })
            .collect();

        self.analyses.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "Analyzed {}: {} ({:.2}), classifier {} at {:.1}%",
            host.host_id(),
            hybrid.final_tier,
            hybrid.final_score,
            classifier.tier,
            classifier.confidence * 100.0
        );

        Ok(HostAnalysis {
            analysis_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            host: host.clone(),
            ports,
            features,
            classifier,
            attribution,
            hybrid,
            posture,
            model: active.metadata().clone(),
        })
    }

    /// Analyze each host independently; one failure does not stop the rest
    pub fn analyze_all(&self, hosts: &[HostFacts]) -> Vec<Result<HostAnalysis, EngineError>> {
        hosts
            .iter()
            .map(|host| {
                self.analyze(host).map_err(|e| {
                    log::warn!("Analysis of {} failed at {}: {}", host.host_id(), e.stage(), e);
                    e
                })
            })
            .collect()
    }

    pub fn check_drift(&self, reference: &[FeatureVector], window: &[FeatureVector]) -> DriftStatus {
        self.drift.status(reference, window)
    }

    pub fn retrain_eligibility(&self, report: &DriftReport, new_samples: usize) -> RetrainEligibility {
        retrain_eligibility(report, new_samples, self.config.drift.min_retrain_samples)
    }

    pub fn analyses_processed(&self) -> u64 {
        self.analyses.load(Ordering::Relaxed)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn store(&self) -> &PortIntelligenceStore {
        &self.store
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
