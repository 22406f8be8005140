//! The two sync runs, sequenced against the PPM and notifier collaborators.
//!
//! Every external call is awaited before the next one starts. The first
//! failure aborts the run: nothing is retried and Features already created
//! or updated are left in place.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::SyncError;
use crate::models::{
    is_present, sort_milestones, Feature, ImpactedSystem, Milestone, ProjectVariant, ValueMap,
};
use crate::notify::Notifier;
use crate::payload::catalog::{self, MetadataSource};
use crate::payload::{impacted_system_names, synthesize_create, synthesize_update, FeatureDraft};
use crate::ppm::{sql, QueryRunner, RequestWriter, CHILD_RELATION};
use crate::reconcile::missing_domains;

/// A Feature created by [`FeatureSync::create_missing_features`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedFeature {
    pub domain: String,
    pub request_id: String,
}

/// What a create run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateOutcome {
    pub created: Vec<CreatedFeature>,
}

impl CreateOutcome {
    /// Ids of the created Features, in creation order and without repeats.
    pub fn request_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.created.len());
        for feature in &self.created {
            if !ids.contains(&feature.request_id) {
                ids.push(feature.request_id.clone());
            }
        }
        ids
    }
}

/// What an update run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Ids of the refreshed Features, in update order.
    pub updated: Vec<String>,
    /// Number of notifier calls made.
    pub notified: usize,
}

/// Runs create and update syncs for one PPM instance.
pub struct FeatureSync<'a> {
    queries: &'a dyn QueryRunner,
    writer: &'a dyn RequestWriter,
    notifier: Option<&'a dyn Notifier>,
    base_url: String,
    stamp: Option<NaiveDateTime>,
}

impl<'a> FeatureSync<'a> {
    /// `base_url` is the PPM root that project links are built against.
    pub fn new(
        queries: &'a dyn QueryRunner,
        writer: &'a dyn RequestWriter,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            queries,
            writer,
            notifier: None,
            base_url: base_url.into(),
            stamp: None,
        }
    }

    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Use a fixed last-update stamp instead of the local clock.
    pub fn with_stamp(mut self, stamp: NaiveDateTime) -> Self {
        self.stamp = Some(stamp);
        self
    }

    fn stamp(&self) -> NaiveDateTime {
        self.stamp.unwrap_or_else(|| chrono::Local::now().naive_local())
    }

    /// Create a Feature for every impacted domain that has none and link the
    /// new Features under the assessment.
    pub async fn create_missing_features(
        &self,
        assessment_id: &str,
        project_id: &str,
        project_name: &str,
        variant: ProjectVariant,
    ) -> Result<CreateOutcome, SyncError> {
        let assessment_id = sql::numeric_id("assessment id", assessment_id)?;
        let project_id = sql::numeric_id("project id", project_id)?;
        if !is_present(Some(project_name)) {
            return Err(SyncError::invalid("project name is required"));
        }

        let impacted = self
            .queries
            .run(&sql::impacted_domains(assessment_id)?)
            .await?
            .first_column();
        if impacted.is_empty() {
            tracing::info!("Assessment {} has no impacted domains", assessment_id);
            return Ok(CreateOutcome::default());
        }

        let existing = self
            .queries
            .run(&sql::feature_domains(assessment_id)?)
            .await?
            .first_column();
        let missing = missing_domains(&impacted, &existing);
        tracing::info!(
            "Assessment {}: {} impacted domain(s), {} with Features, {} missing",
            assessment_id,
            impacted.len(),
            existing.len(),
            missing.len()
        );
        if missing.is_empty() {
            return Ok(CreateOutcome::default());
        }

        let project = self.project_metadata(project_id, variant).await?;
        let epmo = if variant.sources_epmo_project() {
            Some(self.epmo_metadata(project_id, variant).await?)
        } else {
            None
        };
        let milestones = self.milestones(project_id).await?;

        let stamp = self.stamp();
        let mut outcome = CreateOutcome::default();
        for domain in &missing {
            let draft = FeatureDraft {
                assessment_id,
                project_name,
                domain,
                variant,
                base_url: &self.base_url,
            };
            let payload = synthesize_create(&draft, &project, epmo.as_ref(), &milestones, stamp)?;
            let request_id = self.writer.create(&payload).await?;
            tracing::info!("Created Feature {} for domain {}", request_id, domain);
            outcome.created.push(CreatedFeature {
                domain: domain.clone(),
                request_id,
            });
        }

        self.writer
            .link(assessment_id, &outcome.request_ids(), CHILD_RELATION)
            .await?;

        Ok(outcome)
    }

    /// Refresh the impacted-system fields of every Feature linked to the
    /// project, notifying the tracker for Features that are mirrored there.
    pub async fn update_features(
        &self,
        assessment_id: &str,
        project_id: &str,
    ) -> Result<UpdateOutcome, SyncError> {
        let assessment_id = sql::numeric_id("assessment id", assessment_id)?;
        let project_id = sql::numeric_id("project id", project_id)?;

        let systems = self
            .queries
            .run(&sql::impacted_systems(assessment_id)?)
            .await?
            .maps()
            .iter()
            .map(ImpactedSystem::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        if systems.is_empty() {
            tracing::info!("Assessment {} has no impacted systems", assessment_id);
            return Ok(UpdateOutcome::default());
        }

        let features = self
            .queries
            .run(&sql::linked_features(project_id)?)
            .await?
            .maps()
            .iter()
            .map(Feature::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(
            "Project {}: {} linked Feature(s), {} impacted system(s)",
            project_id,
            features.len(),
            systems.len()
        );
        if features.is_empty() {
            return Ok(UpdateOutcome::default());
        }

        let milestones = self.milestones(project_id).await?;

        let stamp = self.stamp();
        let mut outcome = UpdateOutcome::default();
        for feature in &features {
            let selected = feature.select_systems(&systems);
            let payload = synthesize_update(&selected, &systems, &milestones, stamp);
            self.writer.update(&feature.request_id, &payload).await?;
            outcome.updated.push(feature.request_id.clone());

            match (self.notifier, feature.external_tracker_url.as_deref()) {
                (Some(notifier), Some(url)) => {
                    let names = impacted_system_names(selected.iter().copied());
                    notifier.notify(url, &names).await?;
                    outcome.notified += 1;
                }
                (Some(_), None) => {
                    tracing::debug!("Feature {} has no tracker URL", feature.request_id)
                }
                (None, _) => {}
            }
        }

        Ok(outcome)
    }

    /// Project columns with the release columns merged in.
    async fn project_metadata(
        &self,
        project_id: &str,
        variant: ProjectVariant,
    ) -> Result<ValueMap, SyncError> {
        let mut project = self
            .queries
            .run(&sql::project_information(project_id)?)
            .await?
            .first_map()
            .ok_or_else(|| SyncError::malformed(format!("project {} not found", project_id)))?;
        check_metadata(variant, MetadataSource::Project, &project);

        let release = self
            .queries
            .run(&sql::project_release(project_id)?)
            .await?
            .first_map()
            .unwrap_or_default();
        check_metadata(variant, MetadataSource::Release, &release);

        project.merge(release);
        Ok(project)
    }

    async fn epmo_metadata(
        &self,
        project_id: &str,
        variant: ProjectVariant,
    ) -> Result<ValueMap, SyncError> {
        let epmo = self
            .queries
            .run(&sql::epmo_project(project_id)?)
            .await?
            .first_map()
            .unwrap_or_default();
        if !epmo.has_present_values() {
            tracing::warn!("Project {} has no EPMO project", project_id);
        } else {
            check_metadata(variant, MetadataSource::EpmoProject, &epmo);
        }
        Ok(epmo)
    }

    async fn milestones(&self, project_id: &str) -> Result<Vec<Milestone>, SyncError> {
        let mut milestones = self
            .queries
            .run(&sql::project_milestones(project_id)?)
            .await?
            .maps()
            .iter()
            .map(Milestone::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        sort_milestones(&mut milestones);
        Ok(milestones)
    }
}

/// Log columns the catalog does not know and required columns that are absent.
fn check_metadata(variant: ProjectVariant, source: MetadataSource, meta: &ValueMap) {
    let undeclared = catalog::undeclared_keys(variant, source, meta);
    if !undeclared.is_empty() {
        tracing::warn!(
            "{:?} columns not mapped for {}, skipped: {}",
            source,
            variant,
            undeclared.join(", ")
        );
    }
    let missing = catalog::missing_required(variant, source, meta);
    if !missing.is_empty() {
        tracing::warn!(
            "{:?} is missing required columns for {}: {}",
            source,
            variant,
            missing.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_drop_repeats() {
        let outcome = CreateOutcome {
            created: vec![
                CreatedFeature {
                    domain: "Billing".to_string(),
                    request_id: "7".to_string(),
                },
                CreatedFeature {
                    domain: "CRM".to_string(),
                    request_id: "8".to_string(),
                },
                CreatedFeature {
                    domain: "Network".to_string(),
                    request_id: "7".to_string(),
                },
            ],
        };
        assert_eq!(outcome.request_ids(), vec!["7", "8"]);
    }
}
