use chrono::NaiveDateTime;

use super::catalog::{self, FieldFormat, FieldMapping, MetadataSource};
use super::table_render::{render_table, TableRow, MAX_FIELD_CHARS};
use super::{CreateRequestPayload, FieldSet, UpdateRequestPayload};
use crate::error::SyncError;
use crate::models::{is_present, ImpactedSystem, Milestone, ProjectVariant, ValueMap};

pub const LAST_UPDATE_TOKEN: &str = "REQ.LAST_UPDATE_DATE";
pub const ENTITY_LAST_UPDATE_TOKEN: &str = "REQ.ENTITY_LAST_UPDATE_DATE";
pub const PROJECT_NAME_TOKEN: &str = "REQ.KNTA_MASTER_PROJ_REF";
pub const ASSESSMENT_TOKEN: &str = "REQD.IMPACT_ASSESSMENT_NUM";
pub const DOMAIN_TOKEN: &str = "REQ.IS_DOMAIN";
pub const MILESTONES_TOKEN: &str = "REQD.ISPMO_PRJ_MILESTONES";
pub const IMPACTED_SYSTEMS_TOKEN: &str = "REQD.ISPMO_IMPACTED_SYSTEMS";
pub const DOMAIN_INVOLVEMENT_TOKEN: &str = "REQD.ISPMO_IS_INVOLVEMENT";
pub const ALL_INVOLVEMENT_TOKEN: &str = "REQD.ISPMO_ALL_IS_INVOLVEMENT";

/// Separator of the impacted-system name list.
pub const SYSTEM_NAME_SEPARATOR: &str = ";";

/// Format PPM expects in `dateValue` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The fixed inputs of one Feature to create.
#[derive(Debug, Clone, Copy)]
pub struct FeatureDraft<'a> {
    pub assessment_id: &'a str,
    pub project_name: &'a str,
    pub domain: &'a str,
    pub variant: ProjectVariant,
    /// PPM base URL, used to link to project pages.
    pub base_url: &'a str,
}

impl FeatureDraft<'_> {
    fn validate(&self) -> Result<(), SyncError> {
        for (name, value) in [
            ("assessment id", self.assessment_id),
            ("project name", self.project_name),
            ("domain", self.domain),
        ] {
            if !is_present(Some(value)) {
                return Err(SyncError::invalid(format!("Feature {} is required", name)));
            }
        }
        Ok(())
    }
}

/// Build the create request for one missing domain.
///
/// `project` holds the IT project columns and, merged in, the release
/// columns. `epmo` is the EPMO project record; it is only read for variants
/// that source it and only when it has present values. Absent metadata never
/// fails synthesis; only the draft's own fields are required.
pub fn synthesize_create(
    draft: &FeatureDraft<'_>,
    project: &ValueMap,
    epmo: Option<&ValueMap>,
    milestones: &[Milestone],
    stamp: NaiveDateTime,
) -> Result<CreateRequestPayload, SyncError> {
    draft.validate()?;

    let mut fields = FieldSet::new();
    push_stamp(&mut fields, stamp);
    fields.push_string(PROJECT_NAME_TOKEN, draft.project_name);
    fields.push_string(ASSESSMENT_TOKEN, draft.assessment_id);
    fields.push_string(DOMAIN_TOKEN, draft.domain);

    for (key, value) in project.present() {
        let mapping = catalog::lookup(draft.variant, MetadataSource::Project, key)
            .or_else(|| catalog::lookup(draft.variant, MetadataSource::Release, key));
        match mapping {
            Some(mapping) => push_mapped(&mut fields, mapping, value, draft, project),
            None => tracing::debug!("No {} mapping for {}, skipped", draft.variant.as_str(), key),
        }
    }

    if let Some(table) = render_field(milestones.iter(), MILESTONES_TOKEN) {
        fields.push_string(MILESTONES_TOKEN, table);
    }

    if draft.variant.sources_epmo_project() {
        if let Some(epmo) = epmo.filter(|m| m.has_present_values()) {
            for (key, value) in epmo.present() {
                if let Some(mapping) =
                    catalog::lookup(draft.variant, MetadataSource::EpmoProject, key)
                {
                    push_mapped(&mut fields, mapping, value, draft, project);
                }
            }
        }
    }

    Ok(CreateRequestPayload::feature(fields))
}

fn push_mapped(
    fields: &mut FieldSet,
    mapping: &FieldMapping,
    value: &str,
    draft: &FeatureDraft<'_>,
    project: &ValueMap,
) {
    match mapping.format {
        FieldFormat::Plain => fields.push_string(mapping.token, value),
        FieldFormat::ProjectLink => {
            fields.push_string(mapping.token, catalog::project_link(draft.base_url, value))
        }
        FieldFormat::ProjectReference => {
            let epmo_number = if draft.variant.exposes_epmo_reference() {
                project.get(catalog::EPMO_NUMBER_KEY)
            } else {
                None
            };
            fields.push_string(
                catalog::DESCRIPTION_TOKEN,
                catalog::describe_feature(
                    project.get(catalog::PROJECT_NUMBER_KEY),
                    draft.project_name,
                    epmo_number,
                ),
            );
            fields.push_string(mapping.token, catalog::project_link(draft.base_url, value));
        }
    }
}

/// Build the update request for one existing Feature.
///
/// `domain_systems` are the systems the Feature carries (its own domain, or
/// everything for the testing Feature); `all_systems` feeds the cross-domain
/// table. Every token is always sent so that stale values are cleared.
pub fn synthesize_update(
    domain_systems: &[&ImpactedSystem],
    all_systems: &[ImpactedSystem],
    milestones: &[Milestone],
    stamp: NaiveDateTime,
) -> UpdateRequestPayload {
    let mut fields = FieldSet::new();
    push_stamp(&mut fields, stamp);
    fields.push_string(
        IMPACTED_SYSTEMS_TOKEN,
        impacted_system_names(domain_systems.iter().copied()),
    );
    fields.push_string(
        DOMAIN_INVOLVEMENT_TOKEN,
        render_field(domain_systems.iter().copied(), DOMAIN_INVOLVEMENT_TOKEN).unwrap_or_default(),
    );
    fields.push_string(
        ALL_INVOLVEMENT_TOKEN,
        render_field(all_systems.iter(), ALL_INVOLVEMENT_TOKEN).unwrap_or_default(),
    );
    fields.push_string(
        MILESTONES_TOKEN,
        render_field(milestones.iter(), MILESTONES_TOKEN).unwrap_or_default(),
    );

    UpdateRequestPayload { fields }
}

/// Distinct system names joined by [`SYSTEM_NAME_SEPARATOR`], in first-seen
/// order.
pub fn impacted_system_names<'a>(systems: impl IntoIterator<Item = &'a ImpactedSystem>) -> String {
    let mut names: Vec<&str> = Vec::new();
    for system in systems {
        if !names.contains(&system.system_name.as_str()) {
            names.push(&system.system_name);
        }
    }
    names.join(SYSTEM_NAME_SEPARATOR)
}

fn push_stamp(fields: &mut FieldSet, stamp: NaiveDateTime) {
    let stamp = stamp.format(DATE_FORMAT).to_string();
    fields.push_date(LAST_UPDATE_TOKEN, stamp.clone());
    fields.push_date(ENTITY_LAST_UPDATE_TOKEN, stamp);
}

fn render_field<'a, R: TableRow + 'a>(
    rows: impl IntoIterator<Item = &'a R>,
    token: &str,
) -> Option<String> {
    let table = render_table(rows, MAX_FIELD_CHARS)?;
    tracing::debug!(
        "{}: {} rows in {} characters, {} dropped",
        token,
        table.rows,
        table.chars,
        table.dropped
    );
    Some(table.html)
}
