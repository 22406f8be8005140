//! Declarative mapping from metadata columns to IS PMO Feature tokens.
//!
//! Each [`FieldMapping`] says which query column feeds which request token,
//! how the value is formatted and which project variants expose it. Payload
//! synthesis walks the metadata it was given and looks each key up here;
//! keys without a mapping, or whose mapping is out of scope for the variant,
//! are skipped.

use crate::models::{is_present, ProjectVariant, ValueMap};
use crate::ppm::join_url;

/// View path appended to the PPM base URL to link to a project.
pub const PROJECT_VIEW_PATH: &str = "project/ViewProject.do?projectId=";

pub const DESCRIPTION_TOKEN: &str = "REQ.DESCRIPTION";
pub const PROJECT_NUMBER_KEY: &str = "ISPMO_PRJ_NUM";
pub const PROJECT_URL_KEY: &str = "ISPMO_PRJ_URL";
pub const EPMO_NUMBER_KEY: &str = "EPMO_PROJECT_NUM";

/// How a source value becomes a token value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Copied verbatim.
    Plain,
    /// A raw project id turned into a link to the project page.
    ProjectLink,
    /// The IT project's own id: emits the project link and, alongside it,
    /// the Feature description.
    ProjectReference,
}

/// Which variants expose a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantScope {
    All,
    /// Every variant that carries an EPMO programme reference.
    EpmoReference,
    /// Only variants whose EPMO project record is read.
    EpmoProject,
}

impl VariantScope {
    pub fn includes(&self, variant: ProjectVariant) -> bool {
        match self {
            Self::All => true,
            Self::EpmoReference => variant.exposes_epmo_reference(),
            Self::EpmoProject => variant.sources_epmo_project(),
        }
    }
}

/// Where a column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    Project,
    Release,
    EpmoProject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub source_key: &'static str,
    pub token: &'static str,
    /// Expected on every row of its source. Only checked for diagnostics.
    pub required: bool,
    pub format: FieldFormat,
    pub scope: VariantScope,
    pub source: MetadataSource,
}

const fn map(
    source: MetadataSource,
    source_key: &'static str,
    token: &'static str,
    required: bool,
    format: FieldFormat,
    scope: VariantScope,
) -> FieldMapping {
    FieldMapping {
        source_key,
        token,
        required,
        format,
        scope,
        source,
    }
}

use FieldFormat::{Plain, ProjectLink, ProjectReference};
use MetadataSource::{EpmoProject, Project, Release};
use VariantScope::{All, EpmoReference};

pub const CATALOG: &[FieldMapping] = &[
    // IT project
    map(Project, PROJECT_NUMBER_KEY, "REQD.ISPMO_PRJ_NUM", true, Plain, All),
    map(Project, PROJECT_URL_KEY, "REQD.ISPMO_PRJ_URL", true, ProjectReference, All),
    map(Project, "ISPMO_PRJ_PHASE", "REQD.ISPMO_PRJ_PHASE", false, Plain, All),
    map(Project, "ISPMO_PRJ_STATUS", "REQD.ISPMO_PRJ_STATUS", false, Plain, All),
    map(Project, EPMO_NUMBER_KEY, "REQD.EPMO_PROJECT_NUM", false, Plain, EpmoReference),
    map(Project, "ISPMO_PM", "REQD.ISPMO_PM", false, Plain, All),
    map(Project, "ISPMO_PRJ_RAG", "REQD.ISPMO_PRJ_RAG", false, Plain, All),
    map(Project, "ISPM_EPMO_BUSINESS_UNIT", "REQD.ISPM_EPMO_BUSINESS_UNIT", false, Plain, All),
    map(Project, "ISPMO_EPMO_SUB_AREA", "REQD.ISPMO_EPMO_SUB_AREA", false, Plain, All),
    map(Project, "ISPMO_EPMO_BU_PRIORITY", "REQD.ISPMO_EPMO_BU_PRIORITY", false, Plain, EpmoReference),
    map(Project, "ISPMO_EPMO_ORG_PRIORITY", "REQD.ISPMO_EPMO_ORG_PRIORITY", false, Plain, EpmoReference),
    map(Project, "ISPMO_PROJECT_TYPE", "REQD.ISPMO_PROJECT_TYPE", true, Plain, All),
    map(Project, "ISPMO_PRJ_SHORT_DESC", "REQD.ISPMO_PRJ_SHORT_DESC", false, Plain, All),
    // Release inclusion
    map(Release, "ISPMO_INCL_RETAIL_BUILD", "REQD.ISPMO_INCL_RETAIL_BUILD", false, Plain, All),
    map(Release, "ISPMO_INCL_CHARG_SYS", "REQD.ISPMO_INCL_CHARG_SYS", false, Plain, All),
    map(Release, "ISPMO_INCL_WHOLSAL_REL", "REQD.ISPMO_INCL_WHOLSAL_REL", false, Plain, All),
    map(Release, "ISPMO_INCL_SIYA_REL", "REQD.ISPMO_INCL_SIYA_REL", false, Plain, All),
    map(Release, "ISPMO_INCL_ILULA_REL", "REQD.ISPMO_INCL_ILULA_REL", false, Plain, All),
    map(Release, "ISPMO_INCL_SIEBEL_REL", "REQD.ISPMO_INCL_SIEBEL_REL", false, Plain, All),
    // EPMO project
    map(EpmoProject, "ISPMO_EPMO_PRJ_URL", "REQD.ISPMO_EPMO_PRJ_URL", true, ProjectLink, VariantScope::EpmoProject),
    map(EpmoProject, "ISPMO_EPMO_PRJ_NUM", "REQD.ISPMO_EPMO_PRJ_NUM", true, Plain, VariantScope::EpmoProject),
    map(EpmoProject, "ISPMO_EPMO_PM", "REQD.ISPMO_EPMO_PM", false, Plain, VariantScope::EpmoProject),
    map(EpmoProject, "ISPMO_EPMO_TYPE", "REQD.ISPMO_EPMO_TYPE", false, Plain, VariantScope::EpmoProject),
];

/// Mapping for a column of `source`, if `variant` exposes it.
pub fn lookup(
    variant: ProjectVariant,
    source: MetadataSource,
    key: &str,
) -> Option<&'static FieldMapping> {
    CATALOG
        .iter()
        .find(|m| m.source == source && m.source_key == key && m.scope.includes(variant))
}

/// Every column `variant` is expected to expose from `source`.
pub fn expected_fields(
    variant: ProjectVariant,
    source: MetadataSource,
) -> impl Iterator<Item = &'static FieldMapping> {
    CATALOG
        .iter()
        .filter(move |m| m.source == source && m.scope.includes(variant))
}

/// Keys of `meta` with a present value that `variant` does not declare.
pub fn undeclared_keys<'m>(
    variant: ProjectVariant,
    source: MetadataSource,
    meta: &'m ValueMap,
) -> Vec<&'m str> {
    meta.present()
        .map(|(k, _)| k)
        .filter(|k| lookup(variant, source, k).is_none())
        .collect()
}

/// Required columns of `source` that have no present value in `meta`.
pub fn missing_required(
    variant: ProjectVariant,
    source: MetadataSource,
    meta: &ValueMap,
) -> Vec<&'static str> {
    expected_fields(variant, source)
        .filter(|m| m.required && !meta.has(m.source_key))
        .map(|m| m.source_key)
        .collect()
}

/// The Feature description.
///
/// `"(IS <project number>) <project name>"`, followed by
/// `" (EPMO <epmo number>)"` when an EPMO number is present. Without a
/// project number the `(IS ...)` prefix is left out.
pub fn describe_feature(
    project_number: Option<&str>,
    project_name: &str,
    epmo_number: Option<&str>,
) -> String {
    let mut description = match project_number.filter(|n| is_present(Some(*n))) {
        Some(num) => format!("(IS {}) {}", num.trim(), project_name),
        None => project_name.to_string(),
    };
    if let Some(epmo) = epmo_number.filter(|n| is_present(Some(*n))) {
        description.push_str(&format!(" (EPMO {})", epmo.trim()));
    }
    description
}

/// Link to a project's page on the PPM instance at `base_url`.
pub fn project_link(base_url: &str, project_id: &str) -> String {
    format!("{}{}", join_url(base_url, PROJECT_VIEW_PATH), project_id.trim())
}
