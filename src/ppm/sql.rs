//! SQL statements run through the PPM SQL runner.
//!
//! Ids are interpolated into the statement text, so every builder rejects
//! anything that is not a plain decimal id.

use crate::error::SyncError;
use crate::models::{Feature, ImpactedSystem, Milestone};

/// Lookup type of the impacted systems list.
const SYSTEMS_LOOKUP: &str = "MTN - IS Impacted Systems List";
/// Lookup type of the IS domains list.
const DOMAINS_LOOKUP: &str = "MTN - IS Domains List";
const KTLO_REFERENCE_CODE: &str = "IS_PMO_IT_KTLO_PROJECT";

/// Check that `value` is a numeric PPM id.
pub fn numeric_id<'a>(label: &str, value: &'a str) -> Result<&'a str, SyncError> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(value)
    } else {
        Err(SyncError::invalid(format!(
            "{} must be a numeric id, got '{}'",
            label, value
        )))
    }
}

/// Distinct domains of the assessment's impacted systems.
pub fn impacted_domains(assessment_id: &str) -> Result<String, SyncError> {
    let id = numeric_id("assessment id", assessment_id)?;
    Ok(format!(
        "SELECT DISTINCT kl.visible_user_data1 \
         FROM kcrt_table_entries kte \
         INNER JOIN knta_parameter_set_fields kpsf ON kte.parameter_set_field_id = kpsf.parameter_set_field_id AND kpsf.parameter_token LIKE 'SYS_IMPACTED' \
         INNER JOIN knta_lookups kl ON kte.parameter2 = kl.lookup_code AND kl.lookup_type LIKE '{systems}' \
         INNER JOIN knta_lookups kldom ON kl.user_data1 = kldom.lookup_code AND kldom.lookup_type LIKE '{domains}' AND kldom.user_data1 IS NOT NULL \
         WHERE kte.request_id = {id}",
        systems = SYSTEMS_LOOKUP,
        domains = DOMAINS_LOOKUP,
        id = id,
    ))
}

/// Distinct domains of the IS PMO Features referenced by the assessment.
pub fn feature_domains(assessment_id: &str) -> Result<String, SyncError> {
    let id = numeric_id("assessment id", assessment_id)?;
    Ok(format!(
        "SELECT DISTINCT kl.meaning \
         FROM knta_references_v krv \
         INNER JOIN kcrt_req_header_details krhd ON krv.target_id = krhd.request_id \
         INNER JOIN knta_lookups kl ON krhd.parameter2 = kl.meaning AND kl.lookup_type LIKE '{domains}' \
         WHERE krv.reference_detail LIKE 'IS PMO Feature' AND krv.source_entity_id = 20 AND krv.source_id = {id}",
        domains = DOMAINS_LOOKUP,
        id = id,
    ))
}

/// IT project metadata. KTLO projects get their EPMO and priority columns
/// blanked.
pub fn project_information(project_id: &str) -> Result<String, SyncError> {
    let id = numeric_id("project id", project_id)?;
    let unless_ktlo = |expr: &str, alias: &str| {
        format!(
            "CASE WHEN krt.reference_code = '{ktlo}' THEN 'null' ELSE nvl({expr}, 'null') END AS {alias}",
            ktlo = KTLO_REFERENCE_CODE,
            expr = expr,
            alias = alias,
        )
    };
    Ok(format!(
        "SELECT kfpp.request_id AS ispmo_prj_num, kfpp.prj_project_id AS ispmo_prj_url, \
         nvl(kfpp.prj_phase_meaning, 'null') AS ispmo_prj_phase, nvl(ks.status_name, 'null') AS ispmo_prj_status, \
         {epmo_num}, \
         nvl(replace(kfpp.prj_project_manager_username, '#@#', '; '), 'null') AS ispmo_pm, \
         nvl(initcap(ppr.overall_health_indicator), 'null') AS ispmo_prj_rag, \
         nvl(kfpp.prj_business_unit_meaning, 'null') AS ispm_epmo_business_unit, \
         nvl(krhd.visible_parameter1, 'null') AS ispmo_epmo_sub_area, \
         {bu_priority}, {org_priority}, \
         nvl(krt.request_type_name, 'null') AS ispmo_project_type, nvl(kr.description, 'null') AS ispmo_prj_short_desc \
         FROM kcrt_fg_pfm_project kfpp \
         INNER JOIN kcrt_request_types krt ON kfpp.request_type_id = krt.request_type_id \
         INNER JOIN kcrt_requests kr ON kfpp.request_id = kr.request_id \
         INNER JOIN kcrt_statuses ks ON kr.status_id = ks.status_id \
         INNER JOIN kcrt_req_header_details krhd ON kr.request_id = krhd.request_id \
         INNER JOIN kcrt_request_details krd ON kr.request_id = krd.request_id AND krd.batch_number = 1 \
         INNER JOIN pm_projects pp ON kr.request_id = pp.pfm_request_id \
         INNER JOIN pm_project_rollup ppr ON pp.rollup_id = ppr.rollup_id \
         WHERE kfpp.prj_project_id = {id}",
        epmo_num = unless_ktlo("krd.visible_parameter3", "epmo_project_num"),
        bu_priority = unless_ktlo("krhd.visible_parameter2", "ispmo_epmo_bu_priority"),
        org_priority = unless_ktlo("krhd.visible_parameter3", "ispmo_epmo_org_priority"),
        id = id,
    ))
}

/// Release inclusion flags of the IT project.
pub fn project_release(project_id: &str) -> Result<String, SyncError> {
    let id = numeric_id("project id", project_id)?;
    Ok(format!(
        "SELECT nvl(krd.visible_parameter11, 'null') AS ispmo_incl_retail_build, \
         nvl(krd.visible_parameter12, 'null') AS ispmo_incl_charg_sys, \
         nvl(krd.visible_parameter13, 'null') AS ispmo_incl_wholsal_rel, \
         nvl(krd.visible_parameter14, 'null') AS ispmo_incl_siya_rel, \
         nvl(krd.visible_parameter15, 'null') AS ispmo_incl_ilula_rel, \
         nvl(krd.visible_parameter20, 'null') AS ispmo_incl_siebel_rel \
         FROM kcrt_fg_pfm_project kfpp \
         INNER JOIN kcrt_request_details krd ON kfpp.request_id = krd.request_id AND krd.batch_number = 1 \
         WHERE kfpp.prj_project_id = {id}",
        id = id,
    ))
}

/// The EPMO project the IT project belongs to.
pub fn epmo_project(project_id: &str) -> Result<String, SyncError> {
    let id = numeric_id("project id", project_id)?;
    Ok(format!(
        "SELECT pp.project_id AS ispmo_epmo_prj_url, pp.pfm_request_id AS ispmo_epmo_prj_num, \
         nvl(pm_utils.get_project_manager_name_list(pp.project_id), 'null') AS ispmo_epmo_pm, \
         nvl(ppt.project_type_name, 'null') AS ispmo_epmo_type \
         FROM kcrt_fg_pfm_project kfpp \
         INNER JOIN kcrt_request_details krd ON kfpp.request_id = krd.request_id AND krd.batch_number = 1 \
         INNER JOIN pm_projects pp ON krd.parameter3 = pp.project_id \
         INNER JOIN pm_project_types ppt ON pp.project_id = ppt.project_id \
         WHERE kfpp.prj_project_id = {id}",
        id = id,
    ))
}

/// Rows of the assessment's Impacted Systems table, by domain then system.
pub fn impacted_systems(assessment_id: &str) -> Result<String, SyncError> {
    let id = numeric_id("assessment id", assessment_id)?;
    Ok(format!(
        "SELECT nvl(kldom.user_data2, 'null') AS {workspace}, kl.visible_user_data1 AS {domain}, \
         kl.meaning AS {system}, nvl(kte.visible_parameter3, 'null') AS {involvement}, \
         nvl(kte.visible_parameter4, 'null') AS {estimate} \
         FROM kcrt_table_entries kte \
         INNER JOIN knta_parameter_set_fields kpsf ON kte.parameter_set_field_id = kpsf.parameter_set_field_id AND kpsf.parameter_token LIKE 'SYS_IMPACTED' \
         INNER JOIN knta_lookups kl ON kte.parameter2 = kl.lookup_code AND kl.lookup_type LIKE '{systems}' \
         INNER JOIN knta_lookups kldom ON kl.user_data1 = kldom.lookup_code AND kldom.lookup_type LIKE '{domains}' AND kldom.user_data1 IS NOT NULL \
         WHERE kte.request_id = {id} \
         ORDER BY kl.visible_user_data1, kl.meaning",
        workspace = ImpactedSystem::WORKSPACE_COLUMN,
        domain = ImpactedSystem::DOMAIN_COLUMN,
        system = ImpactedSystem::SYSTEM_COLUMN,
        involvement = ImpactedSystem::INVOLVEMENT_COLUMN,
        estimate = ImpactedSystem::ESTIMATE_COLUMN,
        systems = SYSTEMS_LOOKUP,
        domains = DOMAINS_LOOKUP,
        id = id,
    ))
}

/// IS PMO Features and Testing Features linked to the IT project.
pub fn linked_features(project_id: &str) -> Result<String, SyncError> {
    let id = numeric_id("project id", project_id)?;
    Ok(format!(
        "SELECT kr.request_id AS {request_id}, krhd.parameter2 AS {domain}, \
         nvl(krd.visible_parameter5, 'null') AS {tracker_url} \
         FROM kcrt_requests kr \
         INNER JOIN kcrt_request_types krt ON kr.request_type_id = krt.request_type_id \
         INNER JOIN kcrt_req_header_details krhd ON kr.request_id = krhd.request_id \
         INNER JOIN kcrt_request_details krd ON kr.request_id = krd.request_id AND krd.batch_number = 1 \
         WHERE krt.request_type_name IN ('IS PMO Feature', 'IS PMO Testing Feature') \
         AND kr.status_code NOT IN ('CANCELLED', 'CLOSED') \
         AND krhd.parameter1 = '{id}' \
         ORDER BY kr.request_id",
        request_id = Feature::REQUEST_ID_COLUMN,
        domain = Feature::DOMAIN_COLUMN,
        tracker_url = Feature::TRACKER_URL_COLUMN,
        id = id,
    ))
}

/// Major milestones of the IT project's work plan.
pub fn project_milestones(project_id: &str) -> Result<String, SyncError> {
    let id = numeric_id("project id", project_id)?;
    Ok(format!(
        "SELECT wt.sequence_number AS {seq}, wt.task_name AS {name}, \
         nvl(to_char(wts.sched_finish_date, 'YYYY-MM-DD'), 'null') AS {scheduled}, \
         nvl(to_char(wta.act_finish_date, 'YYYY-MM-DD'), 'null') AS {actual}, \
         nvl(kl.meaning, 'null') AS {status} \
         FROM wp_tasks wt \
         INNER JOIN wp_task_schedule wts ON wt.task_schedule_id = wts.task_schedule_id \
         INNER JOIN wp_task_actuals wta ON wt.task_actuals_id = wta.actuals_id \
         LEFT OUTER JOIN knta_lookups kl ON wt.status = kl.lookup_code AND kl.lookup_type = 'WP_TASK_STATUS' \
         INNER JOIN pm_work_plans pwp ON wt.work_plan_id = pwp.work_plan_id \
         WHERE pwp.project_id = {id} AND wt.is_major = 'Y' \
         ORDER BY wt.sequence_number",
        seq = Milestone::SEQUENCE_COLUMN,
        name = Milestone::NAME_COLUMN,
        scheduled = Milestone::SCHEDULED_COLUMN,
        actual = Milestone::ACTUAL_COLUMN,
        status = Milestone::STATUS_COLUMN,
        id = id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_numeric_ids() {
        for bad in ["", " ", "12a", "1; DROP TABLE x", "-1"] {
            assert!(impacted_domains(bad).is_err(), "{:?} accepted", bad);
        }
    }

    #[test]
    fn trims_and_interpolates_ids() {
        let sql = feature_domains(" 50001 ").unwrap();
        assert!(sql.ends_with("krv.source_id = 50001"));
    }

    #[test]
    fn project_query_blanks_epmo_columns_for_ktlo() {
        let sql = project_information("30412").unwrap();
        assert_eq!(sql.matches(KTLO_REFERENCE_CODE).count(), 3);
        assert!(sql.contains("AS epmo_project_num"));
    }

    #[test]
    fn row_queries_alias_the_model_columns() {
        let sql = impacted_systems("50001").unwrap();
        assert!(sql.contains(&format!("AS {}", ImpactedSystem::DOMAIN_COLUMN)));
        assert!(sql.contains("ORDER BY kl.visible_user_data1, kl.meaning"));

        let sql = linked_features("30412").unwrap();
        assert!(sql.contains(&format!("AS {}", Feature::TRACKER_URL_COLUMN)));

        let sql = project_milestones("30412").unwrap();
        assert!(sql.contains(&format!("AS {}", Milestone::SEQUENCE_COLUMN)));
    }
}
