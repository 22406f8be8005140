use ia_feature_sync::models::*;
use ia_feature_sync::reconcile::missing_domains;
use speculate2::speculate;

fn system(domain: &str, name: &str) -> ImpactedSystem {
    ImpactedSystem {
        workspace_ref: "1002".to_string(),
        domain: domain.to_string(),
        system_name: name.to_string(),
        involvement: "Build".to_string(),
        estimate_hours: "8".to_string(),
    }
}

fn feature(domain: &str) -> Feature {
    Feature {
        request_id: "70001".to_string(),
        domain: domain.to_string(),
        external_tracker_url: None,
    }
}

speculate! {
    describe "missing_domains" {
        it "returns impacted domains without a Feature, sorted" {
            let missing = missing_domains(["Network", "Billing", "CRM"], ["CRM"]);
            assert_eq!(missing, vec!["Billing", "Network"]);
        }

        it "returns nothing when every domain is covered" {
            let missing = missing_domains(["A", "B"], ["A", "B", "C"]);
            assert!(missing.is_empty());
        }

        it "collapses repeated impacted domains" {
            let missing = missing_domains(["B", "A", "B", "A"], Vec::<String>::new());
            assert_eq!(missing, vec!["A", "B"]);
        }

        it "returns nothing for no impacted domains" {
            assert!(missing_domains(Vec::<&str>::new(), ["A"]).is_empty());
        }

        it "matches labels exactly" {
            let missing = missing_domains(["Billing"], ["billing"]);
            assert_eq!(missing, vec!["Billing"]);
        }

        it "never returns an existing domain" {
            let impacted = ["D", "C", "B", "A", "C"];
            let existing = ["B", "E"];
            let missing = missing_domains(impacted, existing);
            for domain in &missing {
                assert!(!existing.contains(&domain.as_str()));
                assert!(impacted.contains(&domain.as_str()));
            }
            let mut sorted = missing.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(missing, sorted);
        }
    }

    describe "value presence" {
        it "treats null, blank and the null sentinel as absent" {
            for value in [None, Some(""), Some("   "), Some("null"), Some("NULL"), Some(" Null ")] {
                assert!(!is_present(value), "{:?} should be absent", value);
            }
        }

        it "treats falsy-looking text as present" {
            for value in ["0", "false", "N"] {
                assert!(is_present(Some(value)));
            }
        }

        it "only exposes present values through the map" {
            let map: ValueMap = [
                ("ISPMO_PRJ_NUM", Some("1001")),
                ("ISPMO_PRJ_PHASE", Some("null")),
                ("ISPMO_PM", None),
            ]
            .into_iter()
            .collect();

            assert_eq!(map.get("ISPMO_PRJ_NUM"), Some("1001"));
            assert!(!map.has("ISPMO_PRJ_PHASE"));
            assert_eq!(map.raw("ISPMO_PRJ_PHASE"), Some("null"));
            assert!(!map.has("ISPMO_PM"));
            assert_eq!(map.present().count(), 1);
        }
    }

    describe "feature system selection" {
        before {
            let systems = vec![
                system("Billing", "BSCS"),
                system("Billing", "Kenan"),
                system("CRM", "Siebel"),
                system("Network", "NetCracker"),
            ];
        }

        it "gives a domain Feature only its own systems" {
            let selected = feature("Billing").select_systems(&systems);
            let names: Vec<&str> = selected.iter().map(|s| s.system_name.as_str()).collect();
            assert_eq!(names, vec!["BSCS", "Kenan"]);
        }

        it "matches the Feature domain ignoring case" {
            assert_eq!(feature("crm").select_systems(&systems).len(), 1);
        }

        it "gives the Test Automation Feature every system" {
            let selected = feature(TEST_AUTOMATION_DOMAIN).select_systems(&systems);
            assert_eq!(selected.len(), systems.len());
        }

        it "gives a Feature of an unimpacted domain nothing" {
            assert!(feature("Finance").select_systems(&systems).is_empty());
        }
    }
}
